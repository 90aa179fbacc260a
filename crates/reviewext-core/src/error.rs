//! Error types for the listing pipeline

use std::path::PathBuf;

use thiserror::Error;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Line wrapping errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WrapError {
    /// Width is zero or the continuation indent leaves no room for content
    #[error("wrap width {width} leaves no room after a continuation indent of {indent}")]
    NonPositiveWidth { width: usize, indent: usize },
}

/// Source scanning errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A listing directive was opened but never closed with `//}`
    #[error("unterminated //{directive} block opened at line {line}")]
    UnterminatedBlock { directive: String, line: usize },
}

/// Per-block rendering errors
#[derive(Error, Debug)]
pub enum RenderError {
    /// A block failed to render
    #[error("listing {id} (line {line}): {source}")]
    Block {
        id: String,
        line: usize,
        #[source]
        source: Box<RenderError>,
    },

    /// Wrapping could not be performed
    #[error(transparent)]
    Wrap(#[from] WrapError),

    /// The strategy rejected the block
    #[error("render strategy failed: {0}")]
    Strategy(String),
}

/// External file inclusion errors
#[derive(Error, Debug)]
pub enum MapfileError {
    /// The file does not exist
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The file cannot be read
    #[error("permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    /// The path cannot be resolved
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// The resolved path escapes the project root
    #[error("path outside project root: {}", .0.display())]
    OutsideProject(PathBuf),

    /// The extension is not on the allowlist
    #[error("file extension not allowed: {}", .0.display())]
    ExtensionNotAllowed(PathBuf),

    /// The file exceeds the size limit
    #[error("file too large: {} ({size} bytes, limit {limit})", .path.display())]
    TooLarge { path: PathBuf, size: u64, limit: u64 },

    /// Other IO failures
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A mapfile directive could not be parsed
    #[error("malformed directive at line {line}: {text}")]
    MalformedDirective { line: usize, text: String },
}

/// Legacy syntax conversion errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    /// An explicit `wrap=<n>` cannot be applied to a block body
    #[error("cannot pre-wrap //list[{label}]: {source}")]
    Wrap {
        label: String,
        #[source]
        source: WrapError,
    },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The settings file is not valid TOML for [`crate::config::Settings`]
    #[error("invalid settings: {0}")]
    Toml(#[from] toml::de::Error),

    /// The settings file cannot be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Top-level pipeline error
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Mapfile(#[from] MapfileError),

    #[error(transparent)]
    Convert(#[from] ConvertError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
