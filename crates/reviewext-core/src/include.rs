//! External file inclusion (`mapfile` / `maprange`)
//!
//! Pulls source snippets from files next to the document.
//!
//! # Syntax
//!
//! ```text
//! #@mapfile(code/sample.rb)
//! #@end
//!
//! #@maprange(code/sample.rb, BEGIN-MAIN, END-MAIN)
//! #@end
//!
//! //mapfile(code/sample.rb)
//! //maprange(code/sample.rb, BEGIN-MAIN, END-MAIN)
//! ```
//!
//! The `#@` forms keep the directive and `#@end` lines and replace the
//! body between them. The `//` forms are replaced by the file content.
//!
//! Every read is checked: the file must exist, resolve inside the project
//! root, carry an allowed extension and stay under the size limit.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::config::MapfileSettings;
use crate::error::MapfileError;

/// Body emitted in place of a `mapoutput` directive
pub const MAPOUTPUT_DISABLED: &str = "# mapoutput disabled for security";

/// A parsed inclusion directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapDirective {
    /// Whole file
    File { path: String },
    /// Lines between two marker lines
    Range {
        path: String,
        from: Option<String>,
        to: Option<String>,
    },
    /// Command output, never executed
    Output { command: String },
}

/// How a directive was written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveForm {
    /// `#@name(...)` followed by a body and `#@end`
    Block,
    /// `//name(...)` on a single line
    Inline,
}

impl MapDirective {
    /// Parse a directive line
    ///
    /// # Example
    ///
    /// ```
    /// use reviewext_core::include::{DirectiveForm, MapDirective};
    ///
    /// let (directive, form) = MapDirective::parse("#@maprange(a.rb, BEGIN, END)").unwrap();
    /// assert_eq!(form, DirectiveForm::Block);
    /// assert_eq!(
    ///     directive,
    ///     MapDirective::Range {
    ///         path: "a.rb".to_string(),
    ///         from: Some("BEGIN".to_string()),
    ///         to: Some("END".to_string()),
    ///     }
    /// );
    /// ```
    pub fn parse(line: &str) -> Option<(Self, DirectiveForm)> {
        static DIRECTIVE_RE: OnceLock<Regex> = OnceLock::new();
        let re = DIRECTIVE_RE.get_or_init(|| {
            Regex::new(r"^(#@|//)(mapfile|maprange|mapoutput)\((.*)\)\s*$").unwrap()
        });

        let caps = re.captures(line.trim_end())?;
        let form = if &caps[1] == "#@" {
            DirectiveForm::Block
        } else {
            DirectiveForm::Inline
        };
        let args = caps[3].trim();

        let directive = match &caps[2] {
            "mapfile" => MapDirective::File {
                path: args.to_string(),
            },
            "maprange" => {
                let mut parts = args.split(',').map(str::trim);
                let path = parts.next().unwrap_or_default().to_string();
                let mut marker = || parts.next().filter(|m| !m.is_empty()).map(String::from);
                let from = marker();
                let to = marker();
                MapDirective::Range { path, from, to }
            }
            _ => MapDirective::Output {
                command: args.to_string(),
            },
        };
        Some((directive, form))
    }
}

/// Reads files for inclusion under a project root
#[derive(Debug, Clone)]
pub struct MapfileResolver {
    base_dir: PathBuf,
    project_root: PathBuf,
    settings: MapfileSettings,
}

impl MapfileResolver {
    /// Resolve relative paths against `base_dir`, which is also the project root
    pub fn new(base_dir: impl Into<PathBuf>, settings: MapfileSettings) -> Self {
        let base_dir = base_dir.into();
        Self {
            project_root: base_dir.clone(),
            base_dir,
            settings,
        }
    }

    /// Use a project root other than the base directory
    pub fn with_project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = root.into();
        self
    }

    /// Turn a directive path argument into a filesystem path
    ///
    /// Surrounding quotes are removed; relative paths are joined to the
    /// base directory.
    pub fn resolve_path(&self, raw: &str) -> PathBuf {
        let trimmed = raw
            .trim()
            .trim_start_matches(['"', '\''])
            .trim_end_matches(['"', '\'']);
        let path = Path::new(trimmed);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Read a whole file after validating it
    pub fn read(&self, raw: &str) -> Result<String, MapfileError> {
        let path = self.resolve_path(raw);
        self.validate(&path)?;

        let content = fs::read_to_string(&path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => MapfileError::NotFound(path.clone()),
            ErrorKind::PermissionDenied => MapfileError::PermissionDenied(path.clone()),
            _ => MapfileError::Io(err),
        })?;
        debug!(path = %path.display(), bytes = content.len(), "mapfile read");

        Ok(match content.strip_prefix('\u{feff}') {
            Some(stripped) => stripped.to_string(),
            None => content,
        })
    }

    /// Read the lines of a file between two markers
    pub fn read_range(
        &self,
        raw: &str,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<String, MapfileError> {
        Ok(extract_range(&self.read(raw)?, from, to))
    }

    /// Content for one directive
    pub fn content_for(&self, directive: &MapDirective) -> Result<String, MapfileError> {
        match directive {
            MapDirective::File { path } => self.read(path),
            MapDirective::Range { path, from, to } => {
                self.read_range(path, from.as_deref(), to.as_deref())
            }
            MapDirective::Output { command } => {
                warn!(command = %command, "mapoutput is disabled");
                Ok(format!("{}\n", MAPOUTPUT_DISABLED))
            }
        }
    }

    fn validate(&self, path: &Path) -> Result<(), MapfileError> {
        if !path.exists() {
            return Err(MapfileError::NotFound(path.to_path_buf()));
        }
        let real = path
            .canonicalize()
            .map_err(|_| MapfileError::InvalidPath(path.display().to_string()))?;
        let root = self
            .project_root
            .canonicalize()
            .map_err(|_| MapfileError::InvalidPath(self.project_root.display().to_string()))?;
        if !real.starts_with(&root) {
            return Err(MapfileError::OutsideProject(path.to_path_buf()));
        }

        let ext = real
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
            .unwrap_or_default();
        if !self.settings.allowed_extensions.iter().any(|allowed| *allowed == ext) {
            return Err(MapfileError::ExtensionNotAllowed(path.to_path_buf()));
        }

        let size = fs::metadata(&real)?.len();
        if size > self.settings.max_file_size {
            return Err(MapfileError::TooLarge {
                path: path.to_path_buf(),
                size,
                limit: self.settings.max_file_size,
            });
        }
        Ok(())
    }
}

/// Extract the lines between marker lines
///
/// Output starts after the last line containing `from` that precedes the
/// first line containing `to`, and stops before that `to` line. A missing
/// marker is logged and falls back to the start or end of the content.
/// Line endings are preserved.
pub fn extract_range(content: &str, from: Option<&str>, to: Option<&str>) -> String {
    let lines: Vec<&str> = content.split_inclusive('\n').collect();
    let mut from_idx = None;
    let mut to_idx = None;

    for (idx, line) in lines.iter().enumerate() {
        if from.is_some_and(|marker| line.contains(marker)) {
            from_idx = Some(idx + 1);
        }
        if to.is_some_and(|marker| line.contains(marker)) {
            to_idx = Some(idx);
            break;
        }
    }

    if let (Some(marker), None) = (from, from_idx) {
        warn!(marker, "start marker not found");
    }
    if let (Some(marker), None) = (to, to_idx) {
        warn!(marker, "end marker not found");
    }

    let start = from_idx.unwrap_or(0);
    let end = to_idx.unwrap_or(lines.len());
    if start >= end {
        return String::new();
    }
    lines[start..end].concat()
}

/// Expand every inclusion directive in a source
///
/// # Errors
///
/// Fails on the first file that cannot be included, or on a `#@` directive
/// with no closing `#@end`.
pub fn expand(source: &str, resolver: &MapfileResolver) -> Result<String, MapfileError> {
    let mut out = String::with_capacity(source.len());
    let mut lines = source.split_inclusive('\n').enumerate();

    while let Some((idx, raw)) = lines.next() {
        let line = raw.trim_end_matches(['\n', '\r']);
        let Some((directive, form)) = MapDirective::parse(line) else {
            out.push_str(raw);
            continue;
        };

        let content = resolver.content_for(&directive)?;
        match form {
            DirectiveForm::Inline => push_content(&mut out, &content),
            DirectiveForm::Block => {
                out.push_str(raw);
                ensure_newline(&mut out);
                push_content(&mut out, &content);

                let end = lines
                    .by_ref()
                    .find(|(_, body)| body.trim_end() == "#@end")
                    .ok_or_else(|| MapfileError::MalformedDirective {
                        line: idx + 1,
                        text: line.to_string(),
                    })?;
                out.push_str(end.1);
            }
        }
    }

    Ok(out)
}

fn push_content(out: &mut String, content: &str) {
    out.push_str(content);
    if !content.is_empty() {
        ensure_newline(out);
    }
}

fn ensure_newline(out: &mut String) {
    if !out.ends_with('\n') {
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "head\n// BEGIN\nbody 1\nbody 2\n// END\ntail\n";

    #[test]
    fn test_parse_forms() {
        assert_eq!(
            MapDirective::parse("//mapfile(\"code/a.rb\")"),
            Some((
                MapDirective::File {
                    path: "\"code/a.rb\"".to_string()
                },
                DirectiveForm::Inline
            ))
        );
        assert!(matches!(
            MapDirective::parse("#@mapoutput(ls -la)"),
            Some((MapDirective::Output { .. }, DirectiveForm::Block))
        ));
        assert!(MapDirective::parse("#@mapfile").is_none());
        assert!(MapDirective::parse("//list[a][b]{").is_none());
    }

    #[test]
    fn test_range_between_markers() {
        assert_eq!(
            extract_range(SAMPLE, Some("BEGIN"), Some("END")),
            "body 1\nbody 2\n"
        );
    }

    #[test]
    fn test_range_missing_markers_fall_back() {
        assert_eq!(extract_range(SAMPLE, Some("NOPE"), Some("END")), "head\n// BEGIN\nbody 1\nbody 2\n");
        assert_eq!(extract_range(SAMPLE, Some("BEGIN"), Some("NOPE")), "body 1\nbody 2\n// END\ntail\n");
        assert_eq!(extract_range(SAMPLE, None, None), SAMPLE);
    }

    #[test]
    fn test_range_uses_last_start_before_end() {
        let content = "A\nx\nA\ny\nB\nA\n";
        assert_eq!(extract_range(content, Some("A"), Some("B")), "y\n");
    }

    #[test]
    fn test_resolve_path_strips_quotes() {
        let resolver = MapfileResolver::new("/project", MapfileSettings::default());
        assert_eq!(
            resolver.resolve_path("'code/a.rb'"),
            PathBuf::from("/project/code/a.rb")
        );
        assert_eq!(resolver.resolve_path("/abs/b.py"), PathBuf::from("/abs/b.py"));
    }
}
