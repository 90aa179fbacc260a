//! reviewext-ast - Value types for listing blocks
//!
//! This crate provides the plain data types shared by the reviewext
//! pipeline: the listing option model and the block/document structure
//! produced by scanning a Re:VIEW source.

pub mod block;
pub mod document;
pub mod options;

pub use block::{Block, DirectiveKind, ListingBlock};
pub use document::Document;
pub use options::{
    FontSize, LineNumbers, ListOptions, Wrap, DEFAULT_FOLD_MARK, DEFAULT_PRINT_INDENT,
    DEFAULT_WRAP_WIDTH,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
