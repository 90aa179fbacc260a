//! reviewext-core - Listing options for Re:VIEW
//!
//! Core library for reviewext: parses listing options, merges them with
//! legacy caption options and directive defaults, folds long lines and
//! dispatches each listing block to a render backend.
//!
//! # Example
//!
//! ```
//! use reviewext_core::dispatch::{Dispatcher, ListingRenderer, ListingRequest};
//! use reviewext_core::{parser, ListOptions, RenderError};
//!
//! struct Plain;
//!
//! impl ListingRenderer for Plain {
//!     fn render(
//!         &mut self,
//!         request: &ListingRequest,
//!         options: Option<&ListOptions>,
//!     ) -> Result<String, RenderError> {
//!         let numbered = options.is_some_and(|o| o.numbered());
//!         Ok(format!("{} numbered={}", request.lines.join("|"), numbered))
//!     }
//! }
//!
//! let doc = parser::parse("//listnum[a][Sample]{\nputs 1\n//}\n").unwrap();
//! let out = Dispatcher::default().render_document(&doc, &mut Plain).unwrap();
//! assert_eq!(out, "puts 1 numbered=true\n");
//! ```

pub mod caption;
pub mod config;
pub mod convert;
pub mod diagnostics;
pub mod dispatch;
pub mod error;
pub mod include;
pub mod merge;
pub mod options;
pub mod parser;
pub mod wrap;

pub use config::Settings;
pub use dispatch::{Dispatcher, ListingRenderer, ListingRequest};
pub use error::{
    ConfigError, ConvertError, Error, MapfileError, ParseError, RenderError, Result, WrapError,
};
pub use merge::merge;
pub use options::{parse_options, stringify, OptionList};
pub use reviewext_ast::{
    Block, DirectiveKind, Document, FontSize, LineNumbers, ListOptions, ListingBlock, Wrap,
};
pub use wrap::{wrap, LineWrapper, WrapPolicy};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
