//! reviewext-render - Listing render strategies
//!
//! Backends for the listing dispatcher in `reviewext-core`:
//!
//! - [`LatexStrategy`] decorates `listings` environments with `\lstset`
//!   settings derived from the listing options
//! - [`HtmlStrategy`] wraps Re:VIEW's listing markup in a styled
//!   `code-block` container
//!
//! Both delegate the undecorated listing to a [`BaseRenderer`].
//!
//! # Example
//!
//! ```
//! use reviewext_core::Settings;
//! use reviewext_render::{render_source, Backend};
//!
//! let source = "//list[hello][Hello][wrap=on,lang=ruby]{\nputs 'hello'\n//}\n";
//! let latex = render_source(source, Backend::Latex, &Settings::default()).unwrap();
//! assert!(latex.contains("breaklines=true"));
//! assert!(latex.contains("language=Ruby"));
//! ```

pub mod base;
pub mod document;
pub mod html;
pub mod latex;

pub use base::{html_escape, latex_escape, BaseRenderer, HtmlBaseRenderer, LatexBaseRenderer};
pub use document::{render_document, render_source, Backend};
pub use html::{ContainerAttributes, HtmlStrategy, STYLESHEET};
pub use latex::{listings_language, LatexStrategy};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
