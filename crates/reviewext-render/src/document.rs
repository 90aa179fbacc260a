//! Whole-document rendering

use std::fmt;
use std::str::FromStr;

use reviewext_ast::Document;
use reviewext_core::{parser, Dispatcher, RenderError, Settings};
use tracing::debug;

use crate::html::HtmlStrategy;
use crate::latex::LatexStrategy;

/// Output backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// Print output via `listings`
    Latex,
    /// Web output
    Html,
}

impl Backend {
    pub fn as_str(self) -> &'static str {
        match self {
            Backend::Latex => "latex",
            Backend::Html => "html",
        }
    }

    /// Conventional output file extension
    pub fn extension(self) -> &'static str {
        match self {
            Backend::Latex => "tex",
            Backend::Html => "html",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "latex" | "tex" | "pdf" => Ok(Backend::Latex),
            "html" | "web" => Ok(Backend::Html),
            other => Err(format!("unknown backend: {}", other)),
        }
    }
}

/// Render a parsed document with the strategy for `backend`
pub fn render_document(
    document: &Document,
    backend: Backend,
    settings: &Settings,
) -> Result<String, RenderError> {
    debug!(%backend, blocks = document.len(), "rendering document");
    let mut dispatcher = Dispatcher::new(settings.clone());
    match backend {
        Backend::Latex => {
            let mut strategy = LatexStrategy::new(settings.latex.clone());
            dispatcher.render_document(document, &mut strategy)
        }
        Backend::Html => {
            let mut strategy = HtmlStrategy::new(settings.html.clone());
            dispatcher.render_document(document, &mut strategy)
        }
    }
}

/// Parse and render a `.re` source
pub fn render_source(
    source: &str,
    backend: Backend,
    settings: &Settings,
) -> reviewext_core::Result<String> {
    let document = parser::parse(source)?;
    Ok(render_document(&document, backend, settings)?)
}
