//! Print strategy
//!
//! Decorates a LaTeX listing with a `\lstset` block derived from the
//! listing options and resets the settings afterwards:
//!
//! ```text
//! \lstset{%
//!   breaklines=true,
//!   ...
//!   inputencoding=utf8
//! }%
//! \begin{tcolorbox}[title={\scriptsize\ttfamily app.rb}]   (filename only)
//! <base listing>
//! \end{tcolorbox}
//! \lstset{basicstyle=\ttfamily}%
//! ```
//!
//! `listings` cannot fold at a column count, so an explicit `wrap=<n>` is
//! folded upstream by the dispatcher before the base renderer runs.

use reviewext_ast::ListOptions;
use reviewext_core::config::LatexSettings;
use reviewext_core::{ListingRenderer, ListingRequest, RenderError};
use tracing::debug;

use crate::base::{latex_escape, BaseRenderer, LatexBaseRenderer};

/// Settings that follow every decorated listing
const TRAILER: [&str; 8] = [
    "keepspaces=true",
    "showstringspaces=false",
    "frame=single",
    "framesep=5pt",
    "xleftmargin=0.5em",
    "xrightmargin=0.5em",
    "extendedchars=true",
    "inputencoding=utf8",
];

/// Post-break glyph when a block sets no `foldmark`
const DEFAULT_POSTBREAK: &str = "$\\hookrightarrow$";

/// Resets listing settings after a decorated block
pub const LSTSET_RESET: &str = "\\lstset{basicstyle=\\ttfamily}%\n";

/// Map a language tag to its `listings` name
///
/// Returns `None` for languages `listings` is not configured for; those
/// blocks are rendered without highlighting.
pub fn listings_language(lang: &str) -> Option<&'static str> {
    match lang.to_ascii_lowercase().as_str() {
        "ruby" => Some("Ruby"),
        "python" => Some("Python"),
        "java" => Some("Java"),
        "javascript" | "typescript" => Some("Java"),
        "c" => Some("C"),
        "cpp" => Some("C++"),
        "csharp" => Some("[Sharp]C"),
        "sql" => Some("SQL"),
        "bash" => Some("bash"),
        "sh" => Some("sh"),
        _ => None,
    }
}

/// LaTeX render strategy
#[derive(Debug, Clone)]
pub struct LatexStrategy<B = LatexBaseRenderer> {
    base: B,
    settings: LatexSettings,
}

impl LatexStrategy<LatexBaseRenderer> {
    /// Strategy over the default LaTeX environments
    pub fn new(settings: LatexSettings) -> Self {
        Self {
            base: LatexBaseRenderer::new(settings.listings),
            settings,
        }
    }
}

impl<B: BaseRenderer> LatexStrategy<B> {
    /// Strategy over a custom base renderer
    pub fn with_base(base: B, settings: LatexSettings) -> Self {
        Self { base, settings }
    }

    /// `\lstset` parameters for one block, in output order
    pub fn lstset_params(&self, options: &ListOptions, lang: Option<&str>) -> Vec<String> {
        let mut params = Vec::new();
        let breaking = options.wraps() || options.fold == Some(true);

        if breaking {
            params.push("breaklines=true".to_string());
            params.push("breakatwhitespace=false".to_string());
            params.push("columns=fullflexible".to_string());
        }

        if let Some(ref mark) = options.foldmark {
            params.push(format!(
                "postbreak=\\mbox{{\\textcolor{{red}}{{{}}}\\space}}",
                latex_escape(mark)
            ));
        } else if breaking && options.shows_fold_mark() {
            params.push(format!(
                "postbreak=\\mbox{{\\textcolor{{red}}{{{}}}\\space}}",
                DEFAULT_POSTBREAK
            ));
        }

        if let Some(indent) = options.indent {
            params.push(format!("breakindent={}pt", indent));
        } else if breaking {
            params.push(format!("breakindent={}pt", self.settings.break_indent));
        }

        if options.numbered() {
            params.push("numbers=left".to_string());
            if let Some(start) = options.lineno.and_then(|l| l.start()) {
                params.push(format!("firstnumber={}", start));
            }
        }

        params.push(match options.fontsize.as_ref().map(|s| s.as_str()) {
            Some("small") => "basicstyle=\\ttfamily\\small".to_string(),
            Some("large") => "basicstyle=\\ttfamily\\large".to_string(),
            _ => "basicstyle=\\ttfamily".to_string(),
        });

        if let Some(lang) = options.lang.as_deref().or(lang) {
            match listings_language(lang) {
                Some(name) => params.push(format!("language={}", name)),
                None => debug!(lang, "no listings language, highlighting skipped"),
            }
        }

        params.extend(TRAILER.iter().map(|p| p.to_string()));
        params
    }
}

impl<B: BaseRenderer> ListingRenderer for LatexStrategy<B> {
    fn render(
        &mut self,
        request: &ListingRequest,
        options: Option<&ListOptions>,
    ) -> Result<String, RenderError> {
        let options = match options {
            Some(options) if self.settings.listings => options,
            _ => return Ok(self.base.render(request)),
        };

        let params = self.lstset_params(options, request.lang.as_deref());
        let mut out = format!("\\lstset{{%\n  {}\n}}%\n", params.join(",\n  "));

        if let Some(ref filename) = options.filename {
            out.push_str(&format!(
                "\\begin{{tcolorbox}}[title={{\\scriptsize\\ttfamily {}}}]\n",
                latex_escape(filename)
            ));
        }
        out.push_str(&self.base.render(request));
        if options.filename.is_some() {
            out.push_str("\\end{tcolorbox}\n");
        }
        out.push_str(LSTSET_RESET);

        Ok(out)
    }

    fn wraps_upstream(&self, options: &ListOptions) -> bool {
        match options.wrap {
            Some(wrap) if wrap.explicit_width().is_some() => true,
            Some(wrap) => self.settings.prewrap_boolean && wrap.is_enabled(),
            None => false,
        }
    }

    fn continuation_indent(&self) -> usize {
        self.settings.break_indent.max(0) as usize
    }

    fn fold_mark(&self) -> Option<&str> {
        Some(self.settings.fold_mark.as_str())
    }
}
