//! Web strategy
//!
//! Wraps the base `<div>`/`<pre>` markup in a `code-block` container whose
//! classes, inline style and `data-*` attributes carry the listing options.
//! The browser does the folding (`white-space: pre-wrap`), so lines are
//! never pre-wrapped for this backend.

use reviewext_ast::{DirectiveKind, LineNumbers, ListOptions, Wrap};
use reviewext_core::config::HtmlSettings;
use reviewext_core::{ListingRenderer, ListingRequest, RenderError};
use tracing::trace;

use crate::base::{html_escape, BaseRenderer, HtmlBaseRenderer};

/// Stylesheet injected before the first decorated block of a document
pub const STYLESHEET: &str = r#"<style>
  .code-block {
    position: relative;
    border: 1px solid #ddd;
    border-radius: 4px;
    padding: 10px;
    margin: 1em 0;
    background: #f8f8f8;
  }
  .code-block.wrap-enabled {
    white-space: pre-wrap;
    word-break: break-word;
    overflow-wrap: break-word;
    hyphens: auto;
  }
  .code-block.wrap-enabled[data-foldmark]::after {
    content: attr(data-foldmark);
    color: #999;
    font-size: 0.8em;
    position: absolute;
    right: 0;
  }
  .code-filename {
    background: #333;
    color: #fff;
    padding: 4px 8px;
    font-size: 0.9em;
    font-family: monospace;
    border-radius: 4px 4px 0 0;
  }
  .code-block.line-numbers {
    counter-reset: line-number;
    padding-left: 3em;
  }
  .code-block.line-numbers span.line::before {
    counter-increment: line-number;
    content: counter(line-number);
    display: inline-block;
    width: 2em;
    margin-left: -3em;
    margin-right: 1em;
    text-align: right;
    color: #999;
    font-size: 0.9em;
  }
  .command-output {
    background: #000;
    color: #0f0;
    font-family: 'Courier New', monospace;
  }
</style>
"#;

/// Attributes of the `code-block` container
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContainerAttributes {
    pub classes: Vec<String>,
    pub style: Vec<String>,
    pub data: Vec<(&'static str, String)>,
}

impl ContainerAttributes {
    /// Derive container attributes from listing options
    pub fn from_options(kind: DirectiveKind, options: &ListOptions) -> Self {
        let mut attrs = Self {
            classes: vec!["code-block".to_string()],
            ..Default::default()
        };

        if options.wraps() {
            attrs.classes.push("wrap-enabled".to_string());
            attrs.style.push("white-space: pre-wrap".to_string());
            attrs.style.push("word-break: break-word".to_string());
            attrs.style.push("overflow-wrap: break-word".to_string());
            if let Some(Wrap::Width(width)) = options.wrap {
                attrs.data.push(("data-wrap-at", width.to_string()));
                attrs.style.push(format!("max-width: {}ch", width));
            }
        } else {
            attrs.style.push("white-space: pre".to_string());
            attrs.style.push("overflow-x: auto".to_string());
        }

        if let Some(ref mark) = options.foldmark {
            attrs.data.push(("data-foldmark", html_escape(mark)));
        }

        if options.numbered() {
            attrs.classes.push("line-numbers".to_string());
            if let Some(LineNumbers::From(start)) = options.lineno {
                attrs.data.push(("data-line-start", start.to_string()));
                attrs
                    .style
                    .push(format!("counter-reset: line-number {}", start.get() - 1));
            }
        }

        match options.fontsize.as_ref().map(|s| s.as_str()) {
            Some("small") => attrs.style.push("font-size: 0.9em".to_string()),
            Some("large") => attrs.style.push("font-size: 1.2em".to_string()),
            _ => {}
        }

        if let Some(ref lang) = options.lang {
            attrs.classes.push(format!("language-{}", html_escape(lang)));
            attrs.data.push(("data-lang", html_escape(lang)));
        }
        if let Some(ref filename) = options.filename {
            attrs.data.push(("data-filename", html_escape(filename)));
        }
        if let Some(ref highlight) = options.highlight {
            attrs.data.push(("data-highlight", html_escape(highlight)));
        }

        if kind == DirectiveKind::Cmd {
            attrs.classes.push("command-output".to_string());
        }

        attrs
    }

    /// Opening `<div>` tag
    pub fn opening_tag(&self) -> String {
        let mut tag = format!("<div class=\"{}\"", self.classes.join(" "));
        if !self.style.is_empty() {
            tag.push_str(&format!(" style=\"{}\"", self.style.join("; ")));
        }
        for (key, value) in &self.data {
            tag.push_str(&format!(" {}=\"{}\"", key, value));
        }
        tag.push('>');
        tag
    }
}

/// HTML render strategy
#[derive(Debug, Clone)]
pub struct HtmlStrategy<B = HtmlBaseRenderer> {
    base: B,
    settings: HtmlSettings,
    styles_injected: bool,
}

impl HtmlStrategy<HtmlBaseRenderer> {
    pub fn new(settings: HtmlSettings) -> Self {
        Self::with_base(HtmlBaseRenderer, settings)
    }
}

impl<B: BaseRenderer> HtmlStrategy<B> {
    /// Strategy over a custom base renderer
    pub fn with_base(base: B, settings: HtmlSettings) -> Self {
        Self {
            base,
            settings,
            styles_injected: false,
        }
    }
}

impl<B: BaseRenderer> ListingRenderer for HtmlStrategy<B> {
    fn render(
        &mut self,
        request: &ListingRequest,
        options: Option<&ListOptions>,
    ) -> Result<String, RenderError> {
        let mut out = String::new();

        let Some(options) = options else {
            out.push_str("<div class=\"code-block\">\n");
            out.push_str(&self.base.render(request));
            out.push_str("</div>\n");
            return Ok(out);
        };

        if self.settings.inject_styles && !self.styles_injected {
            trace!("injecting listing stylesheet");
            out.push_str(STYLESHEET);
            self.styles_injected = true;
        }

        if let Some(ref filename) = options.filename {
            out.push_str(&format!(
                "<div class=\"code-filename\">{}</div>\n",
                html_escape(filename)
            ));
        }

        let attrs = ContainerAttributes::from_options(request.kind, options);
        out.push_str(&attrs.opening_tag());
        out.push('\n');
        out.push_str(&self.base.render(request));
        out.push_str("</div>\n");

        Ok(out)
    }

    fn begin_document(&mut self) {
        self.styles_injected = false;
    }
}
