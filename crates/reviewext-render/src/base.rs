//! Base renderers
//!
//! The plain listing output the strategies decorate. A base renderer
//! emits caption and lines only; it knows nothing about listing options.

use reviewext_ast::DirectiveKind;
use reviewext_core::ListingRequest;

/// Undecorated listing output for one backend
pub trait BaseRenderer {
    /// Render caption and lines of one block
    fn render(&mut self, request: &ListingRequest) -> String;
}

/// LaTeX listing environments
///
/// With `listings` on, blocks go into `review<kind>lst` environments
/// (listings-based, lines verbatim); otherwise into the escaped
/// `review<kind>` environments.
#[derive(Debug, Clone)]
pub struct LatexBaseRenderer {
    listings: bool,
}

impl LatexBaseRenderer {
    pub fn new(listings: bool) -> Self {
        Self { listings }
    }
}

impl Default for LatexBaseRenderer {
    fn default() -> Self {
        Self::new(true)
    }
}

impl BaseRenderer for LatexBaseRenderer {
    fn render(&mut self, request: &ListingRequest) -> String {
        let name = request.kind.name();
        let caption = request.caption.as_deref().filter(|c| !c.is_empty());
        let mut out = String::from("\\begin{reviewlistblock}\n");

        if self.listings {
            match caption {
                Some(caption) => out.push_str(&format!(
                    "\\begin{{review{}lst}}[caption={{{}}}]\n",
                    name,
                    latex_escape(caption)
                )),
                None => out.push_str(&format!("\\begin{{review{}lst}}\n", name)),
            }
            for line in &request.lines {
                out.push_str(line);
                out.push('\n');
            }
            out.push_str(&format!("\\end{{review{}lst}}\n", name));
        } else {
            if let Some(caption) = caption {
                out.push_str(&format!(
                    "\\review{}caption{{{}}}\n",
                    caption_macro(request.kind),
                    latex_escape(caption)
                ));
            }
            out.push_str(&format!("\\begin{{review{}}}\n", name));
            for line in &request.lines {
                out.push_str(&latex_escape(line));
                out.push('\n');
            }
            out.push_str(&format!("\\end{{review{}}}\n", name));
        }

        out.push_str("\\end{reviewlistblock}\n");
        out
    }
}

/// Re:VIEW's `<div>`/`<pre>` listing markup
#[derive(Debug, Clone, Default)]
pub struct HtmlBaseRenderer;

impl BaseRenderer for HtmlBaseRenderer {
    fn render(&mut self, request: &ListingRequest) -> String {
        let name = caption_macro(request.kind);
        let mut out = String::new();

        match request.id.as_deref().filter(|id| !id.is_empty()) {
            Some(id) => out.push_str(&format!(
                "<div id=\"{}\" class=\"{}-code\">\n",
                html_escape(id),
                name
            )),
            None => out.push_str(&format!("<div class=\"{}-code\">\n", name)),
        }
        if let Some(caption) = request.caption.as_deref().filter(|c| !c.is_empty()) {
            out.push_str(&format!("<p class=\"caption\">{}</p>\n", html_escape(caption)));
        }

        match request.lang.as_deref() {
            Some(lang) => out.push_str(&format!(
                "<pre class=\"{} language-{}\">",
                name,
                html_escape(lang)
            )),
            None => out.push_str(&format!("<pre class=\"{}\">", name)),
        }
        for line in &request.lines {
            out.push_str("<span class=\"line\">");
            out.push_str(&html_escape(line));
            out.push_str("</span>\n");
        }
        out.push_str("</pre>\n</div>\n");
        out
    }
}

/// Family name shared by a directive and its numbered variant
fn caption_macro(kind: DirectiveKind) -> &'static str {
    match kind {
        DirectiveKind::List | DirectiveKind::ListNum => "list",
        DirectiveKind::EmList | DirectiveKind::EmListNum => "emlist",
        DirectiveKind::Cmd => "cmd",
        DirectiveKind::Source => "source",
    }
}

/// Escape LaTeX special characters
pub fn latex_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\textbackslash{}"),
            '{' => out.push_str("\\{"),
            '}' => out.push_str("\\}"),
            '#' => out.push_str("\\#"),
            '$' => out.push_str("\\$"),
            '%' => out.push_str("\\%"),
            '&' => out.push_str("\\&"),
            '_' => out.push_str("\\_"),
            '^' => out.push_str("\\textasciicircum{}"),
            '~' => out.push_str("\\textasciitilde{}"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
