//! Deprecated listing directive rule
//!
//! `emlist`, `emlistnum`, `cmd` and `source` are superseded by `//list`
//! with listing options. Each occurrence is reported with a fix that
//! rewrites the header line.
//!
//! # Diagnostic Codes
//!
//! - `LIST001`: `//emlist`
//! - `LIST002`: `//emlistnum`
//! - `LIST003`: `//cmd`
//! - `LIST004`: `//source`

use reviewext_ast::{DirectiveKind, Document, ListingBlock};
use reviewext_core::convert::modern_header;
use reviewext_core::diagnostics::{Diagnostic, Fix, Severity, Span};

use crate::Validator;

/// Flags deprecated listing directives
#[derive(Debug, Clone)]
pub struct DeprecatedListValidator {
    severity: Severity,
}

impl Default for DeprecatedListValidator {
    fn default() -> Self {
        Self::new(Severity::Warning)
    }
}

impl DeprecatedListValidator {
    pub fn new(severity: Severity) -> Self {
        Self { severity }
    }

    /// Rule code for a directive, `None` when it is not deprecated
    pub fn rule_code(kind: DirectiveKind) -> Option<&'static str> {
        match kind {
            DirectiveKind::EmList => Some("LIST001"),
            DirectiveKind::EmListNum => Some("LIST002"),
            DirectiveKind::Cmd => Some("LIST003"),
            DirectiveKind::Source => Some("LIST004"),
            DirectiveKind::List | DirectiveKind::ListNum => None,
        }
    }

    fn check(&self, block: &ListingBlock) -> Option<Diagnostic> {
        let code = Self::rule_code(block.kind)?;
        let header = modern_header(block.kind, block.caption.as_deref(), block.param.as_deref())?;
        let (start, end) = block.header;
        let span = Span::new(start, end).with_position(block.line, 1);

        let mut diagnostic = Diagnostic::new(
            self.severity,
            format!("//{} is deprecated", block.kind),
        )
        .with_code(code)
        .with_span(span)
        .with_help(format!("Use {}{{ instead", header))
        .with_fix(Fix::new(span, format!("{}{{", header)));

        if block.kind == DirectiveKind::Source {
            diagnostic = diagnostic.with_note("the first parameter becomes the `filename` option");
        }
        Some(diagnostic)
    }
}

impl Validator for DeprecatedListValidator {
    fn code(&self) -> &'static str {
        "LIST"
    }

    fn name(&self) -> &'static str {
        "deprecated-list"
    }

    fn validate(&self, doc: &Document) -> Vec<Diagnostic> {
        doc.listings().filter_map(|block| self.check(block)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reviewext_core::parser;

    fn lint(source: &str) -> Vec<Diagnostic> {
        DeprecatedListValidator::default().validate(&parser::parse(source).unwrap())
    }

    #[test]
    fn test_rule_codes() {
        let source = "\
//emlist[A]{
//}
//emlistnum[B][ruby]{
//}
//cmd{
//}
//source[app.rb][App]{
//}
";
        let codes: Vec<_> = lint(source)
            .into_iter()
            .map(|d| d.code.unwrap_or_default())
            .collect();
        assert_eq!(codes, vec!["LIST001", "LIST002", "LIST003", "LIST004"]);
    }

    #[test]
    fn test_span_covers_header_line() {
        let source = "= Title\n//emlist[Sample][ruby]{\nputs 1\n//}\n";
        let diags = lint(source);
        let span = diags[0].span.unwrap();

        assert_eq!(&source[span.start..span.end], "//emlist[Sample][ruby]{");
        assert_eq!(span.line, Some(2));
        assert_eq!(span.column, Some(1));
    }

    #[test]
    fn test_fix_replacements() {
        let fix = |source: &str| lint(source)[0].fix.clone().unwrap().replacement;

        assert_eq!(fix("//emlist[Sample][ruby]{\n//}\n"), "//list[][Sample][ruby]{");
        assert_eq!(
            fix("//emlistnum[Sample][ruby]{\n//}\n"),
            "//list[][Sample][lang=ruby,lineno]{"
        );
        assert_eq!(fix("//cmd{\n//}\n"), "//list[][コマンド][fontsize=small]{");
        assert_eq!(fix("//source[app.rb][App]{\n//}\n"), "//list[][App][filename=app.rb]{");
    }

    #[test]
    fn test_source_note() {
        let diags = lint("//source[app.rb][App]{\n//}\n");
        assert_eq!(diags[0].notes.len(), 1);
        assert!(diags[0].is_warning());
    }

    #[test]
    fn test_diagnostic_serializes() {
        let diags = lint("//cmd[Shell]{\n//}\n");
        let json = serde_json::to_value(&diags[0]).unwrap();
        assert_eq!(json["code"], "LIST003");
        assert_eq!(json["severity"], "warning");
        assert_eq!(json["span"]["line"], 1);
    }
}
