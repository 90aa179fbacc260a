//! Lint diagnostics
//!
//! Findings reported against a Re:VIEW source, with an optional
//! machine-applicable [`Fix`].

use serde::{Deserialize, Serialize};

/// A finding reported against a source file
///
/// # Example
///
/// ```
/// use reviewext_core::diagnostics::{Diagnostic, Fix, Span};
///
/// let diag = Diagnostic::warning("//emlist is deprecated")
///     .with_code("LIST001")
///     .with_span(Span::new(0, 9).with_position(1, 1))
///     .with_fix(Fix::new(Span::new(0, 9), "//list[]"));
/// assert!(diag.fix.is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,

    pub message: String,

    /// Rule code, e.g. `LIST001`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,

    /// Replacement that resolves the finding
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix: Option<Fix>,
}

/// Severity level of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A byte range in the source, with an optional 1-based position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Start offset (inclusive)
    pub start: usize,

    /// End offset (exclusive)
    pub end: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
}

/// A text replacement over a span
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fix {
    pub span: Span,
    pub replacement: String,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            code: None,
            span: None,
            file: None,
            help: None,
            notes: Vec::new(),
            fix: None,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_fix(mut self, fix: Fix) -> Self {
        self.fix = Some(fix);
        self
    }

    /// Check if this is an error-level diagnostic
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        matches!(self.severity, Severity::Warning)
    }
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            line: None,
            column: None,
        }
    }

    /// Set both line and column
    pub fn with_position(mut self, line: usize, column: usize) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }
}

impl Fix {
    pub fn new(span: Span, replacement: impl Into<String>) -> Self {
        Self {
            span,
            replacement: replacement.into(),
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // severity[code]: message
        write!(f, "{}", self.severity)?;
        if let Some(ref code) = self.code {
            write!(f, "[{}]", code)?;
        }
        write!(f, ": {}", self.message)?;

        if let Some(ref file) = self.file {
            write!(f, "\n  --> {}", file)?;
            if let Some(Span {
                line: Some(line),
                column: Some(col),
                ..
            }) = self.span
            {
                write!(f, ":{}:{}", line, col)?;
            }
        }

        if let Some(ref help) = self.help {
            write!(f, "\n  = help: {}", help)?;
        }
        for note in &self.notes {
            write!(f, "\n  = note: {}", note)?;
        }

        Ok(())
    }
}

/// Apply every fix carried by `diagnostics` to `source`
///
/// Fixes are applied back to front. A fix that overlaps one already
/// applied, or whose span is out of range, is skipped.
pub fn apply_fixes<'a>(source: &str, diagnostics: impl IntoIterator<Item = &'a Diagnostic>) -> String {
    let mut fixes: Vec<&Fix> = diagnostics
        .into_iter()
        .filter_map(|d| d.fix.as_ref())
        .collect();
    fixes.sort_by(|a, b| b.span.start.cmp(&a.span.start));

    let mut out = source.to_string();
    let mut floor = usize::MAX;
    for fix in fixes {
        let Span { start, end, .. } = fix.span;
        if end > floor
            || start > end
            || end > out.len()
            || !out.is_char_boundary(start)
            || !out.is_char_boundary(end)
        {
            tracing::warn!(start, end, "skipping overlapping or invalid fix");
            continue;
        }
        out.replace_range(start..end, &fix.replacement);
        floor = start;
    }
    out
}
