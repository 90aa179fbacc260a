//! Line wrapping
//!
//! Folds source lines that exceed a column width. The first segment of a
//! line takes up to `width` characters; every continuation is prefixed
//! with `indent` spaces and takes up to `width - indent` characters. The
//! fold mark is appended to every segment except the last.
//!
//! Widths count `char`s, not bytes or display columns.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::WrapError;

/// Where a long line is cut
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WrapPolicy {
    /// Cut after the last whitespace within the limit, or hard-cut when
    /// there is none. Segments concatenate back to the original line.
    #[default]
    Word,
    /// Cut exactly at the limit and drop leading whitespace from the
    /// remainder.
    Strict,
}

/// A validated wrapping configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineWrapper {
    width: usize,
    indent: usize,
    mark: String,
    policy: WrapPolicy,
}

impl LineWrapper {
    /// Create a wrapper
    ///
    /// Fails when `width` is zero or `indent` leaves no room for content
    /// on continuation lines.
    pub fn new(width: usize, indent: usize, mark: impl Into<String>) -> Result<Self, WrapError> {
        if width == 0 || indent >= width {
            return Err(WrapError::NonPositiveWidth { width, indent });
        }
        Ok(Self {
            width,
            indent,
            mark: mark.into(),
            policy: WrapPolicy::default(),
        })
    }

    /// Select the cut policy
    pub fn with_policy(mut self, policy: WrapPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn indent(&self) -> usize {
        self.indent
    }

    pub fn mark(&self) -> &str {
        &self.mark
    }

    pub fn policy(&self) -> WrapPolicy {
        self.policy
    }

    /// Split one line into content segments, without marks or indentation
    pub fn segments(&self, line: &str) -> Vec<String> {
        let chars: Vec<char> = line.chars().collect();
        if chars.len() <= self.width {
            return vec![line.to_string()];
        }

        let mut segments = Vec::new();
        let mut rest: &[char] = &chars;
        let mut limit = self.width;

        while rest.len() > limit {
            let cut = match self.policy {
                WrapPolicy::Word => word_cut(rest, limit),
                WrapPolicy::Strict => limit,
            };
            segments.push(rest[..cut].iter().collect());
            rest = &rest[cut..];

            if self.policy == WrapPolicy::Strict {
                let skip = rest.iter().take_while(|c| c.is_whitespace()).count();
                rest = &rest[skip..];
            }
            limit = self.width - self.indent;
        }

        if !rest.is_empty() || segments.is_empty() {
            segments.push(rest.iter().collect());
        }
        segments
    }

    /// Wrap one line into output lines
    pub fn wrap_line(&self, line: &str) -> Vec<String> {
        let segments = self.segments(line);
        let last = segments.len() - 1;
        let pad = " ".repeat(self.indent);

        segments
            .into_iter()
            .enumerate()
            .map(|(i, segment)| {
                let mut out = String::with_capacity(segment.len() + pad.len() + self.mark.len());
                if i > 0 {
                    out.push_str(&pad);
                }
                out.push_str(&segment);
                if i < last {
                    out.push_str(&self.mark);
                }
                out
            })
            .collect()
    }

    /// Wrap a sequence of lines
    pub fn wrap_lines<S: AsRef<str>>(&self, lines: &[S]) -> Vec<String> {
        let mut out = Vec::with_capacity(lines.len());
        let mut folded = 0usize;
        for line in lines {
            let wrapped = self.wrap_line(line.as_ref());
            if wrapped.len() > 1 {
                folded += 1;
            }
            out.extend(wrapped);
        }
        if folded > 0 {
            debug!(folded, width = self.width, "folded long lines");
        }
        out
    }
}

/// Wrap `lines` at `width` with the word-boundary policy
///
/// # Example
///
/// ```
/// use reviewext_core::wrap::wrap;
///
/// let line = "x".repeat(90);
/// let out = wrap(&[line], 80, "~", 4).unwrap();
/// assert_eq!(out.len(), 2);
/// assert_eq!(out[0], format!("{}~", "x".repeat(80)));
/// assert_eq!(out[1], format!("    {}", "x".repeat(10)));
/// ```
pub fn wrap<S: AsRef<str>>(
    lines: &[S],
    width: usize,
    mark: &str,
    indent: usize,
) -> Result<Vec<String>, WrapError> {
    Ok(LineWrapper::new(width, indent, mark)?.wrap_lines(lines))
}

/// Cut position for the word policy: just after the last whitespace that
/// is not the first character, else the limit itself
fn word_cut(rest: &[char], limit: usize) -> usize {
    rest[..limit]
        .iter()
        .rposition(|c| c.is_whitespace())
        .filter(|&pos| pos > 0)
        .map(|pos| pos + 1)
        .unwrap_or(limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_lines_unchanged() {
        let lines = vec!["short".to_string(), "x".repeat(80), String::new()];
        let out = wrap(&lines, 80, "~", 4).unwrap();
        assert_eq!(out, lines);
    }

    #[test]
    fn test_ninety_x_scenario() {
        let wrapper = LineWrapper::new(80, 4, "~").unwrap();
        let segments = wrapper.segments(&"x".repeat(90));
        assert_eq!(segments, vec!["x".repeat(80), "x".repeat(10)]);

        let out = wrapper.wrap_line(&"x".repeat(90));
        assert_eq!(out[1], format!("    {}", "x".repeat(10)));
    }

    #[test]
    fn test_prefers_whitespace() {
        let wrapper = LineWrapper::new(10, 2, ">").unwrap();
        let segments = wrapper.segments("hello world again");
        assert_eq!(segments, vec!["hello ", "world ", "again"]);
        assert_eq!(segments.concat(), "hello world again");
    }

    #[test]
    fn test_continuation_limit() {
        let wrapper = LineWrapper::new(10, 4, "").unwrap();
        let segments = wrapper.segments(&"a".repeat(25));
        assert_eq!(segments[0].len(), 10);
        assert!(segments[1..].iter().all(|s| s.len() <= 6));
        assert_eq!(segments.concat(), "a".repeat(25));
    }

    #[test]
    fn test_strict_policy_trims_remainder() {
        let wrapper = LineWrapper::new(5, 0, "~")
            .unwrap()
            .with_policy(WrapPolicy::Strict);
        let out = wrapper.wrap_line("abcde   fgh");
        assert_eq!(out, vec!["abcde~", "fgh"]);
    }

    #[test]
    fn test_multibyte_counts_chars() {
        let wrapper = LineWrapper::new(4, 0, "").unwrap();
        assert_eq!(wrapper.segments("日本語です"), vec!["日本語で", "す"]);
    }

    #[test]
    fn test_rejects_non_positive_width() {
        assert_eq!(
            LineWrapper::new(4, 4, "~"),
            Err(WrapError::NonPositiveWidth { width: 4, indent: 4 })
        );
        assert!(LineWrapper::new(0, 0, "~").is_err());
        assert!(wrap(&["abc"], 3, "~", 5).is_err());
    }

    #[test]
    fn test_leading_whitespace_not_a_breakpoint() {
        let wrapper = LineWrapper::new(4, 0, "").unwrap();
        assert_eq!(wrapper.segments(" abcdef"), vec![" abc", "def"]);
    }
}
