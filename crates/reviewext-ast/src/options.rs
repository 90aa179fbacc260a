//! Listing option model
//!
//! This module defines [`ListOptions`], the structured configuration of a
//! single listing block. Every field is independently optional: `None`
//! means "inherit the backend default", never an error.

use std::fmt;
use std::num::{NonZeroU64, NonZeroUsize};

use serde::{Deserialize, Serialize};

/// Default wrap width when `wrap` is enabled without an explicit width
pub const DEFAULT_WRAP_WIDTH: usize = 80;

/// Default glyph inserted at a wrap point
pub const DEFAULT_FOLD_MARK: &str = "\u{21a9}";

/// Default continuation indent for the print backend
pub const DEFAULT_PRINT_INDENT: i64 = 20;

/// Line wrapping setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Wrap {
    /// Wrapping enabled at the default width
    On,
    /// Wrapping explicitly disabled
    Off,
    /// Wrapping enabled at an explicit column width
    Width(NonZeroUsize),
}

impl Wrap {
    /// Wrap at `width` columns; a zero width disables wrapping
    pub fn at(width: usize) -> Self {
        NonZeroUsize::new(width).map_or(Wrap::Off, Wrap::Width)
    }

    /// Whether wrapping is enabled
    pub fn is_enabled(self) -> bool {
        !matches!(self, Wrap::Off)
    }

    /// The explicit column width, if one was given
    pub fn explicit_width(self) -> Option<usize> {
        match self {
            Wrap::Width(width) => Some(width.get()),
            _ => None,
        }
    }

    /// The effective width, falling back to `default` for a boolean `wrap`
    pub fn width_or(self, default: usize) -> Option<usize> {
        match self {
            Wrap::On => Some(default),
            Wrap::Off => None,
            Wrap::Width(width) => Some(width.get()),
        }
    }
}

/// Line numbering setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineNumbers {
    /// Numbering enabled, starting from the backend default
    On,
    /// Numbering explicitly disabled
    Off,
    /// Numbering enabled, starting at the given number
    From(NonZeroU64),
}

impl LineNumbers {
    /// Number from `start`; zero disables numbering
    pub fn starting_at(start: u64) -> Self {
        NonZeroU64::new(start).map_or(LineNumbers::Off, LineNumbers::From)
    }

    /// Whether numbering is enabled
    pub fn is_enabled(self) -> bool {
        !matches!(self, LineNumbers::Off)
    }

    /// The explicit starting number, if one was given
    pub fn start(self) -> Option<u64> {
        match self {
            LineNumbers::From(start) => Some(start.get()),
            _ => None,
        }
    }
}

/// Rendering font size
///
/// Unrecognized sizes are kept verbatim in [`FontSize::Other`] and rendered
/// at the normal size. Names are case-sensitive, so `Small` is an
/// unrecognized size; `Other` never holds one of the three preset names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    Small,
    Normal,
    Large,
    Other(String),
}

impl FontSize {
    /// Parse a font size name
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "small" => FontSize::Small,
            "normal" => FontSize::Normal,
            "large" => FontSize::Large,
            other => FontSize::Other(other.to_string()),
        }
    }

    /// The option-string spelling of this size
    pub fn as_str(&self) -> &str {
        match self {
            FontSize::Small => "small",
            FontSize::Normal => "normal",
            FontSize::Large => "large",
            FontSize::Other(name) => name,
        }
    }
}

impl fmt::Display for FontSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration of one listing block
///
/// Instances are created per directive occurrence, consumed by a render
/// strategy, and never persisted.
///
/// # Example
///
/// ```
/// use reviewext_ast::{FontSize, LineNumbers, ListOptions, Wrap};
///
/// let options = ListOptions {
///     wrap: Some(Wrap::at(80)),
///     lineno: Some(LineNumbers::On),
///     fontsize: Some(FontSize::Small),
///     ..Default::default()
/// };
/// assert!(options.wraps());
/// assert!(options.numbered());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListOptions {
    /// Enable wrapping (boolean or explicit width)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrap: Option<Wrap>,
    /// Enable the fold indicator independently of wrapping
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fold: Option<bool>,
    /// Glyph inserted at a wrap point
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foldmark: Option<String>,
    /// Spaces prefixed to continuation lines (passed through unvalidated)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indent: Option<i64>,
    /// Line numbering (boolean or starting number)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lineno: Option<LineNumbers>,
    /// Rendering font size
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fontsize: Option<FontSize>,
    /// Syntax-highlighting language
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    /// Badge text shown above the block
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Highlighted line ranges, e.g. `3-5,7`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight: Option<String>,
}

impl ListOptions {
    /// Create an option set with every field absent
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether every field is absent
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Whether wrapping is enabled
    pub fn wraps(&self) -> bool {
        self.wrap.is_some_and(Wrap::is_enabled)
    }

    /// Whether line numbering is enabled
    pub fn numbered(&self) -> bool {
        self.lineno.is_some_and(LineNumbers::is_enabled)
    }

    /// Whether a fold mark should be shown at wrap points
    ///
    /// An explicit `fold` wins; otherwise the mark follows `wrap`.
    pub fn shows_fold_mark(&self) -> bool {
        match self.fold {
            Some(fold) => fold,
            None => self.wraps(),
        }
    }

    /// Set the wrap field
    pub fn with_wrap(mut self, wrap: Wrap) -> Self {
        self.wrap = Some(wrap);
        self
    }

    /// Set the line numbering field
    pub fn with_lineno(mut self, lineno: LineNumbers) -> Self {
        self.lineno = Some(lineno);
        self
    }

    /// Set the font size field
    pub fn with_fontsize(mut self, fontsize: FontSize) -> Self {
        self.fontsize = Some(fontsize);
        self
    }

    /// Set the language field
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_empty() {
        let options = ListOptions::new();
        assert!(options.is_empty());
        assert!(!options.wraps());
        assert!(!options.numbered());
        assert!(!options.shows_fold_mark());
    }

    #[test]
    fn test_wrap_widths() {
        assert_eq!(Wrap::On.width_or(DEFAULT_WRAP_WIDTH), Some(80));
        assert_eq!(Wrap::at(40).width_or(DEFAULT_WRAP_WIDTH), Some(40));
        assert_eq!(Wrap::Off.width_or(DEFAULT_WRAP_WIDTH), None);
        assert_eq!(Wrap::On.explicit_width(), None);
    }

    #[test]
    fn test_zero_disables() {
        assert_eq!(Wrap::at(0), Wrap::Off);
        assert_eq!(LineNumbers::starting_at(0), LineNumbers::Off);
        assert!(Wrap::at(1).is_enabled());
        assert_eq!(LineNumbers::starting_at(1).start(), Some(1));
    }

    #[test]
    fn test_line_number_start() {
        assert_eq!(LineNumbers::starting_at(10).start(), Some(10));
        assert_eq!(LineNumbers::On.start(), None);
        assert!(!LineNumbers::Off.is_enabled());
    }

    #[test]
    fn test_fold_mark_follows_wrap() {
        let options = ListOptions::new().with_wrap(Wrap::On);
        assert!(options.shows_fold_mark());

        let options = ListOptions {
            fold: Some(false),
            ..options
        };
        assert!(!options.shows_fold_mark());

        let options = ListOptions {
            fold: Some(true),
            ..Default::default()
        };
        assert!(options.shows_fold_mark());
    }

    #[test]
    fn test_fontsize_parse() {
        assert_eq!(FontSize::parse("small"), FontSize::Small);
        assert_eq!(FontSize::parse(" large "), FontSize::Large);
        assert_eq!(
            FontSize::parse("Small"),
            FontSize::Other("Small".to_string())
        );
        assert_eq!(
            FontSize::parse("tiny"),
            FontSize::Other("tiny".to_string())
        );
        assert_eq!(FontSize::parse("tiny").as_str(), "tiny");
    }

    #[test]
    fn test_serialize_skips_absent_fields() {
        let options = ListOptions::new().with_lang("ruby");
        let json = serde_json::to_string(&options).unwrap();
        assert_eq!(json, r#"{"lang":"ruby"}"#);
    }
}
