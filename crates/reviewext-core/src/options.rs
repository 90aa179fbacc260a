//! Listing option parsing
//!
//! Turns the compact `key=value,key=value` directive language into a
//! [`ListOptions`] value, and back.
//!
//! # Syntax
//!
//! ```text
//! wrap=80,lineno=on,fontsize=small
//! lang=ruby, filename=app.rb, highlight=3-5,7
//! lineno,fold
//! ```
//!
//! Parsing is best-effort and never fails: unknown keys are ignored and
//! malformed values are coerced (see [`parse_options`]).

use std::fmt;

use reviewext_ast::{FontSize, LineNumbers, ListOptions, Wrap, DEFAULT_PRINT_INDENT};
use tracing::debug;

/// Option keys understood by [`parse_options`]
pub const KNOWN_KEYS: [&str; 10] = [
    "wrap", "fold", "foldmark", "indent", "lineno", "fontsize", "lang", "language", "filename",
    "highlight",
];

/// Ordered `key[=value]` tokens of an option string
///
/// This is the untyped layer shared by the typed parser and the legacy
/// converter. It keeps keys it does not understand, so a rewrite does not
/// drop forward-compatible options.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OptionList {
    entries: Vec<(String, Option<String>)>,
}

impl OptionList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokenize an option string
    ///
    /// Tokens are split on `,`; whitespace around tokens and around `=` is
    /// ignored and empty tokens are skipped. A bare range token directly
    /// after `highlight=` continues that value, so `highlight=3-5,7` keeps
    /// both ranges.
    pub fn parse(input: &str) -> Self {
        let mut list = Self::new();

        for token in input.split(',') {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }

            let (key, value) = match token.split_once('=') {
                Some((key, value)) => {
                    let value = value.trim();
                    (key.trim(), (!value.is_empty()).then(|| value.to_string()))
                }
                None => (token, None),
            };

            if value.is_none() && is_range_token(key) {
                if let Some((last_key, Some(last_value))) = list.entries.last_mut() {
                    if last_key.eq_ignore_ascii_case("highlight") {
                        last_value.push(',');
                        last_value.push_str(key);
                        continue;
                    }
                }
            }

            if key.is_empty() {
                continue;
            }
            list.entries.push((key.to_string(), value));
        }

        list
    }

    /// Check whether the list has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether `key` is present
    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Value of the last occurrence of `key`
    ///
    /// Returns `None` when the key is absent and `Some(None)` for a bare key.
    pub fn get(&self, key: &str) -> Option<Option<&str>> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_deref())
    }

    /// Set `key`, replacing an existing entry in place or appending
    pub fn set(&mut self, key: impl Into<String>, value: Option<String>) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Remove every occurrence of `key`
    pub fn remove(&mut self, key: &str) {
        self.entries.retain(|(k, _)| k != key);
    }

    /// Iterate over the entries in source order
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }
}

impl fmt::Display for OptionList {
    /// Serialize back to an option string
    ///
    /// A bare key and a key whose value is `on` are both written as the
    /// bare key.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            match value.as_deref() {
                None | Some("on") => f.write_str(key)?,
                Some(value) => write!(f, "{}={}", key, value)?,
            }
        }
        Ok(())
    }
}

/// Parse an option string into a [`ListOptions`]
///
/// Per-key coercion:
/// - `wrap`: bare, `on` or `true` enables at the default width; `off` or
///   `false` disables; otherwise the leading integer is the width, and a
///   non-numeric or non-positive value disables.
/// - `fold`: bare, `on` or `true` is true; anything else is false.
/// - `lineno`: bare, `on` or `true` is on; a positive leading integer is
///   the starting number; anything else is off.
/// - `indent`: leading integer, 20 when no integer can be read.
/// - `foldmark`, `fontsize`, `lang`/`language`, `filename`, `highlight`:
///   taken verbatim; a bare key is ignored.
///
/// An empty input yields options with every field absent.
///
/// # Example
///
/// ```
/// use reviewext_ast::{FontSize, LineNumbers, Wrap};
/// use reviewext_core::options::parse_options;
///
/// let options = parse_options("wrap=80,lineno=on,fontsize=small");
/// assert_eq!(options.wrap, Some(Wrap::at(80)));
/// assert_eq!(options.lineno, Some(LineNumbers::On));
/// assert_eq!(options.fontsize, Some(FontSize::Small));
/// assert_eq!(options.lang, None);
/// ```
pub fn parse_options(input: &str) -> ListOptions {
    from_option_list(&OptionList::parse(input))
}

/// Build typed options from an already tokenized list
pub fn from_option_list(list: &OptionList) -> ListOptions {
    let mut options = ListOptions::new();

    for (key, value) in list.iter() {
        match key.to_ascii_lowercase().as_str() {
            "wrap" => options.wrap = Some(coerce_wrap(value)),
            "fold" => options.fold = Some(is_truthy(value)),
            "foldmark" => {
                if let Some(mark) = value {
                    options.foldmark = Some(mark.to_string());
                }
            }
            "indent" => {
                options.indent = Some(value.and_then(leading_int).unwrap_or(DEFAULT_PRINT_INDENT));
            }
            "lineno" => options.lineno = Some(coerce_lineno(value)),
            "fontsize" => {
                if let Some(size) = value {
                    options.fontsize = Some(FontSize::parse(size));
                }
            }
            "lang" | "language" => {
                if let Some(lang) = value {
                    options.lang = Some(lang.to_string());
                }
            }
            "filename" => {
                if let Some(filename) = value {
                    options.filename = Some(filename.to_string());
                }
            }
            "highlight" => {
                if let Some(ranges) = value {
                    options.highlight = Some(ranges.to_string());
                }
            }
            _ => debug!(key, "ignoring unknown listing option"),
        }
    }

    options
}

/// Serialize options to the canonical option string
///
/// Keys are written in the fixed order `wrap, fold, foldmark, indent,
/// lineno, fontsize, lang, filename, highlight`; absent fields are
/// omitted. [`parse_options`] reads the result back to the same value.
///
/// String values are written verbatim, so they must not contain `,` nor
/// begin or end with whitespace; such values do not survive a round trip.
/// `highlight` may use `,` between ranges.
pub fn stringify(options: &ListOptions) -> String {
    let mut parts = Vec::new();

    if let Some(wrap) = options.wrap {
        parts.push(match wrap {
            Wrap::On => "wrap=on".to_string(),
            Wrap::Off => "wrap=off".to_string(),
            Wrap::Width(width) => format!("wrap={}", width),
        });
    }
    if let Some(fold) = options.fold {
        parts.push(format!("fold={}", if fold { "on" } else { "off" }));
    }
    if let Some(ref mark) = options.foldmark {
        parts.push(format!("foldmark={}", mark));
    }
    if let Some(indent) = options.indent {
        parts.push(format!("indent={}", indent));
    }
    if let Some(lineno) = options.lineno {
        parts.push(match lineno {
            LineNumbers::On => "lineno=on".to_string(),
            LineNumbers::Off => "lineno=off".to_string(),
            LineNumbers::From(start) => format!("lineno={}", start),
        });
    }
    if let Some(ref size) = options.fontsize {
        parts.push(format!("fontsize={}", size));
    }
    if let Some(ref lang) = options.lang {
        parts.push(format!("lang={}", lang));
    }
    if let Some(ref filename) = options.filename {
        parts.push(format!("filename={}", filename));
    }
    if let Some(ref ranges) = options.highlight {
        parts.push(format!("highlight={}", ranges));
    }

    parts.join(",")
}

/// Whether a trailing directive parameter is an option string
///
/// A parameter is treated as options when it contains `=`; otherwise it is
/// a plain language tag.
pub fn looks_like_options(param: &str) -> bool {
    param.contains('=')
}

/// Read the leading integer of a string, ignoring leading whitespace
///
/// `"80px"` reads as 80, `"-3"` as -3; `"abc"` has no leading integer.
pub fn leading_int(value: &str) -> Option<i64> {
    let value = value.trim_start();
    let (sign, digits) = match value.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, value.strip_prefix('+').unwrap_or(value)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

fn is_truthy(value: Option<&str>) -> bool {
    match value {
        None => true,
        Some(v) => v.eq_ignore_ascii_case("on") || v.eq_ignore_ascii_case("true"),
    }
}

fn is_falsy(value: &str) -> bool {
    value.eq_ignore_ascii_case("off") || value.eq_ignore_ascii_case("false")
}

fn coerce_wrap(value: Option<&str>) -> Wrap {
    if is_truthy(value) {
        return Wrap::On;
    }
    match value {
        Some(v) if is_falsy(v) => Wrap::Off,
        Some(v) => match leading_int(v) {
            Some(width) if width > 0 => Wrap::at(width as usize),
            _ => Wrap::Off,
        },
        None => Wrap::On,
    }
}

fn coerce_lineno(value: Option<&str>) -> LineNumbers {
    if is_truthy(value) {
        return LineNumbers::On;
    }
    match value.and_then(leading_int) {
        Some(start) if start > 0 => LineNumbers::starting_at(start as u64),
        _ => LineNumbers::Off,
    }
}

fn is_range_token(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_digit() || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scenario() {
        let options = parse_options("wrap=80,lineno=on,fontsize=small");
        assert_eq!(
            options,
            ListOptions {
                wrap: Some(Wrap::at(80)),
                lineno: Some(LineNumbers::On),
                fontsize: Some(FontSize::Small),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse_options("").is_empty());
        assert!(parse_options(" , ,").is_empty());
    }

    #[test]
    fn test_whitespace_is_ignored() {
        let options = parse_options("  wrap = 60 ,  lang =  ruby ");
        assert_eq!(options.wrap, Some(Wrap::at(60)));
        assert_eq!(options.lang.as_deref(), Some("ruby"));
    }

    #[test]
    fn test_wrap_coercion() {
        assert_eq!(parse_options("wrap").wrap, Some(Wrap::On));
        assert_eq!(parse_options("wrap=on").wrap, Some(Wrap::On));
        assert_eq!(parse_options("wrap=true").wrap, Some(Wrap::On));
        assert_eq!(parse_options("wrap=off").wrap, Some(Wrap::Off));
        assert_eq!(parse_options("wrap=false").wrap, Some(Wrap::Off));
        assert_eq!(parse_options("wrap=72cols").wrap, Some(Wrap::at(72)));
        assert_eq!(parse_options("wrap=abc").wrap, Some(Wrap::Off));
        assert_eq!(parse_options("wrap=-4").wrap, Some(Wrap::Off));
    }

    #[test]
    fn test_lineno_coercion() {
        assert_eq!(parse_options("lineno").lineno, Some(LineNumbers::On));
        assert_eq!(parse_options("lineno=true").lineno, Some(LineNumbers::On));
        assert_eq!(parse_options("lineno=10").lineno, Some(LineNumbers::starting_at(10)));
        assert_eq!(parse_options("lineno=0").lineno, Some(LineNumbers::Off));
        assert_eq!(parse_options("lineno=off").lineno, Some(LineNumbers::Off));
    }

    #[test]
    fn test_fold_coercion() {
        assert_eq!(parse_options("fold").fold, Some(true));
        assert_eq!(parse_options("fold=on").fold, Some(true));
        assert_eq!(parse_options("fold=yes").fold, Some(false));
    }

    #[test]
    fn test_indent_coercion() {
        assert_eq!(parse_options("indent=4").indent, Some(4));
        assert_eq!(parse_options("indent").indent, Some(20));
        assert_eq!(parse_options("indent=wide").indent, Some(20));
        // Out-of-range values pass through unvalidated
        assert_eq!(parse_options("indent=-3").indent, Some(-3));
    }

    #[test]
    fn test_language_alias() {
        assert_eq!(parse_options("language=python").lang.as_deref(), Some("python"));
        assert_eq!(parse_options("lang=ruby").lang.as_deref(), Some("ruby"));
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let options = parse_options("captionpos=none,copybutton,lang=go");
        assert_eq!(options, ListOptions::new().with_lang("go"));
    }

    #[test]
    fn test_bare_string_keys_ignored() {
        let options = parse_options("filename,foldmark");
        assert!(options.is_empty());
    }

    #[test]
    fn test_highlight_keeps_ranges() {
        let options = parse_options("highlight=3-5,7,lang=ruby");
        assert_eq!(options.highlight.as_deref(), Some("3-5,7"));
        assert_eq!(options.lang.as_deref(), Some("ruby"));

        let options = parse_options("HIGHLIGHT=3-5,7");
        assert_eq!(options.highlight.as_deref(), Some("3-5,7"));
    }

    #[test]
    fn test_zero_values_round_trip() {
        let options = ListOptions::new()
            .with_wrap(Wrap::at(0))
            .with_lineno(LineNumbers::starting_at(0));
        assert_eq!(stringify(&options), "wrap=off,lineno=off");
        assert_eq!(parse_options(&stringify(&options)), options);
    }

    #[test]
    fn test_fontsize_case_is_kept() {
        let options = parse_options("fontsize=Small");
        assert_eq!(options.fontsize, Some(FontSize::Other("Small".to_string())));
        assert_eq!(parse_options(&stringify(&options)), options);
    }

    #[test]
    fn test_stringify_order() {
        let options = ListOptions {
            highlight: Some("1-2".to_string()),
            lang: Some("c".to_string()),
            wrap: Some(Wrap::at(80)),
            lineno: Some(LineNumbers::starting_at(5)),
            ..Default::default()
        };
        assert_eq!(stringify(&options), "wrap=80,lineno=5,lang=c,highlight=1-2");
    }

    #[test]
    fn test_stringify_round_trip() {
        let options = ListOptions {
            wrap: Some(Wrap::On),
            fold: Some(false),
            foldmark: Some("~".to_string()),
            indent: Some(4),
            lineno: Some(LineNumbers::Off),
            fontsize: Some(FontSize::Large),
            lang: Some("ruby".to_string()),
            filename: Some("app.rb".to_string()),
            highlight: Some("3-5,7".to_string()),
        };
        assert_eq!(parse_options(&stringify(&options)), options);
    }

    #[test]
    fn test_option_list_preserves_unknown_keys() {
        let mut list = OptionList::parse("lineno,captionpos=none,diffformat=inline");
        assert_eq!(list.len(), 3);
        assert_eq!(list.get("lineno"), Some(None));
        assert_eq!(list.get("captionpos"), Some(Some("none")));

        list.set("foldmark", Some("~".to_string()));
        list.remove("captionpos");
        assert_eq!(list.to_string(), "lineno,diffformat=inline,foldmark=~");
    }

    #[test]
    fn test_option_list_on_collapses() {
        let list = OptionList::parse("lineno=on,wrap=80");
        assert_eq!(list.to_string(), "lineno,wrap=80");
    }

    #[test]
    fn test_leading_int() {
        assert_eq!(leading_int("80"), Some(80));
        assert_eq!(leading_int(" 12px"), Some(12));
        assert_eq!(leading_int("-3"), Some(-3));
        assert_eq!(leading_int("+7"), Some(7));
        assert_eq!(leading_int("abc"), None);
        assert_eq!(leading_int(""), None);
    }

    #[test]
    fn test_looks_like_options() {
        assert!(looks_like_options("wrap=80"));
        assert!(!looks_like_options("ruby"));
    }
}
