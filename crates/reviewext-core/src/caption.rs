//! Legacy caption-embedded options
//!
//! Older sources put options at the end of the caption slot:
//!
//! ```text
//! //list[main][Main loop wrap=on,lineno=on]{
//! ```
//!
//! The options start at the first whitespace that precedes a `key=` token.

use std::sync::OnceLock;

use regex::Regex;
use reviewext_ast::ListOptions;

use crate::options::{parse_options, KNOWN_KEYS};

/// Split a caption into its text and any embedded options
///
/// Returns the caption unchanged and `None` when it carries no recognized
/// option key.
///
/// # Example
///
/// ```
/// use reviewext_ast::Wrap;
/// use reviewext_core::caption::split_caption_options;
///
/// let (caption, options) = split_caption_options("Main loop wrap=on,lineno=on");
/// assert_eq!(caption, "Main loop");
/// assert_eq!(options.unwrap().wrap, Some(Wrap::On));
/// ```
pub fn split_caption_options(caption: &str) -> (String, Option<ListOptions>) {
    static KNOWN_KEY_RE: OnceLock<Regex> = OnceLock::new();
    static SPLIT_RE: OnceLock<Regex> = OnceLock::new();

    let known = KNOWN_KEY_RE
        .get_or_init(|| Regex::new(&format!(r"\s+(?:{})=", KNOWN_KEYS.join("|"))).unwrap());
    if !known.is_match(caption) {
        return (caption.to_string(), None);
    }

    let split = SPLIT_RE.get_or_init(|| Regex::new(r"\s+\w+=").unwrap());
    match split.find(caption) {
        Some(m) => {
            let text = caption[..m.start()].to_string();
            let options = parse_options(caption[m.start()..].trim());
            (text, Some(options))
        }
        None => (caption.to_string(), None),
    }
}
