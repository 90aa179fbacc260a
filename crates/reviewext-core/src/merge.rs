//! Option merging
//!
//! Combines the option sources of one listing block: legacy options
//! embedded in the caption (`base`), the trailing option parameter
//! (`incoming`) and the directive's forced defaults.

use reviewext_ast::{LineNumbers, ListOptions, Wrap};

/// Merge option sources for one block
///
/// For every field `incoming` wins over `base`. Forced defaults then fill
/// any field that is absent; for `lineno`, `wrap` and `fold` they also
/// override an explicitly disabled value, so `//listnum[..][..][lineno=off]`
/// is still numbered. Neither input is modified.
///
/// # Example
///
/// ```
/// use reviewext_ast::{DirectiveKind, LineNumbers};
/// use reviewext_core::merge::merge;
/// use reviewext_core::options::parse_options;
///
/// let base = parse_options("wrap=60");
/// let incoming = parse_options("lang=ruby");
/// let merged = merge(Some(&base), Some(&incoming), &DirectiveKind::ListNum.forced_defaults());
///
/// assert_eq!(merged.lang.as_deref(), Some("ruby"));
/// assert_eq!(merged.lineno, Some(LineNumbers::On));
/// ```
pub fn merge(
    base: Option<&ListOptions>,
    incoming: Option<&ListOptions>,
    forced: &ListOptions,
) -> ListOptions {
    let empty = ListOptions::new();
    let base = base.unwrap_or(&empty);
    let incoming = incoming.unwrap_or(&empty);

    let mut merged = ListOptions {
        wrap: incoming.wrap.or(base.wrap),
        fold: incoming.fold.or(base.fold),
        foldmark: incoming.foldmark.clone().or_else(|| base.foldmark.clone()),
        indent: incoming.indent.or(base.indent),
        lineno: incoming.lineno.or(base.lineno),
        fontsize: incoming.fontsize.clone().or_else(|| base.fontsize.clone()),
        lang: incoming.lang.clone().or_else(|| base.lang.clone()),
        filename: incoming.filename.clone().or_else(|| base.filename.clone()),
        highlight: incoming.highlight.clone().or_else(|| base.highlight.clone()),
    };

    if forced.wrap.is_some() && merged.wrap.map_or(true, |w| w == Wrap::Off) {
        merged.wrap = forced.wrap;
    }
    if forced.fold.is_some() && merged.fold.map_or(true, |f| !f) {
        merged.fold = forced.fold;
    }
    if forced.lineno.is_some() && merged.lineno.map_or(true, |l| l == LineNumbers::Off) {
        merged.lineno = forced.lineno;
    }
    fill(&mut merged.foldmark, &forced.foldmark);
    fill(&mut merged.indent, &forced.indent);
    fill(&mut merged.fontsize, &forced.fontsize);
    fill(&mut merged.lang, &forced.lang);
    fill(&mut merged.filename, &forced.filename);
    fill(&mut merged.highlight, &forced.highlight);

    merged
}

fn fill<T: Clone>(slot: &mut Option<T>, default: &Option<T>) {
    if slot.is_none() {
        *slot = default.clone();
    }
}
