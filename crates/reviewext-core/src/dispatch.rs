//! Directive dispatch
//!
//! Resolves the options in effect for each listing block and hands the
//! block to a [`ListingRenderer`]. Per block the dispatcher moves through
//! [`BlockPhase`]s:
//!
//! ```text
//! Idle -> OptionsResolved -> Delegating -> Cleared
//! ```
//!
//! The options in effect while delegating live in the dispatcher's
//! Active Configuration slot. The slot is only reachable through an
//! [`ActiveConfiguration`] guard that clears it when dropped, so it is
//! empty again after every block, including blocks whose renderer fails
//! or panics.

use reviewext_ast::{Block, DirectiveKind, Document, ListOptions, ListingBlock};
use tracing::{debug, warn};

use crate::caption::split_caption_options;
use crate::config::Settings;
use crate::error::RenderError;
use crate::merge::merge;
use crate::options::{looks_like_options, parse_options};
use crate::wrap::LineWrapper;

/// Block data handed to a renderer
#[derive(Debug, Clone, PartialEq)]
pub struct ListingRequest {
    pub kind: DirectiveKind,
    pub id: Option<String>,
    /// Caption with any embedded options removed
    pub caption: Option<String>,
    /// Language tag with any option syntax removed
    pub lang: Option<String>,
    /// Body lines, already wrapped when the renderer asked for it
    pub lines: Vec<String>,
}

/// A backend that turns one listing block into output
pub trait ListingRenderer {
    /// Render one block with the options in effect, if any
    fn render(
        &mut self,
        request: &ListingRequest,
        options: Option<&ListOptions>,
    ) -> Result<String, RenderError>;

    /// Whether the dispatcher should fold long lines before `render`
    fn wraps_upstream(&self, _options: &ListOptions) -> bool {
        false
    }

    /// Continuation indent for upstream wrapping when a block sets none
    fn continuation_indent(&self) -> usize {
        0
    }

    /// Fold mark for upstream wrapping when a block sets none
    ///
    /// `None` falls back to `listing.fold_mark`.
    fn fold_mark(&self) -> Option<&str> {
        None
    }

    /// Called once before the first block of a document
    fn begin_document(&mut self) {}

    /// Output for source text outside listing blocks
    fn passthrough(&mut self, text: &str) -> String {
        text.to_string()
    }
}

/// Where the dispatcher is within the current block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockPhase {
    #[default]
    Idle,
    OptionsResolved,
    Delegating,
    Cleared,
}

#[derive(Debug, Default)]
struct ActiveSlot {
    options: Option<ListOptions>,
    phase: BlockPhase,
}

/// Scoped access to the options in effect for the block being rendered
///
/// Dropping the guard clears the slot.
#[derive(Debug)]
pub struct ActiveConfiguration<'a> {
    slot: &'a mut ActiveSlot,
}

impl<'a> ActiveConfiguration<'a> {
    fn enter(slot: &'a mut ActiveSlot, options: Option<ListOptions>) -> Self {
        slot.options = options;
        slot.phase = BlockPhase::Delegating;
        Self { slot }
    }

    /// The options in effect
    pub fn options(&self) -> Option<&ListOptions> {
        self.slot.options.as_ref()
    }
}

impl Drop for ActiveConfiguration<'_> {
    fn drop(&mut self) {
        self.slot.options = None;
        self.slot.phase = BlockPhase::Cleared;
    }
}

/// A block's cleaned parameters and resolved options
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResolvedBlock {
    pub caption: Option<String>,
    pub lang: Option<String>,
    /// `None` when the block carries no options and its directive forces none
    pub options: Option<ListOptions>,
}

/// Resolve the options of one block
///
/// Caption-embedded options are the merge base, a trailing option
/// parameter is the incoming side, and the directive's forced defaults
/// fill what is left. A trailing parameter without `=` is a plain
/// language tag.
pub fn resolve(block: &ListingBlock) -> ResolvedBlock {
    let (caption, base) = match block.caption.as_deref() {
        Some(caption) => {
            let (text, options) = split_caption_options(caption);
            (Some(text), options)
        }
        None => (None, None),
    };

    let (mut lang, incoming) = match block.param.as_deref() {
        Some(param) if looks_like_options(param) => {
            let incoming = parse_options(param);
            (incoming.lang.clone(), Some(incoming))
        }
        Some(param) => (Some(param.trim().to_string()), None),
        None => (None, None),
    };

    let forced = block.kind.forced_defaults();
    let options = if base.is_none() && incoming.is_none() && forced.is_empty() {
        None
    } else {
        let merged = merge(base.as_ref(), incoming.as_ref(), &forced);
        if lang.is_none() {
            lang = merged.lang.clone();
        }
        Some(merged)
    };

    ResolvedBlock {
        caption,
        lang,
        options,
    }
}

/// Drives listing blocks through a renderer one at a time
#[derive(Debug, Default)]
pub struct Dispatcher {
    settings: Settings,
    slot: ActiveSlot,
}

impl Dispatcher {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            slot: ActiveSlot::default(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The options currently in effect; `None` outside delegation
    pub fn active_options(&self) -> Option<&ListOptions> {
        self.slot.options.as_ref()
    }

    pub fn phase(&self) -> BlockPhase {
        self.slot.phase
    }

    /// Render one listing block
    ///
    /// Failures are returned as [`RenderError::Block`] carrying the block's
    /// label and source line.
    pub fn render_block<R>(
        &mut self,
        block: &ListingBlock,
        renderer: &mut R,
    ) -> Result<String, RenderError>
    where
        R: ListingRenderer + ?Sized,
    {
        self.slot.phase = BlockPhase::Idle;
        let resolved = resolve(block);
        self.slot.phase = BlockPhase::OptionsResolved;
        debug!(
            block = %block.label(),
            kind = %block.kind,
            options = ?resolved.options,
            "resolved listing options"
        );

        let active = ActiveConfiguration::enter(&mut self.slot, resolved.options);
        let result = prewrap(&self.settings, renderer, active.options(), &block.lines).and_then(
            |lines| {
                let request = ListingRequest {
                    kind: block.kind,
                    id: block.id.clone(),
                    caption: resolved.caption,
                    lang: resolved.lang,
                    lines,
                };
                renderer.render(&request, active.options())
            },
        );
        drop(active);

        result.map_err(|err| match err {
            err @ RenderError::Block { .. } => err,
            err => RenderError::Block {
                id: block.label(),
                line: block.line,
                source: Box::new(err),
            },
        })
    }

    /// Render a whole document in block order
    ///
    /// Stops at the first block that fails.
    pub fn render_document<R>(
        &mut self,
        document: &Document,
        renderer: &mut R,
    ) -> Result<String, RenderError>
    where
        R: ListingRenderer + ?Sized,
    {
        renderer.begin_document();
        let mut out = String::new();

        for block in &document.blocks {
            match block {
                // Text blocks are joined without their final newline
                Block::Text(text) => {
                    out.push_str(&renderer.passthrough(text));
                    out.push('\n');
                }
                Block::Listing(listing) => {
                    let rendered = self.render_block(listing, renderer)?;
                    out.push_str(&rendered);
                    if !rendered.ends_with('\n') {
                        out.push('\n');
                    }
                }
            }
        }

        Ok(out)
    }
}

/// Fold long lines when the renderer cannot do it itself
fn prewrap<R>(
    settings: &Settings,
    renderer: &R,
    options: Option<&ListOptions>,
    lines: &[String],
) -> Result<Vec<String>, RenderError>
where
    R: ListingRenderer + ?Sized,
{
    let Some(options) = options else {
        return Ok(lines.to_vec());
    };
    if !options.wraps() || !renderer.wraps_upstream(options) {
        return Ok(lines.to_vec());
    }
    let Some(width) = options
        .wrap
        .and_then(|wrap| wrap.width_or(settings.listing.wrap_width))
    else {
        return Ok(lines.to_vec());
    };

    let indent = match options.indent {
        Some(indent) if indent < 0 => {
            warn!(indent, "negative indent, using 0");
            0
        }
        Some(indent) => indent as usize,
        None => renderer.continuation_indent(),
    };
    let mark = if options.shows_fold_mark() {
        options
            .foldmark
            .as_deref()
            .or_else(|| renderer.fold_mark())
            .unwrap_or(settings.listing.fold_mark.as_str())
    } else {
        ""
    };

    let wrapper = LineWrapper::new(width, indent, mark)?.with_policy(settings.listing.wrap_policy);
    Ok(wrapper.wrap_lines(lines))
}
