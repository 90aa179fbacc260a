//! Block-level elements of a Re:VIEW source
//!
//! Only listing blocks are modelled structurally. Everything else is kept
//! as passthrough text for the host compiler.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::options::{FontSize, LineNumbers, ListOptions};

/// Block-level content element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Block {
    /// A listing directive with its body
    Listing(ListingBlock),
    /// Source lines passed through untouched
    Text(String),
}

/// Listing directive variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectiveKind {
    /// `//list[id][caption][options]`
    List,
    /// `//listnum[id][caption][options]`, forces line numbering
    ListNum,
    /// `//emlist[caption][options]`
    EmList,
    /// `//emlistnum[caption][options]`, forces line numbering
    EmListNum,
    /// `//cmd[caption][options]`, forces the small font
    Cmd,
    /// `//source[caption][options]`
    Source,
}

impl DirectiveKind {
    /// All listing directives, longest name first so prefix matching is safe
    pub const ALL: [DirectiveKind; 6] = [
        DirectiveKind::EmListNum,
        DirectiveKind::ListNum,
        DirectiveKind::EmList,
        DirectiveKind::Source,
        DirectiveKind::List,
        DirectiveKind::Cmd,
    ];

    /// The directive name as written after `//`
    pub fn name(self) -> &'static str {
        match self {
            DirectiveKind::List => "list",
            DirectiveKind::ListNum => "listnum",
            DirectiveKind::EmList => "emlist",
            DirectiveKind::EmListNum => "emlistnum",
            DirectiveKind::Cmd => "cmd",
            DirectiveKind::Source => "source",
        }
    }

    /// Look up a directive by name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Whether the directive takes a leading `[id]` parameter
    pub fn has_id(self) -> bool {
        matches!(self, DirectiveKind::List | DirectiveKind::ListNum)
    }

    /// Whether the directive is a deprecated spelling of `//list`
    pub fn is_deprecated(self) -> bool {
        matches!(
            self,
            DirectiveKind::EmList
                | DirectiveKind::EmListNum
                | DirectiveKind::Cmd
                | DirectiveKind::Source
        )
    }

    /// Options this directive supplies when the author left them absent
    pub fn forced_defaults(self) -> ListOptions {
        match self {
            DirectiveKind::ListNum | DirectiveKind::EmListNum => {
                ListOptions::new().with_lineno(LineNumbers::On)
            }
            DirectiveKind::Cmd => ListOptions::new().with_fontsize(FontSize::Small),
            DirectiveKind::List | DirectiveKind::EmList | DirectiveKind::Source => {
                ListOptions::new()
            }
        }
    }
}

impl fmt::Display for DirectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A listing block as written in the source
///
/// `param` is the raw trailing parameter: either a plain language tag or
/// a `key=value` option string. Option resolution happens at dispatch time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingBlock {
    /// Which directive introduced the block
    pub kind: DirectiveKind,
    /// Block identifier (`list`/`listnum` only)
    pub id: Option<String>,
    /// Caption, possibly carrying legacy embedded options
    pub caption: Option<String>,
    /// Trailing parameter (language tag or option string)
    pub param: Option<String>,
    /// Body lines, verbatim
    pub lines: Vec<String>,
    /// 1-based source line of the opening directive
    pub line: usize,
    /// Byte range of the opening directive line
    pub header: (usize, usize),
}

impl ListingBlock {
    /// Create a block with no parameters
    pub fn new(kind: DirectiveKind, lines: Vec<String>) -> Self {
        Self {
            kind,
            id: None,
            caption: None,
            param: None,
            lines,
            line: 1,
            header: (0, 0),
        }
    }

    /// Set the identifier
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the caption
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    /// Set the trailing parameter
    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.param = Some(param.into());
        self
    }

    /// Set the source line
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }

    /// A human-readable label for diagnostics: the id, or the directive and line
    pub fn label(&self) -> String {
        match self.id.as_deref() {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => format!("//{} at line {}", self.kind, self.line),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directive_names_round_trip() {
        for kind in DirectiveKind::ALL {
            assert_eq!(DirectiveKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(DirectiveKind::from_name("image"), None);
    }

    #[test]
    fn test_forced_defaults() {
        assert_eq!(
            DirectiveKind::ListNum.forced_defaults().lineno,
            Some(LineNumbers::On)
        );
        assert_eq!(
            DirectiveKind::Cmd.forced_defaults().fontsize,
            Some(FontSize::Small)
        );
        assert!(DirectiveKind::List.forced_defaults().is_empty());
    }

    #[test]
    fn test_deprecated_kinds() {
        assert!(!DirectiveKind::List.is_deprecated());
        assert!(!DirectiveKind::ListNum.is_deprecated());
        assert!(DirectiveKind::EmList.is_deprecated());
        assert!(DirectiveKind::Cmd.is_deprecated());
    }

    #[test]
    fn test_label_prefers_id() {
        let block = ListingBlock::new(DirectiveKind::List, vec![]).with_id("main");
        assert_eq!(block.label(), "main");

        let block = ListingBlock::new(DirectiveKind::Cmd, vec![]).at_line(12);
        assert_eq!(block.label(), "//cmd at line 12");
    }
}
