//! Re:VIEW source scanner
//!
//! Splits a `.re` source into listing blocks and passthrough text. Only
//! the six listing directives are recognized:
//!
//! ```text
//! //list[id][caption][options]{      //emlist[caption][options]{
//! //listnum[id][caption][options]{   //emlistnum[caption][options]{
//! //cmd[caption][options]{           //source[caption][options]{
//! ```
//!
//! A block body runs until a line starting with `//}`. Preprocessor
//! lines (`#@...`) inside a body are comments and are dropped.

use std::sync::OnceLock;

use regex::Regex;
use reviewext_ast::{Block, DirectiveKind, Document, ListingBlock};

use crate::error::ParseError;

/// Parser state for tracking what kind of block we're currently building
#[derive(Debug)]
enum ParserState {
    /// Outside any listing, accumulating passthrough lines
    Text(Vec<String>),
    /// Inside a listing body
    Listing(ListingBlock),
}

struct Parser {
    blocks: Vec<Block>,
    state: ParserState,
}

impl Parser {
    fn new() -> Self {
        Self {
            blocks: Vec::new(),
            state: ParserState::Text(Vec::new()),
        }
    }

    fn parse(mut self, source: &str) -> Result<Document, ParseError> {
        let mut offset = 0;

        for (index, raw) in source.split_inclusive('\n').enumerate() {
            let line = raw.trim_end_matches('\n').trim_end_matches('\r');
            self.process_line(line, index + 1, (offset, offset + line.len()));
            offset += raw.len();
        }

        match self.state {
            ParserState::Listing(block) => Err(ParseError::UnterminatedBlock {
                directive: block.kind.name().to_string(),
                line: block.line,
            }),
            ParserState::Text(lines) => {
                if !lines.is_empty() {
                    self.blocks.push(Block::Text(lines.join("\n")));
                }
                Ok(Document {
                    blocks: self.blocks,
                })
            }
        }
    }

    fn process_line(&mut self, line: &str, number: usize, span: (usize, usize)) {
        match &mut self.state {
            ParserState::Listing(block) => {
                if line.starts_with("//}") {
                    let state = std::mem::replace(&mut self.state, ParserState::Text(Vec::new()));
                    if let ParserState::Listing(block) = state {
                        self.blocks.push(Block::Listing(block));
                    }
                } else if !line.starts_with("#@") {
                    block.lines.push(line.to_string());
                }
            }
            ParserState::Text(lines) => match parse_header(line) {
                Some(mut block) => {
                    block.line = number;
                    block.header = span;
                    if !lines.is_empty() {
                        self.blocks.push(Block::Text(lines.join("\n")));
                    }
                    self.state = ParserState::Listing(block);
                }
                None => lines.push(line.to_string()),
            },
        }
    }
}

/// Parse a Re:VIEW source into blocks
///
/// # Example
///
/// ```
/// use reviewext_core::parser::parse;
///
/// let doc = parse("= Title\n//list[main][Main][lang=ruby]{\nputs 1\n//}\n").unwrap();
/// let block = doc.listings().next().unwrap();
/// assert_eq!(block.id.as_deref(), Some("main"));
/// assert_eq!(block.param.as_deref(), Some("lang=ruby"));
/// assert_eq!(block.lines, vec!["puts 1"]);
/// ```
pub fn parse(source: &str) -> Result<Document, ParseError> {
    Parser::new().parse(source)
}

/// Parse a listing directive opening line, without its body
pub fn parse_header(line: &str) -> Option<ListingBlock> {
    static HEADER_RE: OnceLock<Regex> = OnceLock::new();
    let re = HEADER_RE.get_or_init(|| {
        Regex::new(r"^//(listnum|list|emlistnum|emlist|cmd|source)((?:\[[^\]]*\])*)\{\s*$")
            .unwrap()
    });

    let caps = re.captures(line)?;
    let kind = DirectiveKind::from_name(&caps[1])?;
    let mut params = bracket_params(&caps[2]).into_iter();

    let mut block = ListingBlock::new(kind, Vec::new());
    if kind.has_id() {
        block.id = params.next();
    }
    block.caption = params.next().filter(|c| !c.is_empty());
    block.param = params.next().filter(|p| !p.is_empty());
    Some(block)
}

/// Split `[a][b][c]` into its bracket contents
pub fn bracket_params(text: &str) -> Vec<String> {
    static PARAM_RE: OnceLock<Regex> = OnceLock::new();
    let re = PARAM_RE.get_or_init(|| Regex::new(r"\[([^\]]*)\]").unwrap());
    re.captures_iter(text).map(|c| c[1].to_string()).collect()
}
