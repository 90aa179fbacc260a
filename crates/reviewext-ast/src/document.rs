//! Document root
//!
//! A document is the sequence of blocks of one Re:VIEW source file, in
//! source order. Rendering is strictly block-sequential.

use serde::{Deserialize, Serialize};

use crate::block::{Block, ListingBlock};

/// A complete document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    /// Document content blocks
    pub blocks: Vec<Block>,
}

impl Document {
    /// Create a new empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a block to the document
    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Check if the document is empty (no blocks)
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Get the number of blocks
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Iterate over the listing blocks only
    pub fn listings(&self) -> impl Iterator<Item = &ListingBlock> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Listing(listing) => Some(listing),
            Block::Text(_) => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::DirectiveKind;

    #[test]
    fn test_document_new() {
        let doc = Document::new();
        assert!(doc.is_empty());
        assert_eq!(doc.len(), 0);
    }

    #[test]
    fn test_listings_skips_text() {
        let mut doc = Document::new();
        doc.push(Block::Text("= Chapter".to_string()));
        doc.push(Block::Listing(ListingBlock::new(
            DirectiveKind::List,
            vec!["puts 1".to_string()],
        )));
        doc.push(Block::Text("Some prose.".to_string()));

        assert_eq!(doc.len(), 3);
        assert_eq!(doc.listings().count(), 1);
    }
}
