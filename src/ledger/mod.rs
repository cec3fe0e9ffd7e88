//! Block Ledger Module
//!
//! An append-only chain of blocks for the blockchain visualizer:
//!
//! - `Block`: a numbered entry carrying its own identifier and the identifier
//!   of the block before it
//! - `Ledger`: the ordered, never-empty sequence of blocks
//! - `HighlightTimer`: the short-lived highlight of a freshly appended block
//!
//! Identifiers are random strings, not digests of the block contents.

pub mod highlight;
pub mod identifier;

use crate::error::LedgerError;
use chrono::{DateTime, Utc};
use std::collections::HashSet;

pub use highlight::HighlightTimer;
pub use identifier::{IdentifierSource, RandomIdentifiers};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub number: u64,
    pub identifier: String,
    pub previous_identifier: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Block {
    pub fn is_genesis(&self) -> bool {
        self.previous_identifier.is_none()
    }
}

/// Append-only sequence of blocks. Always holds at least the genesis block.
#[derive(Debug, Clone)]
pub struct Ledger {
    blocks: Vec<Block>,
}

impl Ledger {
    pub fn initialize(ids: &mut dyn IdentifierSource) -> Self {
        let genesis = Block {
            number: 1,
            identifier: ids.next_identifier(),
            previous_identifier: None,
            created_at: Utc::now(),
        };
        tracing::debug!(identifier = %genesis.identifier, "Initialized ledger");
        Self {
            blocks: vec![genesis],
        }
    }

    /// Rebuild a ledger from raw blocks, checking every chain invariant.
    #[cfg(test)]
    pub fn from_blocks(blocks: Vec<Block>) -> Result<Self, LedgerError> {
        let ledger = Self { blocks };
        ledger.verify()?;
        Ok(ledger)
    }

    /// Append a block linked to the current last block and return it.
    pub fn append_block(&mut self, ids: &mut dyn IdentifierSource) -> &Block {
        let previous = self.last();
        let number = previous.number + 1;
        let previous_identifier = previous.identifier.clone();

        let mut identifier = ids.next_identifier();
        while self.contains_identifier(&identifier) {
            tracing::warn!(identifier = %identifier, "Identifier collision, drawing again");
            identifier = ids.next_identifier();
        }

        tracing::info!(number, identifier = %identifier, "Appended block");
        self.blocks.push(Block {
            number,
            identifier,
            previous_identifier: Some(previous_identifier),
            created_at: Utc::now(),
        });
        self.last()
    }

    pub fn verify(&self) -> Result<(), LedgerError> {
        let first = self.blocks.first().ok_or(LedgerError::Empty)?;
        if !first.is_genesis() {
            return Err(LedgerError::GenesisHasParent);
        }

        let mut seen = HashSet::new();
        for (index, block) in self.blocks.iter().enumerate() {
            let expected = index as u64 + 1;
            if block.number != expected {
                return Err(LedgerError::NumberGap {
                    expected,
                    found: block.number,
                });
            }
            if index > 0 {
                let previous = &self.blocks[index - 1];
                if block.previous_identifier.as_deref() != Some(previous.identifier.as_str()) {
                    return Err(LedgerError::BrokenLink {
                        number: block.number,
                    });
                }
            }
            if !seen.insert(block.identifier.as_str()) {
                return Err(LedgerError::DuplicateIdentifier {
                    identifier: block.identifier.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn last(&self) -> &Block {
        // Never empty: every constructor leaves at least one block.
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter()
    }

    fn contains_identifier(&self, identifier: &str) -> bool {
        self.blocks.iter().any(|b| b.identifier == identifier)
    }
}

// Helper functions for display

/// First eight characters of an identifier followed by an ellipsis.
pub fn short_identifier(identifier: Option<&str>) -> String {
    match identifier {
        Some(id) => format!("{}...", id.chars().take(8).collect::<String>()),
        None => "null...".to_string(),
    }
}

pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format("%H:%M:%S%.3f").to_string()
}

#[cfg(test)]
mod tests {
    use super::identifier::{ScriptedIdentifiers, SequentialIdentifiers};
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_initialize_yields_single_genesis_block() {
        let mut ids = SequentialIdentifiers::new();
        let ledger = Ledger::initialize(&mut ids);

        assert_eq!(ledger.len(), 1);
        let genesis = ledger.last();
        assert_eq!(genesis.number, 1);
        assert!(genesis.previous_identifier.is_none());
        assert_eq!(genesis.identifier, "id000001");
        assert!(ledger.verify().is_ok());
    }

    #[test]
    fn test_append_links_to_previous_block() {
        let mut ids = SequentialIdentifiers::new();
        let mut ledger = Ledger::initialize(&mut ids);
        let genesis_before = ledger.blocks()[0].clone();

        let appended = ledger.append_block(&mut ids).clone();

        assert_eq!(ledger.len(), 2);
        assert_eq!(appended.number, 2);
        assert_eq!(
            appended.previous_identifier.as_deref(),
            Some(genesis_before.identifier.as_str())
        );
        assert_eq!(ledger.blocks()[0], genesis_before);
        assert_eq!(ledger.last(), &appended);
    }

    #[test]
    fn test_append_redraws_on_collision() {
        let mut ids = ScriptedIdentifiers::new(&["aaa", "aaa", "bbb"]);
        let mut ledger = Ledger::initialize(&mut ids);
        let appended = ledger.append_block(&mut ids);

        assert_eq!(appended.identifier, "bbb");
        assert!(ledger.verify().is_ok());
    }

    #[test]
    fn test_from_blocks_rejects_empty() {
        assert_eq!(Ledger::from_blocks(vec![]).unwrap_err(), LedgerError::Empty);
    }

    #[test]
    fn test_from_blocks_rejects_broken_chains() {
        let mut ids = SequentialIdentifiers::new();
        let mut ledger = Ledger::initialize(&mut ids);
        ledger.append_block(&mut ids);
        ledger.append_block(&mut ids);
        let good = ledger.blocks().to_vec();

        let mut parented = good.clone();
        parented[0].previous_identifier = Some("x".to_string());
        assert_eq!(
            Ledger::from_blocks(parented).unwrap_err(),
            LedgerError::GenesisHasParent
        );

        let mut gap = good.clone();
        gap[2].number = 4;
        assert_eq!(
            Ledger::from_blocks(gap).unwrap_err(),
            LedgerError::NumberGap {
                expected: 3,
                found: 4
            }
        );

        let mut broken = good.clone();
        broken[2].previous_identifier = Some(good[0].identifier.clone());
        assert_eq!(
            Ledger::from_blocks(broken).unwrap_err(),
            LedgerError::BrokenLink { number: 3 }
        );

        let mut duplicate = good.clone();
        duplicate[2].identifier = good[0].identifier.clone();
        assert!(matches!(
            Ledger::from_blocks(duplicate).unwrap_err(),
            LedgerError::DuplicateIdentifier { .. }
        ));

        assert!(Ledger::from_blocks(good).is_ok());
    }

    #[test]
    fn test_short_identifier() {
        assert_eq!(short_identifier(Some("abcdefghijkl")), "abcdefgh...");
        assert_eq!(short_identifier(Some("abc")), "abc...");
        assert_eq!(short_identifier(None), "null...");
    }

    proptest! {
        #[test]
        fn prop_appends_keep_chain_intact(appends in 0usize..64, seed in any::<u64>()) {
            let mut ids = RandomIdentifiers::seeded(seed);
            let mut ledger = Ledger::initialize(&mut ids);
            for _ in 0..appends {
                ledger.append_block(&mut ids);
            }

            prop_assert_eq!(ledger.len(), appends + 1);
            prop_assert!(ledger.verify().is_ok());
            for (i, block) in ledger.iter().enumerate() {
                prop_assert_eq!(block.number, i as u64 + 1);
                if i > 0 {
                    let previous = &ledger.blocks()[i - 1];
                    prop_assert_eq!(
                        block.previous_identifier.as_deref(),
                        Some(previous.identifier.as_str())
                    );
                }
            }
        }
    }
}
