//! Error types for the ledger model.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("ledger must contain at least one block")]
    Empty,

    #[error("genesis block must not reference a previous block")]
    GenesisHasParent,

    #[error("block {found} found where block {expected} was expected")]
    NumberGap { expected: u64, found: u64 },

    #[error("block {number} does not link to the identifier of its predecessor")]
    BrokenLink { number: u64 },

    #[error("identifier {identifier} is used by more than one block")]
    DuplicateIdentifier { identifier: String },
}
