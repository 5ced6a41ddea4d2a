//! # Block Error Types
//!
//! All errors that can occur while encoding blocks or building the catalog.

use thiserror::Error;

/// Errors that can occur in the block codec and the block catalog.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlockError {
    /// A type id does not fit in the 24-bit type field.
    #[error("block type id {0} exceeds the 24-bit type field (max {max})", max = crate::block::MAX_TYPE_ID)]
    TypeIdOutOfRange(u32),

    /// A type id was looked up that the catalog never registered.
    #[error("unknown block type {0}")]
    UnknownBlockType(u32),

    /// Registration broke the ascending, gap-free id order.
    #[error("non-contiguous block id: expected {expected}, got {found}")]
    NonContiguousId {
        /// The id the catalog expected next.
        expected: u32,
        /// The id that was registered.
        found: u32,
    },

    /// A catalog record named neither or both of `face` and `faces`.
    #[error("block {id} must declare exactly one of `face` or `faces`")]
    InvalidFaceSpec {
        /// The offending record's id.
        id: u32,
    },

    /// The catalog document could not be parsed.
    #[error("malformed block catalog: {0}")]
    MalformedCatalog(String),
}

/// Result type for block operations.
pub type BlockResult<T> = Result<T, BlockError>;
