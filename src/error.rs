// ============================================================
// File: error.rs
// Description:
//   Error types returned by the public B+ tree operations. Only the
//   two recoverable categories from the design's error-handling section
//   are represented here — duplicate insert and missing delete.
//   Construction misuse and broken structural invariants are programmer
//   errors and are reported via `assert!`, not this enum.
// ============================================================
use thiserror::Error;

/// Errors returned by [`crate::index::Tree`] mutating operations.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum BPlusTreeError {
    /// `insert` was called with a key already present in the tree.
    #[error("key {0} already exists")]
    DuplicateKey(i64),

    /// `delete` was called with a key not present in the tree.
    #[error("key {0} not found")]
    KeyNotFound(i64),
}
