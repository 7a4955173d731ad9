//! # bptree-index
//! An in-memory B+ tree index over `i64` keys and values.
//!
//! ## Features
//! - Point `insert`/`search`/`delete`, plus `get_range` which returns the
//!   value of *some* key within an inclusive range rather than a list.
//! - Arena-backed nodes (`index::Tree`) so parent and sibling
//!   back-references are plain indices, not `Rc`/`RefCell` pointers.
//! - A `check_invariants` validator and a non-recursive `dump` for
//!   inspection, both intended for tests and the demo shell rather than
//!   the hot path.
//!
//! ## Non-goals
//! No persistence, no concurrency, no duplicate keys, no cursor objects,
//! no bulk-load, no statistics. These are out of scope by design; see
//! `SPEC_FULL.md` for the full rationale.
//!
//! ## Usage
//! This crate is a library first; `bptree-shell` (in `main.rs`/`shell.rs`)
//! is a thin REPL over the public [`index::Tree`] API for interactive use
//! and manual testing, not a tested interface in its own right.
// =====================================================================
// File: lib.rs
// =====================================================================

pub mod error;
pub mod index;
pub mod shell;

pub use error::BPlusTreeError;
pub use index::Tree;
