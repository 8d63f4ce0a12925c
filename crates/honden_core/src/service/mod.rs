//! Store-level use cases.
//!
//! # Responsibility
//! - Own the transaction boundary over the catalog repositories.
//! - Coordinate byte-store side effects with catalog commits.
//! - Keep callers (CLI, import jobs) decoupled from SQL.

pub mod graph_store;
pub mod integrity;
