//! Domain model for the inode/link graph.
//!
//! # Responsibility
//! - Define inode identity, kind tags and the typed records behind them.
//! - Define canonical link pairs and the neighbor read models.
//!
//! # Invariants
//! - Every entity is reachable through exactly one `InodeId`.
//! - Links are undirected and stored in canonical order.

pub mod inode;
pub mod link;
