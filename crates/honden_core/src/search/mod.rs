//! Search over enumerated inodes.
//!
//! # Responsibility
//! - Define the ranking seam used by `GraphStore::search`.
//! - Keep ranking policy outside the catalog transaction code.

pub mod ranker;
