//! Core of the honden knowledge base: an inode/link graph store.
//!
//! Every artifact (note, media file) is an inode in one identity space;
//! links are undirected associations between inodes. `GraphStore` is the
//! entry point and owns the transaction boundary.

pub mod blob;
pub mod config;
pub mod db;
pub mod error;
pub mod import;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use blob::{ByteStore, ByteStoreError, ByteStoreResult, FsByteStore, MemoryByteStore};
pub use config::{NameUniqueness, StoreConfig, StoreLayout};
pub use error::{StoreError, StoreResult};
pub use import::{classify, import_directory, FileClass, ImportError, ImportReport};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::inode::{
    Entity, EntityValidationError, Inode, InodeId, InodeKind, Media, Note, ResolvedInode,
};
pub use model::link::{InodeWithLinks, Link, LinkEnd, Neighbor};
pub use repo::entity_repo::{EntityCatalog, SqliteEntityCatalog};
pub use repo::inode_repo::{InodeIndex, SqliteInodeIndex};
pub use repo::link_repo::{LinkGraph, SqliteLinkGraph};
pub use search::ranker::{FilenameRanker, SearchRanker};
pub use service::graph_store::{DeleteSummary, GraphStore};
pub use service::integrity::{IntegrityReport, KindMismatch};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
