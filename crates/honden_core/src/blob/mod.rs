//! Backing byte store for media content.
//!
//! # Responsibility
//! - Define the contract the graph store uses for bytes kept outside SQLite.
//! - Provide filesystem and in-memory implementations.
//!
//! # Invariants
//! - Byte locations are derived from the inode id alone; filenames are never
//!   used as path components.
//! - Byte operations are not transactional; callers order them around the
//!   catalog transaction.

use crate::model::inode::InodeId;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod fs;
mod memory;

pub use fs::FsByteStore;
pub use memory::MemoryByteStore;

pub type ByteStoreResult<T> = Result<T, ByteStoreError>;

/// Failure reported by a byte store implementation.
#[derive(Debug)]
pub enum ByteStoreError {
    /// No bytes are stored for this inode.
    NotFound(InodeId),
    Io {
        uuid: InodeId,
        source: std::io::Error,
    },
}

impl Display for ByteStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(uuid) => write!(f, "no stored bytes for inode {uuid}"),
            Self::Io { uuid, source } => write!(f, "byte store i/o failed for {uuid}: {source}"),
        }
    }
}

impl Error for ByteStoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::Io { source, .. } => Some(source),
        }
    }
}

/// Storage contract for media bytes, keyed by inode id.
pub trait ByteStore {
    /// Stores `content` for `uuid`, replacing anything already there.
    fn write_bytes(&mut self, uuid: InodeId, content: &[u8]) -> ByteStoreResult<()>;
    /// Reads the bytes stored for `uuid`.
    fn read_bytes(&self, uuid: InodeId) -> ByteStoreResult<Vec<u8>>;
    /// Removes the bytes stored for `uuid`.
    ///
    /// Returns `ByteStoreError::NotFound` when nothing is stored.
    fn delete_bytes(&mut self, uuid: InodeId) -> ByteStoreResult<()>;
}
