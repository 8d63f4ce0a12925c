//! Error taxonomy shared by the catalog repositories and the graph store.
//!
//! # Invariants
//! - Uniqueness and degenerate-input errors leave no partial state behind.
//! - `Corruption` is never auto-repaired; it is surfaced for an operator.

use crate::blob::ByteStoreError;
use crate::db::DbError;
use crate::model::inode::{EntityValidationError, InodeId, InodeKind};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    /// No inode exists for this identifier.
    NotFound(InodeId),
    /// Identifier is already registered under a different kind.
    Conflict {
        uuid: InodeId,
        existing: InodeKind,
        requested: InodeKind,
    },
    /// The canonical pair is already linked.
    DuplicateLink(InodeId, InodeId),
    /// Filename is taken under the active uniqueness mode.
    NameConflict(String),
    /// Both link endpoints are the same inode.
    SelfLink(InodeId),
    /// Inode and typed record disagree.
    Corruption(String),
    /// Operation is not defined for this kind.
    UnsupportedKind {
        uuid: InodeId,
        kind: InodeKind,
        operation: &'static str,
    },
    Validation(EntityValidationError),
    Db(DbError),
    Bytes(ByteStoreError),
    /// Persisted value cannot be decoded.
    InvalidData(String),
}

impl StoreError {
    /// Stable machine-readable code, used in log events and CLI output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Conflict { .. } => "conflict",
            Self::DuplicateLink(..) => "duplicate_link",
            Self::NameConflict(_) => "name_conflict",
            Self::SelfLink(_) => "self_link",
            Self::Corruption(_) => "corruption",
            Self::UnsupportedKind { .. } => "unsupported_kind",
            Self::Validation(_) => "invalid_input",
            Self::Db(_) => "db_error",
            Self::Bytes(_) => "byte_store_error",
            Self::InvalidData(_) => "invalid_data",
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(uuid) => write!(f, "inode not found: {uuid}"),
            Self::Conflict {
                uuid,
                existing,
                requested,
            } => write!(
                f,
                "inode {uuid} is registered as {existing}, cannot register as {requested}"
            ),
            Self::DuplicateLink(a, b) => write!(f, "link already exists: {a} <-> {b}"),
            Self::NameConflict(filename) => write!(f, "filename already in use: `{filename}`"),
            Self::SelfLink(uuid) => write!(f, "cannot link inode {uuid} to itself"),
            Self::Corruption(details) => write!(f, "catalog corruption: {details}"),
            Self::UnsupportedKind {
                uuid,
                kind,
                operation,
            } => write!(f, "{operation} is not supported for {kind} inode {uuid}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Bytes(err) => write!(f, "{err}"),
            Self::InvalidData(details) => write!(f, "invalid persisted data: {details}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Bytes(err) => Some(err),
            _ => None,
        }
    }
}

impl From<EntityValidationError> for StoreError {
    fn from(value: EntityValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<ByteStoreError> for StoreError {
    fn from(value: ByteStoreError) -> Self {
        Self::Bytes(value)
    }
}
