//! Catalog repositories.
//!
//! # Responsibility
//! - Keep SQL for the inode index, entity catalog and link graph in one layer.
//! - Expose each concern as a trait with a connection-borrowing SQLite impl.
//!
//! # Invariants
//! - Repositories never open or commit transactions; the graph store owns the
//!   transaction boundary and hands repositories the transaction connection.
//! - Repositories return semantic errors (`NotFound`, `Corruption`, ...) in
//!   addition to SQLite transport errors.

use crate::error::{StoreError, StoreResult};
use crate::model::inode::InodeId;
use uuid::Uuid;

pub mod entity_repo;
pub mod inode_repo;
pub mod link_repo;

pub(crate) fn parse_uuid(value: &str, table: &str) -> StoreResult<InodeId> {
    Uuid::parse_str(value)
        .map_err(|_| StoreError::InvalidData(format!("invalid uuid `{value}` in {table}")))
}
