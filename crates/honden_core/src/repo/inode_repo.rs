//! Inode index: identity registration and polymorphic lookup.
//!
//! # Responsibility
//! - Register identifiers under exactly one kind.
//! - Resolve an identifier to its kind and typed record.
//!
//! # Invariants
//! - Re-registering with the same kind is a no-op; another kind conflicts.
//! - An inode whose typed record is missing resolves to `Corruption`.

use crate::error::{StoreError, StoreResult};
use crate::model::inode::{Inode, InodeId, InodeKind, ResolvedInode};
use crate::repo::entity_repo::{EntityCatalog, SqliteEntityCatalog};
use crate::repo::parse_uuid;
use rusqlite::{params, Connection, OptionalExtension};

/// Repository interface for the inode identity layer.
pub trait InodeIndex {
    /// Registers `uuid` as `kind`. Returns `true` when a row was inserted.
    fn register(&self, uuid: InodeId, kind: InodeKind) -> StoreResult<bool>;
    /// Returns the registered kind, if any.
    fn kind_of(&self, uuid: InodeId) -> StoreResult<Option<InodeKind>>;
    /// Resolves `uuid` to its kind and typed record.
    fn resolve(&self, uuid: InodeId) -> StoreResult<ResolvedInode>;
    /// Resolves every registered inode. Order is unspecified.
    fn list_all(&self) -> StoreResult<Vec<ResolvedInode>>;
    /// Lists identity rows without touching typed records.
    fn list_inodes(&self) -> StoreResult<Vec<Inode>>;
    /// Removes the identity row. Returns whether a row was removed.
    fn remove(&self, uuid: InodeId) -> StoreResult<bool>;
}

/// SQLite-backed inode index.
pub struct SqliteInodeIndex<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteInodeIndex<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn load_typed(&self, inode: Inode) -> StoreResult<ResolvedInode> {
        let catalog = SqliteEntityCatalog::new(self.conn);
        match catalog.load(inode.kind, inode.uuid)? {
            Some(entity) => Ok(ResolvedInode::new(entity)),
            None => Err(StoreError::Corruption(format!(
                "inode {} is registered as {} but has no {} record",
                inode.uuid, inode.kind, inode.kind
            ))),
        }
    }
}

impl InodeIndex for SqliteInodeIndex<'_> {
    fn register(&self, uuid: InodeId, kind: InodeKind) -> StoreResult<bool> {
        if let Some(existing) = self.kind_of(uuid)? {
            if existing == kind {
                return Ok(false);
            }
            return Err(StoreError::Conflict {
                uuid,
                existing,
                requested: kind,
            });
        }

        self.conn.execute(
            "INSERT INTO inodes (uuid, kind) VALUES (?1, ?2);",
            params![uuid.to_string(), kind.as_str()],
        )?;
        Ok(true)
    }

    fn kind_of(&self, uuid: InodeId) -> StoreResult<Option<InodeKind>> {
        let kind_text: Option<String> = self
            .conn
            .query_row(
                "SELECT kind FROM inodes WHERE uuid = ?1;",
                [uuid.to_string()],
                |row| row.get(0),
            )
            .optional()?;

        kind_text
            .map(|text| {
                InodeKind::parse(&text).ok_or_else(|| {
                    StoreError::InvalidData(format!("unknown kind `{text}` in inodes.kind"))
                })
            })
            .transpose()
    }

    fn resolve(&self, uuid: InodeId) -> StoreResult<ResolvedInode> {
        let kind = self.kind_of(uuid)?.ok_or(StoreError::NotFound(uuid))?;
        self.load_typed(Inode { uuid, kind })
    }

    fn list_all(&self) -> StoreResult<Vec<ResolvedInode>> {
        self.list_inodes()?
            .into_iter()
            .map(|inode| self.load_typed(inode))
            .collect()
    }

    fn list_inodes(&self) -> StoreResult<Vec<Inode>> {
        let mut stmt = self
            .conn
            .prepare("SELECT uuid, kind FROM inodes ORDER BY created_at ASC, uuid ASC;")?;
        let mut rows = stmt.query([])?;
        let mut inodes = Vec::new();
        while let Some(row) = rows.next()? {
            let uuid_text: String = row.get("uuid")?;
            let kind_text: String = row.get("kind")?;
            let kind = InodeKind::parse(&kind_text).ok_or_else(|| {
                StoreError::InvalidData(format!("unknown kind `{kind_text}` in inodes.kind"))
            })?;
            inodes.push(Inode {
                uuid: parse_uuid(&uuid_text, "inodes")?,
                kind,
            });
        }
        Ok(inodes)
    }

    fn remove(&self, uuid: InodeId) -> StoreResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM inodes WHERE uuid = ?1;", [uuid.to_string()])?;
        Ok(changed > 0)
    }
}
