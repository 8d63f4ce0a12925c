//! Graph store facade and transaction boundary.
//!
//! # Responsibility
//! - Compose the inode index, entity catalog and link graph into atomic
//!   create/rename/delete/connect/disconnect/enumerate operations.
//! - Order byte-store side effects around the catalog transaction.
//!
//! # Invariants
//! - Every mutation runs in one `IMMEDIATE` transaction; an error drops the
//!   transaction, which rolls the catalog back.
//! - Links, renames and content edits require every referenced inode to exist.
//! - Delete removes links, bytes, typed record and inode, in that order.
//! - Bytes deleted before a failed commit cannot be restored; that gap is
//!   accepted and surfaced as the commit error.

use crate::blob::{ByteStore, ByteStoreError, FsByteStore, MemoryByteStore};
use crate::config::{StoreConfig, StoreLayout};
use crate::db::{open_db, open_db_in_memory};
use crate::error::{StoreError, StoreResult};
use crate::model::inode::{
    validate_filename, Entity, InodeId, InodeKind, Media, Note, ResolvedInode,
};
use crate::model::link::{InodeWithLinks, Link, LinkEnd, Neighbor};
use crate::repo::entity_repo::{EntityCatalog, SqliteEntityCatalog};
use crate::repo::inode_repo::{InodeIndex, SqliteInodeIndex};
use crate::repo::link_repo::{LinkGraph, SqliteLinkGraph};
use crate::search::ranker::SearchRanker;
use crate::service::integrity::{scan_integrity, IntegrityReport};
use log::{debug, error, info, warn};
use rusqlite::{Connection, TransactionBehavior};
use std::time::Instant;

/// Outcome of a successful `GraphStore::delete_inode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteSummary {
    pub kind: InodeKind,
    pub links_removed: usize,
    /// `false` for kinds without bytes, or when the bytes were already gone.
    pub bytes_removed: bool,
}

/// Explicitly constructed store handle.
///
/// Owns the catalog connection and the byte store for its whole lifetime;
/// mutating calls take `&mut self`, so one handle is one writer.
pub struct GraphStore {
    conn: Connection,
    bytes: Box<dyn ByteStore>,
    config: StoreConfig,
}

impl GraphStore {
    /// Wraps an already migrated connection and a byte store.
    pub fn new(conn: Connection, bytes: Box<dyn ByteStore>, config: StoreConfig) -> Self {
        Self {
            conn,
            bytes,
            config,
        }
    }

    /// Opens the catalog and filesystem byte store under `layout`.
    pub fn open(layout: &StoreLayout, config: StoreConfig) -> StoreResult<Self> {
        std::fs::create_dir_all(layout.root()).map_err(|err| {
            StoreError::InvalidData(format!(
                "cannot create store root `{}`: {err}",
                layout.root().display()
            ))
        })?;
        let conn = open_db(layout.db_path())?;
        info!(
            "event=store_open module=store status=ok name_uniqueness={}",
            config.name_uniqueness
        );
        Ok(Self::new(
            conn,
            Box::new(FsByteStore::new(layout.media_dir())),
            config,
        ))
    }

    /// Opens a throwaway in-memory catalog with an in-memory byte store.
    pub fn open_in_memory(config: StoreConfig) -> StoreResult<Self> {
        let conn = open_db_in_memory()?;
        Ok(Self::new(conn, Box::new(MemoryByteStore::new()), config))
    }

    /// Closes the catalog connection.
    pub fn close(self) -> StoreResult<()> {
        self.conn.close().map_err(|(_, err)| StoreError::from(err))?;
        info!("event=store_close module=store status=ok");
        Ok(())
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Read access to the catalog connection, for diagnostics and tests.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn byte_store(&self) -> &dyn ByteStore {
        self.bytes.as_ref()
    }

    /// Creates a note and registers its inode in one transaction.
    pub fn create_note(&mut self, filename: &str, contents: &str) -> StoreResult<InodeId> {
        let started_at = Instant::now();
        let result = self.create_note_inner(filename, contents);
        log_mutation("inode_create", started_at, &result, |uuid| {
            format!("kind=note uuid={uuid}")
        });
        result
    }

    /// Creates a media record and registers its inode in one transaction.
    ///
    /// No bytes are written; see `create_media_with_bytes`.
    pub fn create_media(&mut self, filename: &str, filetype: &str) -> StoreResult<InodeId> {
        let started_at = Instant::now();
        let result = self.create_media_inner(filename, filetype, None);
        log_mutation("inode_create", started_at, &result, |uuid| {
            format!("kind=media uuid={uuid}")
        });
        result
    }

    /// Creates a media record and stores its bytes.
    ///
    /// A failed byte write rolls the catalog back. A failed commit removes
    /// the bytes that were just written.
    pub fn create_media_with_bytes(
        &mut self,
        filename: &str,
        filetype: &str,
        content: &[u8],
    ) -> StoreResult<InodeId> {
        let started_at = Instant::now();
        let result = self.create_media_inner(filename, filetype, Some(content));
        log_mutation("inode_create", started_at, &result, |uuid| {
            format!("kind=media uuid={uuid} bytes={}", content.len())
        });
        result
    }

    /// Resolves one inode to its kind and typed record.
    pub fn resolve(&self, uuid: InodeId) -> StoreResult<ResolvedInode> {
        SqliteInodeIndex::new(&self.conn).resolve(uuid)
    }

    /// Renames the filename of an inode. Backing bytes are not touched.
    pub fn rename(&mut self, uuid: InodeId, new_filename: &str) -> StoreResult<()> {
        let started_at = Instant::now();
        let result = self.rename_inner(uuid, new_filename);
        log_mutation("inode_rename", started_at, &result, |_| format!("uuid={uuid}"));
        result
    }

    /// Returns note contents; absent contents read as an empty string.
    pub fn get_contents(&self, uuid: InodeId) -> StoreResult<String> {
        match self.resolve(uuid)?.entity {
            Entity::Note(note) => Ok(note.contents.unwrap_or_default()),
            other => Err(StoreError::UnsupportedKind {
                uuid,
                kind: other.kind(),
                operation: "get_contents",
            }),
        }
    }

    /// Replaces note contents.
    pub fn set_contents(&mut self, uuid: InodeId, contents: &str) -> StoreResult<()> {
        let started_at = Instant::now();
        let result = self.set_contents_inner(uuid, contents);
        log_mutation("note_set_contents", started_at, &result, |_| {
            format!("uuid={uuid} bytes={}", contents.len())
        });
        result
    }

    /// Reads the backing bytes of a media inode.
    pub fn media_bytes(&self, uuid: InodeId) -> StoreResult<Vec<u8>> {
        let kind = require_kind(&self.conn, uuid)?;
        if !kind.has_backing_bytes() {
            return Err(StoreError::UnsupportedKind {
                uuid,
                kind,
                operation: "media_bytes",
            });
        }
        Ok(self.bytes.read_bytes(uuid)?)
    }

    /// Links two existing inodes.
    pub fn connect(&mut self, a: InodeId, b: InodeId) -> StoreResult<Link> {
        let started_at = Instant::now();
        let result = self.connect_inner(a, b);
        log_mutation("link_connect", started_at, &result, |link| {
            format!("endpoint_a={} endpoint_b={}", link.endpoint_a, link.endpoint_b)
        });
        result
    }

    /// Unlinks two existing inodes. Returns whether a link was removed;
    /// an absent link is not an error.
    pub fn disconnect(&mut self, a: InodeId, b: InodeId) -> StoreResult<bool> {
        let started_at = Instant::now();
        let result = self.disconnect_inner(a, b);
        log_mutation("link_disconnect", started_at, &result, |removed| {
            format!("a={a} b={b} removed={removed}")
        });
        result
    }

    /// Identifiers linked to an existing inode.
    pub fn neighbors(&self, uuid: InodeId) -> StoreResult<Vec<LinkEnd>> {
        require_kind(&self.conn, uuid)?;
        SqliteLinkGraph::new(&self.conn).neighbors(uuid)
    }

    /// Resolves one inode together with its resolved neighbors.
    ///
    /// A link to a missing inode is reported as `Corruption`.
    pub fn get_inode_with_links(&self, uuid: InodeId) -> StoreResult<InodeWithLinks> {
        let index = SqliteInodeIndex::new(&self.conn);
        let inode = index.resolve(uuid)?;
        let neighbors = SqliteLinkGraph::new(&self.conn)
            .neighbors(uuid)?
            .into_iter()
            .map(|end| match index.resolve(end.uuid) {
                Ok(resolved) => Ok(Neighbor {
                    inode: resolved,
                    linked_from: end.linked_from,
                }),
                Err(StoreError::NotFound(missing)) => Err(StoreError::Corruption(format!(
                    "link {uuid} <-> {missing} points to a missing inode"
                ))),
                Err(err) => Err(err),
            })
            .collect::<StoreResult<Vec<_>>>()?;

        Ok(InodeWithLinks { inode, neighbors })
    }

    /// Resolves every inode in the catalog.
    pub fn enumerate_all(&self) -> StoreResult<Vec<ResolvedInode>> {
        let started_at = Instant::now();
        let inodes = SqliteInodeIndex::new(&self.conn).list_all()?;
        debug!(
            "event=inode_enumerate module=store status=ok count={} duration_ms={}",
            inodes.len(),
            started_at.elapsed().as_millis()
        );
        Ok(inodes)
    }

    /// Every inode whose filename is exactly `filename`.
    pub fn find_by_filename(&self, filename: &str) -> StoreResult<Vec<ResolvedInode>> {
        Ok(SqliteEntityCatalog::new(&self.conn)
            .find_by_filename(filename)?
            .into_iter()
            .map(ResolvedInode::new)
            .collect())
    }

    /// Hands every inode to `ranker` and returns its ranking.
    pub fn search(
        &self,
        query: &str,
        ranker: &dyn SearchRanker,
    ) -> StoreResult<Vec<ResolvedInode>> {
        let candidates = self.enumerate_all()?;
        Ok(ranker.rank(query, candidates))
    }

    pub fn link_count(&self) -> StoreResult<u64> {
        SqliteLinkGraph::new(&self.conn).link_count()
    }

    /// Deletes an inode with its links, typed record and backing bytes.
    ///
    /// Missing media bytes are tolerated (logged at `warn`); any other byte
    /// store failure rolls the catalog back.
    pub fn delete_inode(&mut self, uuid: InodeId) -> StoreResult<DeleteSummary> {
        let started_at = Instant::now();
        let result = self.delete_inode_inner(uuid);
        log_mutation("inode_delete", started_at, &result, |summary| {
            format!(
                "uuid={uuid} kind={} links_removed={} bytes_removed={}",
                summary.kind, summary.links_removed, summary.bytes_removed
            )
        });
        result
    }

    /// Read-only consistency scan. Never repairs anything.
    pub fn verify_integrity(&self) -> StoreResult<IntegrityReport> {
        let report = scan_integrity(&self.conn)?;
        if report.is_clean() {
            info!("event=integrity_scan module=store status=ok issues=0");
        } else {
            warn!(
                "event=integrity_scan module=store status=issues issues={}",
                report.issue_count()
            );
        }
        Ok(report)
    }

    fn create_note_inner(&mut self, filename: &str, contents: &str) -> StoreResult<InodeId> {
        let note = Note::new(filename, contents)?;
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let catalog = SqliteEntityCatalog::new(&tx);
        ensure_name_free(&self.config, &catalog, InodeKind::Note, &note.filename, None)?;
        catalog.insert_note(&note)?;
        SqliteInodeIndex::new(&tx).register(note.uuid, InodeKind::Note)?;
        tx.commit()?;
        Ok(note.uuid)
    }

    fn create_media_inner(
        &mut self,
        filename: &str,
        filetype: &str,
        content: Option<&[u8]>,
    ) -> StoreResult<InodeId> {
        let media = Media::new(filename, filetype)?;
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let catalog = SqliteEntityCatalog::new(&tx);
        ensure_name_free(&self.config, &catalog, InodeKind::Media, &media.filename, None)?;
        catalog.insert_media(&media)?;
        SqliteInodeIndex::new(&tx).register(media.uuid, InodeKind::Media)?;

        if let Some(content) = content {
            self.bytes.write_bytes(media.uuid, content)?;
            if let Err(err) = tx.commit() {
                if let Err(cleanup) = self.bytes.delete_bytes(media.uuid) {
                    warn!(
                        "event=inode_create module=store status=error uuid={} error_code=byte_cleanup_failed error={cleanup}",
                        media.uuid
                    );
                }
                return Err(err.into());
            }
            return Ok(media.uuid);
        }

        tx.commit()?;
        Ok(media.uuid)
    }

    fn rename_inner(&mut self, uuid: InodeId, new_filename: &str) -> StoreResult<()> {
        validate_filename(new_filename)?;
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let kind = require_kind(&tx, uuid)?;
        if !kind.has_filename() {
            return Err(StoreError::UnsupportedKind {
                uuid,
                kind,
                operation: "rename",
            });
        }

        let catalog = SqliteEntityCatalog::new(&tx);
        ensure_name_free(&self.config, &catalog, kind, new_filename, Some(uuid))?;
        if !catalog.set_filename(kind, uuid, new_filename)? {
            return Err(missing_record(uuid, kind));
        }
        tx.commit()?;
        Ok(())
    }

    fn set_contents_inner(&mut self, uuid: InodeId, contents: &str) -> StoreResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let kind = require_kind(&tx, uuid)?;
        if !kind.has_contents() {
            return Err(StoreError::UnsupportedKind {
                uuid,
                kind,
                operation: "set_contents",
            });
        }
        if !SqliteEntityCatalog::new(&tx).set_note_contents(uuid, contents)? {
            return Err(missing_record(uuid, kind));
        }
        tx.commit()?;
        Ok(())
    }

    fn connect_inner(&mut self, a: InodeId, b: InodeId) -> StoreResult<Link> {
        if a == b {
            return Err(StoreError::SelfLink(a));
        }
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        require_kind(&tx, a)?;
        require_kind(&tx, b)?;
        let link = SqliteLinkGraph::new(&tx).connect(a, b)?;
        tx.commit()?;
        Ok(link)
    }

    fn disconnect_inner(&mut self, a: InodeId, b: InodeId) -> StoreResult<bool> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        require_kind(&tx, a)?;
        require_kind(&tx, b)?;
        let removed = SqliteLinkGraph::new(&tx).disconnect(a, b)?;
        tx.commit()?;
        Ok(removed)
    }

    fn delete_inode_inner(&mut self, uuid: InodeId) -> StoreResult<DeleteSummary> {
        let kind = SqliteInodeIndex::new(&self.conn).resolve(uuid)?.kind;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let links_removed = SqliteLinkGraph::new(&tx).remove_all_touching(uuid)?;

        let mut bytes_removed = false;
        if kind.has_backing_bytes() {
            match self.bytes.delete_bytes(uuid) {
                Ok(()) => bytes_removed = true,
                Err(ByteStoreError::NotFound(_)) => {
                    warn!(
                        "event=inode_delete module=store status=degraded uuid={uuid} error_code=bytes_already_missing"
                    );
                }
                Err(err) => return Err(err.into()),
            }
        }

        if !SqliteEntityCatalog::new(&tx).delete(kind, uuid)? {
            return Err(missing_record(uuid, kind));
        }
        if !SqliteInodeIndex::new(&tx).remove(uuid)? {
            return Err(StoreError::NotFound(uuid));
        }
        tx.commit()?;

        Ok(DeleteSummary {
            kind,
            links_removed,
            bytes_removed,
        })
    }
}

/// Registered kind of `uuid`, or `NotFound`.
fn require_kind(conn: &Connection, uuid: InodeId) -> StoreResult<InodeKind> {
    SqliteInodeIndex::new(conn)
        .kind_of(uuid)?
        .ok_or(StoreError::NotFound(uuid))
}

fn ensure_name_free(
    config: &StoreConfig,
    catalog: &impl EntityCatalog,
    kind: InodeKind,
    filename: &str,
    except: Option<InodeId>,
) -> StoreResult<()> {
    let kinds = config.name_uniqueness.conflicting_kinds(kind);
    if kinds.is_empty() {
        return Ok(());
    }
    if catalog.filename_taken(filename, &kinds, except)? {
        return Err(StoreError::NameConflict(filename.to_string()));
    }
    Ok(())
}

fn missing_record(uuid: InodeId, kind: InodeKind) -> StoreError {
    StoreError::Corruption(format!(
        "inode {uuid} is registered as {kind} but has no {kind} record"
    ))
}

fn log_mutation<T>(
    event: &str,
    started_at: Instant,
    result: &StoreResult<T>,
    describe: impl FnOnce(&T) -> String,
) {
    let duration_ms = started_at.elapsed().as_millis();
    match result {
        Ok(value) => info!(
            "event={event} module=store status=ok {} duration_ms={duration_ms}",
            describe(value)
        ),
        Err(err @ StoreError::Corruption(_)) => error!(
            "event={event} module=store status=error error_code={} duration_ms={duration_ms} error={err}",
            err.code()
        ),
        Err(err) => warn!(
            "event={event} module=store status=error error_code={} duration_ms={duration_ms}",
            err.code()
        ),
    }
}
