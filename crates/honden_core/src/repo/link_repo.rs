//! Link graph: undirected edge set over inode identifiers.
//!
//! # Responsibility
//! - Store links in canonical order so `(a, b)` and `(b, a)` share one row.
//! - Answer neighbor queries from either canonical slot.
//!
//! # Invariants
//! - Stored rows satisfy `endpoint_a < endpoint_b` (also a table CHECK).
//! - Duplicate detection is a single primary-key lookup.
//! - Endpoint existence is checked by the caller; the FK only backs it up.

use crate::error::{StoreError, StoreResult};
use crate::model::inode::InodeId;
use crate::model::link::{Link, LinkEnd};
use crate::repo::parse_uuid;
use rusqlite::{params, Connection};

/// Repository interface for undirected links.
pub trait LinkGraph {
    /// Inserts the canonical pair of `{a, b}`.
    fn connect(&self, a: InodeId, b: InodeId) -> StoreResult<Link>;
    /// Deletes the canonical pair of `{a, b}`. Returns whether a row was removed.
    fn disconnect(&self, a: InodeId, b: InodeId) -> StoreResult<bool>;
    fn is_linked(&self, a: InodeId, b: InodeId) -> StoreResult<bool>;
    /// Every identifier linked to `uuid`, tagged with `uuid` as origin.
    fn neighbors(&self, uuid: InodeId) -> StoreResult<Vec<LinkEnd>>;
    /// Deletes every pair touching `uuid`. Returns the number removed.
    fn remove_all_touching(&self, uuid: InodeId) -> StoreResult<usize>;
    fn link_count(&self) -> StoreResult<u64>;
    fn list_links(&self) -> StoreResult<Vec<Link>>;
}

/// SQLite-backed link graph.
pub struct SqliteLinkGraph<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteLinkGraph<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn exists(&self, link: &Link) -> StoreResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM links WHERE endpoint_a = ?1 AND endpoint_b = ?2
            );",
            params![link.endpoint_a.to_string(), link.endpoint_b.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

impl LinkGraph for SqliteLinkGraph<'_> {
    fn connect(&self, a: InodeId, b: InodeId) -> StoreResult<Link> {
        let link = Link::canonical(a, b).ok_or(StoreError::SelfLink(a))?;
        if self.exists(&link)? {
            return Err(StoreError::DuplicateLink(link.endpoint_a, link.endpoint_b));
        }

        self.conn.execute(
            "INSERT INTO links (endpoint_a, endpoint_b) VALUES (?1, ?2);",
            params![link.endpoint_a.to_string(), link.endpoint_b.to_string()],
        )?;
        Ok(link)
    }

    fn disconnect(&self, a: InodeId, b: InodeId) -> StoreResult<bool> {
        let Some(link) = Link::canonical(a, b) else {
            return Ok(false);
        };
        let changed = self.conn.execute(
            "DELETE FROM links WHERE endpoint_a = ?1 AND endpoint_b = ?2;",
            params![link.endpoint_a.to_string(), link.endpoint_b.to_string()],
        )?;
        Ok(changed > 0)
    }

    fn is_linked(&self, a: InodeId, b: InodeId) -> StoreResult<bool> {
        match Link::canonical(a, b) {
            Some(link) => self.exists(&link),
            None => Ok(false),
        }
    }

    fn neighbors(&self, uuid: InodeId) -> StoreResult<Vec<LinkEnd>> {
        let mut stmt = self.conn.prepare(
            "SELECT endpoint_b AS other FROM links WHERE endpoint_a = ?1
             UNION
             SELECT endpoint_a AS other FROM links WHERE endpoint_b = ?1
             ORDER BY other ASC;",
        )?;
        let mut rows = stmt.query([uuid.to_string()])?;
        let mut ends = Vec::new();
        while let Some(row) = rows.next()? {
            let other: String = row.get(0)?;
            ends.push(LinkEnd {
                uuid: parse_uuid(&other, "links")?,
                linked_from: uuid,
            });
        }
        Ok(ends)
    }

    fn remove_all_touching(&self, uuid: InodeId) -> StoreResult<usize> {
        let removed = self.conn.execute(
            "DELETE FROM links WHERE endpoint_a = ?1 OR endpoint_b = ?1;",
            [uuid.to_string()],
        )?;
        Ok(removed)
    }

    fn link_count(&self) -> StoreResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM links;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| StoreError::InvalidData(format!("negative link count {count}")))
    }

    fn list_links(&self) -> StoreResult<Vec<Link>> {
        let mut stmt = self
            .conn
            .prepare("SELECT endpoint_a, endpoint_b FROM links ORDER BY endpoint_a, endpoint_b;")?;
        let mut rows = stmt.query([])?;
        let mut links = Vec::new();
        while let Some(row) = rows.next()? {
            let a: String = row.get(0)?;
            let b: String = row.get(1)?;
            links.push(Link {
                endpoint_a: parse_uuid(&a, "links")?,
                endpoint_b: parse_uuid(&b, "links")?,
            });
        }
        Ok(links)
    }
}
