//! Read-only catalog consistency scan.
//!
//! Reports every violation of the inode/typed-record/link invariants it can
//! see. It never repairs: corruption is for an operator to resolve.

use crate::error::StoreResult;
use crate::model::inode::{Inode, InodeId, InodeKind};
use crate::model::link::Link;
use crate::repo::entity_repo::{EntityCatalog, SqliteEntityCatalog};
use crate::repo::inode_repo::{InodeIndex, SqliteInodeIndex};
use crate::repo::link_repo::{LinkGraph, SqliteLinkGraph};
use rusqlite::Connection;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// A typed row found under one kind while its inode says another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KindMismatch {
    pub uuid: InodeId,
    pub registered: InodeKind,
    pub record: InodeKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntegrityReport {
    /// Inodes with no typed record of their kind.
    pub missing_records: Vec<Inode>,
    /// Typed records with no inode at all.
    pub orphan_records: Vec<Inode>,
    pub kind_mismatches: Vec<KindMismatch>,
    /// Links with at least one endpoint missing from the inode index.
    pub dangling_links: Vec<Link>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.issue_count() == 0
    }

    pub fn issue_count(&self) -> usize {
        self.missing_records.len()
            + self.orphan_records.len()
            + self.kind_mismatches.len()
            + self.dangling_links.len()
    }
}

/// Scans the catalog on `conn`.
pub fn scan_integrity(conn: &Connection) -> StoreResult<IntegrityReport> {
    let registered: BTreeMap<InodeId, InodeKind> = SqliteInodeIndex::new(conn)
        .list_inodes()?
        .into_iter()
        .map(|inode| (inode.uuid, inode.kind))
        .collect();

    let catalog = SqliteEntityCatalog::new(conn);
    let mut records: BTreeMap<InodeKind, BTreeSet<InodeId>> = BTreeMap::new();
    for kind in InodeKind::ALL {
        records.insert(kind, catalog.list_ids(kind)?.into_iter().collect());
    }

    let mut report = IntegrityReport::default();

    for (&uuid, &kind) in &registered {
        let has_record = records.get(&kind).is_some_and(|ids| ids.contains(&uuid));
        if !has_record {
            report.missing_records.push(Inode { uuid, kind });
        }
    }

    for (&record_kind, ids) in &records {
        for &uuid in ids {
            match registered.get(&uuid) {
                None => report.orphan_records.push(Inode {
                    uuid,
                    kind: record_kind,
                }),
                Some(&registered_kind) if registered_kind != record_kind => {
                    report.kind_mismatches.push(KindMismatch {
                        uuid,
                        registered: registered_kind,
                        record: record_kind,
                    });
                }
                Some(_) => {}
            }
        }
    }

    report.dangling_links = SqliteLinkGraph::new(conn)
        .list_links()?
        .into_iter()
        .filter(|link| {
            !registered.contains_key(&link.endpoint_a) || !registered.contains_key(&link.endpoint_b)
        })
        .collect();

    Ok(report)
}
