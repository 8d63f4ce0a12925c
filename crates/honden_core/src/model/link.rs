//! Undirected links between inodes.
//!
//! # Invariants
//! - A stored `Link` always satisfies `endpoint_a < endpoint_b`.
//! - Self-links cannot be represented.

use crate::model::inode::{InodeId, ResolvedInode};
use serde::{Deserialize, Serialize};

/// Canonically ordered, undirected association between two inodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Link {
    pub endpoint_a: InodeId,
    pub endpoint_b: InodeId,
}

impl Link {
    /// Builds the canonical form of the unordered pair `{a, b}`.
    ///
    /// Returns `None` when `a == b`.
    pub fn canonical(a: InodeId, b: InodeId) -> Option<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Self {
                endpoint_a: a,
                endpoint_b: b,
            }),
            std::cmp::Ordering::Greater => Some(Self {
                endpoint_a: b,
                endpoint_b: a,
            }),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn touches(&self, uuid: InodeId) -> bool {
        self.endpoint_a == uuid || self.endpoint_b == uuid
    }

    /// Returns the endpoint opposite to `uuid`, if `uuid` is an endpoint.
    pub fn other(&self, uuid: InodeId) -> Option<InodeId> {
        if self.endpoint_a == uuid {
            Some(self.endpoint_b)
        } else if self.endpoint_b == uuid {
            Some(self.endpoint_a)
        } else {
            None
        }
    }
}

/// One neighbor identifier as seen from `linked_from`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkEnd {
    pub uuid: InodeId,
    pub linked_from: InodeId,
}

/// Resolved neighbor used for "linked from X" rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Neighbor {
    pub inode: ResolvedInode,
    pub linked_from: InodeId,
}

/// Read-only composite of one inode and everything linked to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InodeWithLinks {
    pub inode: ResolvedInode,
    pub neighbors: Vec<Neighbor>,
}

#[cfg(test)]
mod tests {
    use super::Link;
    use uuid::Uuid;

    #[test]
    fn canonical_orders_endpoints() {
        let low = Uuid::parse_str("00000000-0000-4000-8000-000000000001").unwrap();
        let high = Uuid::parse_str("ffffffff-0000-4000-8000-000000000001").unwrap();

        let forward = Link::canonical(low, high).unwrap();
        let backward = Link::canonical(high, low).unwrap();
        assert_eq!(forward, backward);
        assert_eq!(forward.endpoint_a, low);
        assert_eq!(forward.other(low), Some(high));
    }

    #[test]
    fn canonical_rejects_self_pair() {
        let id = Uuid::new_v4();
        assert!(Link::canonical(id, id).is_none());
    }

    #[test]
    fn uuid_order_matches_text_order() {
        let a = Uuid::parse_str("0a000000-0000-4000-8000-000000000000").unwrap();
        let b = Uuid::parse_str("a0000000-0000-4000-8000-000000000000").unwrap();
        assert!(a < b);
        assert!(a.to_string() < b.to_string());
    }
}
