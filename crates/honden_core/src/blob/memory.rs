//! In-memory byte store for tests and throwaway catalogs.

use super::{ByteStore, ByteStoreError, ByteStoreResult};
use crate::model::inode::InodeId;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct MemoryByteStore {
    blobs: HashMap<InodeId, Vec<u8>>,
}

impl MemoryByteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, uuid: InodeId) -> bool {
        self.blobs.contains_key(&uuid)
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

impl ByteStore for MemoryByteStore {
    fn write_bytes(&mut self, uuid: InodeId, content: &[u8]) -> ByteStoreResult<()> {
        self.blobs.insert(uuid, content.to_vec());
        Ok(())
    }

    fn read_bytes(&self, uuid: InodeId) -> ByteStoreResult<Vec<u8>> {
        self.blobs
            .get(&uuid)
            .cloned()
            .ok_or(ByteStoreError::NotFound(uuid))
    }

    fn delete_bytes(&mut self, uuid: InodeId) -> ByteStoreResult<()> {
        self.blobs
            .remove(&uuid)
            .map(|_| ())
            .ok_or(ByteStoreError::NotFound(uuid))
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryByteStore;
    use crate::blob::{ByteStore, ByteStoreError};
    use uuid::Uuid;

    #[test]
    fn delete_of_absent_bytes_is_not_found() {
        let mut store = MemoryByteStore::new();
        let id = Uuid::new_v4();

        store.write_bytes(id, b"abc").unwrap();
        assert!(store.contains(id));
        assert_eq!(store.len(), 1);

        store.delete_bytes(id).unwrap();
        assert!(store.is_empty());
        assert!(matches!(
            store.delete_bytes(id),
            Err(ByteStoreError::NotFound(missing)) if missing == id
        ));
    }
}
