//! Filesystem-backed byte store.

use super::{ByteStore, ByteStoreError, ByteStoreResult};
use crate::model::inode::InodeId;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const TEMP_SUFFIX: &str = "partial";

/// Byte store writing one file per inode under a root directory.
///
/// Layout: `<root>/<uuid>`. Writes go through `<root>/<uuid>.partial` and are
/// renamed into place, so a reader never observes a half-written file.
#[derive(Debug, Clone)]
pub struct FsByteStore {
    root: PathBuf,
}

impl FsByteStore {
    /// Creates a store rooted at `root`. The directory is created lazily.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of the bytes for `uuid`.
    pub fn path_for(&self, uuid: InodeId) -> PathBuf {
        self.root.join(uuid.hyphenated().to_string())
    }

    fn temp_path_for(&self, uuid: InodeId) -> PathBuf {
        self.root.join(format!("{}.{TEMP_SUFFIX}", uuid.hyphenated()))
    }
}

impl ByteStore for FsByteStore {
    fn write_bytes(&mut self, uuid: InodeId, content: &[u8]) -> ByteStoreResult<()> {
        let io_err = |source| ByteStoreError::Io { uuid, source };

        std::fs::create_dir_all(&self.root).map_err(io_err)?;
        let temp_path = self.temp_path_for(uuid);
        std::fs::write(&temp_path, content).map_err(io_err)?;
        if let Err(source) = std::fs::rename(&temp_path, self.path_for(uuid)) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(io_err(source));
        }
        Ok(())
    }

    fn read_bytes(&self, uuid: InodeId) -> ByteStoreResult<Vec<u8>> {
        std::fs::read(self.path_for(uuid)).map_err(|source| map_io(uuid, source))
    }

    fn delete_bytes(&mut self, uuid: InodeId) -> ByteStoreResult<()> {
        std::fs::remove_file(self.path_for(uuid)).map_err(|source| map_io(uuid, source))
    }
}

fn map_io(uuid: InodeId, source: std::io::Error) -> ByteStoreError {
    if source.kind() == ErrorKind::NotFound {
        ByteStoreError::NotFound(uuid)
    } else {
        ByteStoreError::Io { uuid, source }
    }
}
