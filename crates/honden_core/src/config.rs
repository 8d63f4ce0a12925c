//! Store configuration and on-disk layout.
//!
//! # Responsibility
//! - Carry deployment-mode switches (filename uniqueness).
//! - Derive catalog and byte-store locations from one root directory.

use crate::model::inode::InodeKind;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

const DB_FILE_NAME: &str = "honden.db";
const MEDIA_DIR_NAME: &str = "media";

/// Filename uniqueness policy applied on create and rename.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameUniqueness {
    /// Any number of inodes may share a filename.
    #[default]
    Unconstrained,
    /// A filename is unique among records of the same kind.
    PerKind,
    /// A filename is unique across every kind.
    CatalogWide,
}

impl NameUniqueness {
    /// Kinds whose filenames collide with a record of `kind`.
    pub fn conflicting_kinds(self, kind: InodeKind) -> Vec<InodeKind> {
        match self {
            Self::Unconstrained => Vec::new(),
            Self::PerKind => vec![kind],
            Self::CatalogWide => InodeKind::ALL.to_vec(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unconstrained => "unconstrained",
            Self::PerKind => "per_kind",
            Self::CatalogWide => "catalog_wide",
        }
    }
}

impl Display for NameUniqueness {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NameUniqueness {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "unconstrained" => Ok(Self::Unconstrained),
            "per_kind" => Ok(Self::PerKind),
            "catalog_wide" => Ok(Self::CatalogWide),
            other => Err(format!(
                "unsupported name uniqueness `{other}`; expected unconstrained|per_kind|catalog_wide"
            )),
        }
    }
}

/// Behavior switches for one graph store handle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub name_uniqueness: NameUniqueness,
}

/// Filesystem layout under a store root.
///
/// `<root>/honden.db` holds the catalog, `<root>/media/<uuid>` the bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLayout {
    root: PathBuf,
}

impl StoreLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn db_path(&self) -> PathBuf {
        self.root.join(DB_FILE_NAME)
    }

    pub fn media_dir(&self) -> PathBuf {
        self.root.join(MEDIA_DIR_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::{NameUniqueness, StoreLayout};
    use crate::model::inode::InodeKind;
    use std::path::Path;

    #[test]
    fn name_uniqueness_parses_cli_spellings() {
        assert_eq!(
            "catalog-wide".parse::<NameUniqueness>().unwrap(),
            NameUniqueness::CatalogWide
        );
        assert_eq!(
            " PER_KIND ".parse::<NameUniqueness>().unwrap(),
            NameUniqueness::PerKind
        );
        assert!("strict".parse::<NameUniqueness>().is_err());
    }

    #[test]
    fn conflicting_kinds_follow_mode() {
        assert!(NameUniqueness::Unconstrained
            .conflicting_kinds(InodeKind::Note)
            .is_empty());
        assert_eq!(
            NameUniqueness::PerKind.conflicting_kinds(InodeKind::Media),
            vec![InodeKind::Media]
        );
        assert_eq!(
            NameUniqueness::CatalogWide.conflicting_kinds(InodeKind::Note),
            vec![InodeKind::Note, InodeKind::Media]
        );
    }

    #[test]
    fn layout_derives_paths_from_root() {
        let layout = StoreLayout::new("/srv/kb");
        assert_eq!(layout.db_path(), Path::new("/srv/kb/honden.db"));
        assert_eq!(layout.media_dir(), Path::new("/srv/kb/media"));
    }
}
