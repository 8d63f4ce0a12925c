//! Inode identity and typed entity records.
//!
//! # Responsibility
//! - Define the closed set of entity kinds sharing one identity space.
//! - Define the typed records (note, media) each inode resolves to.
//!
//! # Invariants
//! - `uuid` is generated once per entity and never reused.
//! - An `Entity` variant always agrees with the `InodeKind` it was loaded for.
//! - Filenames are display names only; they are never used as storage paths.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of an inode.
///
/// Ordered by `Uuid` byte order, which matches the lexicographic order of the
/// lowercase hyphenated text persisted in the catalog.
pub type InodeId = Uuid;

/// Closed set of entity kinds that can be registered as inodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InodeKind {
    /// Text note with inline contents.
    Note,
    /// Binary artifact whose bytes live in the byte store.
    Media,
}

impl InodeKind {
    /// Every kind, in persisted order.
    pub const ALL: [InodeKind; 2] = [InodeKind::Note, InodeKind::Media];

    /// Tag persisted in `inodes.kind`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::Media => "media",
        }
    }

    /// Parses a persisted kind tag. Unknown tags yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "note" => Some(Self::Note),
            "media" => Some(Self::Media),
            _ => None,
        }
    }

    /// Whether records of this kind carry a renameable filename.
    pub fn has_filename(self) -> bool {
        match self {
            Self::Note | Self::Media => true,
        }
    }

    /// Whether records of this kind carry editable text contents.
    pub fn has_contents(self) -> bool {
        matches!(self, Self::Note)
    }

    /// Whether deleting this kind must also delete backing bytes.
    pub fn has_backing_bytes(self) -> bool {
        matches!(self, Self::Media)
    }
}

impl Display for InodeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation failures for typed entity records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityValidationError {
    NilUuid,
    BlankFilename,
    /// Filename contains a control character (newline, NUL, ...).
    FilenameControlChar,
    BlankFiletype,
}

impl Display for EntityValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilUuid => write!(f, "uuid must not be nil"),
            Self::BlankFilename => write!(f, "filename must not be blank"),
            Self::FilenameControlChar => write!(f, "filename must not contain control characters"),
            Self::BlankFiletype => write!(f, "media filetype must not be blank"),
        }
    }
}

impl Error for EntityValidationError {}

/// Checks a filename for catalog use.
pub fn validate_filename(filename: &str) -> Result<(), EntityValidationError> {
    if filename.trim().is_empty() {
        return Err(EntityValidationError::BlankFilename);
    }
    if filename.chars().any(char::is_control) {
        return Err(EntityValidationError::FilenameControlChar);
    }
    Ok(())
}

/// Identity row owned by the inode index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inode {
    pub uuid: InodeId,
    pub kind: InodeKind,
}

/// Typed record for `InodeKind::Note`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub uuid: InodeId,
    pub filename: String,
    /// `None` only for rows written without contents by older tooling.
    pub contents: Option<String>,
}

impl Note {
    /// Creates a note record with a freshly generated identifier.
    pub fn new(
        filename: impl Into<String>,
        contents: impl Into<String>,
    ) -> Result<Self, EntityValidationError> {
        Self::with_id(Uuid::new_v4(), filename, Some(contents.into()))
    }

    /// Creates a note record for an existing identifier.
    pub fn with_id(
        uuid: InodeId,
        filename: impl Into<String>,
        contents: Option<String>,
    ) -> Result<Self, EntityValidationError> {
        let note = Self {
            uuid,
            filename: filename.into(),
            contents,
        };
        note.validate()?;
        Ok(note)
    }

    pub fn validate(&self) -> Result<(), EntityValidationError> {
        if self.uuid.is_nil() {
            return Err(EntityValidationError::NilUuid);
        }
        validate_filename(&self.filename)
    }
}

/// Typed record for `InodeKind::Media`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    pub uuid: InodeId,
    pub filename: String,
    /// MIME type, e.g. `image/png`.
    pub filetype: String,
}

impl Media {
    /// Creates a media record with a freshly generated identifier.
    pub fn new(
        filename: impl Into<String>,
        filetype: impl Into<String>,
    ) -> Result<Self, EntityValidationError> {
        Self::with_id(Uuid::new_v4(), filename, filetype)
    }

    /// Creates a media record for an existing identifier.
    pub fn with_id(
        uuid: InodeId,
        filename: impl Into<String>,
        filetype: impl Into<String>,
    ) -> Result<Self, EntityValidationError> {
        let media = Self {
            uuid,
            filename: filename.into(),
            filetype: filetype.into(),
        };
        media.validate()?;
        Ok(media)
    }

    pub fn validate(&self) -> Result<(), EntityValidationError> {
        if self.uuid.is_nil() {
            return Err(EntityValidationError::NilUuid);
        }
        validate_filename(&self.filename)?;
        if self.filetype.trim().is_empty() {
            return Err(EntityValidationError::BlankFiletype);
        }
        Ok(())
    }
}

/// Kind-specific record behind an inode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Entity {
    Note(Note),
    Media(Media),
}

impl Entity {
    pub fn kind(&self) -> InodeKind {
        match self {
            Self::Note(_) => InodeKind::Note,
            Self::Media(_) => InodeKind::Media,
        }
    }

    pub fn uuid(&self) -> InodeId {
        match self {
            Self::Note(note) => note.uuid,
            Self::Media(media) => media.uuid,
        }
    }

    /// Display filename, for kinds that have one.
    pub fn filename(&self) -> Option<&str> {
        match self {
            Self::Note(note) => Some(note.filename.as_str()),
            Self::Media(media) => Some(media.filename.as_str()),
        }
    }
}

/// An inode together with its typed record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedInode {
    pub uuid: InodeId,
    pub kind: InodeKind,
    pub entity: Entity,
}

impl ResolvedInode {
    pub fn new(entity: Entity) -> Self {
        Self {
            uuid: entity.uuid(),
            kind: entity.kind(),
            entity,
        }
    }

    pub fn filename(&self) -> Option<&str> {
        self.entity.filename()
    }

    pub fn inode(&self) -> Inode {
        Inode {
            uuid: self.uuid,
            kind: self.kind,
        }
    }
}
