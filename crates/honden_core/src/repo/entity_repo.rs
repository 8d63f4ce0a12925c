//! Entity catalog: per-kind typed records.
//!
//! # Responsibility
//! - Persist note and media rows and their kind-specific attributes.
//! - Dispatch kind-generic reads/writes through a closed kind -> table map.
//!
//! # Invariants
//! - Table names come only from `kind_table`, never from caller input.
//! - Writes validate records before SQL mutations.
//! - Rename touches the filename column only.

use crate::error::StoreResult;
use crate::model::inode::{validate_filename, Entity, InodeId, InodeKind, Media, Note};
use crate::repo::parse_uuid;
use rusqlite::{params, Connection, OptionalExtension, Row};

/// Catalog table holding the typed rows of `kind`.
pub(crate) fn kind_table(kind: InodeKind) -> &'static str {
    match kind {
        InodeKind::Note => "notes",
        InodeKind::Media => "media",
    }
}

/// Repository interface over typed entity rows.
pub trait EntityCatalog {
    fn insert_note(&self, note: &Note) -> StoreResult<()>;
    fn insert_media(&self, media: &Media) -> StoreResult<()>;
    fn get_note(&self, uuid: InodeId) -> StoreResult<Option<Note>>;
    fn get_media(&self, uuid: InodeId) -> StoreResult<Option<Media>>;
    /// Loads the typed record of `kind` for `uuid`.
    fn load(&self, kind: InodeKind, uuid: InodeId) -> StoreResult<Option<Entity>>;
    /// Deletes the typed record of `kind`. Returns whether a row was removed.
    fn delete(&self, kind: InodeKind, uuid: InodeId) -> StoreResult<bool>;
    /// Updates the filename column. Returns whether a row was changed.
    fn set_filename(&self, kind: InodeKind, uuid: InodeId, filename: &str) -> StoreResult<bool>;
    /// Replaces note contents. Returns whether a row was changed.
    fn set_note_contents(&self, uuid: InodeId, contents: &str) -> StoreResult<bool>;
    /// Whether `filename` is used by a record of one of `kinds`, other than `except`.
    fn filename_taken(
        &self,
        filename: &str,
        kinds: &[InodeKind],
        except: Option<InodeId>,
    ) -> StoreResult<bool>;
    /// All records of any kind carrying exactly `filename`.
    fn find_by_filename(&self, filename: &str) -> StoreResult<Vec<Entity>>;
    /// Identifiers of every typed row of `kind`, regardless of inode state.
    fn list_ids(&self, kind: InodeKind) -> StoreResult<Vec<InodeId>>;
}

/// SQLite-backed entity catalog.
///
/// Works on a plain connection or inside a transaction (via deref).
pub struct SqliteEntityCatalog<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEntityCatalog<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl EntityCatalog for SqliteEntityCatalog<'_> {
    fn insert_note(&self, note: &Note) -> StoreResult<()> {
        note.validate()?;
        self.conn.execute(
            "INSERT INTO notes (uuid, filename, contents) VALUES (?1, ?2, ?3);",
            params![
                note.uuid.to_string(),
                note.filename.as_str(),
                note.contents.as_deref()
            ],
        )?;
        Ok(())
    }

    fn insert_media(&self, media: &Media) -> StoreResult<()> {
        media.validate()?;
        self.conn.execute(
            "INSERT INTO media (uuid, filename, filetype) VALUES (?1, ?2, ?3);",
            params![
                media.uuid.to_string(),
                media.filename.as_str(),
                media.filetype.as_str()
            ],
        )?;
        Ok(())
    }

    fn get_note(&self, uuid: InodeId) -> StoreResult<Option<Note>> {
        let row = self
            .conn
            .query_row(
                "SELECT uuid, filename, contents FROM notes WHERE uuid = ?1;",
                [uuid.to_string()],
                |row| {
                    Ok((
                        row.get::<_, String>("uuid")?,
                        row.get::<_, String>("filename")?,
                        row.get::<_, Option<String>>("contents")?,
                    ))
                },
            )
            .optional()?;

        row.map(|(uuid_text, filename, contents)| {
            Ok(Note {
                uuid: parse_uuid(&uuid_text, "notes.uuid")?,
                filename,
                contents,
            })
        })
        .transpose()
    }

    fn get_media(&self, uuid: InodeId) -> StoreResult<Option<Media>> {
        let row = self
            .conn
            .query_row(
                "SELECT uuid, filename, filetype FROM media WHERE uuid = ?1;",
                [uuid.to_string()],
                |row| {
                    Ok((
                        row.get::<_, String>("uuid")?,
                        row.get::<_, String>("filename")?,
                        row.get::<_, String>("filetype")?,
                    ))
                },
            )
            .optional()?;

        row.map(|(uuid_text, filename, filetype)| {
            Ok(Media {
                uuid: parse_uuid(&uuid_text, "media.uuid")?,
                filename,
                filetype,
            })
        })
        .transpose()
    }

    fn load(&self, kind: InodeKind, uuid: InodeId) -> StoreResult<Option<Entity>> {
        match kind {
            InodeKind::Note => Ok(self.get_note(uuid)?.map(Entity::Note)),
            InodeKind::Media => Ok(self.get_media(uuid)?.map(Entity::Media)),
        }
    }

    fn delete(&self, kind: InodeKind, uuid: InodeId) -> StoreResult<bool> {
        let changed = self.conn.execute(
            &format!("DELETE FROM {} WHERE uuid = ?1;", kind_table(kind)),
            [uuid.to_string()],
        )?;
        Ok(changed > 0)
    }

    fn set_filename(&self, kind: InodeKind, uuid: InodeId, filename: &str) -> StoreResult<bool> {
        validate_filename(filename)?;
        let changed = self.conn.execute(
            &format!(
                "UPDATE {} SET filename = ?2 WHERE uuid = ?1;",
                kind_table(kind)
            ),
            params![uuid.to_string(), filename],
        )?;
        Ok(changed > 0)
    }

    fn set_note_contents(&self, uuid: InodeId, contents: &str) -> StoreResult<bool> {
        let changed = self.conn.execute(
            "UPDATE notes SET contents = ?2 WHERE uuid = ?1;",
            params![uuid.to_string(), contents],
        )?;
        Ok(changed > 0)
    }

    fn filename_taken(
        &self,
        filename: &str,
        kinds: &[InodeKind],
        except: Option<InodeId>,
    ) -> StoreResult<bool> {
        let except = except.map(|uuid| uuid.to_string());
        for kind in kinds {
            let taken: i64 = self.conn.query_row(
                &format!(
                    "SELECT EXISTS(
                        SELECT 1 FROM {}
                        WHERE filename = ?1
                          AND (?2 IS NULL OR uuid <> ?2)
                    );",
                    kind_table(*kind)
                ),
                params![filename, except.as_deref()],
                |row| row.get(0),
            )?;
            if taken == 1 {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn find_by_filename(&self, filename: &str) -> StoreResult<Vec<Entity>> {
        let mut found = Vec::new();
        for kind in InodeKind::ALL {
            let mut stmt = self.conn.prepare(&format!(
                "SELECT uuid FROM {} WHERE filename = ?1 ORDER BY uuid ASC;",
                kind_table(kind)
            ))?;
            let mut rows = stmt.query([filename])?;
            while let Some(row) = rows.next()? {
                let uuid = row_uuid(row, kind)?;
                if let Some(entity) = self.load(kind, uuid)? {
                    found.push(entity);
                }
            }
        }
        Ok(found)
    }

    fn list_ids(&self, kind: InodeKind) -> StoreResult<Vec<InodeId>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT uuid FROM {} ORDER BY uuid ASC;",
            kind_table(kind)
        ))?;
        let mut rows = stmt.query([])?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            ids.push(row_uuid(row, kind)?);
        }
        Ok(ids)
    }
}

fn row_uuid(row: &Row<'_>, kind: InodeKind) -> StoreResult<InodeId> {
    let text: String = row.get(0)?;
    parse_uuid(&text, kind_table(kind))
}
