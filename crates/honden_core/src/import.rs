//! Bulk import of a directory into the graph store.
//!
//! # Responsibility
//! - Classify files by extension into note, media or skip.
//! - Create one inode per qualifying file; copy media bytes into the byte store.
//!
//! # Invariants
//! - Re-importing a filename already in the catalog is a no-op reported as
//!   `already_known`, whatever the uniqueness mode.
//! - Per-file failures are collected in the report; only an unreadable
//!   directory aborts the whole import.

use crate::error::StoreError;
use crate::model::inode::{InodeId, InodeKind};
use crate::service::graph_store::GraphStore;
use log::{info, warn};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Instant;

const NOTE_EXTENSIONS: &[&str] = &["md", "txt", "note"];

/// Import decision for one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileClass {
    Note,
    Media { filetype: &'static str },
    Skip,
}

/// MIME type for a known media extension (without the dot, any case).
pub fn extension_to_mime(extension: &str) -> Option<&'static str> {
    match extension.to_ascii_lowercase().as_str() {
        "jpeg" | "jpg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "pdf" => Some("application/pdf"),
        "webm" => Some("video/webm"),
        "mp4" => Some("video/mp4"),
        "mkv" => Some("video/x-matroska"),
        "mp3" => Some("audio/mpeg"),
        _ => None,
    }
}

/// Classifies a file name. Files without an extension are notes.
pub fn classify(file_name: &Path) -> FileClass {
    let Some(extension) = file_name.extension() else {
        return FileClass::Note;
    };
    let Some(extension) = extension.to_str() else {
        return FileClass::Skip;
    };

    let lowered = extension.to_ascii_lowercase();
    if NOTE_EXTENSIONS.contains(&lowered.as_str()) {
        return FileClass::Note;
    }
    match extension_to_mime(&lowered) {
        Some(filetype) => FileClass::Media { filetype },
        None => FileClass::Skip,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportedFile {
    pub filename: String,
    pub uuid: InodeId,
    pub kind: InodeKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportFailure {
    pub filename: String,
    pub error_code: &'static str,
    pub message: String,
}

/// Per-file outcome of one import run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub imported: Vec<ImportedFile>,
    pub already_known: Vec<String>,
    pub skipped: Vec<String>,
    pub failed: Vec<ImportFailure>,
}

/// Failure that aborts an import before any file is processed.
#[derive(Debug)]
pub enum ImportError {
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReadDir { path, source } => {
                write!(f, "cannot list import directory `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for ImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ReadDir { source, .. } => Some(source),
        }
    }
}

/// Imports every regular file directly inside `dir`, in filename order.
pub fn import_directory(store: &mut GraphStore, dir: &Path) -> Result<ImportReport, ImportError> {
    let started_at = Instant::now();
    let read_dir_err = |source| ImportError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_dir_err)? {
        let entry = entry.map_err(read_dir_err)?;
        entries.push(entry.path());
    }
    entries.sort();

    let mut report = ImportReport::default();
    for path in entries {
        import_one(store, &path, &mut report);
    }

    info!(
        "event=bulk_import module=import status=ok imported={} already_known={} skipped={} failed={} duration_ms={}",
        report.imported.len(),
        report.already_known.len(),
        report.skipped.len(),
        report.failed.len(),
        started_at.elapsed().as_millis()
    );
    Ok(report)
}

fn import_one(store: &mut GraphStore, path: &Path, report: &mut ImportReport) {
    let Some(filename) = path.file_name().map(|name| name.to_string_lossy().into_owned()) else {
        return;
    };

    if !path.is_file() {
        report.skipped.push(filename);
        return;
    }

    let class = classify(Path::new(&filename));
    if class == FileClass::Skip {
        report.skipped.push(filename);
        return;
    }

    match store.find_by_filename(&filename) {
        Ok(existing) if !existing.is_empty() => {
            report.already_known.push(filename);
            return;
        }
        Ok(_) => {}
        Err(err) => {
            record_failure(report, filename, &err);
            return;
        }
    }

    let created = match class {
        FileClass::Note => read_text(path).and_then(|contents| {
            store
                .create_note(&filename, &contents)
                .map(|uuid| (uuid, InodeKind::Note))
        }),
        FileClass::Media { filetype } => read_bytes(path).and_then(|content| {
            store
                .create_media_with_bytes(&filename, filetype, &content)
                .map(|uuid| (uuid, InodeKind::Media))
        }),
        FileClass::Skip => return,
    };

    match created {
        Ok((uuid, kind)) => report.imported.push(ImportedFile {
            filename,
            uuid,
            kind,
        }),
        Err(err) => record_failure(report, filename, &err),
    }
}

fn read_text(path: &Path) -> Result<String, StoreError> {
    std::fs::read_to_string(path).map_err(|err| {
        StoreError::InvalidData(format!("cannot read note text `{}`: {err}", path.display()))
    })
}

fn read_bytes(path: &Path) -> Result<Vec<u8>, StoreError> {
    std::fs::read(path).map_err(|err| {
        StoreError::InvalidData(format!("cannot read media `{}`: {err}", path.display()))
    })
}

fn record_failure(report: &mut ImportReport, filename: String, err: &StoreError) {
    warn!(
        "event=bulk_import_file module=import status=error error_code={}",
        err.code()
    );
    report.failed.push(ImportFailure {
        filename,
        error_code: err.code(),
        message: err.to_string(),
    });
}

#[cfg(test)]
mod tests {
    use super::{classify, extension_to_mime, FileClass};
    use std::path::Path;

    #[test]
    fn classify_follows_extension_table() {
        assert_eq!(classify(Path::new("README")), FileClass::Note);
        assert_eq!(classify(Path::new("todo.MD")), FileClass::Note);
        assert_eq!(classify(Path::new("journal.note")), FileClass::Note);
        assert_eq!(
            classify(Path::new("pic.PNG")),
            FileClass::Media {
                filetype: "image/png"
            }
        );
        assert_eq!(classify(Path::new("archive.zip")), FileClass::Skip);
    }

    #[test]
    fn mime_map_covers_media_extensions() {
        assert_eq!(extension_to_mime("jpg"), Some("image/jpeg"));
        assert_eq!(extension_to_mime("mkv"), Some("video/x-matroska"));
        assert_eq!(extension_to_mime("mp3"), Some("audio/mpeg"));
        assert_eq!(extension_to_mime("md"), None);
    }
}
