//! Command definitions and dispatch for the `honden` binary.
//!
//! Every command prints one JSON document on success.

use clap::{Parser, Subcommand};
use honden_core::{
    default_log_level, import_directory, init_logging, FilenameRanker, GraphStore, ImportError,
    InodeId, LoggingError, NameUniqueness, StoreConfig, StoreError, StoreLayout,
};
use log::info;
use serde_json::{json, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Honden knowledge base: notes and media linked in one graph
#[derive(Parser)]
#[command(name = "honden")]
#[command(about = "Inode/link graph store for notes and media", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Store root directory (holds honden.db and media/)
    #[arg(long, default_value = ".honden")]
    pub root: PathBuf,

    /// Filename uniqueness (unconstrained, per-kind, catalog-wide)
    #[arg(long, default_value = "unconstrained")]
    pub name_uniqueness: NameUniqueness,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log directory (default: <root>/logs)
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Import every note and media file directly inside a directory
    Import {
        /// Directory to import
        dir: PathBuf,
    },
    /// List every inode
    List,
    /// Show one inode with its linked neighbors
    Show { uuid: InodeId },
    /// Print the contents of a note
    Cat { uuid: InodeId },
    /// Create a note
    NewNote {
        filename: String,
        /// Initial contents
        #[arg(long, default_value = "")]
        contents: String,
    },
    /// Replace the contents of a note
    Write { uuid: InodeId, contents: String },
    /// Link two inodes
    Connect { a: InodeId, b: InodeId },
    /// Unlink two inodes
    Disconnect { a: InodeId, b: InodeId },
    /// Change the filename of an inode
    Rename { uuid: InodeId, filename: String },
    /// Delete an inode, its links and its stored bytes
    Delete { uuid: InodeId },
    /// Rank inodes by filename match
    Search { query: String },
    /// Scan the catalog for inconsistencies
    Verify,
}

#[derive(Debug)]
pub enum CliError {
    Logging(LoggingError),
    Store(StoreError),
    Import(ImportError),
    Output(serde_json::Error),
    InvalidPath(String),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Logging(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "[{}] {err}", err.code()),
            Self::Import(err) => write!(f, "{err}"),
            Self::Output(err) => write!(f, "cannot render output: {err}"),
            Self::InvalidPath(message) => write!(f, "{message}"),
        }
    }
}

impl Error for CliError {}

impl From<LoggingError> for CliError {
    fn from(value: LoggingError) -> Self {
        Self::Logging(value)
    }
}

impl From<StoreError> for CliError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<ImportError> for CliError {
    fn from(value: ImportError) -> Self {
        Self::Import(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Output(value)
    }
}

impl Cli {
    /// Starts logging, opens the store, runs the command and closes the store.
    pub fn run(&self) -> Result<String, CliError> {
        let root = absolute(&self.root)?;
        let log_dir = match &self.log_dir {
            Some(dir) => absolute(dir)?,
            None => root.join("logs"),
        };
        let level = self.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, &log_dir)?;

        let started_at = Instant::now();
        let mut store = GraphStore::open(
            &StoreLayout::new(root),
            StoreConfig {
                name_uniqueness: self.name_uniqueness,
            },
        )?;
        let output = execute(&mut store, &self.command);
        store.close()?;
        let output = output?;

        info!(
            "event=cli_command module=cli status=ok command={} duration_ms={}",
            self.command.name(),
            started_at.elapsed().as_millis()
        );
        Ok(serde_json::to_string_pretty(&output)?)
    }
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Self::Import { .. } => "import",
            Self::List => "list",
            Self::Show { .. } => "show",
            Self::Cat { .. } => "cat",
            Self::NewNote { .. } => "new-note",
            Self::Write { .. } => "write",
            Self::Connect { .. } => "connect",
            Self::Disconnect { .. } => "disconnect",
            Self::Rename { .. } => "rename",
            Self::Delete { .. } => "delete",
            Self::Search { .. } => "search",
            Self::Verify => "verify",
        }
    }
}

fn execute(store: &mut GraphStore, command: &Commands) -> Result<Value, CliError> {
    let value = match command {
        Commands::Import { dir } => serde_json::to_value(import_directory(store, dir)?)?,
        Commands::List => serde_json::to_value(store.enumerate_all()?)?,
        Commands::Show { uuid } => serde_json::to_value(store.get_inode_with_links(*uuid)?)?,
        Commands::Cat { uuid } => json!({ "uuid": uuid, "contents": store.get_contents(*uuid)? }),
        Commands::NewNote { filename, contents } => {
            json!({ "uuid": store.create_note(filename, contents)? })
        }
        Commands::Write { uuid, contents } => {
            store.set_contents(*uuid, contents)?;
            json!({ "uuid": uuid, "updated": true })
        }
        Commands::Connect { a, b } => serde_json::to_value(store.connect(*a, *b)?)?,
        Commands::Disconnect { a, b } => json!({ "removed": store.disconnect(*a, *b)? }),
        Commands::Rename { uuid, filename } => {
            store.rename(*uuid, filename)?;
            json!({ "uuid": uuid, "filename": filename })
        }
        Commands::Delete { uuid } => {
            let summary = store.delete_inode(*uuid)?;
            json!({
                "uuid": uuid,
                "kind": summary.kind,
                "links_removed": summary.links_removed,
                "bytes_removed": summary.bytes_removed,
            })
        }
        Commands::Search { query } => serde_json::to_value(store.search(query, &FilenameRanker)?)?,
        Commands::Verify => serde_json::to_value(store.verify_integrity()?)?,
    };
    Ok(value)
}

fn absolute(path: &Path) -> Result<PathBuf, CliError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir()
        .map_err(|err| CliError::InvalidPath(format!("cannot read working directory: {err}")))?;
    Ok(cwd.join(path))
}

#[cfg(test)]
mod tests {
    use super::{Cli, Commands};
    use clap::{CommandFactory, Parser};
    use honden_core::NameUniqueness;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_global_flags_and_subcommand() {
        let cli = Cli::try_parse_from([
            "honden",
            "--root",
            "/tmp/kb",
            "--name-uniqueness",
            "per-kind",
            "rename",
            "6f1c0d4e-2b7a-4c1e-9a53-0d1f2e3a4b5c",
            "cover.png",
        ])
        .unwrap();

        assert_eq!(cli.name_uniqueness, NameUniqueness::PerKind);
        assert!(matches!(cli.command, Commands::Rename { ref filename, .. } if filename == "cover.png"));
    }

    #[test]
    fn rejects_malformed_uuid() {
        assert!(Cli::try_parse_from(["honden", "show", "not-a-uuid"]).is_err());
    }
}
