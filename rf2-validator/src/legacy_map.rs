//! Legacy identifier to UUID lookup tables.
//!
//! Releases that carry UUID-variant files also ship `sct2_to_uuid_map*` files
//! pairing each identifier with its UUID, one file per release state. The
//! tables are only consumed by cross-reference validators.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::filename::ReleaseState;
use crate::strategy::fs::{numbered_lines, open_text};

/// Header cell that marks the first row of a map file.
const HEADER_MARKER: &str = "sctId";

/// Errors from loading the legacy map tables.
#[derive(Debug, Error)]
pub enum LegacyMapError {
    #[error("Found multiple {state} map files: {} and {}", first.display(), second.display())]
    Duplicate {
        state: ReleaseState,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Unexpected mapping file {}: no Delta, Snapshot or Full in its name", path.display())]
    UnknownState { path: PathBuf },

    #[error("Failed to read mapping file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Mapping file {} line {line}: {message}", path.display())]
    Row {
        path: PathBuf,
        line: usize,
        message: String,
    },
}

impl LegacyMapError {
    /// The file the error is about.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Duplicate { second, .. } => second,
            Self::UnknownState { path } | Self::Io { path, .. } | Self::Row { path, .. } => path,
        }
    }
}

/// Identifier to UUID tables, one per release state.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LegacyIdMap {
    delta: HashMap<u64, Uuid>,
    snapshot: HashMap<u64, Uuid>,
    full: HashMap<u64, Uuid>,
}

impl LegacyIdMap {
    /// Load one table per file. Each release state may appear at most once.
    ///
    /// # Errors
    /// Returns [`LegacyMapError`] on a duplicate or unrecognised file, an
    /// unreadable file or a malformed row.
    pub fn load(files: &[PathBuf]) -> Result<Self, LegacyMapError> {
        let mut map = Self::default();
        let mut sources: HashMap<ReleaseState, &PathBuf> = HashMap::new();

        for path in files {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let Some(state) = ReleaseState::from_name(&name) else {
                return Err(LegacyMapError::UnknownState { path: path.clone() });
            };
            if let Some(first) = sources.insert(state, path) {
                return Err(LegacyMapError::Duplicate {
                    state,
                    first: first.clone(),
                    second: path.clone(),
                });
            }

            let table = load_table(path)?;
            debug!(file = %path.display(), %state, entries = table.len(), "Loaded legacy map");
            *map.table_mut(state) = table;
        }

        Ok(map)
    }

    /// The table for one release state.
    #[must_use]
    pub fn table(&self, state: ReleaseState) -> &HashMap<u64, Uuid> {
        match state {
            ReleaseState::Delta => &self.delta,
            ReleaseState::Snapshot => &self.snapshot,
            ReleaseState::Full => &self.full,
        }
    }

    fn table_mut(&mut self, state: ReleaseState) -> &mut HashMap<u64, Uuid> {
        match state {
            ReleaseState::Delta => &mut self.delta,
            ReleaseState::Snapshot => &mut self.snapshot,
            ReleaseState::Full => &mut self.full,
        }
    }

    /// Look up the UUID of an identifier.
    #[must_use]
    pub fn get(&self, state: ReleaseState, id: u64) -> Option<Uuid> {
        self.table(state).get(&id).copied()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.delta.is_empty() && self.snapshot.is_empty() && self.full.is_empty()
    }
}

fn load_table(path: &Path) -> Result<HashMap<u64, Uuid>, LegacyMapError> {
    let io_error = |source| LegacyMapError::Io {
        path: path.to_path_buf(),
        source,
    };
    let lines = numbered_lines(open_text(path).map_err(io_error)?, 1);

    let mut table = HashMap::new();
    for (line, bytes) in lines {
        let row_error = |message: String| LegacyMapError::Row {
            path: path.to_path_buf(),
            line,
            message,
        };
        let text = String::from_utf8(bytes.map_err(io_error)?)
            .map_err(|_| row_error("not valid UTF-8".to_owned()))?;
        let mut cells = text.split('\t');

        let Some(id) = cells.next().filter(|cell| !cell.is_empty()) else {
            continue;
        };
        if id == HEADER_MARKER {
            continue;
        }
        let id = id
            .parse::<u64>()
            .map_err(|_| row_error(format!("'{id}' is not a numeric identifier")))?;
        let uuid = cells
            .next()
            .ok_or_else(|| row_error("missing uuid column".to_owned()))?;
        let uuid =
            Uuid::parse_str(uuid).map_err(|e| row_error(format!("invalid uuid '{uuid}': {e}")))?;
        table.insert(id, uuid);
    }
    Ok(table)
}
