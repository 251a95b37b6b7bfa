use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{Activity, NewActivity};

/// What the client last knew: the activity list from the most recent
/// successful round-trip and the last form it submitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub activities: Vec<Activity>,
    #[serde(default)]
    pub last_form: Option<NewActivity>,
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
}

/// JSON file holding the client's [`Snapshot`].
#[derive(Debug, Clone)]
pub struct SnapshotCache {
    path: PathBuf,
}

impl SnapshotCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load from disk. Returns an empty snapshot if the file is missing or unparseable.
    pub fn load(&self) -> Snapshot {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Snapshot::default(),
            Err(e) => {
                tracing::warn!("cannot read snapshot {}: {e}", self.path.display());
                return Snapshot::default();
            }
        };
        serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!("discarding corrupt snapshot {}: {e}", self.path.display());
            Snapshot::default()
        })
    }

    /// Overwrite the snapshot on disk, stamping `saved_at`.
    pub fn save(&self, snapshot: &Snapshot) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut stamped = snapshot.clone();
        stamped.saved_at = Some(Utc::now());
        let json = serde_json::to_string_pretty(&stamped)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    /// Load, apply `f`, save.
    pub fn update(&self, f: impl FnOnce(&mut Snapshot)) -> Result<Snapshot> {
        let mut snapshot = self.load();
        f(&mut snapshot);
        self.save(&snapshot)?;
        Ok(snapshot)
    }
}
