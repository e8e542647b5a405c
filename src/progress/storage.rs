//! Storage operations for progress
//!
//! Directory structure:
//! ```text
//! {data-dir}/
//! ├── progress.json   # ProgressSnapshot
//! └── session.json    # Interaction cursor
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::models::ProgressSnapshot;

#[derive(Error, Debug)]
pub enum ProgressError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Module not found: {0}")]
    ModuleNotFound(String),

    #[error("Node not found: {module_id}[{domain_index}][{node_index}]")]
    NodeNotFound {
        module_id: String,
        domain_index: usize,
        node_index: usize,
    },

    #[error("Node not found: {module_id}/{domain_id}/{node_id}")]
    UnknownNode {
        module_id: String,
        domain_id: String,
        node_id: String,
    },

    #[error("Core module cannot be removed: {0}")]
    CoreModuleRemoval(String),
}

pub type Result<T> = std::result::Result<T, ProgressError>;

/// Persisted interaction cursor. The state is kept as a raw string so an
/// unknown value can be detected and reset on restore.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCursor {
    pub interaction_state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_module: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_node: Option<String>,
}

/// File-backed progress storage
pub struct ProgressStorage {
    data_dir: PathBuf,
}

impl ProgressStorage {
    pub fn new(data_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&data_dir)?;
        Ok(Self { data_dir })
    }

    fn progress_path(&self) -> PathBuf {
        self.data_dir.join("progress.json")
    }

    fn cursor_path(&self) -> PathBuf {
        self.data_dir.join("session.json")
    }

    /// Load the saved snapshot, `None` on first run
    pub fn load_snapshot(&self) -> Result<Option<ProgressSnapshot>> {
        read_json(&self.progress_path())
    }

    pub fn save_snapshot(&self, snapshot: &ProgressSnapshot) -> Result<()> {
        write_json(&self.progress_path(), snapshot)
    }

    pub fn load_cursor(&self) -> Result<Option<SessionCursor>> {
        read_json(&self.cursor_path())
    }

    pub fn save_cursor(&self, cursor: &SessionCursor) -> Result<()> {
        write_json(&self.cursor_path(), cursor)
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&content)?))
}

/// Write to a sibling temp file then rename, so readers never see a partial file
fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, serde_json::to_string_pretty(value)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
