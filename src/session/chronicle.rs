//! Chronicle (exploration) loading
//!
//! Entering the chronicle mode may need the active run's dungeon to be
//! loaded first. While that happens the mode stays `chronicle` and renders a
//! loading view; a failed load can be retried.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The exploration run the user is in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChronicleRun {
    pub run_id: String,
    pub dungeon_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum DungeonLoad {
    #[default]
    NotLoaded,
    Loading,
    Loaded,
    Failed(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChronicleState {
    pub active_run: Option<ChronicleRun>,
    pub load: DungeonLoad,
}

impl ChronicleState {
    /// A load is needed when there is a run whose dungeon is not loaded yet
    pub fn needs_load(&self) -> bool {
        self.active_run.is_some() && !matches!(self.load, DungeonLoad::Loaded | DungeonLoad::Loading)
    }
}

/// Loads dungeon content for a run
#[async_trait]
pub trait ChronicleLoader: Send + Sync {
    async fn load_dungeon(&self, run: &ChronicleRun) -> Result<(), String>;
}
