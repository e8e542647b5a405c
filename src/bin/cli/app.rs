use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;

use tutor_lib::config::TutorConfig;
use tutor_lib::content::Catalog;
use tutor_lib::progress::{ProgressStorage, ProgressTracker, SessionCursor};

/// Shared state for CLI commands, loaded once per invocation
pub struct App {
    pub config: TutorConfig,
    pub data_dir: PathBuf,
    pub catalog: Catalog,
    pub tracker: ProgressTracker,
    pub cursor: Option<SessionCursor>,
}

impl App {
    pub fn new(
        config_path: Option<&Path>,
        data_dir: Option<PathBuf>,
        catalog_path: Option<PathBuf>,
    ) -> Result<Self> {
        let config_path = match config_path {
            Some(path) => path.to_path_buf(),
            None => dirs::config_dir()
                .context("Failed to get config directory")?
                .join("tutor")
                .join("tutor.toml"),
        };
        let config = TutorConfig::load(&config_path)
            .with_context(|| format!("Failed to read config {}", config_path.display()))?;

        let data_dir = data_dir.unwrap_or_else(|| config.data_dir.clone());
        let catalog_path = catalog_path.unwrap_or_else(|| data_dir.join("catalog.json"));
        let catalog = Catalog::load(&catalog_path)
            .with_context(|| format!("Failed to load catalog {}", catalog_path.display()))?;

        let storage = ProgressStorage::new(data_dir.clone())
            .context("Failed to open progress storage")?;
        let snapshot = storage
            .load_snapshot()
            .context("Failed to read progress.json")?;
        let cursor = storage
            .load_cursor()
            .context("Failed to read session.json")?;

        let tracker = ProgressTracker::hydrate(&catalog, snapshot);

        Ok(Self {
            config,
            data_dir,
            catalog,
            tracker,
            cursor,
        })
    }

    pub fn rng(&self) -> StdRng {
        match self.config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}
