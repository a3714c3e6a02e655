pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
pub mod store;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::AppConfig;
use crate::error::AppError;
use crate::services::AcademyService;
use crate::store::{MemoryStore, SqliteStore};

/// A running academy backend and the resources it must release on shutdown.
pub struct Academy {
    service: AcademyService,
    snapshot: Option<(MemoryStore, PathBuf)>,
}

impl Academy {
    /// Opens the store named by the config: SQLite when a database URL is set,
    /// otherwise an in-memory store, restored from `snapshot_path` if present.
    pub async fn open(config: &AppConfig) -> Result<Self, AppError> {
        if let Some(url) = &config.database_url {
            if config.snapshot_path.is_some() {
                warn!("SNAPSHOT_PATH is ignored when DATABASE_URL is set");
            }
            let store = SqliteStore::connect(url, config.max_connections).await?;
            return Ok(Self {
                service: AcademyService::new(Arc::new(store)),
                snapshot: None,
            });
        }

        info!("DATABASE_URL not set, using in-memory store");
        let (store, snapshot) = match &config.snapshot_path {
            Some(path) => {
                let store = MemoryStore::load(path).await?;
                (store.clone(), Some((store, path.clone())))
            }
            None => (MemoryStore::new(), None),
        };
        Ok(Self {
            service: AcademyService::new(Arc::new(store)),
            snapshot,
        })
    }

    pub fn service(&self) -> AcademyService {
        self.service.clone()
    }

    /// Saves the in-memory state when a snapshot path is configured.
    pub async fn close(self) -> Result<(), AppError> {
        if let Some((store, path)) = self.snapshot {
            store.save(&path).await?;
        }
        Ok(())
    }
}
