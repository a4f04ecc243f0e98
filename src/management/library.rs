use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::{
    config,
    error::SyncError,
    types::{LibrarySnapshot, Track},
};

/// Somewhere the library snapshot can be kept between phases.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn load(&self) -> Result<LibrarySnapshot, SyncError>;
    async fn save(&self, snapshot: &LibrarySnapshot) -> Result<(), SyncError>;
}

/// Keeps the snapshot as a JSON list of `{id, artist, genres}` records.
pub struct LibraryManager {
    path: PathBuf,
}

impl LibraryManager {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_env() -> Self {
        Self::new(config::library_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SnapshotStore for LibraryManager {
    async fn load(&self) -> Result<LibrarySnapshot, SyncError> {
        let content = async_fs::read_to_string(&self.path)
            .await
            .map_err(|e| SyncError::Snapshot(format!("cannot read {}: {}", self.path.display(), e)))?;
        let tracks: Vec<Track> = serde_json::from_str(&content).map_err(|e| {
            SyncError::Snapshot(format!("cannot parse {}: {}", self.path.display(), e))
        })?;
        Ok(LibrarySnapshot::from_tracks(tracks))
    }

    async fn save(&self, snapshot: &LibrarySnapshot) -> Result<(), SyncError> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await.map_err(|e| {
                SyncError::Snapshot(format!("cannot create {}: {}", parent.display(), e))
            })?;
        }

        let json = serde_json::to_string_pretty(&snapshot.tracks)
            .map_err(|e| SyncError::Snapshot(e.to_string()))?;
        async_fs::write(&self.path, json)
            .await
            .map_err(|e| SyncError::Snapshot(format!("cannot write {}: {}", self.path.display(), e)))
    }
}
