//! Landing area storage

use crate::error::{IngestError, IngestResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lb_core::LandingPath;
use std::path::{Path, PathBuf};

/// Landing path for a payload received from `application` at `received_at`.
///
/// Files are named `<app>-splineOutput-<YYYY-MM-DD_HH_MM_SS_ffffff>.json` and
/// partitioned by application and date.
pub fn landing_path_for(
    zone: &str,
    source: &str,
    application: &str,
    received_at: DateTime<Utc>,
) -> LandingPath {
    let date = received_at.format("%Y-%m-%d").to_string();
    let stamp = received_at.format("%Y-%m-%d_%H_%M_%S_%6f");
    LandingPath::new(
        zone,
        source,
        application,
        date,
        format!("{application}-splineOutput-{stamp}.json"),
    )
}

/// Where received payloads are written
#[async_trait]
pub trait LandingStore: Send + Sync {
    /// Write a payload, returning the location it was stored at
    async fn write(&self, path: &LandingPath, data: &[u8]) -> IngestResult<PathBuf>;
}

/// Landing store on the local filesystem
#[derive(Debug, Clone)]
pub struct FsLandingStore {
    root: PathBuf,
}

impl FsLandingStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem location of a landing path
    pub fn resolve(&self, path: &LandingPath) -> PathBuf {
        self.root.join(path.to_string())
    }
}

#[async_trait]
impl LandingStore for FsLandingStore {
    async fn write(&self, path: &LandingPath, data: &[u8]) -> IngestResult<PathBuf> {
        let target = self.resolve(path);
        let write_error = |source: std::io::Error| IngestError::LandingWrite {
            path: target.display().to_string(),
            source,
        };
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(write_error)?;
        }
        tokio::fs::write(&target, data).await.map_err(write_error)?;
        log::info!("Landed {} bytes at {}", data.len(), target.display());
        Ok(target)
    }
}
