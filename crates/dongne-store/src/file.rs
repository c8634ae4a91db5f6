//! Single JSON file baseline backend.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use dongne_core::{Clock, Deal};
use tracing::{debug, error, info, warn};

use crate::baseline::{BaselineRepository, BaselineSnapshot, refresh_due};
use crate::StoreError;

/// File name of the snapshot inside the data directory.
pub const BASELINE_FILE: &str = "realestate-baseline.json";

/// Baseline kept in one JSON file.
///
/// Writes go to a temporary file in the same directory which is then renamed
/// over the target, so a failed write leaves the previous snapshot in place and
/// readers never observe a partial file. Concurrent writers race; the last
/// rename wins.
pub struct JsonFileBaseline {
    path: PathBuf,
    clock: Arc<dyn Clock>,
}

impl JsonFileBaseline {
    pub fn new(path: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self {
            path: path.into(),
            clock,
        }
    }

    /// `<data_dir>/realestate-baseline.json`.
    pub fn in_dir(data_dir: &Path, clock: Arc<dyn Clock>) -> Self {
        Self::new(data_dir.join(BASELINE_FILE), clock)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(io_err)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.write_all(bytes).map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}

#[async_trait]
impl BaselineRepository for JsonFileBaseline {
    async fn read(&self) -> Option<BaselineSnapshot> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no baseline snapshot");
                return None;
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to read baseline");
                return None;
            }
        };
        match serde_json::from_slice::<BaselineSnapshot>(&bytes) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to parse baseline");
                None
            }
        }
    }

    async fn write(&self, deals: &[Deal]) -> Result<BaselineSnapshot, StoreError> {
        let snapshot = BaselineSnapshot::capture(deals.to_vec(), self.clock.now());
        let bytes = serde_json::to_vec_pretty(&snapshot)?;

        let path = self.path.clone();
        let result = tokio::task::spawn_blocking(move || write_atomic(&path, &bytes))
            .await
            .map_err(StoreError::from)
            .and_then(|r| r);
        if let Err(e) = &result {
            error!(path = %self.path.display(), error = %e, "failed to write baseline");
        }
        result?;

        info!(
            path = %self.path.display(),
            deals = snapshot.deals.len(),
            date = %snapshot.captured_date,
            "baseline written"
        );
        Ok(snapshot)
    }

    async fn is_refresh_due(&self) -> bool {
        let snapshot = self.read().await;
        refresh_due(snapshot.as_ref(), self.clock.today())
    }
}
