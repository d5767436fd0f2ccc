//! File-backed configuration store.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{debug, instrument};

use keyfield_domain::repositories::ConfigRepository;
use keyfield_errors::{KeyfieldError, KeyfieldResult};

/// Stores the raw serialized configuration in a single JSON file.
///
/// Concrete stand-in for the host platform's configuration persistence
/// endpoint: an absent file means nothing has been persisted yet.
pub struct FileConfigRepository {
    path: PathBuf,
}

impl FileConfigRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ConfigRepository for FileConfigRepository {
    #[instrument(skip(self))]
    async fn load(&self) -> KeyfieldResult<Option<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => {
                debug!(path = %self.path.display(), bytes = raw.len(), "configuration read");
                Ok(Some(raw))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(KeyfieldError::config_store(format!(
                "failed to read {}: {e}",
                self.path.display()
            ))),
        }
    }

    #[instrument(skip(self, raw))]
    async fn save(&self, raw: &str) -> KeyfieldResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                KeyfieldError::config_store(format!(
                    "failed to create {}: {e}",
                    parent.display()
                ))
            })?;
        }
        tokio::fs::write(&self.path, raw).await.map_err(|e| {
            KeyfieldError::config_store(format!(
                "failed to write {}: {e}",
                self.path.display()
            ))
        })?;
        debug!(path = %self.path.display(), bytes = raw.len(), "configuration written");
        Ok(())
    }
}
