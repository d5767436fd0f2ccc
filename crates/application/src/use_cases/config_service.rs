//! Translation between the persisted configuration shape and the in-memory
//! document.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use keyfield_domain::{ConfigRepository, ConfigurationDocument};
use keyfield_errors::{KeyfieldError, KeyfieldResult};

/// Envelope of the persisted configuration:
/// `{"config": {"settings": [{"app": ..., "primaryKeyField": ...}]}}`.
/// The shape is stable across sessions.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedConfig {
    config: ConfigurationDocument,
}

/// Loads and saves the configuration document through the persistence
/// port.
pub struct ConfigService {
    repository: Arc<dyn ConfigRepository>,
}

impl ConfigService {
    pub fn new(repository: Arc<dyn ConfigRepository>) -> Self {
        Self { repository }
    }

    /// The persisted document, or the empty document when nothing has been
    /// persisted yet or the persisted data is malformed. Only transport
    /// failures propagate: a corrupt store must not prevent the editor
    /// from starting.
    #[instrument(skip(self))]
    pub async fn load_document(&self) -> KeyfieldResult<ConfigurationDocument> {
        let Some(raw) = self.repository.load().await? else {
            info!("no persisted configuration, starting from an empty document");
            return Ok(ConfigurationDocument::default());
        };
        match parse_document(&raw) {
            Ok(document) => {
                info!(rows = document.len(), "configuration loaded");
                Ok(document)
            }
            Err(error) => {
                warn!(%error, "starting from an empty document");
                Ok(ConfigurationDocument::default())
            }
        }
    }

    /// Serializes the document into the persisted shape and stores it.
    #[instrument(skip_all)]
    pub async fn save_document(&self, document: &ConfigurationDocument) -> KeyfieldResult<()> {
        let persisted = PersistedConfig {
            config: document.clone(),
        };
        let raw = serde_json::to_string(&persisted)
            .map_err(|e| KeyfieldError::serialization(e.to_string()))?;
        self.repository.save(&raw).await?;
        info!(rows = document.len(), "configuration saved");
        Ok(())
    }
}

/// Parses raw persisted JSON into a document, reporting malformed data
/// (bad JSON or missing shape) as [`KeyfieldError::MalformedConfig`].
fn parse_document(raw: &str) -> KeyfieldResult<ConfigurationDocument> {
    serde_json::from_str::<PersistedConfig>(raw)
        .map(|persisted| persisted.config)
        .map_err(|e| KeyfieldError::malformed_config(e.to_string()))
}
