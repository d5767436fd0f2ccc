use thiserror::Error;

/// Errors produced by the configuration editor backend.
///
/// Every variant carries its context as an owned message and the enum derives
/// `Clone`, so a single failed in-flight metadata fetch can hand the same
/// error to every caller attached to it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyfieldError {
    #[error("metadata provider unavailable: {0}")]
    ProviderUnavailable(String),
    #[error("malformed persisted configuration: {0}")]
    MalformedConfig(String),
    #[error("configuration store error: {0}")]
    ConfigStore(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("internal error: {0}")]
    Internal(String),
}

pub type KeyfieldResult<T> = Result<T, KeyfieldError>;

impl KeyfieldError {
    pub fn provider_unavailable<S: Into<String>>(msg: S) -> Self {
        Self::ProviderUnavailable(msg.into())
    }
    pub fn malformed_config<S: Into<String>>(msg: S) -> Self {
        Self::MalformedConfig(msg.into())
    }
    pub fn config_store<S: Into<String>>(msg: S) -> Self {
        Self::ConfigStore(msg.into())
    }
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        Self::Serialization(msg.into())
    }
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether retrying the failed operation can reasonably succeed.
    ///
    /// Provider and store failures are transient by assumption; malformed
    /// data and serialization failures are not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            KeyfieldError::ProviderUnavailable(_) | KeyfieldError::ConfigStore(_)
        )
    }

    /// Whether the failure ends the editing session. Nothing does: every
    /// failure degrades to missing options or an empty document.
    pub fn is_fatal(&self) -> bool {
        false
    }
}

impl From<serde_json::Error> for KeyfieldError {
    fn from(err: serde_json::Error) -> Self {
        KeyfieldError::Serialization(err.to_string())
    }
}
