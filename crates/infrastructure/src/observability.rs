//! Tracing initialization.

use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use keyfield_errors::{KeyfieldError, KeyfieldResult};

/// Initializes the tracing subscriber for binaries and integration tests.
///
/// `RUST_LOG` wins when set; otherwise `default_filter` (or `info`)
/// applies. Fails if a global subscriber is already installed, so test
/// harnesses call it behind `Once` and ignore the result.
pub fn init_observability(default_filter: Option<&str>) -> KeyfieldResult<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter.unwrap_or("info")));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().compact())
        .try_init()
        .map_err(|e| KeyfieldError::internal(format!("failed to initialize tracing: {e}")))?;

    info!("observability initialized");
    Ok(())
}
