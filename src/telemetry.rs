//! Process-wide log subscriber.

use std::sync::OnceLock;

use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Error)]
#[error("failed to install log subscriber: {0}")]
pub struct TelemetryError(String);

static INIT: OnceLock<Result<(), TelemetryError>> = OnceLock::new();

/// Install the fmt subscriber once. Later calls return the first outcome.
///
/// The filter comes from `RUST_LOG`, defaulting to `info`.
pub fn init() -> Result<(), TelemetryError> {
    INIT.get_or_init(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .try_init()
            .map_err(|e| TelemetryError(e.to_string()))
    })
    .clone()
}
