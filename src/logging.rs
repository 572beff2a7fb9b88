use eyre::{
    Context as _,
    Result,
};
use tracing_subscriber::{
    prelude::*,
    EnvFilter,
};

/// Initialize tracing for host binaries embedding this crate.
pub fn log_init() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(tracing_error::ErrorLayer::default())
        .with(tracing_subscriber::fmt::layer().with_filter(filter))
        .try_init()
        .context("Failed to initialize tracing subscriber")
}
