//! Remove all persisted moderation state: both keys and the nonce record.

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use modcallback::store::{purge_module_state, JsonFileStore};
use modcallback::Config;

fn main() -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    let config = Config::from_env();

    let path = match &config.store_path {
        Some(p) => p,
        None => {
            warn!("store_path_not_configured_nothing_to_purge");
            return Ok(());
        }
    };

    let store = JsonFileStore::open(path)
        .with_context(|| format!("Failed to open store {}", path.display()))?;
    purge_module_state(&store).context("Failed to purge module state")?;

    info!(path = %path.display(), "purge_complete");

    Ok(())
}
