pub mod config;
pub mod error;
pub mod types;

pub use config::{Config, NeisConfig, StoreConfig};
pub use error::{AppError, ConfigError, NetworkError, ReqwestErrorExt, StorageError};
pub use types::{LocaleIdentity, MealSlot, ParseMealSlotError};

use anyhow::Result;

/// Initialize tracing/logging.
///
/// `RUST_LOG` wins when set; otherwise `default_filter` is used.
pub fn init(default_filter: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    tracing::debug!("Gupsik core initialized");
    Ok(())
}
