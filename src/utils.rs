use std::path::PathBuf;

use config::{Environment, File};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{Config, Result};

pub const CONFIG_ENV: &str = "DEPTHSNAP_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "depthsnap.toml";

/// Config file location: `$DEPTHSNAP_CONFIG` or `./depthsnap.toml`
pub fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Load configuration: defaults, then the optional file, then environment
pub fn load_config() -> Result<Config> {
    let path = config_path();
    let config = config::Config::builder()
        .add_source(File::from(path.clone()).required(false))
        .add_source(
            Environment::with_prefix("DEPTHSNAP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize::<Config>()?;

    info!("Configuration loaded (file: {})", path.display());
    Ok(config)
}

/// Install the fmt subscriber; `RUST_LOG` overrides the default filter
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("depthsnap=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .init();
}
