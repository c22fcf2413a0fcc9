mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./config.toml",
        "./relaycast.toml",
        "~/.config/relaycast/config.toml",
        "/etc/relaycast/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    // Return default config if no file found
    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if config.proxy.secret.is_empty() {
        anyhow::bail!(
            "proxy.secret is not set; generate one with `relaycast generate-secret`"
        );
    }

    if config.proxy.token_ttl_hours == 0 {
        anyhow::bail!("proxy.token_ttl_hours cannot be 0");
    }

    if let Some(store) = &config.store {
        url::Url::parse(&store.base_url)
            .with_context(|| format!("Invalid store.base_url: {}", store.base_url))?;
    }

    if let Some(base) = &config.server.public_base_url {
        url::Url::parse(base)
            .with_context(|| format!("Invalid server.public_base_url: {}", base))?;
    }

    Ok(())
}
