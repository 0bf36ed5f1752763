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

    let default_paths = [
        "./tileforged.toml",
        "~/.config/tileforged/config.toml",
        "/etc/tileforged/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    let optimize = &config.optimize;

    if !(1..=100).contains(&optimize.quality) {
        anyhow::bail!("Quality must be between 1 and 100, got {}", optimize.quality);
    }

    if optimize.max_size == 0 {
        anyhow::bail!("max_size cannot be 0");
    }

    if optimize.workers == Some(0) {
        anyhow::bail!("workers cannot be 0");
    }

    if optimize.max_decode_pixels == 0 {
        anyhow::bail!("max_decode_pixels cannot be 0");
    }

    if config.discovery.descriptor_extensions.iter().any(|e| e.is_empty()) {
        anyhow::bail!("Descriptor extensions cannot be empty");
    }

    Ok(())
}
