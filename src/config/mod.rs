pub mod settings;

pub use settings::{ApiSettings, Config, LogRotation};

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory holding the config file and, by default, debug logs
pub fn config_dir() -> Result<PathBuf> {
    let dir = dirs::config_dir()
        .context("Failed to get config directory")?
        .join("fabao");

    fs::create_dir_all(&dir).context("Failed to create config directory")?;

    Ok(dir)
}

/// Get the configuration file path
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Load configuration from the default location, writing defaults on first run
pub fn load_or_create_config() -> Result<Config> {
    load_or_create_config_at(&config_path()?)
}

/// Load configuration from `path`, writing defaults there if it does not exist
pub fn load_or_create_config_at(path: &Path) -> Result<Config> {
    if path.exists() {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        return Ok(config);
    }

    let config = Config::default();
    save_config_at(&config, path)?;
    println!("Created default config at: {}", path.display());

    Ok(config)
}

/// Save configuration to `path`
pub fn save_config_at(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
    }
    let content = toml::to_string_pretty(config).context("Failed to serialize config")?;
    fs::write(path, content)
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;
    Ok(())
}
