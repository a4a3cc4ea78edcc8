/// Configuration loading and access helpers
///
/// The parsed configuration lives in a process-wide `OnceCell<RwLock<Config>>`
/// for collaborators that want it. Core components receive their sections
/// explicitly at construction time.
use super::schemas::Config;
use crate::logger::{self, LogTag};
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use std::path::Path;

pub static CONFIG: OnceCell<RwLock<Config>> = OnceCell::new();

/// Default configuration file path
pub const CONFIG_FILE_PATH: &str = "data/config.toml";

/// Environment variable overriding the configuration path
pub const CONFIG_PATH_ENV: &str = "CRYPTO_VOLUME_CONFIG";

pub fn config_path() -> String {
    std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| CONFIG_FILE_PATH.to_string())
}

/// Parse a configuration file; a missing file yields the defaults
pub fn read_config_file(path: &str) -> Result<Config, String> {
    if !Path::new(path).exists() {
        logger::warning(
            LogTag::Config,
            &format!("Config file '{}' not found, using default values", path),
        );
        return Ok(Config::default());
    }

    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file '{}': {}", path, e))?;

    toml::from_str::<Config>(&contents)
        .map_err(|e| format!("Failed to parse config file '{}': {}", path, e))
}

/// Load configuration from the default location and initialize the global
pub fn load_config() -> Result<(), String> {
    load_config_from_path(&config_path())
}

pub fn load_config_from_path(path: &str) -> Result<(), String> {
    let config = read_config_file(path)?;

    CONFIG
        .set(RwLock::new(config))
        .map_err(|_| "Config already initialized".to_string())?;

    logger::info(LogTag::Config, &format!("Configuration loaded from {}", path));
    Ok(())
}

/// Re-read the file and atomically replace the global configuration
pub fn reload_config_from_path(path: &str) -> Result<(), String> {
    let new_config = read_config_file(path)?;

    match CONFIG.get() {
        Some(lock) => {
            *lock.write() = new_config;
            Ok(())
        }
        None => Err("Config not initialized. Call load_config() first.".to_string()),
    }
}

/// Clone of the global configuration (defaults if never loaded)
pub fn get_config_clone() -> Config {
    CONFIG
        .get()
        .map(|lock| lock.read().clone())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_missing_file_gives_defaults() {
        let config = read_config_file("/nonexistent/crypto-volume.toml").unwrap();
        assert_eq!(config.exchanges.timeout_seconds, 10);
    }

    #[test]
    fn test_read_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[cache]\nvolume_ttl_secs = 15\nshared_enabled = true").unwrap();

        let config = read_config_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.cache.volume_ttl_secs, 15);
        assert!(config.cache.shared_enabled);
        assert_eq!(config.cache.historical_ttl_secs, 600);
    }

    #[test]
    fn test_read_invalid_file_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[cache\nvolume_ttl_secs = ").unwrap();

        let err = read_config_file(file.path().to_str().unwrap()).unwrap_err();
        assert!(err.contains("Failed to parse"));
    }
}
