// Configuration management module
// Handles the TOML config file and validated settings

pub mod settings;

pub use settings::{Config, ConfigError, OllamaConfig, ServerConfig};

/// Get the default data directory (config file, grants file, vector index)
#[inline]
pub fn default_data_dir() -> Result<std::path::PathBuf, ConfigError> {
    Config::default_dir()
}
