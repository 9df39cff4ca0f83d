use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config.toml: {0}")]
    LoadError(#[from] config::ConfigError),
}
