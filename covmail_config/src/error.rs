use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not find site list at: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Site list already exists at: {}. Please edit it directly.", .0.display())]
    AlreadyExists(PathBuf),

    #[error("Could not parse site list: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Key `{key}` is not allowed for site `{site}`, allowed keys are: {allowed}")]
    DisallowedKey {
        key: String,
        site: String,
        allowed: String,
    },

    #[error("Invalid email pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Cannot find home directory")]
    NoHomeDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
