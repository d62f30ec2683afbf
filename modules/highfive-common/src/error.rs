use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not get parameter {0}")]
    NotFound(String),

    #[error("Invalid value for parameter {key}: {message}")]
    Invalid { key: String, message: String },

    #[error("Failed to read config file {path}: {message}")]
    File { path: String, message: String },
}
