use thiserror::Error;

pub type Result<T> = std::result::Result<T, HighFiveError>;

#[derive(Debug, Error)]
pub enum HighFiveError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },
}

impl From<reqwest::Error> for HighFiveError {
    fn from(err: reqwest::Error) -> Self {
        HighFiveError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for HighFiveError {
    fn from(err: serde_json::Error) -> Self {
        HighFiveError::Parse(err.to_string())
    }
}
