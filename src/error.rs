use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TourError {
    #[error("API key not configured. Set DATA_GO_KR_API_KEY or api.key in the config file.")]
    NoApiKey,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    #[error("API error ({code}): {message}")]
    Api { code: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Required file not found: {}", .0.display())]
    MissingOutput(PathBuf),

    #[error("Store connection lost: {0}")]
    StoreDisconnected(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("{0}")]
    Other(String),
}

impl TourError {
    /// Get user-friendly hint for the error
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::NoApiKey => Some(
                "Request a service key at https://www.data.go.kr and export it as DATA_GO_KR_API_KEY."
                    .to_string(),
            ),
            Self::Network(_) => Some("Check your internet connection and try again.".to_string()),
            Self::Http { status, .. } if *status == 401 || *status == 403 => {
                Some("Check that the service key is valid and activated for this API.".to_string())
            }
            Self::Http { status, .. } if *status == 429 => Some(
                "The daily request quota is exhausted. Re-run later; cached raw data is reused by --transform-only."
                    .to_string(),
            ),
            Self::MissingOutput(_) => Some(
                "Run the earlier stage first (--step 1 produces regions.json and categories.json)."
                    .to_string(),
            ),
            Self::StoreDisconnected(_) => {
                Some("The store kept dropping the connection. Try again later.".to_string())
            }
            _ => None,
        }
    }

    /// Whether a bulk write failing with this error may be retried
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::StoreDisconnected(_))
    }
}

pub type Result<T> = std::result::Result<T, TourError>;
