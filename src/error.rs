use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Credentials error: {0}")]
    Auth(String),

    /// Error envelope returned by the platform API.
    #[error("API error ({status}) {reason}: {message}")]
    Api {
        status: u16,
        reason: String,
        message: String,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn is_playlist_not_found(&self) -> bool {
        matches!(self, AppError::Api { reason, .. } if reason == "playlistNotFound")
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, AppError::Http(e) if e.is_timeout())
    }
}
