//! Error taxonomy.
//!
//! Only failures that reach an operator live here. Missing terrain data and
//! out-of-range water levels are recovered locally and never become errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FloodError {
    /// The configured terrain provider could not be initialized.
    #[error("terrain provider '{provider}' unavailable: {reason}")]
    ProviderUnavailable { provider: String, reason: String },

    #[error("invalid terrain tile: {0}")]
    InvalidTile(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The render loop could not be started, reached, or joined.
    #[error("render loop: {0}")]
    RenderLoop(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FloodError {
    pub fn provider_unavailable<P: ToString, R: ToString>(provider: P, reason: R) -> Self {
        FloodError::ProviderUnavailable {
            provider: provider.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid_tile<T: ToString>(msg: T) -> Self {
        FloodError::InvalidTile(msg.to_string())
    }

    pub fn render_loop<T: ToString>(msg: T) -> Self {
        FloodError::RenderLoop(msg.to_string())
    }
}

pub type FloodResult<T> = Result<T, FloodError>;
