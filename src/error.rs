// Error taxonomy for the dashboard core
use crate::domain::period::Period;
use thiserror::Error;

/// Message shown when a request failed without a usable server message.
pub const GENERIC_FETCH_MESSAGE: &str = "failed to load dashboard data";

/// Failures that end a load attempt. Every variant surfaces to the renderer
/// as `FetchState::Error(message)`.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FetchError {
    #[error("identifier not found")]
    AbsentIdentity,

    #[error("configuration error: {0}")]
    Configuration(String),

    /// Non-success HTTP status. Holds the server message, or a status-coded
    /// fallback when the body carried none.
    #[error("{0}")]
    Request(String),

    #[error("request failed: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("no annual data found for this user")]
    NoData,
}

impl FetchError {
    /// Human-readable message placed into the error state.
    pub fn message(&self) -> String {
        match self {
            FetchError::Request(message) if message.trim().is_empty() => {
                GENERIC_FETCH_MESSAGE.to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Transport(err.to_string())
    }
}

/// Renderer commands the controller refuses without touching its state.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ViewError {
    #[error("dashboard is not ready for period selection")]
    NotReady,

    #[error("period {0} is not available for this entity")]
    UnknownPeriod(Period),
}
