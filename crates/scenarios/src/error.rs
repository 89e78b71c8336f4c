//! Error types for scenario execution

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScenarioError {
    /// WebDriver session or command failure
    #[error("Browser error: {0}")]
    Browser(String),

    /// A command outlived its wait; the page behind it may still be loading
    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The comment form never became visible; nothing can be submitted
    #[error("Comment form not available at {url}")]
    FormUnavailable { url: String },

    #[error("Smoke check failed for {endpoint}: {reason}")]
    SmokeCheck { endpoint: String, reason: String },

    #[error("Login failed: {reason}")]
    Login { reason: String },

    #[error(transparent)]
    Core(#[from] wpharness_core::Error),
}

impl ScenarioError {
    pub fn browser(op: &str, target: &str, err: impl std::fmt::Display) -> Self {
        Self::Browser(format!("{op} {target}: {err}"))
    }
}

pub type Result<T> = std::result::Result<T, ScenarioError>;
