//! Error types for the financial analyst agent

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

#[derive(Error, Debug)]
pub enum AgentError {

    // =============================
    // Capability-Boundary Errors
    // =============================
    // Every variant below is recovered at the capability boundary and folded
    // into the workflow as a failure-tagged string, never an abort.

    #[error("No data found for '{0}'")]
    NoDataFound(String),

    #[error("Transport fault: {0}")]
    Transport(String),

    #[error("Credential fault: {0}")]
    Credential(String),

    #[error("Generation fault: {0}")]
    Generation(String),

    #[error("Planning error: {0}")]
    Planning(String),

    // =============================
    // Fatal Startup Errors
    // =============================

    #[error("Configuration fault: {0}")]
    Configuration(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AgentError {
    /// Only configuration faults stop the process before serving questions;
    /// everything else degrades to a failure-tagged capability result.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AgentError::Configuration(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_configuration_is_fatal() {
        assert!(AgentError::Configuration("missing key".into()).is_fatal());
        assert!(!AgentError::NoDataFound("FAKE".into()).is_fatal());
        assert!(!AgentError::Transport("timeout".into()).is_fatal());
        assert!(!AgentError::Generation("quota".into()).is_fatal());
    }

    #[test]
    fn test_no_data_names_the_subject() {
        let err = AgentError::NoDataFound("NVDA".into());
        assert!(err.to_string().contains("NVDA"));
    }
}
