//! Startup configuration
//!
//! Both API credentials are resolved exactly once at process start. A missing
//! secret is a fatal configuration fault — the agent refuses to serve any
//! question rather than failing later inside a capability call.

use crate::error::AgentError;
use crate::Result;
use std::env;

pub const GEMINI_API_KEY_VAR: &str = "GEMINI_API_KEY";
pub const NEWS_API_KEY_VAR: &str = "NEWS_API_KEY";

/// Opaque secrets the agent is constructed with.
#[derive(Debug, Clone)]
pub struct Settings {
    pub gemini_api_key: String,
    pub news_api_key: String,
}

impl Settings {
    /// Load settings from `.env` and the process environment.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let gemini_api_key = require_var(GEMINI_API_KEY_VAR)?;
        let news_api_key = require_var(NEWS_API_KEY_VAR)?;

        Ok(Self {
            gemini_api_key,
            news_api_key,
        })
    }
}

fn require_var(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AgentError::Configuration(format!(
            "{} is not set. Add it to your environment or .env file before starting the agent.",
            name
        ))),
    }
}
