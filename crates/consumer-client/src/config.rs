//! # Client Configuration
//!
//! Endpoints of the remote services and process engine tuning. Every field
//! has a default and can be overridden from the environment.

use pc_02_process_engine::EngineConfig;
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

const DEFAULT_PROCESSENGINE_URL: &str = "http://localhost:8000/processengine";
const DEFAULT_IAM_URL: &str = "http://localhost:8000/iam";
const DEFAULT_MESSAGEBUS_URL: &str = "http://localhost:8000/mb";

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} is not a valid number: {value:?}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("{name} must be an http(s) URL, got {value:?}")]
    InvalidUrl { name: &'static str, value: String },

    #[error("Invalid engine configuration: {0}")]
    Engine(String),
}

/// Complete client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsumerConfig {
    /// Base route of the process engine API.
    pub processengine_url: String,
    /// Base route of the identity service.
    pub iam_url: String,
    /// Endpoint of the message bus.
    pub messagebus_url: String,
    pub engine: EngineConfig,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            processengine_url: DEFAULT_PROCESSENGINE_URL.to_string(),
            iam_url: DEFAULT_IAM_URL.to_string(),
            messagebus_url: DEFAULT_MESSAGEBUS_URL.to_string(),
            engine: EngineConfig::default(),
        }
    }
}

impl ConsumerConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `PC_PROCESSENGINE_URL`: Process engine route
    /// - `PC_IAM_URL`: Identity service route
    /// - `PC_MESSAGEBUS_URL`: Message bus endpoint
    /// - `PC_EVENT_CAPACITY`: Events buffered per subscription
    /// - `PC_PAGE_SIZE`: Default page size of list operations
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source, then validate.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(url) = lookup("PC_PROCESSENGINE_URL") {
            config.processengine_url = url;
        }
        if let Some(url) = lookup("PC_IAM_URL") {
            config.iam_url = url;
        }
        if let Some(url) = lookup("PC_MESSAGEBUS_URL") {
            config.messagebus_url = url;
        }
        if let Some(value) = lookup("PC_EVENT_CAPACITY") {
            config.engine.event_channel_capacity = parse_number("PC_EVENT_CAPACITY", value)?;
        }
        if let Some(value) = lookup("PC_PAGE_SIZE") {
            config.engine.default_page_size = parse_number("PC_PAGE_SIZE", value)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_url("processengine_url", &self.processengine_url)?;
        check_url("iam_url", &self.iam_url)?;
        check_url("messagebus_url", &self.messagebus_url)?;
        self.engine
            .validate()
            .map_err(|e| ConfigError::Engine(e.to_string()))
    }
}

fn parse_number<T: std::str::FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidNumber { name, value })
}

fn check_url(name: &'static str, value: &str) -> Result<(), ConfigError> {
    let has_host = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"))
        .is_some_and(|rest| !rest.is_empty());
    if !has_host {
        return Err(ConfigError::InvalidUrl {
            name,
            value: value.to_string(),
        });
    }
    Ok(())
}
