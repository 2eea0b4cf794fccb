// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::env;
use std::time::Duration;

use crate::constants::{DEFAULT_SEND_GATEWAY, DEFAULT_TIMEOUT_SECS, DEFAULT_UPLOAD_GATEWAY};
use crate::errors::ConfigError;
use crate::util::{self, parse_robot_key};

/// Configuration for a robot client
#[derive(Debug, Clone)]
pub struct RobotConfig {
    /// Robot key issued when the robot was added to the group
    pub key: Option<String>,
    /// Full webhook address, used instead of the key when set
    pub webhook: Option<String>,
    /// Gateway the key is appended to for sending messages
    pub send_gateway: String,
    /// Gateway the key is appended to for media uploads
    pub upload_gateway: String,
    /// HTTPS proxy URL
    pub https_proxy: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Log level (e.g., trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            key: None,
            webhook: None,
            send_gateway: DEFAULT_SEND_GATEWAY.to_string(),
            upload_gateway: DEFAULT_UPLOAD_GATEWAY.to_string(),
            https_proxy: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            log_level: "info".to_string(),
        }
    }
}

impl RobotConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Create configuration from any variable source; `lookup` returns `None` for unset names.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let key = lookup("WORKROBOT_KEY").and_then(|val| parse_robot_key(&val));
        let webhook = lookup("WORKROBOT_WEBHOOK")
            .map(|val| val.trim().to_string())
            .filter(|val| !val.is_empty());
        let upload_gateway = lookup("WORKROBOT_UPLOAD_GATEWAY")
            .map(|val| val.trim().to_string())
            .filter(|val| !val.is_empty())
            .unwrap_or(defaults.upload_gateway);
        let https_proxy = lookup("WORKROBOT_PROXY_HTTPS").or_else(|| lookup("HTTPS_PROXY"));
        let timeout_secs = match lookup("WORKROBOT_TIMEOUT_SECS") {
            Some(val) => val.trim().parse::<u64>().map_err(|_| {
                ConfigError::InvalidConfig(format!(
                    "WORKROBOT_TIMEOUT_SECS must be a whole number of seconds, got '{val}'"
                ))
            })?,
            None => defaults.timeout_secs,
        };
        let log_level = lookup("WORKROBOT_LOG_LEVEL")
            .map(|val| val.to_lowercase())
            .unwrap_or(defaults.log_level);

        let config = Self {
            key,
            webhook,
            send_gateway: defaults.send_gateway,
            upload_gateway,
            https_proxy,
            timeout_secs,
            log_level,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.key.is_none() && self.webhook.is_none() {
            return Err(ConfigError::InvalidConfig(
                "either WORKROBOT_KEY or WORKROBOT_WEBHOOK must be set".to_string(),
            ));
        }

        if let Some(webhook) = &self.webhook {
            util::parse_endpoint(webhook)?;
        }
        util::parse_endpoint(&self.send_gateway)?;
        util::parse_endpoint(&self.upload_gateway)?;

        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidConfig(
                "timeout must be greater than 0".to_string(),
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.log_level.as_str()) {
            return Err(ConfigError::InvalidConfig(format!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.log_level
            )));
        }

        Ok(())
    }

    /// Address messages are posted to. An explicit webhook wins over the key.
    pub fn webhook_url(&self) -> Result<String, ConfigError> {
        if let Some(webhook) = &self.webhook {
            return util::parse_endpoint(webhook);
        }
        util::webhook_url(&self.send_gateway, self.robot_key()?.as_str())
    }

    /// Address media is uploaded to, keyed by the configured key or the key found in the webhook.
    pub fn upload_url(&self) -> Result<String, ConfigError> {
        util::upload_url(&self.upload_gateway, self.robot_key()?.as_str())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn robot_key(&self) -> Result<String, ConfigError> {
        self.key
            .clone()
            .or_else(|| self.webhook.as_deref().and_then(util::key_from_webhook))
            .ok_or_else(|| {
                ConfigError::InvalidConfig("no robot key configured or found in webhook".to_string())
            })
    }
}
