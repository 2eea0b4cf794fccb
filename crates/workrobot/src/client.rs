// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Entry point bundling the dispatcher and uploader for one robot.

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::RobotConfig;
use crate::constants::{DEFAULT_SEND_GATEWAY, DEFAULT_TIMEOUT_SECS, DEFAULT_UPLOAD_GATEWAY};
use crate::dispatcher::{Dispatcher, FailurePolicy};
use crate::errors::{ConfigError, DispatchError};
use crate::message::Message;
use crate::transport::{build_client, HttpTransport};
use crate::uploader::Uploader;
use crate::util;

/// Explicit endpoints and HTTP client for a [`Client`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub webhook: String,
    pub upload_endpoint: String,
    pub http_client: reqwest::Client,
}

#[derive(Debug, Clone)]
pub struct Client {
    dispatcher: Dispatcher<HttpTransport>,
    uploader: Uploader,
}

impl Client {
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        let webhook = util::parse_endpoint(&config.webhook)?;
        let upload_endpoint = util::parse_endpoint(&config.upload_endpoint)?;

        let transport = HttpTransport::new(config.http_client);
        let uploader = Uploader::new(transport.client().clone(), upload_endpoint);

        Ok(Client {
            dispatcher: Dispatcher::new(transport, webhook),
            uploader,
        })
    }

    /// Client for `key` on the default gateways.
    pub fn from_key(key: &str) -> Result<Self, ConfigError> {
        let key = util::parse_robot_key(key)
            .ok_or_else(|| ConfigError::InvalidConfig(format!("invalid robot key '{key}'")))?;
        Self::new(ClientConfig {
            webhook: util::webhook_url(DEFAULT_SEND_GATEWAY, &key)?,
            upload_endpoint: util::upload_url(DEFAULT_UPLOAD_GATEWAY, &key)?,
            http_client: build_client(None, std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))?,
        })
    }

    pub fn from_robot_config(config: &RobotConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let http_client = build_client(config.https_proxy.as_deref(), config.timeout())?;
        let client = Self::new(ClientConfig {
            webhook: config.webhook_url()?,
            upload_endpoint: config.upload_url()?,
            http_client,
        })?;
        debug!("Robot client ready, timeout {:?}", config.timeout());
        Ok(client)
    }

    pub fn webhook(&self) -> &str {
        self.dispatcher.endpoint()
    }

    pub fn dispatcher(&self) -> &Dispatcher<HttpTransport> {
        &self.dispatcher
    }

    pub fn uploader(&self) -> &Uploader {
        &self.uploader
    }

    pub async fn send(&self, messages: &[Message]) -> Result<(), DispatchError> {
        self.dispatcher.send(messages).await
    }

    pub async fn send_with_cancel(
        &self,
        messages: &[Message],
        cancel: &CancellationToken,
    ) -> Result<(), DispatchError> {
        self.dispatcher.send_with_cancel(messages, cancel).await
    }

    pub async fn send_concurrent(
        &self,
        messages: &[Message],
        policy: FailurePolicy,
    ) -> Result<(), DispatchError> {
        self.dispatcher.send_concurrent(messages, policy).await
    }

    pub async fn send_concurrent_with_cancel(
        &self,
        messages: &[Message],
        policy: FailurePolicy,
        cancel: &CancellationToken,
    ) -> Result<(), DispatchError> {
        self.dispatcher
            .send_concurrent_with_cancel(messages, policy, cancel)
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_key_uses_default_gateways() {
        let client = Client::from_key("test-case").unwrap();
        assert_eq!(
            client.webhook(),
            "https://qyapi.weixin.qq.com/cgi-bin/webhook/send?key=test-case"
        );
        assert_eq!(
            client.uploader().endpoint(),
            "https://qyapi.weixin.qq.com/cgi-bin/webhook/upload_media?key=test-case&type=file"
        );
    }

    #[test]
    fn test_dispatcher_targets_webhook() {
        let client = Client::from_key("test-case").unwrap();
        let dispatcher = client.dispatcher().clone();
        assert_eq!(dispatcher.endpoint(), client.webhook());
    }

    #[test]
    fn test_from_key_rejects_invalid_key() {
        assert!(matches!(
            Client::from_key("not a key"),
            Err(ConfigError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_new_rejects_invalid_webhook() {
        let result = Client::new(ClientConfig {
            webhook: "ftp://example.com/send".to_string(),
            upload_endpoint: DEFAULT_UPLOAD_GATEWAY.to_string(),
            http_client: reqwest::Client::new(),
        });
        assert!(matches!(result, Err(ConfigError::InvalidUrl { .. })));
    }

    #[test]
    fn test_from_robot_config() {
        let config = RobotConfig {
            webhook: Some("https://work.example.com/hook?key=from-hook".to_string()),
            ..Default::default()
        };
        let client = Client::from_robot_config(&config).unwrap();
        assert_eq!(client.webhook(), "https://work.example.com/hook?key=from-hook");
        assert!(client.uploader().endpoint().contains("key=from-hook"));
    }

    #[test]
    fn test_from_robot_config_invalid() {
        assert!(Client::from_robot_config(&RobotConfig::default()).is_err());
    }
}
