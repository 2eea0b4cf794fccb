// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Single-request delivery of an encoded message to the webhook.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::errors::{ConfigError, DispatchError};

/// Acknowledgment returned by the webhook for every request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Receipt {
    #[serde(rename = "errcode", default)]
    pub code: i64,
    #[serde(rename = "errmsg", default)]
    pub message: String,
}

impl Receipt {
    pub fn is_success(&self) -> bool {
        self.code == 0
    }

    /// Turns a non-zero acknowledgment into [`DispatchError::RemoteRejected`].
    pub fn into_result(self) -> Result<(), DispatchError> {
        if self.is_success() {
            return Ok(());
        }
        Err(DispatchError::RemoteRejected {
            code: self.code,
            message: self.message,
        })
    }
}

/// Performs one POST of `payload` to `endpoint`.
///
/// Implementations should give up with [`DispatchError::Cancelled`] as soon as `cancel`
/// fires; the concurrent dispatcher relies on this to stop the remaining work after a
/// fail-fast failure.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        endpoint: &str,
        payload: Bytes,
        cancel: &CancellationToken,
    ) -> Result<Receipt, DispatchError>;
}

/// [`Transport`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(client: reqwest::Client) -> Self {
        HttpTransport { client }
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    async fn exchange(&self, request: reqwest::Request) -> Result<Receipt, DispatchError> {
        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| DispatchError::TransportFailed(e.to_string()))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| DispatchError::ResponseUnreadable(e.to_string()))?;
        debug!("Webhook answered {status} with {} bytes", body.len());

        Ok(serde_json::from_slice::<Receipt>(&body)?)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        endpoint: &str,
        payload: Bytes,
        cancel: &CancellationToken,
    ) -> Result<Receipt, DispatchError> {
        let request = self
            .client
            .post(endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .build()
            .map_err(|e| DispatchError::RequestConstructionFailed(e.to_string()))?;

        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(DispatchError::Cancelled),
            receipt = self.exchange(request) => receipt,
        }
    }
}

/// Builds the HTTP client used for webhook and upload requests.
pub fn build_client(
    https_proxy: Option<&str>,
    timeout: Duration,
) -> Result<reqwest::Client, ConfigError> {
    let mut builder = reqwest::Client::builder()
        .timeout(timeout)
        .pool_idle_timeout(Some(Duration::from_secs(270)))
        .tcp_keepalive(Some(Duration::from_secs(120)));

    if let Some(proxy) = https_proxy {
        debug!("Routing robot requests through proxy {proxy}");
        let proxy = reqwest::Proxy::https(proxy).map_err(|e| ConfigError::InvalidUrl {
            url: proxy.to_string(),
            reason: e.to_string(),
        })?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| ConfigError::HttpClient(e.to_string()))
}
