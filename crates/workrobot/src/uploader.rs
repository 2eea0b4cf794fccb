// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Multipart upload of files referenced by file messages.

use std::path::Path;

use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tokio::io::AsyncRead;
use tracing::{debug, error};

use crate::bounded_reader::read_bounded_async;
use crate::constants::MAX_UPLOAD_FILE_SIZE;
use crate::errors::UploadError;

/// Media stored by the robot gateway, valid for three days.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedMedia {
    pub media_id: String,
    pub media_type: String,
    /// Unix timestamp in seconds.
    pub created_at: i64,
}

#[derive(Debug, Deserialize)]
struct UploadReceipt {
    #[serde(rename = "errcode", default)]
    code: i64,
    #[serde(rename = "errmsg", default)]
    message: String,
    #[serde(default)]
    media_id: String,
    #[serde(rename = "type", default)]
    media_type: String,
    #[serde(default)]
    created_at: String,
}

#[derive(Debug, Clone)]
pub struct Uploader {
    client: reqwest::Client,
    endpoint: String,
}

impl Uploader {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Uploader {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Uploads a local file under its own file name.
    pub async fn upload_file(&self, path: impl AsRef<Path>) -> Result<UploadedMedia, UploadError> {
        let path = path.as_ref();
        let file = tokio::fs::File::open(path).await?;
        let file_name = path.file_name().and_then(|name| name.to_str());
        self.upload_reader(file_name, file).await
    }

    /// Reads `reader` into memory, up to 20 MiB, and uploads it.
    pub async fn upload_reader<R: AsyncRead + Unpin>(
        &self,
        file_name: Option<&str>,
        reader: R,
    ) -> Result<UploadedMedia, UploadError> {
        let data = read_bounded_async(reader, MAX_UPLOAD_FILE_SIZE).await?;
        self.upload_bytes(file_name, data).await
    }

    /// Uploads `data` as the `media` form field. Without a file name a random one is used.
    pub async fn upload_bytes(
        &self,
        file_name: Option<&str>,
        data: Vec<u8>,
    ) -> Result<UploadedMedia, UploadError> {
        let file_name = match file_name {
            Some(name) => name.to_string(),
            None => uuid::Uuid::new_v4().to_string(),
        };
        debug!("Uploading {} bytes as {file_name}", data.len());

        let part = Part::bytes(data)
            .file_name(file_name)
            .mime_str("application/octet-stream")
            .map_err(|e| UploadError::Multipart(e.to_string()))?;
        let form = Form::new().part("media", part);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::TransportFailed(e.to_string()))?;
        let body = response
            .bytes()
            .await
            .map_err(|e| UploadError::ResponseUnreadable(e.to_string()))?;

        let receipt: UploadReceipt = serde_json::from_slice(&body)?;
        if receipt.code != 0 {
            error!(
                "Failed to upload media: {}: {}",
                receipt.code, receipt.message
            );
            return Err(UploadError::RemoteRejected {
                code: receipt.code,
                message: receipt.message,
            });
        }

        let created_at = receipt
            .created_at
            .parse::<i64>()
            .map_err(|_| UploadError::InvalidCreatedAt(receipt.created_at.clone()))?;

        Ok(UploadedMedia {
            media_id: receipt.media_id,
            media_type: receipt.media_type,
            created_at,
        })
    }
}
