// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::io::Read;

use base64::{engine::general_purpose::STANDARD, Engine};
use md5::{Digest, Md5};
use tokio::io::AsyncRead;

use super::wire::{ImageBody, Payload};
use crate::bounded_reader::{read_bounded, read_bounded_async};
use crate::constants::MAX_IMAGE_FILE_SIZE;
use crate::errors::MessageError;

/// Image message holding at most 2 MiB of raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    data: Vec<u8>,
    md5: String,
}

impl Image {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, MessageError> {
        let data = read_bounded(reader, MAX_IMAGE_FILE_SIZE)?;
        Ok(Image::with_digest(data))
    }

    pub async fn from_async_reader<R: AsyncRead + Unpin>(reader: R) -> Result<Self, MessageError> {
        let data = read_bounded_async(reader, MAX_IMAGE_FILE_SIZE).await?;
        Ok(Image::with_digest(data))
    }

    pub async fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, MessageError> {
        let file = tokio::fs::File::open(path).await?;
        Image::from_async_reader(file).await
    }

    pub fn from_bytes(data: Vec<u8>) -> Result<Self, MessageError> {
        if data.len() > MAX_IMAGE_FILE_SIZE {
            return Err(MessageError::ImageTooLarge {
                limit: MAX_IMAGE_FILE_SIZE,
            });
        }
        Ok(Image::with_digest(data))
    }

    fn with_digest(data: Vec<u8>) -> Self {
        let md5 = format!("{:x}", Md5::digest(&data));
        Image { data, md5 }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Lowercase hex MD5 of the raw bytes.
    pub fn md5(&self) -> &str {
        &self.md5
    }

    pub(crate) fn payload(&self) -> Payload<'_> {
        Payload::Image {
            image: ImageBody {
                base64: STANDARD.encode(&self.data),
                md5: &self.md5,
            },
        }
    }
}
