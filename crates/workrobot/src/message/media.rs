// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use super::wire::{FileBody, Payload};
use crate::uploader::UploadedMedia;

/// File message referring to previously uploaded media.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Media {
    media_id: String,
}

impl Media {
    pub fn new(media_id: impl Into<String>) -> Self {
        Media {
            media_id: media_id.into(),
        }
    }

    pub fn media_id(&self) -> &str {
        &self.media_id
    }

    pub(crate) fn payload(&self) -> Payload<'_> {
        Payload::File {
            file: FileBody {
                media_id: &self.media_id,
            },
        }
    }
}

impl From<UploadedMedia> for Media {
    fn from(uploaded: UploadedMedia) -> Self {
        Media::new(uploaded.media_id)
    }
}
