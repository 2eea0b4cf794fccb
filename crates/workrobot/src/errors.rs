// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

/// Validation failures raised by message builders. The builder is left untouched
/// whenever one of these is returned.
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    #[error("message too long: {length} bytes exceeds the {limit} byte limit")]
    MessageTooLong { length: usize, limit: usize },

    #[error("image too large: exceeds the {limit} byte limit")]
    ImageTooLarge { limit: usize },

    #[error("too many articles: a card holds at most {limit}")]
    TooManyArticles { limit: usize },

    #[error("missing required field: {0}")]
    MissingRequiredField(&'static str),

    #[error("unreadable image source: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures of the size-capped stream ingestion.
#[derive(Debug, thiserror::Error)]
pub enum BoundedReadError {
    #[error("stream exceeds the {limit} byte limit")]
    LimitExceeded { limit: usize },

    #[error("stream read failed: {0}")]
    Io(#[from] std::io::Error),
}

impl From<BoundedReadError> for MessageError {
    fn from(err: BoundedReadError) -> Self {
        match err {
            BoundedReadError::LimitExceeded { limit } => MessageError::ImageTooLarge { limit },
            BoundedReadError::Io(err) => MessageError::Io(err),
        }
    }
}

/// Failures surfaced while delivering messages to the webhook.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("bad request: {0}")]
    RequestConstructionFailed(String),

    #[error("http request failed: {0}")]
    TransportFailed(String),

    #[error("unreadable http response: {0}")]
    ResponseUnreadable(String),

    #[error("wrong http response data: {0}")]
    ResponseMalformed(#[from] serde_json::Error),

    #[error("{code}: {message}")]
    RemoteRejected { code: i64, message: String },

    #[error("delivery cancelled")]
    Cancelled,

    #[error("{}", AggregateDisplay(.0))]
    Aggregate(Vec<DispatchError>),
}

impl DispatchError {
    /// Individual failures carried by this error. A composite yields its members,
    /// any other error yields itself.
    pub fn errors(&self) -> &[DispatchError] {
        match self {
            DispatchError::Aggregate(errors) => errors,
            other => std::slice::from_ref(other),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, DispatchError::Cancelled)
    }

    /// Folds collected failures the way they are reported to callers: nothing for an
    /// empty set, the failure itself for a single one, a composite otherwise.
    pub(crate) fn combine(mut errors: Vec<DispatchError>) -> Option<DispatchError> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(DispatchError::Aggregate(errors)),
        }
    }
}

struct AggregateDisplay<'a>(&'a [DispatchError]);

impl fmt::Display for AggregateDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

/// Failures of the media upload flow.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("cannot read upload source: {0}")]
    Io(#[from] std::io::Error),

    #[error("upload source exceeds the {limit} byte limit")]
    TooLarge { limit: usize },

    #[error("cannot create multipart: {0}")]
    Multipart(String),

    #[error("http request failed: {0}")]
    TransportFailed(String),

    #[error("unreadable http response: {0}")]
    ResponseUnreadable(String),

    #[error("invalid http response: {0}")]
    ResponseMalformed(#[from] serde_json::Error),

    #[error("{code}: {message}")]
    RemoteRejected { code: i64, message: String },

    #[error("invalid created_at response: {0}")]
    InvalidCreatedAt(String),
}

impl From<BoundedReadError> for UploadError {
    fn from(err: BoundedReadError) -> Self {
        match err {
            BoundedReadError::LimitExceeded { limit } => UploadError::TooLarge { limit },
            BoundedReadError::Io(err) => UploadError::Io(err),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}
