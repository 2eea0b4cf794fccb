// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Client for group-chat robot webhooks.
//!
//! Messages are built through typed builders that validate their limits on every
//! mutation, encoded into the webhook wire format, and handed to a [`Dispatcher`]
//! which delivers them either in order or concurrently.

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod bounded_reader;
pub mod client;
pub mod config;
pub mod constants;
pub mod dispatcher;
pub mod errors;
pub mod message;
pub mod segment;
pub mod transport;
pub mod uploader;
pub mod util;

pub use client::{Client, ClientConfig};
pub use config::RobotConfig;
pub use dispatcher::{Dispatcher, FailurePolicy};
pub use errors::{BoundedReadError, ConfigError, DispatchError, MessageError, UploadError};
pub use message::{Article, Card, Image, Markdown, Media, Mention, Message, Text};
pub use segment::Segment;
pub use transport::{HttpTransport, Receipt, Transport};
pub use uploader::{UploadedMedia, Uploader};
