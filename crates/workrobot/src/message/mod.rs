// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Message kinds accepted by the robot webhook.
//!
//! Every builder validates its limits when it is mutated, so a [`Message`] that exists
//! is always encodable. Encoding is pure: the same message yields the same bytes on
//! every call.

mod card;
mod image;
mod markdown;
mod media;
mod text;
pub(crate) mod wire;

pub use card::{Article, Card};
pub use image::Image;
pub use markdown::Markdown;
pub use media::Media;
pub use text::{Mention, Text};

use bytes::Bytes;

/// A message ready to be delivered.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Text(Text),
    Markdown(Markdown),
    Image(Image),
    Card(Card),
    Media(Media),
}

impl Message {
    /// Wire discriminant sent as `msgtype`.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Text(_) => "text",
            Message::Markdown(_) => "markdown",
            Message::Image(_) => "image",
            Message::Card(_) => "news",
            Message::Media(_) => "file",
        }
    }

    /// JSON body for the webhook.
    pub fn encode(&self) -> Bytes {
        let payload = match self {
            Message::Text(text) => text.payload(),
            Message::Markdown(markdown) => markdown.payload(),
            Message::Image(image) => image.payload(),
            Message::Card(card) => card.payload(),
            Message::Media(media) => media.payload(),
        };
        Bytes::from(payload.to_bytes())
    }
}

impl From<Text> for Message {
    fn from(text: Text) -> Self {
        Message::Text(text)
    }
}

impl From<Mention> for Message {
    fn from(mention: Mention) -> Self {
        Message::Text(Text::from(mention))
    }
}

impl From<Markdown> for Message {
    fn from(markdown: Markdown) -> Self {
        Message::Markdown(markdown)
    }
}

impl From<Image> for Message {
    fn from(image: Image) -> Self {
        Message::Image(image)
    }
}

impl From<Card> for Message {
    fn from(card: Card) -> Self {
        Message::Card(card)
    }
}

impl From<Media> for Message {
    fn from(media: Media) -> Self {
        Message::Media(media)
    }
}
