// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use super::wire::{Payload, TextBody};
use crate::constants::{MENTION_ALL, TEXT_MESSAGE_MAX_LENGTH};
use crate::errors::MessageError;

/// Group members to notify, by name or by mobile number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mention {
    members: Vec<String>,
    mobiles: Vec<String>,
    all: bool,
}

impl Mention {
    pub fn new<M, P>(members: M, mobiles: P, all: bool) -> Self
    where
        M: IntoIterator,
        M::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        Mention {
            members: members.into_iter().map(Into::into).collect(),
            mobiles: mobiles.into_iter().map(Into::into).collect(),
            all,
        }
    }

    pub fn mention_all(&mut self, all: bool) -> &mut Self {
        self.all = all;
        self
    }

    pub fn mention_member(&mut self, member: impl Into<String>) -> &mut Self {
        self.members.push(member.into());
        self
    }

    pub fn mention_mobile(&mut self, mobile: impl Into<String>) -> &mut Self {
        self.mobiles.push(mobile.into());
        self
    }

    pub fn members(&self) -> &[String] {
        &self.members
    }

    pub fn mobiles(&self) -> &[String] {
        &self.mobiles
    }

    pub fn is_all(&self) -> bool {
        self.all
    }

    /// Member and mobile lists as sent on the wire. The `@all` sentinel lands in the
    /// mobile list only when mobiles are the sole mentions; otherwise it joins the
    /// member list.
    fn lists(&self) -> (Vec<&str>, Vec<&str>) {
        let mut members: Vec<&str> = self.members.iter().map(String::as_str).collect();
        let mut mobiles: Vec<&str> = self.mobiles.iter().map(String::as_str).collect();
        if self.all {
            if !mobiles.is_empty() && members.is_empty() {
                mobiles.push(MENTION_ALL);
            } else {
                members.push(MENTION_ALL);
            }
        }
        (members, mobiles)
    }
}

/// Plain text message with optional mentions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Text {
    content: String,
    mention: Mention,
}

impl Text {
    pub fn new(content: impl Into<String>) -> Result<Self, MessageError> {
        let mut text = Text::default();
        text.set_content(content)?;
        Ok(text)
    }

    /// Replaces the content. Content longer than 2048 bytes is rejected and the
    /// previous content is kept.
    pub fn set_content(&mut self, content: impl Into<String>) -> Result<(), MessageError> {
        let content = content.into();
        if content.len() > TEXT_MESSAGE_MAX_LENGTH {
            return Err(MessageError::MessageTooLong {
                length: content.len(),
                limit: TEXT_MESSAGE_MAX_LENGTH,
            });
        }
        self.content = content;
        Ok(())
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn mention(&self) -> &Mention {
        &self.mention
    }

    pub fn mention_mut(&mut self) -> &mut Mention {
        &mut self.mention
    }

    pub fn mention_all(&mut self, all: bool) -> &mut Self {
        self.mention.mention_all(all);
        self
    }

    pub fn mention_member(&mut self, member: impl Into<String>) -> &mut Self {
        self.mention.mention_member(member);
        self
    }

    pub fn mention_mobile(&mut self, mobile: impl Into<String>) -> &mut Self {
        self.mention.mention_mobile(mobile);
        self
    }

    pub(crate) fn payload(&self) -> Payload<'_> {
        let (mentioned_list, mentioned_mobile_list) = self.mention.lists();
        Payload::Text {
            text: TextBody {
                content: &self.content,
                mentioned_list,
                mentioned_mobile_list,
            },
        }
    }
}

impl From<Mention> for Text {
    fn from(mention: Mention) -> Self {
        Text {
            content: String::new(),
            mention,
        }
    }
}
