// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::fmt::Display;

use super::wire::{MarkdownBody, Payload};
use crate::constants::MARKDOWN_MESSAGE_MAX_LENGTH;
use crate::errors::MessageError;
use crate::segment::Segment;

const LINE_SEPARATOR: &str = "\n";

/// Markdown message assembled line by line.
///
/// Each accepted line is charged its own length plus one separator byte against the
/// 4096 byte budget.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markdown {
    len: usize,
    lines: Vec<String>,
}

impl Markdown {
    pub fn new() -> Self {
        Markdown::default()
    }

    /// Builds a message from rendered items, one line each.
    pub fn from_lines<I>(lines: I) -> Result<Self, MessageError>
    where
        I: IntoIterator,
        I::Item: Display,
    {
        let mut markdown = Markdown::new();
        for line in lines {
            markdown.add_line(line.to_string())?;
        }
        Ok(markdown)
    }

    /// Replaces everything with a single raw markdown document.
    pub fn set_raw_content(&mut self, raw: impl Into<String>) -> Result<(), MessageError> {
        let raw = raw.into();
        if raw.len() > MARKDOWN_MESSAGE_MAX_LENGTH {
            return Err(MessageError::MessageTooLong {
                length: raw.len(),
                limit: MARKDOWN_MESSAGE_MAX_LENGTH,
            });
        }
        self.len = raw.len();
        self.lines = vec![raw];
        Ok(())
    }

    pub fn add_line(&mut self, line: impl Into<String>) -> Result<(), MessageError> {
        let line = line.into();
        let len = self.len + line.len() + LINE_SEPARATOR.len();
        if len > MARKDOWN_MESSAGE_MAX_LENGTH {
            return Err(MessageError::MessageTooLong {
                length: len,
                limit: MARKDOWN_MESSAGE_MAX_LENGTH,
            });
        }
        self.len = len;
        self.lines.push(line);
        Ok(())
    }

    pub fn add_segment(&mut self, segment: Segment) -> Result<(), MessageError> {
        self.add_line(String::from(segment))
    }

    /// Bytes charged against the limit so far.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when nothing has been charged against the limit.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn content(&self) -> String {
        self.lines.join(LINE_SEPARATOR)
    }

    pub(crate) fn payload(&self) -> Payload<'_> {
        Payload::Markdown {
            markdown: MarkdownBody {
                content: self.content(),
            },
        }
    }
}
