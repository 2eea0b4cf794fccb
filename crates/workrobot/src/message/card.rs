// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

use super::wire::{NewsBody, Payload};
use crate::constants::MAX_ARTICLE_COUNT;
use crate::errors::MessageError;

/// One entry of a news card. `title` and `url` are required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub description: String,
    pub url: String,
    pub picurl: String,
}

impl Article {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Article {
            title: title.into(),
            url: url.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_picurl(mut self, picurl: impl Into<String>) -> Self {
        self.picurl = picurl.into();
        self
    }
}

/// Card of linked articles, at most 8.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Card {
    articles: Vec<Article>,
}

impl Card {
    pub fn new() -> Self {
        Card::default()
    }

    pub fn from_articles<I>(articles: I) -> Result<Self, MessageError>
    where
        I: IntoIterator<Item = Article>,
    {
        let mut card = Card::new();
        for article in articles {
            card.add_article(article)?;
        }
        Ok(card)
    }

    pub fn add_article(&mut self, article: Article) -> Result<(), MessageError> {
        if self.articles.len() >= MAX_ARTICLE_COUNT {
            return Err(MessageError::TooManyArticles {
                limit: MAX_ARTICLE_COUNT,
            });
        }
        if article.title.is_empty() {
            return Err(MessageError::MissingRequiredField("title"));
        }
        if article.url.is_empty() {
            return Err(MessageError::MissingRequiredField("url"));
        }

        self.articles.push(article);
        Ok(())
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub(crate) fn payload(&self) -> Payload<'_> {
        Payload::News {
            news: NewsBody {
                articles: &self.articles,
            },
        }
    }
}
