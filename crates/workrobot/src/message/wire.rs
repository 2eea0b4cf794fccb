// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Request bodies accepted by the robot webhook.
//! See <https://developer.work.weixin.qq.com/document/path/91770>.

use serde::Serialize;

use super::card::Article;

#[derive(Debug, Serialize)]
#[serde(tag = "msgtype", rename_all = "lowercase")]
pub(crate) enum Payload<'a> {
    Text { text: TextBody<'a> },
    Markdown { markdown: MarkdownBody },
    Image { image: ImageBody<'a> },
    News { news: NewsBody<'a> },
    File { file: FileBody<'a> },
}

#[derive(Debug, Serialize)]
pub(crate) struct TextBody<'a> {
    pub content: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mentioned_list: Vec<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mentioned_mobile_list: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct MarkdownBody {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ImageBody<'a> {
    pub base64: String,
    pub md5: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct NewsBody<'a> {
    pub articles: &'a [Article],
}

#[derive(Debug, Serialize)]
pub(crate) struct FileBody<'a> {
    pub media_id: &'a str,
}

impl Payload<'_> {
    pub(crate) fn to_bytes(&self) -> Vec<u8> {
        // Every field is a string, a list of strings or a struct of those, so serialisation
        // has no failure path.
        #[allow(clippy::expect_used)]
        serde_json::to_vec(self).expect("robot payload serialization is infallible")
    }
}
