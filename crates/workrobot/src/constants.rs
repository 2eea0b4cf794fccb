// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// Robot webhook gateway; the robot key travels as the `key` query parameter.
pub const DEFAULT_SEND_GATEWAY: &str = "https://qyapi.weixin.qq.com/cgi-bin/webhook/send";
/// Gateway accepting multipart media uploads for file messages.
pub const DEFAULT_UPLOAD_GATEWAY: &str = "https://qyapi.weixin.qq.com/cgi-bin/webhook/upload_media";

pub const TEXT_MESSAGE_MAX_LENGTH: usize = 2048;
pub const MARKDOWN_MESSAGE_MAX_LENGTH: usize = 4096;
pub const MAX_IMAGE_FILE_SIZE: usize = 2 * 1024 * 1024;
pub const MAX_ARTICLE_COUNT: usize = 8;
/// Upper bound for files read into memory before upload.
pub const MAX_UPLOAD_FILE_SIZE: usize = 20 * 1024 * 1024;

/// Appended to a mention list to notify every group member.
pub const MENTION_ALL: &str = "@all";

pub const DEFAULT_TIMEOUT_SECS: u64 = 5;
