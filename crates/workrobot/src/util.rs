// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Utility functions for robot keys and gateway addresses.

use reqwest::Url;

use crate::errors::ConfigError;

/// Parses and validates a robot key.
///
/// A valid key must:
/// - Not be empty or contain only whitespace
/// - Contain only ASCII alphanumerics or hyphens
///
/// Whitespace is automatically trimmed from the input.
///
/// # Examples
///
/// ```
/// use workrobot::util::parse_robot_key;
///
/// assert_eq!(
///     parse_robot_key(" 693a91f6-7xxx-4bc4-97a0-0ec2sifa5aaa "),
///     Some("693a91f6-7xxx-4bc4-97a0-0ec2sifa5aaa".to_string())
/// );
/// assert_eq!(parse_robot_key(""), None);
/// assert_eq!(parse_robot_key("key&type=file"), None);
/// ```
pub fn parse_robot_key(key: &str) -> Option<String> {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(invalid_char) = trimmed
        .chars()
        .find(|&ch| !ch.is_ascii_alphanumeric() && ch != '-')
    {
        tracing::error!(
            "WORKROBOT_KEY contains invalid character '{}'. Only ASCII alphanumerics and hyphens are allowed. Ignoring key.",
            invalid_char
        );
        return None;
    }

    Some(trimmed.to_string())
}

/// Webhook address for `key` on `gateway`: the gateway with a `key` query parameter.
pub fn webhook_url(gateway: &str, key: &str) -> Result<String, ConfigError> {
    with_query(gateway, &[("key", key)])
}

/// Media upload address for `key` on `gateway`.
pub fn upload_url(gateway: &str, key: &str) -> Result<String, ConfigError> {
    with_query(gateway, &[("key", key), ("type", "file")])
}

/// Extracts the robot key from a full webhook address.
pub fn key_from_webhook(webhook: &str) -> Option<String> {
    let url = Url::parse(webhook).ok()?;
    url.query_pairs()
        .find(|(name, _)| name == "key")
        .map(|(_, value)| value.into_owned())
}

/// Checks that `url` parses as an absolute http(s) URL and returns its normalised form.
pub fn parse_endpoint(url: &str) -> Result<String, ConfigError> {
    parse_http_url(url).map(String::from)
}

fn parse_http_url(url: &str) -> Result<Url, ConfigError> {
    let parsed = Url::parse(url).map_err(|e| ConfigError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }
    Ok(parsed)
}

fn with_query(gateway: &str, params: &[(&str, &str)]) -> Result<String, ConfigError> {
    let mut url = parse_http_url(gateway)?;
    url.query_pairs_mut().extend_pairs(params);
    Ok(url.into())
}
