// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Inline markdown fragments understood by the robot markdown renderer.
//!
//! ```
//! use workrobot::segment::{bold, color_green, title};
//!
//! assert_eq!(title(3, "Server Closed").to_string(), "### Server Closed");
//! assert_eq!(color_green(bold("ok")).to_string(), r#"<font color="info">**ok**</font>"#);
//! ```

use std::fmt::{self, Display};

pub const MAXIMAL_TITLE: i32 = 1;
pub const MEDIUM_TITLE: i32 = 3;
pub const MINIMUM_TITLE: i32 = 6;

/// A rendered piece of markdown text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Segment(String);

impl Segment {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Segment {
    fn from(s: &str) -> Self {
        Segment(s.to_string())
    }
}

impl From<String> for Segment {
    fn from(s: String) -> Self {
        Segment(s)
    }
}

impl From<Segment> for String {
    fn from(s: Segment) -> Self {
        s.0
    }
}

/// Heading of the given level, clamped into `1..=6`.
pub fn title(level: i32, text: impl Display) -> Segment {
    let level = level.clamp(MAXIMAL_TITLE, MINIMUM_TITLE) as usize;
    Segment(format!("{} {text}", "#".repeat(level)))
}

pub fn link(title: impl Display, url: impl Display) -> Segment {
    Segment(format!("[{title}]({url})"))
}

pub fn bold(text: impl Display) -> Segment {
    Segment(format!("**{text}**"))
}

pub fn code(code: impl Display) -> Segment {
    Segment(format!("`{code}`"))
}

/// Quote block; every line of `text` gets its own `> ` marker.
pub fn quote(text: impl Display) -> Segment {
    Segment(format!("> {}", text.to_string().replace('\n', "\n> ")))
}

pub fn color_green(text: impl Display) -> Segment {
    colored("info", text)
}

pub fn color_gray(text: impl Display) -> Segment {
    colored("comment", text)
}

pub fn color_red(text: impl Display) -> Segment {
    colored("warning", text)
}

fn colored(color: &str, text: impl Display) -> Segment {
    Segment(format!(r#"<font color="{color}">{text}</font>"#))
}

/// Concatenates the rendered items with `sep` in between.
pub fn join<I>(sep: &str, items: I) -> Segment
where
    I: IntoIterator,
    I::Item: Display,
{
    let rendered: Vec<String> = items.into_iter().map(|item| item.to_string()).collect();
    Segment(rendered.join(sep))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_level_is_clamped() {
        assert_eq!(title(-10, "t").as_str(), "# t");
        assert_eq!(title(0, "t").as_str(), "# t");
        assert_eq!(title(MEDIUM_TITLE, "t").as_str(), "### t");
        assert_eq!(title(6, "t").as_str(), "###### t");
        assert_eq!(title(10, "t").as_str(), "###### t");
    }

    #[test]
    fn test_link() {
        assert_eq!(
            link("hello world", "https://example.com").as_str(),
            "[hello world](https://example.com)"
        );
    }

    #[test]
    fn test_bold_and_code() {
        assert_eq!(bold("hello world").as_str(), "**hello world**");
        assert_eq!(code("package main").as_str(), "`package main`");
    }

    #[test]
    fn test_quote_prefixes_every_line() {
        assert_eq!(quote("hello\nworld\nend").as_str(), "> hello\n> world\n> end");
    }

    #[test]
    fn test_colors_wrap_nested_segments() {
        assert_eq!(
            color_green(bold("hello")).as_str(),
            r#"<font color="info">**hello**</font>"#
        );
        assert_eq!(
            color_gray(bold("hello")).as_str(),
            r#"<font color="comment">**hello**</font>"#
        );
        assert_eq!(
            color_red("hello").as_str(),
            r#"<font color="warning">hello</font>"#
        );
    }

    #[test]
    fn test_join_mixed_items() {
        let joined = join(" | ", [bold("a").to_string(), "b".to_string(), 3.to_string()]);
        assert_eq!(joined.as_str(), "**a** | b | 3");
    }
}
