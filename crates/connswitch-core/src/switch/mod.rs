//! Switching strategies
//!
//! - [`comment`]: line-level `//` toggling between environment blocks
//! - [`default`]: structural copy of one entry into a destination key
//!
//! The strategy is chosen once per request through [`SwitchMode`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod comment;
pub mod default;

pub use comment::{BlockSummary, CommentModeSwitcher, CommentSwitchOutput, CommentSwitchReport};
pub use default::{DefaultModeSwitcher, RenderStyle};

/// How a switch is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwitchMode {
    /// Copy the environment's entry into the destination key
    #[default]
    Default,
    /// Toggle comment markers so only the environment's block is active
    Comment,
}

impl SwitchMode {
    /// Lower-case mode name
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Comment => "comment",
        }
    }
}

impl fmt::Display for SwitchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown mode name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown mode '{0}' (valid: default, comment)")]
pub struct ParseModeError(String);

impl FromStr for SwitchMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "comment" => Ok(Self::Comment),
            _ => Err(ParseModeError(s.to_string())),
        }
    }
}

/// Text split into lines with enough layout info to rejoin it exactly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLines<'a> {
    /// Lines without terminators
    pub lines: Vec<&'a str>,
    /// Dominant line terminator
    pub newline: &'static str,
}

impl<'a> TextLines<'a> {
    /// Split on `\n`, dropping a trailing `\r` from each line
    #[must_use]
    pub fn split(text: &'a str) -> Self {
        let newline = if text.contains("\r\n") { "\r\n" } else { "\n" };
        let lines = text
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .collect();
        Self { lines, newline }
    }

    /// Join rewritten lines with the original terminator
    #[must_use]
    pub fn join<S: AsRef<str>>(&self, lines: &[S]) -> String {
        let mut out = String::new();
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                out.push_str(self.newline);
            }
            out.push_str(line.as_ref());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_from_str() {
        assert_eq!("Comment".parse(), Ok(SwitchMode::Comment));
        assert_eq!("default".parse(), Ok(SwitchMode::Default));
        assert!("toggle".parse::<SwitchMode>().is_err());
    }

    #[test]
    fn text_lines_roundtrip_lf() {
        let text = "{\n  \"a\": 1\n}\n";
        let split = TextLines::split(text);
        assert_eq!(split.lines, vec!["{", "  \"a\": 1", "}", ""]);
        assert_eq!(split.join(&split.lines), text);
    }

    #[test]
    fn text_lines_roundtrip_crlf() {
        let text = "{\r\n  \"a\": 1\r\n}";
        let split = TextLines::split(text);
        assert_eq!(split.newline, "\r\n");
        assert_eq!(split.join(&split.lines), text);
    }
}
