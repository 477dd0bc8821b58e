//! Environment labels and block-header classification
//!
//! Block headers are free-text `//` comments such as `// Azure Dev` or
//! `//QA SA`. Classification is a substring heuristic expressed as an
//! ordered rule table; the first rule whose predicate holds names the block.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Deployment environment a connection string can be switched to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnvironmentType {
    /// Development
    Development,
    /// Quality assurance / test
    QA,
    /// Production
    Production,
}

impl EnvironmentType {
    /// All environments in declaration order
    pub const ALL: [Self; 3] = [Self::Development, Self::QA, Self::Production];

    /// Canonical name, used for `{Environment}` substitution
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "Development",
            Self::QA => "QA",
            Self::Production => "Production",
        }
    }
}

impl fmt::Display for EnvironmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown environment name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown environment '{0}' (valid: Development, QA, Production)")]
pub struct ParseEnvironmentError(String);

impl FromStr for EnvironmentType {
    type Err = ParseEnvironmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|env| env.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseEnvironmentError(s.to_string()))
    }
}

/// A single header rule: predicate over the lower-cased comment body
#[derive(Debug, Clone, Copy)]
pub struct HeaderRule {
    /// Label assigned when the predicate holds
    pub label: &'static str,
    /// Predicate over lower-cased comment text
    pub matches: fn(&str) -> bool,
}

fn azure_dev(c: &str) -> bool {
    c.contains("azure") && c.contains("dev")
}

fn azure_qa(c: &str) -> bool {
    c.contains("azure") && c.contains("qa")
}

fn azure_prod(c: &str) -> bool {
    c.contains("azure") && c.contains("prod")
}

fn plain_dev(c: &str) -> bool {
    c.contains("dev") && !c.contains("connection")
}

fn plain_qa(c: &str) -> bool {
    (c.contains("qa") || c.contains("test")) && !c.contains("connection")
}

fn plain_prod(c: &str) -> bool {
    c.contains("prod") && !c.contains("connection")
}

/// Header rules in evaluation order. Azure rules come first so that
/// `Azure Dev` never collapses into the bare `Development` label.
pub const HEADER_RULES: &[HeaderRule] = &[
    HeaderRule { label: "Azure Dev", matches: azure_dev },
    HeaderRule { label: "Azure QA", matches: azure_qa },
    HeaderRule { label: "Azure Prod", matches: azure_prod },
    HeaderRule { label: "Development", matches: plain_dev },
    HeaderRule { label: "QA", matches: plain_qa },
    HeaderRule { label: "Production", matches: plain_prod },
];

/// Comment text that looks like a commented `"key": value` pair
fn looks_like_key_value(c: &str) -> bool {
    c.contains('"') && c.contains(':')
}

/// Classify comment text (marker already stripped) as a block label
#[must_use]
pub fn classify(comment: &str) -> Option<&'static str> {
    let comment = comment.trim().to_lowercase();
    if looks_like_key_value(&comment) {
        return None;
    }
    HEADER_RULES
        .iter()
        .find(|rule| (rule.matches)(&comment))
        .map(|rule| rule.label)
}

/// Block label for a raw line, if it is a `//` header comment
#[must_use]
pub fn header_label(line: &str) -> Option<&'static str> {
    line.trim().strip_prefix("//").and_then(classify)
}

/// Map a free-text label (or entry name) to an environment
#[must_use]
pub fn to_environment_type(label: &str) -> Option<EnvironmentType> {
    let label = label.to_lowercase();
    if label.contains("dev") {
        Some(EnvironmentType::Development)
    } else if label.contains("qa") || label.contains("test") {
        Some(EnvironmentType::QA)
    } else if label.contains("prod") {
        Some(EnvironmentType::Production)
    } else {
        None
    }
}

/// Whether a block label selects `target`
#[must_use]
pub fn block_matches_target(label: &str, target: EnvironmentType) -> bool {
    let label = label.to_lowercase();
    if label.contains(&target.as_str().to_lowercase()) {
        return true;
    }
    match target {
        EnvironmentType::Development => label.contains("dev"),
        EnvironmentType::QA => label.contains("qa") || label.contains("test"),
        EnvironmentType::Production => label.contains("prod"),
    }
}
