//! Block scanning over raw config lines
//!
//! A block runs from one environment header comment to the next (or EOF).
//! The scanner is a single forward pass carrying one [`ScanState`].

use crate::environment::{header_label, to_environment_type};
use crate::line::{is_commented, LineClassifier};
use serde::Serialize;

/// Label used for entries seen before any header when listing
pub const UNKNOWN_BLOCK: &str = "Unknown";

/// Suffix appended to display names of commented entries
pub const COMMENTED_SUFFIX: &str = " (commented)";

/// A connection string found in a configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionEntry {
    /// Key name (display name for listings)
    pub name: String,
    /// Value, or the redaction placeholder if it could not be recovered
    pub raw_value: String,
    /// Provider, for formats that carry one
    pub provider_name: Option<String>,
    /// Environment inferred from the block label or name
    pub environment: Option<crate::EnvironmentType>,
    /// Whether the entry sits on a commented-out line
    pub is_commented: bool,
}

/// Connection entry together with its position and block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedEntry {
    /// Zero-based line index
    pub line_index: usize,
    /// Parsed entry
    pub entry: ConnectionEntry,
    /// Header label active at this line
    pub block_label: String,
}

/// Mutable state threaded through a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanState {
    current_label: String,
}

impl ScanState {
    /// Start with the given label (empty for "no block yet")
    #[must_use]
    pub fn new(initial_label: impl Into<String>) -> Self {
        Self {
            current_label: initial_label.into(),
        }
    }

    /// Label of the block currently being scanned
    #[inline]
    #[must_use]
    pub fn current_label(&self) -> &str {
        &self.current_label
    }

    /// Feed a line; returns the new label if the line is a header
    pub fn observe_header(&mut self, line: &str) -> Option<&'static str> {
        let label = header_label(line)?;
        self.current_label = label.to_string();
        Some(label)
    }
}

/// Walks lines and yields connection entries tagged with their block
#[derive(Debug, Clone, Default)]
pub struct BlockScanner {
    classifier: LineClassifier,
}

impl BlockScanner {
    /// Create scanner over the given line classifier
    #[must_use]
    pub fn new(classifier: LineClassifier) -> Self {
        Self { classifier }
    }

    /// Line classifier in use
    #[inline]
    #[must_use]
    pub fn classifier(&self) -> &LineClassifier {
        &self.classifier
    }

    /// Scan starting from `initial_label`
    pub fn scan<'a, I>(&self, lines: I, initial_label: &str) -> Vec<ScannedEntry>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut state = ScanState::new(initial_label);
        let mut out = Vec::new();

        for (line_index, line) in lines.into_iter().enumerate() {
            if state.observe_header(line).is_some() {
                continue;
            }
            if !self.classifier.is_connection_line(line) {
                continue;
            }
            let Some((name, raw_value)) = self.classifier.parse(line) else {
                continue;
            };
            let is_commented = is_commented(line);
            let name = if is_commented {
                format!("{name}{COMMENTED_SUFFIX}")
            } else {
                name
            };
            out.push(ScannedEntry {
                line_index,
                entry: ConnectionEntry {
                    name,
                    raw_value,
                    provider_name: None,
                    environment: to_environment_type(state.current_label()),
                    is_commented,
                },
                block_label: state.current_label().to_string(),
            });
        }

        out
    }

    /// Scan for listing: entries before the first header fall in `Unknown`
    pub fn scan_for_listing<'a, I>(&self, lines: I) -> Vec<ScannedEntry>
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.scan(lines, UNKNOWN_BLOCK)
    }
}
