//! Switch requests
//!
//! A request is built by the caller (usually the CLI) and consumed by
//! [`crate::ConnectionStringEngine::switch`].

use crate::config::ENVIRONMENT_PLACEHOLDER;
use crate::environment::EnvironmentType;
use crate::error::SwitchError;
use crate::switch::SwitchMode;
use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};
use std::path::PathBuf;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\{environment\}").expect("static regex is valid"));

/// Everything needed to switch one file to one environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchRequest {
    /// Configuration file to rewrite
    pub file_path: PathBuf,
    /// Environment to activate
    pub target_environment: EnvironmentType,
    /// Source key template, e.g. `{Environment}Connection`
    pub name_pattern: String,
    /// Destination key; the configured default when `None`
    pub target_connection_name: Option<String>,
    /// Switching strategy
    pub mode: SwitchMode,
}

impl SwitchRequest {
    /// Create request with default pattern, destination and mode
    #[must_use]
    pub fn new(file_path: impl Into<PathBuf>, target_environment: EnvironmentType) -> Self {
        Self {
            file_path: file_path.into(),
            target_environment,
            name_pattern: format!("{ENVIRONMENT_PLACEHOLDER}Connection"),
            target_connection_name: None,
            mode: SwitchMode::Default,
        }
    }

    /// Set the source key template
    #[must_use]
    pub fn with_name_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.name_pattern = pattern.into();
        self
    }

    /// Set the destination key
    #[must_use]
    pub fn with_target_connection(mut self, name: impl Into<String>) -> Self {
        self.target_connection_name = Some(name.into());
        self
    }

    /// Set the switching strategy
    #[must_use]
    pub fn with_mode(mut self, mode: SwitchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Source key derived from the name pattern
    ///
    /// The placeholder is matched case-insensitively; every occurrence is
    /// replaced with the environment's canonical name.
    ///
    /// # Errors
    /// `SwitchError::InvalidNamePattern` if the pattern has no placeholder
    pub fn source_key(&self) -> Result<String, SwitchError> {
        if !PLACEHOLDER.is_match(&self.name_pattern) {
            return Err(SwitchError::InvalidNamePattern {
                pattern: self.name_pattern.clone(),
            });
        }
        Ok(PLACEHOLDER
            .replace_all(&self.name_pattern, NoExpand(self.target_environment.as_str()))
            .into_owned())
    }

    /// Destination key, falling back to `default` when unset or empty
    #[must_use]
    pub fn destination_key<'a>(&'a self, default: &'a str) -> &'a str {
        self.target_connection_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(default)
    }
}
