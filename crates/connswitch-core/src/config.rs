//! Engine configuration
//!
//! Every field has a default, so an absent or partial TOML file is valid.

use crate::error::SwitchError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Placeholder substituted with the environment name in name patterns
pub const ENVIRONMENT_PLACEHOLDER: &str = "{Environment}";

/// Value reported when a connection line has no recoverable value
pub const REDACTED_VALUE: &str = "***";

/// Tunables shared by the handlers and the CLI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Literal key names always treated as connection entries, in match order
    pub known_keys: Vec<String>,
    /// Pattern used when the caller does not supply one
    pub default_name_pattern: String,
    /// Destination key for default-mode switches
    pub default_destination: String,
    /// `providerName` written for XML sources that carry none
    pub default_provider: String,
    /// Connection-string keys masked when listing
    pub sensitive_keys: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            known_keys: vec![
                "SysSetupConnection".to_string(),
                "AvbobPoetryConnection".to_string(),
            ],
            default_name_pattern: format!("{ENVIRONMENT_PLACEHOLDER}Connection"),
            default_destination: "DefaultConnection".to_string(),
            default_provider: "System.Data.SqlClient".to_string(),
            sensitive_keys: ["password", "pwd", "user id", "uid"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl EngineConfig {
    /// Parse from TOML text
    ///
    /// # Errors
    /// Returns `SwitchError::Config` if the TOML is invalid
    pub fn from_toml_str(text: &str) -> Result<Self, SwitchError> {
        toml::from_str(text).map_err(|e| SwitchError::Config(e.to_string()))
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// Returns `SwitchError::Config` if the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SwitchError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| SwitchError::Config(format!("cannot read {}: {e}", path.display())))?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!("Loaded engine config from {}", path.display());
        Ok(config)
    }
}
