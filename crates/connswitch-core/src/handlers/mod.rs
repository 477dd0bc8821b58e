//! Configuration file handlers
//!
//! One handler per file format:
//! - JSON (`.json`): comment-mode text toggling or a structural tree copy
//! - XML (`.config`): structural `<add>` attribute edit in `<connectionStrings>`

use crate::config::EngineConfig;
use crate::error::SwitchError;
use crate::request::SwitchRequest;
use crate::scanner::ConnectionEntry;
use crate::switch::{CommentSwitchReport, SwitchMode};
use serde::Serialize;
use std::fmt;
use std::path::Path;

mod json;
mod xml;

pub use json::JsonConfigHandler;
pub use xml::{XmlConfigHandler, CONNECTION_STRINGS_ELEMENT};

/// File format served by a handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ConfigFormat {
    /// JSON (`appsettings.json` style)
    Json,
    /// XML (`web.config` / `app.config` style)
    Xml,
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("json"),
            Self::Xml => f.write_str("xml"),
        }
    }
}

/// Result of transforming one file's text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerOutput {
    /// New file content
    pub text: String,
    /// Whether `text` differs from the input
    pub changed: bool,
    /// Strategy that was actually applied
    pub applied_mode: SwitchMode,
    /// Comment-mode pass report, if that strategy ran
    pub comment_report: Option<CommentSwitchReport>,
}

/// Format-specific listing and switching over in-memory text
///
/// Handlers never touch the filesystem; the engine owns reading and writing.
pub trait ConfigFileHandler: Send + Sync + 'static {
    /// Format served
    fn format(&self) -> ConfigFormat;

    /// Supported file extensions (without dot, lower case)
    fn extensions(&self) -> &[&str];

    /// Check if this handler serves the given path (case-insensitive)
    fn can_handle(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| {
                self.extensions()
                    .iter()
                    .any(|known| known.eq_ignore_ascii_case(ext))
            })
    }

    /// Strategy this handler applies for a requested mode
    fn effective_mode(&self, requested: SwitchMode) -> SwitchMode {
        requested
    }

    /// Connection strings present in `text`
    ///
    /// # Errors
    /// `SwitchError::InvalidFormat` if the text does not parse
    fn list(&self, text: &str, path: &Path) -> Result<Vec<ConnectionEntry>, SwitchError>;

    /// Apply `request` to `text`
    ///
    /// # Errors
    /// `NotFound`, `EmptyValue`, `InvalidFormat` or `InvalidNamePattern`
    fn switch(&self, text: &str, request: &SwitchRequest) -> Result<HandlerOutput, SwitchError>;
}

/// Handlers selected by file extension
pub struct HandlerRegistry {
    handlers: Vec<Box<dyn ConfigFileHandler>>,
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        default_handlers(&EngineConfig::default())
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handler_count", &self.handlers.len())
            .field("extensions", &self.all_extensions())
            .finish()
    }
}

impl HandlerRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Register a handler; earlier registrations win on overlap
    pub fn register<H: ConfigFileHandler>(&mut self, handler: H) {
        self.handlers.push(Box::new(handler));
    }

    /// Find handler for path
    #[must_use]
    pub fn find_for_path(&self, path: &Path) -> Option<&dyn ConfigFileHandler> {
        self.handlers
            .iter()
            .find(|h| h.can_handle(path))
            .map(|h| &**h)
    }

    /// Get all registered extensions
    #[must_use]
    pub fn all_extensions(&self) -> Vec<&str> {
        self.handlers
            .iter()
            .flat_map(|h| h.extensions())
            .copied()
            .collect()
    }
}

/// Create registry with the built-in JSON and XML handlers
#[must_use]
pub fn default_handlers(config: &EngineConfig) -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();
    registry.register(JsonConfigHandler::new(config));
    registry.register(XmlConfigHandler::new(config));
    registry
}
