//! Connection string engine
//!
//! Owns file IO around the pure handlers: resolve the handler by extension,
//! check the file exists, read it whole, transform in memory and write the
//! result back once.

use crate::config::EngineConfig;
use crate::error::SwitchError;
use crate::handlers::{default_handlers, ConfigFileHandler, ConfigFormat, HandlerRegistry};
use crate::request::SwitchRequest;
use crate::scanner::ConnectionEntry;
use crate::switch::{CommentSwitchReport, SwitchMode};
use std::path::{Path, PathBuf};

/// Result of a successful switch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchOutcome {
    /// File that was processed
    pub path: PathBuf,
    /// Format of the handler that processed it
    pub format: ConfigFormat,
    /// Strategy actually applied (XML always reports `Default`)
    pub mode: SwitchMode,
    /// Whether the file was rewritten
    pub changed: bool,
    /// Block report for comment-mode switches
    pub comment_report: Option<CommentSwitchReport>,
}

/// Lists and switches connection strings in configuration files
#[derive(Debug)]
pub struct ConnectionStringEngine {
    registry: HandlerRegistry,
    config: EngineConfig,
}

impl Default for ConnectionStringEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl ConnectionStringEngine {
    /// Create engine with the built-in handlers
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            registry: default_handlers(&config),
            config,
        }
    }

    /// Create engine with a custom handler registry
    #[must_use]
    pub fn with_registry(config: EngineConfig, registry: HandlerRegistry) -> Self {
        Self { registry, config }
    }

    /// Engine configuration
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Check that `path` has a supported extension and exists
    ///
    /// The extension is checked first, without touching the filesystem.
    ///
    /// # Errors
    /// `SwitchError::UnsupportedFormat` or `SwitchError::FileNotFound`
    pub async fn preflight(&self, path: &Path) -> Result<&dyn ConfigFileHandler, SwitchError> {
        let handler = self.handler_for(path)?;
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(SwitchError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        Ok(handler)
    }

    /// Switch the request's file to the target environment
    ///
    /// The file is only rewritten when its content changes, via a temporary
    /// sibling file renamed over the original.
    ///
    /// # Errors
    /// Any [`SwitchError`]; on error the file is left untouched
    pub async fn switch(&self, request: &SwitchRequest) -> Result<SwitchOutcome, SwitchError> {
        let path = request.file_path.as_path();
        let handler = self.handler_for(path)?;
        let mode = handler.effective_mode(request.mode);
        if mode == SwitchMode::Default {
            request.source_key()?;
        }
        self.preflight(path).await?;

        let text = read_text(path).await?;
        let output = handler.switch(&text, request)?;

        if output.changed {
            write_atomic(path, &output.text).await?;
        } else {
            tracing::debug!("{} already up to date; not rewritten", path.display());
        }
        tracing::info!(
            "Switched {} to {} ({} mode, changed: {})",
            path.display(),
            request.target_environment,
            output.applied_mode,
            output.changed
        );

        Ok(SwitchOutcome {
            path: path.to_path_buf(),
            format: handler.format(),
            mode: output.applied_mode,
            changed: output.changed,
            comment_report: output.comment_report,
        })
    }

    /// Connection strings defined in `path`, commented ones included
    ///
    /// # Errors
    /// `UnsupportedFormat`, `FileNotFound`, `Io` or `InvalidFormat`
    pub async fn list(&self, path: impl AsRef<Path>) -> Result<Vec<ConnectionEntry>, SwitchError> {
        let path = path.as_ref();
        let handler = self.preflight(path).await?;
        let text = read_text(path).await?;
        let entries = handler.list(&text, path)?;
        tracing::debug!("Found {} connection strings in {}", entries.len(), path.display());
        Ok(entries)
    }

    fn handler_for(&self, path: &Path) -> Result<&dyn ConfigFileHandler, SwitchError> {
        self.registry
            .find_for_path(path)
            .ok_or_else(|| SwitchError::UnsupportedFormat {
                extension: path
                    .extension()
                    .map(|e| e.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            })
    }
}

async fn read_text(path: &Path) -> Result<String, SwitchError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| SwitchError::io_error(path, e))
}

/// Replace the file behind `path` with `text`
///
/// Symlinks are followed so the link survives, and the replacement keeps the
/// original's permissions. Read-only files are refused.
async fn write_atomic(path: &Path, text: &str) -> Result<(), SwitchError> {
    let target = tokio::fs::canonicalize(path)
        .await
        .map_err(|e| SwitchError::io_error(path, e))?;
    let permissions = tokio::fs::metadata(&target)
        .await
        .map_err(|e| SwitchError::io_error(&target, e))?
        .permissions();
    if permissions.readonly() {
        return Err(SwitchError::io_error(
            &target,
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "file is read-only"),
        ));
    }

    let mut name = target.as_os_str().to_os_string();
    name.push(format!(".tmp.{}", std::process::id()));
    let temp = PathBuf::from(name);

    if let Err(e) = replace_with(&temp, &target, text, permissions).await {
        // Best effort; the original file is still intact
        let _ = tokio::fs::remove_file(&temp).await;
        return Err(e);
    }
    Ok(())
}

async fn replace_with(
    temp: &Path,
    target: &Path,
    text: &str,
    permissions: std::fs::Permissions,
) -> Result<(), SwitchError> {
    tokio::fs::write(temp, text)
        .await
        .map_err(|e| SwitchError::io_error(temp, e))?;
    tokio::fs::set_permissions(temp, permissions)
        .await
        .map_err(|e| SwitchError::io_error(temp, e))?;
    tokio::fs::rename(temp, target)
        .await
        .map_err(|e| SwitchError::io_error(target, e))
}
