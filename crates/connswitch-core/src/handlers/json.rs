//! JSON configuration handler
//!
//! Comment mode works on the raw lines so that formatting and comments
//! survive; default mode edits a parsed tree and re-renders it.

use crate::config::EngineConfig;
use crate::error::SwitchError;
use crate::handlers::{ConfigFileHandler, ConfigFormat, HandlerOutput};
use crate::line::LineClassifier;
use crate::request::SwitchRequest;
use crate::scanner::{BlockScanner, ConnectionEntry};
use crate::switch::default::{parse_json_or_json5, strip_utf8_bom};
use crate::switch::{CommentModeSwitcher, DefaultModeSwitcher, RenderStyle, SwitchMode, TextLines};
use std::path::Path;

/// Handler for `.json` files
#[derive(Debug, Clone)]
pub struct JsonConfigHandler {
    scanner: BlockScanner,
    default_destination: String,
}

impl JsonConfigHandler {
    /// Create handler from engine configuration
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            scanner: BlockScanner::new(LineClassifier::new(config.known_keys.iter().cloned())),
            default_destination: config.default_destination.clone(),
        }
    }

    fn switch_comment(&self, text: &str, request: &SwitchRequest) -> HandlerOutput {
        let split = TextLines::split(text);
        let output = CommentModeSwitcher::new(self.scanner.classifier())
            .apply(split.lines.iter().copied(), request.target_environment);
        let changed = output.report.changed();
        let text = if changed {
            split.join(&output.lines)
        } else {
            text.to_string()
        };
        tracing::debug!(
            "Comment mode: {} blocks, {} commented, {} uncommented",
            output.report.blocks.len(),
            output.report.commented,
            output.report.uncommented
        );
        HandlerOutput {
            text,
            changed,
            applied_mode: SwitchMode::Comment,
            comment_report: Some(output.report),
        }
    }

    fn switch_default(&self, text: &str, request: &SwitchRequest) -> Result<HandlerOutput, SwitchError> {
        let source_key = request.source_key()?;
        let destination_key = request.destination_key(&self.default_destination);

        let (body, _) = strip_utf8_bom(text);
        let (mut doc, used_json5) = parse_json_or_json5(body)
            .map_err(|message| SwitchError::invalid_format(&request.file_path, message))?;
        if used_json5 {
            tracing::debug!("Parsed {} with JSON5 fallback", request.file_path.display());
        }

        let changed = DefaultModeSwitcher::apply(&mut doc, &source_key, destination_key)?;
        tracing::debug!("Copied {} into {} (changed: {})", source_key, destination_key, changed);

        let text = if changed {
            RenderStyle::detect(text)
                .render(&doc)
                .map_err(|e| SwitchError::invalid_format(&request.file_path, e.to_string()))?
        } else {
            text.to_string()
        };

        Ok(HandlerOutput {
            text,
            changed,
            applied_mode: SwitchMode::Default,
            comment_report: None,
        })
    }
}

impl Default for JsonConfigHandler {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl ConfigFileHandler for JsonConfigHandler {
    fn format(&self) -> ConfigFormat {
        ConfigFormat::Json
    }

    fn extensions(&self) -> &[&str] {
        &["json"]
    }

    fn list(&self, text: &str, _path: &Path) -> Result<Vec<ConnectionEntry>, SwitchError> {
        let (body, _) = strip_utf8_bom(text);
        let split = TextLines::split(body);
        Ok(self
            .scanner
            .scan_for_listing(split.lines.iter().copied())
            .into_iter()
            .map(|scanned| scanned.entry)
            .collect())
    }

    fn switch(&self, text: &str, request: &SwitchRequest) -> Result<HandlerOutput, SwitchError> {
        match self.effective_mode(request.mode) {
            SwitchMode::Comment => Ok(self.switch_comment(text, request)),
            SwitchMode::Default => self.switch_default(text, request),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EnvironmentType;
    use pretty_assertions::assert_eq;

    const BLOCKS: &str = r#"{
  "ConnectionStrings": {
    // Azure Dev
    //"DevConnection": "server=a",
    // Azure Prod
    "ProdConnection": "server=b"
  }
}
"#;

    const TREE: &str = r#"{
    "Logging": {
        "LogLevel": "Warning"
    },
    "ConnectionStrings": {
        "DevelopmentConnection": "server=dev",
        "QAConnection": "server=qa",
        "ProductionConnection": "server=prod"
    }
}
"#;

    #[test]
    fn comment_mode_switches_blocks() {
        let handler = JsonConfigHandler::default();
        let request = SwitchRequest::new("appsettings.json", EnvironmentType::Development)
            .with_mode(SwitchMode::Comment);

        let output = handler.switch(BLOCKS, &request).unwrap();
        assert!(output.changed);
        assert_eq!(
            output.text,
            r#"{
  "ConnectionStrings": {
    // Azure Dev
    "DevConnection": "server=a",
    // Azure Prod
    //"ProdConnection": "server=b"
  }
}
"#
        );
    }

    #[test]
    fn default_mode_inserts_destination_and_keeps_layout() {
        let handler = JsonConfigHandler::default();
        let request = SwitchRequest::new("appsettings.json", EnvironmentType::QA);

        let output = handler.switch(TREE, &request).unwrap();
        assert_eq!(
            output.text,
            r#"{
    "Logging": {
        "LogLevel": "Warning"
    },
    "ConnectionStrings": {
        "DevelopmentConnection": "server=dev",
        "QAConnection": "server=qa",
        "ProductionConnection": "server=prod",
        "DefaultConnection": "server=qa"
    }
}
"#
        );
    }

    #[test]
    fn default_mode_honors_custom_destination() {
        let handler = JsonConfigHandler::default();
        let request = SwitchRequest::new("appsettings.json", EnvironmentType::Production)
            .with_target_connection("ActiveConnection");

        let output = handler.switch(TREE, &request).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&output.text).unwrap();
        assert_eq!(doc["ConnectionStrings"]["ActiveConnection"], "server=prod");
        assert!(doc["ConnectionStrings"].get("DefaultConnection").is_none());
    }

    #[test]
    fn default_mode_invalid_json() {
        let handler = JsonConfigHandler::default();
        let request = SwitchRequest::new("broken.json", EnvironmentType::QA);
        let err = handler.switch("{ \"ConnectionStrings\": ", &request).unwrap_err();
        assert!(matches!(err, SwitchError::InvalidFormat { .. }));
    }

    #[test]
    fn list_reports_commented_entries() {
        let handler = JsonConfigHandler::default();
        let entries = handler.list(BLOCKS, Path::new("appsettings.json")).unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["DevConnection (commented)", "ProdConnection"]);
        assert_eq!(entries[1].environment, Some(EnvironmentType::Production));
    }
}
