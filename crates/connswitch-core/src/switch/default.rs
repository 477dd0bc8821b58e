//! Default-mode switching over a JSON tree
//!
//! Copies `ConnectionStrings.<source>` into `ConnectionStrings.<destination>`
//! and re-renders the document in the file's own layout (indent unit,
//! newline style, trailing newline, BOM).

use crate::error::SwitchError;
use serde::Serialize;
use serde_json::Value;

/// Name of the JSON section holding connection strings
pub const CONNECTION_STRINGS_SECTION: &str = "ConnectionStrings";

/// Structural value copy between two connection string keys
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultModeSwitcher;

impl DefaultModeSwitcher {
    /// Deep-copy `source_key` into `destination_key`
    ///
    /// Returns whether the destination value changed. A destination that
    /// already exists keeps its position in the section.
    ///
    /// # Errors
    /// `SwitchError::NotFound` if the section or the source key is absent
    pub fn apply(
        tree: &mut Value,
        source_key: &str,
        destination_key: &str,
    ) -> Result<bool, SwitchError> {
        let section = tree
            .get_mut(CONNECTION_STRINGS_SECTION)
            .and_then(Value::as_object_mut)
            .ok_or_else(|| SwitchError::NotFound(format!("{CONNECTION_STRINGS_SECTION} section")))?;

        let value = section
            .get(source_key)
            .cloned()
            .ok_or_else(|| SwitchError::key_not_found(source_key))?;

        if section.get(destination_key) == Some(&value) {
            return Ok(false);
        }
        section.insert(destination_key.to_string(), value);
        Ok(true)
    }
}

/// Parse strict JSON, falling back to JSON5 for comments and trailing commas
///
/// Returns the document and whether the fallback was needed.
///
/// # Errors
/// Returns both parser messages when neither accepts the text
pub fn parse_json_or_json5(text: &str) -> Result<(Value, bool), String> {
    match serde_json::from_str::<Value>(text) {
        Ok(doc) => Ok((doc, false)),
        Err(json_error) => match json5::from_str::<Value>(text) {
            Ok(doc) => Ok((doc, true)),
            Err(json5_error) => Err(format!("{json_error}; json5: {json5_error}")),
        },
    }
}

/// Layout of the original file, reapplied when rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderStyle {
    indent: Vec<u8>,
    newline: &'static str,
    trailing_newline: bool,
    had_bom: bool,
}

impl RenderStyle {
    /// Detect layout from the original text (BOM included)
    #[must_use]
    pub fn detect(text: &str) -> Self {
        let (body, had_bom) = strip_utf8_bom(text);
        let newline = if body.contains("\r\n") { "\r\n" } else { "\n" };
        Self {
            indent: detect_indent(body),
            newline,
            trailing_newline: body.ends_with('\n'),
            had_bom,
        }
    }

    /// Render a document in this layout
    ///
    /// # Errors
    /// Propagates serializer failures
    pub fn render(&self, doc: &Value) -> Result<String, serde_json::Error> {
        let mut bytes = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(&self.indent);
        let mut serializer = serde_json::Serializer::with_formatter(&mut bytes, formatter);
        doc.serialize(&mut serializer)?;
        // serde_json only ever emits UTF-8
        let mut rendered = String::from_utf8_lossy(&bytes).into_owned();
        if self.newline == "\r\n" {
            rendered = rendered.replace('\n', "\r\n");
        }
        if self.trailing_newline {
            rendered.push_str(self.newline);
        }
        if self.had_bom {
            rendered.insert(0, '\u{FEFF}');
        }
        Ok(rendered)
    }
}

/// Split off a leading UTF-8 BOM
#[must_use]
pub fn strip_utf8_bom(text: &str) -> (&str, bool) {
    text.strip_prefix('\u{FEFF}')
        .map_or((text, false), |stripped| (stripped, true))
}

fn detect_indent(text: &str) -> Vec<u8> {
    for line in text.lines() {
        let trimmed = line.trim_start_matches([' ', '\t']);
        if trimmed.is_empty() || trimmed.starts_with('{') || trimmed.starts_with('}') {
            continue;
        }
        let ws_len = line.len() - trimmed.len();
        if ws_len > 0 {
            return line.as_bytes()[..ws_len].to_vec();
        }
    }
    b"  ".to_vec()
}
