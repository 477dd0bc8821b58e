//! XML configuration handler
//!
//! Works on `web.config` / `app.config` style files:
//!
//! ```xml
//! <connectionStrings>
//!   <add name="ProductionConnection" connectionString="..." providerName="..." />
//! </connectionStrings>
//! ```
//!
//! The document is streamed through `quick-xml` twice: once to locate the
//! source and destination `<add>` elements, once to write every event back
//! unchanged except the destination (updated in place or appended as the
//! last child of the first `<connectionStrings>`).

use crate::config::EngineConfig;
use crate::environment::to_environment_type;
use crate::error::SwitchError;
use crate::handlers::{ConfigFileHandler, ConfigFormat, HandlerOutput};
use crate::request::SwitchRequest;
use crate::scanner::ConnectionEntry;
use crate::switch::default::strip_utf8_bom;
use crate::switch::SwitchMode;
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::path::Path;

/// Element holding the `<add>` entries
pub const CONNECTION_STRINGS_ELEMENT: &str = "connectionStrings";

const ADD_ELEMENT: &[u8] = b"add";
const NAME_ATTR: &str = "name";
const CONNECTION_STRING_ATTR: &str = "connectionString";
const PROVIDER_NAME_ATTR: &str = "providerName";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct AddElement {
    name: Option<String>,
    connection_string: Option<String>,
    provider_name: Option<String>,
}

impl AddElement {
    fn read(e: &BytesStart<'_>) -> Result<Self, String> {
        let mut out = Self::default();
        for attr in e.attributes() {
            let attr = attr.map_err(|e| e.to_string())?;
            let value = attr.unescape_value().map_err(|e| e.to_string())?.into_owned();
            match attr.key.as_ref() {
                b"name" => out.name = Some(value),
                b"connectionString" => out.connection_string = Some(value),
                b"providerName" => out.provider_name = Some(value),
                _ => {}
            }
        }
        Ok(out)
    }

    fn is_named(&self, key: &str) -> bool {
        self.name.as_deref() == Some(key)
    }
}

/// What the first pass learned about `<connectionStrings>` sections
#[derive(Debug, Default)]
struct SectionScan {
    /// A section was seen at all
    found: bool,
    /// Direct `<add>` children, tagged with the zero-based section index
    adds: Vec<(usize, AddElement)>,
    /// Whitespace preceding the first child of the first section
    child_indent: Option<String>,
}

impl SectionScan {
    fn first_section(&self) -> impl Iterator<Item = &AddElement> {
        self.adds
            .iter()
            .filter(|(section, _)| *section == 0)
            .map(|(_, add)| add)
    }
}

fn is_section(e: &BytesStart<'_>) -> bool {
    e.name().as_ref() == CONNECTION_STRINGS_ELEMENT.as_bytes()
}

fn is_add(e: &BytesStart<'_>) -> bool {
    e.name().as_ref() == ADD_ELEMENT
}

/// Trailing line break (`\n` or `\r\n`) plus indentation of a whitespace-only text node
fn indentation_of(text: &BytesText<'_>) -> Option<String> {
    let raw = String::from_utf8_lossy(text);
    if !raw.chars().all(char::is_whitespace) {
        return None;
    }
    raw.rfind('\n').map(|i| {
        let start = if raw[..i].ends_with('\r') { i - 1 } else { i };
        raw[start..].to_string()
    })
}

fn scan_sections(text: &str) -> Result<SectionScan, String> {
    let mut reader = Reader::from_str(text);
    let mut scan = SectionScan::default();
    let mut section = 0usize;
    let mut depth = 0usize;
    let mut last_indent: Option<String> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| format!("at position {}: {e}", reader.buffer_position()))?;
        match event {
            Event::Start(e) if depth > 0 => {
                if depth == 1 && is_add(&e) {
                    record_add(&mut scan, section, &e, last_indent.take())?;
                }
                depth += 1;
            }
            Event::Start(e) if is_section(&e) => {
                scan.found = true;
                depth = 1;
            }
            Event::Empty(e) if depth == 1 && is_add(&e) => {
                record_add(&mut scan, section, &e, last_indent.take())?;
            }
            Event::Empty(e) if depth == 0 && is_section(&e) => {
                scan.found = true;
                section += 1;
            }
            Event::End(_) if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    section += 1;
                }
            }
            Event::Text(t) if depth == 1 => last_indent = indentation_of(&t),
            Event::Eof => break,
            _ => {}
        }
    }

    if depth > 0 {
        return Err(format!("unclosed <{CONNECTION_STRINGS_ELEMENT}> element"));
    }
    Ok(scan)
}

fn record_add(
    scan: &mut SectionScan,
    section: usize,
    e: &BytesStart<'_>,
    indent: Option<String>,
) -> Result<(), String> {
    if section == 0 && scan.child_indent.is_none() {
        scan.child_indent = indent;
    }
    scan.adds.push((section, AddElement::read(e)?));
    Ok(())
}

/// Copy of `e` with connection string and provider replaced (or added)
fn updated_add(
    e: &BytesStart<'_>,
    connection_string: &str,
    provider_name: &str,
) -> Result<BytesStart<'static>, String> {
    let mut updated = BytesStart::new(String::from_utf8_lossy(e.name().as_ref()).into_owned());
    let mut saw_connection_string = false;
    let mut saw_provider = false;

    for attr in e.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        match attr.key.as_ref() {
            b"connectionString" => {
                updated.push_attribute((CONNECTION_STRING_ATTR, connection_string));
                saw_connection_string = true;
            }
            b"providerName" => {
                updated.push_attribute((PROVIDER_NAME_ATTR, provider_name));
                saw_provider = true;
            }
            _ => updated.push_attribute(attr),
        }
    }
    if !saw_connection_string {
        updated.push_attribute((CONNECTION_STRING_ATTR, connection_string));
    }
    if !saw_provider {
        updated.push_attribute((PROVIDER_NAME_ATTR, provider_name));
    }
    Ok(updated)
}

fn new_add(name: &str, connection_string: &str, provider_name: &str) -> BytesStart<'static> {
    let mut add = BytesStart::new("add");
    add.push_attribute((NAME_ATTR, name));
    add.push_attribute((CONNECTION_STRING_ATTR, connection_string));
    add.push_attribute((PROVIDER_NAME_ATTR, provider_name));
    add
}

/// Values written into the destination element
struct Replacement<'a> {
    destination: &'a str,
    connection_string: &'a str,
    provider_name: &'a str,
    destination_exists: bool,
    child_indent: Option<&'a str>,
}

fn rewrite(text: &str, replacement: &Replacement<'_>) -> Result<String, String> {
    let mut reader = Reader::from_str(text);
    let mut writer = Writer::new(Vec::new());
    // Depth inside the first section; 0 outside it
    let mut depth = 0usize;
    let mut section_done = false;
    let mut destination_done = false;
    let mut pending: Option<Event<'_>> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| format!("at position {}: {e}", reader.buffer_position()))?;

        match event {
            Event::Eof => {
                if let Some(held) = pending.take() {
                    writer.write_event(held).map_err(message)?;
                }
                break;
            }
            Event::Text(_) if depth == 1 => {
                if let Some(held) = pending.replace(event) {
                    writer.write_event(held).map_err(message)?;
                }
                continue;
            }
            _ => {}
        }

        if matches!(event, Event::End(_)) && depth == 1 && !replacement.destination_exists {
            if let Some(indent) = replacement.child_indent {
                writer
                    .write_event(Event::Text(BytesText::from_escaped(indent)))
                    .map_err(message)?;
            }
            let add = new_add(
                replacement.destination,
                replacement.connection_string,
                replacement.provider_name,
            );
            writer.write_event(Event::Empty(add)).map_err(message)?;
        }

        if let Some(held) = pending.take() {
            writer.write_event(held).map_err(message)?;
        }

        let event = match event {
            Event::Start(e) if depth == 0 && !section_done && is_section(&e) => {
                depth = 1;
                Event::Start(e)
            }
            Event::Start(e) if depth > 0 => {
                let target = depth == 1 && !destination_done && is_destination(&e, replacement)?;
                depth += 1;
                if target {
                    destination_done = true;
                    Event::Start(updated_add(&e, replacement.connection_string, replacement.provider_name)?)
                } else {
                    Event::Start(e)
                }
            }
            Event::Empty(e) if depth == 1 && !destination_done => {
                if is_destination(&e, replacement)? {
                    destination_done = true;
                    Event::Empty(updated_add(&e, replacement.connection_string, replacement.provider_name)?)
                } else {
                    Event::Empty(e)
                }
            }
            Event::End(e) if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    section_done = true;
                }
                Event::End(e)
            }
            other => other,
        };
        writer.write_event(event).map_err(message)?;
    }

    String::from_utf8(writer.into_inner()).map_err(message)
}

fn message<E: std::fmt::Display>(e: E) -> String {
    e.to_string()
}

fn is_destination(e: &BytesStart<'_>, replacement: &Replacement<'_>) -> Result<bool, String> {
    Ok(is_add(e) && AddElement::read(e)?.is_named(replacement.destination))
}

/// Handler for `.config` files
#[derive(Debug, Clone)]
pub struct XmlConfigHandler {
    default_destination: String,
    default_provider: String,
}

impl XmlConfigHandler {
    /// Create handler from engine configuration
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            default_destination: config.default_destination.clone(),
            default_provider: config.default_provider.clone(),
        }
    }
}

impl Default for XmlConfigHandler {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl ConfigFileHandler for XmlConfigHandler {
    fn format(&self) -> ConfigFormat {
        ConfigFormat::Xml
    }

    fn extensions(&self) -> &[&str] {
        &["config"]
    }

    /// XML attributes have no commented form; every switch is structural
    fn effective_mode(&self, _requested: SwitchMode) -> SwitchMode {
        SwitchMode::Default
    }

    fn list(&self, text: &str, path: &Path) -> Result<Vec<ConnectionEntry>, SwitchError> {
        let (body, _) = strip_utf8_bom(text);
        let scan = scan_sections(body).map_err(|message| SwitchError::invalid_format(path, message))?;
        Ok(scan
            .adds
            .into_iter()
            .map(|(_, add)| {
                let name = add.name.unwrap_or_default();
                ConnectionEntry {
                    environment: to_environment_type(&name),
                    name,
                    raw_value: add.connection_string.unwrap_or_default(),
                    provider_name: add.provider_name,
                    is_commented: false,
                }
            })
            .collect())
    }

    fn switch(&self, text: &str, request: &SwitchRequest) -> Result<HandlerOutput, SwitchError> {
        if request.mode == SwitchMode::Comment {
            tracing::debug!("Comment mode is not available for XML; applying structural switch");
        }
        let path = request.file_path.as_path();
        let source_key = request.source_key()?;
        let destination = request.destination_key(&self.default_destination);

        let (body, had_bom) = strip_utf8_bom(text);
        let scan = scan_sections(body).map_err(|message| SwitchError::invalid_format(path, message))?;
        if !scan.found {
            return Err(SwitchError::NotFound(format!("{CONNECTION_STRINGS_ELEMENT} section")));
        }

        let source = scan
            .first_section()
            .find(|add| add.is_named(&source_key))
            .ok_or_else(|| SwitchError::key_not_found(&source_key))?;
        let connection_string = source
            .connection_string
            .as_deref()
            .filter(|value| !value.is_empty())
            .ok_or_else(|| SwitchError::EmptyValue {
                key: source_key.clone(),
            })?;
        let provider_name = source
            .provider_name
            .as_deref()
            .unwrap_or(self.default_provider.as_str());

        let existing = scan.first_section().find(|add| add.is_named(destination));
        if let Some(existing) = existing {
            if existing.connection_string.as_deref() == Some(connection_string)
                && existing.provider_name.as_deref() == Some(provider_name)
            {
                tracing::debug!("{} already matches {}", destination, source_key);
                return Ok(HandlerOutput {
                    text: text.to_string(),
                    changed: false,
                    applied_mode: SwitchMode::Default,
                    comment_report: None,
                });
            }
        }

        let replacement = Replacement {
            destination,
            connection_string,
            provider_name,
            destination_exists: existing.is_some(),
            child_indent: scan.child_indent.as_deref(),
        };
        let mut text =
            rewrite(body, &replacement).map_err(|message| SwitchError::invalid_format(path, message))?;
        if had_bom {
            text.insert(0, '\u{FEFF}');
        }
        tracing::debug!(
            "XML configuration updated: {} <- {} ({})",
            destination,
            source_key,
            if replacement.destination_exists { "updated" } else { "inserted" }
        );

        Ok(HandlerOutput {
            text,
            changed: true,
            applied_mode: SwitchMode::Default,
            comment_report: None,
        })
    }
}
