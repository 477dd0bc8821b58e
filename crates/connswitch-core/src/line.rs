//! Connection-line recognition and key/value extraction
//!
//! Lines are only semi-structured: they may be commented out, redacted or
//! truncated. Extraction therefore cascades from the most specific pattern to
//! the loosest and falls back to [`REDACTED_VALUE`] rather than failing.

use crate::config::REDACTED_VALUE;
use once_cell::sync::Lazy;
use regex::Regex;

static KEY_AND_VALUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""(\w*Connection)"\s*:\s*"([^"]+)""#).expect("static regex is valid")
});

static KEY_ONLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""(\w*Connection)"\s*:"#).expect("static regex is valid"));

/// Strip surrounding whitespace and one leading `//`
#[must_use]
pub fn strip_comment(line: &str) -> &str {
    let trimmed = line.trim();
    trimmed.strip_prefix("//").map_or(trimmed, str::trim)
}

/// Whether the trimmed line starts with `//`
#[inline]
#[must_use]
pub fn is_commented(line: &str) -> bool {
    line.trim_start().starts_with("//")
}

#[derive(Debug, Clone)]
struct KnownKey {
    name: String,
    value: Regex,
}

/// Recognizes connection entries, commented or not
#[derive(Debug, Clone)]
pub struct LineClassifier {
    known: Vec<KnownKey>,
}

impl LineClassifier {
    /// Create classifier for the given known key names (checked in order)
    #[must_use]
    pub fn new<I, S>(known_keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let known = known_keys
            .into_iter()
            .map(Into::into)
            .filter(|name: &String| !name.is_empty())
            .map(|name| {
                let pattern = format!(r#""{}"\s*:\s*"([^"]+)""#, regex::escape(&name));
                let value = Regex::new(&pattern).expect("escaped key always forms a valid regex");
                KnownKey { name, value }
            })
            .collect();
        Self { known }
    }

    /// Known key names in match order
    pub fn known_keys(&self) -> impl Iterator<Item = &str> {
        self.known.iter().map(|k| k.name.as_str())
    }

    /// Whether the line (commented or not) is a connection entry
    #[must_use]
    pub fn is_connection_line(&self, line: &str) -> bool {
        let body = strip_comment(line);
        self.known.iter().any(|k| body.contains(k.name.as_str()))
            || (body.contains("Connection") && body.contains(':'))
    }

    /// Extract `(name, value)` from a connection line
    ///
    /// The value is [`REDACTED_VALUE`] when only the key is recoverable.
    #[must_use]
    pub fn parse(&self, line: &str) -> Option<(String, String)> {
        let body = strip_comment(line);

        if let Some(known) = self.known.iter().find(|k| body.contains(k.name.as_str())) {
            let value = known
                .value
                .captures(body)
                .map_or_else(|| REDACTED_VALUE.to_string(), |c| c[1].to_string());
            return Some((known.name.clone(), value));
        }

        if let Some(caps) = KEY_AND_VALUE.captures(body) {
            return Some((caps[1].to_string(), caps[2].to_string()));
        }

        KEY_ONLY
            .captures(body)
            .map(|caps| (caps[1].to_string(), REDACTED_VALUE.to_string()))
    }
}

impl Default for LineClassifier {
    fn default() -> Self {
        Self::new(crate::config::EngineConfig::default().known_keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> LineClassifier {
        LineClassifier::default()
    }

    #[test]
    fn recognizes_generic_connection_keys() {
        let c = classifier();
        assert!(c.is_connection_line(r#"    "DevConnection": "server=a","#));
        assert!(c.is_connection_line(r#"    //"DevConnection": "server=a","#));
        assert!(!c.is_connection_line(r#"    "Logging": {"#));
        assert!(!c.is_connection_line("// Connection strings below"));
    }

    #[test]
    fn known_key_without_colon_is_connection_line() {
        let c = classifier();
        assert!(c.is_connection_line("// SysSetupConnection redacted"));
    }

    #[test]
    fn parse_known_key_with_value() {
        let c = classifier();
        let parsed = c.parse(r#"  // "SysSetupConnection": "Server=db;Database=setup","#);
        assert_eq!(
            parsed,
            Some(("SysSetupConnection".to_string(), "Server=db;Database=setup".to_string()))
        );
    }

    #[test]
    fn parse_known_key_falls_back_to_redacted() {
        let c = classifier();
        let parsed = c.parse(r#""AvbobPoetryConnection": """#);
        assert_eq!(
            parsed,
            Some(("AvbobPoetryConnection".to_string(), REDACTED_VALUE.to_string()))
        );
    }

    #[test]
    fn parse_generic_key_and_value() {
        let c = classifier();
        let parsed = c.parse(r#""ProdConnection": "server=b""#);
        assert_eq!(parsed, Some(("ProdConnection".to_string(), "server=b".to_string())));
    }

    #[test]
    fn parse_generic_key_only() {
        let c = classifier();
        let parsed = c.parse(r#""QAConnection": null,"#);
        assert_eq!(parsed, Some(("QAConnection".to_string(), REDACTED_VALUE.to_string())));
    }

    #[test]
    fn parse_fails_on_unquoted_key() {
        let c = classifier();
        assert!(c.is_connection_line("Connection: keep-alive"));
        assert_eq!(c.parse("Connection: keep-alive"), None);
    }

    #[test]
    fn configured_keys_replace_defaults() {
        let c = LineClassifier::new(["Billing.Db"]);
        assert!(c.is_connection_line("Billing.Db"));
        assert!(!c.is_connection_line("SysSetupConnection"));
        let parsed = c.parse(r#""Billing.Db": "server=z""#);
        assert_eq!(parsed, Some(("Billing.Db".to_string(), "server=z".to_string())));
    }

    #[test]
    fn strip_comment_variants() {
        assert_eq!(strip_comment("   //  \"a\": 1  "), "\"a\": 1");
        assert_eq!(strip_comment("  \"a\": 1"), "\"a\": 1");
        assert!(is_commented("   // x"));
        assert!(!is_commented("x // y"));
    }
}
