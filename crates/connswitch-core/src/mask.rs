//! Display-time masking of connection string credentials

/// Replacement shown for sensitive values
pub const MASK: &str = "****";

/// Hide the values of sensitive `key=value` parts
///
/// The value is split on `;` (empty parts dropped). A part whose trimmed,
/// lower-cased key contains any of `sensitive_keys` is rewritten as
/// `key=****`; other parts pass through untouched.
#[must_use]
pub fn mask_sensitive<S: AsRef<str>>(value: &str, sensitive_keys: &[S]) -> String {
    value
        .split(';')
        .filter(|part| !part.is_empty())
        .map(|part| match part.split_once('=') {
            Some((key, _)) if is_sensitive(key, sensitive_keys) => format!("{key}={MASK}"),
            _ => part.to_string(),
        })
        .collect::<Vec<_>>()
        .join(";")
}

fn is_sensitive<S: AsRef<str>>(key: &str, sensitive_keys: &[S]) -> bool {
    let key = key.trim().to_lowercase();
    sensitive_keys
        .iter()
        .any(|sensitive| key.contains(&sensitive.as_ref().to_lowercase()))
}
