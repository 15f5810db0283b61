//! Environment variable names used by this crate for configuring the
//! layer from a service's deployment.
//!
//! These are purely helpers; [`Formatter`](crate::formatter::Formatter)
//! itself never reads the environment.

use std::collections::BTreeMap;

/// Static labels, e.g. `service=billing,env=prod`.
pub const LOG_LABELS_ENV: &str = "LOG_LABELS";

/// Set to `true` or `1` to attach the call site to every event.
pub const LOG_REPORT_CALLER_ENV: &str = "LOG_REPORT_CALLER";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a `key=value,key=value` list into labels.
///
/// Whitespace around keys and values is trimmed and empty segments are
/// skipped, so `""` yields no labels. A later duplicate key wins.
pub fn parse_labels(raw: &str) -> Result<BTreeMap<String, String>, LabelParseError> {
    let mut labels = BTreeMap::new();
    for pair in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| LabelParseError::MissingSeparator(pair.to_string()))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(LabelParseError::EmptyKey(pair.to_string()));
        }
        labels.insert(key.to_string(), value.trim().to_string());
    }
    Ok(labels)
}

/// Parse a boolean flag the way `LOG_REPORT_CALLER` accepts it.
pub fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// Error type returned when parsing a label list.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum LabelParseError {
    #[error("label {0:?} is missing '='")]
    MissingSeparator(String),
    #[error("label {0:?} has an empty key")]
    EmptyKey(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_label_list() {
        let labels = parse_labels(" service = billing ,env=prod,, region=").unwrap();
        assert_eq!(labels.len(), 3);
        assert_eq!(labels["service"], "billing");
        assert_eq!(labels["env"], "prod");
        assert_eq!(labels["region"], "");
    }

    #[test]
    fn empty_list_has_no_labels() {
        assert!(parse_labels("").unwrap().is_empty());
        assert!(parse_labels(" , ").unwrap().is_empty());
    }

    #[test]
    fn rejects_malformed_pairs() {
        assert_eq!(
            parse_labels("service"),
            Err(LabelParseError::MissingSeparator("service".into()))
        );
        assert_eq!(
            parse_labels("=prod"),
            Err(LabelParseError::EmptyKey("=prod".into()))
        );
    }

    #[test]
    fn flags() {
        assert!(parse_flag("TRUE"));
        assert!(parse_flag("1"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag(""));
    }
}
