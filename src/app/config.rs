// dataprofiler - app/config.rs
//
// Loads and validates a `RunConfig` from a JSON document (spec §6
// "Consumed: ... a JSON config"). This is the one place untrusted
// user-supplied config crosses into the strongly-typed run model.

use crate::core::model::RunConfig;
use crate::util::error::ConfigError;
use std::path::Path;

/// Parse a `RunConfig` from a JSON file on disk, then validate it.
pub fn load(path: &Path) -> Result<RunConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&raw, path)
}

/// Parse a `RunConfig` from an in-memory JSON string. `path` is kept
/// only for error context.
pub fn parse(raw: &str, path: &Path) -> Result<RunConfig, ConfigError> {
    let config: RunConfig = serde_json::from_str(raw).map_err(|source| ConfigError::JsonParse {
        path: path.to_path_buf(),
        source,
    })?;
    validate(&config)?;
    Ok(config)
}

/// Reject configs with out-of-range values before a run ever starts.
fn validate(config: &RunConfig) -> Result<(), ConfigError> {
    if config.delimiter.is_whitespace() && config.delimiter != '\t' {
        return Err(ConfigError::ValueOutOfRange {
            field: "delimiter".to_string(),
            value: config.delimiter.to_string(),
            expected: "a non-whitespace character, or tab".to_string(),
        });
    }
    if config.top_k == 0 {
        return Err(ConfigError::ValueOutOfRange {
            field: "top_k".to_string(),
            value: config.top_k.to_string(),
            expected: "a positive integer".to_string(),
        });
    }
    if config.spill_budget_bytes == 0 {
        return Err(ConfigError::ValueOutOfRange {
            field: "spill_budget_bytes".to_string(),
            value: config.spill_budget_bytes.to_string(),
            expected: "a positive byte count".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn default_shaped_json_parses() {
        let raw = r#"{
            "delimiter": ",",
            "quoting_enabled": true,
            "expected_line_ending": null,
            "null_tokens": [""],
            "auto_detect_delimiter": false,
            "spill_budget_bytes": 1024,
            "top_k": 10
        }"#;
        let config = parse(raw, &PathBuf::from("config.json")).unwrap();
        assert_eq!(config.delimiter, ',');
        assert_eq!(config.top_k, 10);
    }

    #[test]
    fn zero_top_k_is_rejected() {
        let raw = r#"{
            "delimiter": ",",
            "quoting_enabled": true,
            "expected_line_ending": null,
            "null_tokens": [""],
            "auto_detect_delimiter": false,
            "spill_budget_bytes": 1024,
            "top_k": 0
        }"#;
        let err = parse(raw, &PathBuf::from("config.json")).unwrap_err();
        assert!(matches!(err, ConfigError::ValueOutOfRange { .. }));
    }

    #[test]
    fn malformed_json_reports_parse_error() {
        let err = parse("{not json", &PathBuf::from("config.json")).unwrap_err();
        assert!(matches!(err, ConfigError::JsonParse { .. }));
    }
}
