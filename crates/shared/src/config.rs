//! Configuration types for Opsdesk

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// What to do when the activity sink refuses a write
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AuditFailurePolicy {
    /// Report the failure and keep the committed mutation
    #[default]
    BestEffort,
    /// Fail the operation and undo the mutation it belonged to
    Strict,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Kernel configuration, loaded once at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KernelConfig {
    pub audit_failure_policy: AuditFailurePolicy,

    /// Upper bound on entries returned by an activity query
    pub activity_page_size: usize,

    /// Default tracing filter when RUST_LOG is unset
    pub log_level: String,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            audit_failure_policy: AuditFailurePolicy::BestEffort,
            activity_page_size: 20,
            log_level: "info".to_string(),
        }
    }
}

impl KernelConfig {
    /// Load configuration from a JSON or YAML file (by extension)
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );

        let config = if is_yaml {
            serde_yaml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };
        Ok(config)
    }

    pub fn with_policy(mut self, policy: AuditFailurePolicy) -> Self {
        self.audit_failure_policy = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_defaults() {
        let config = KernelConfig::default();
        assert_eq!(config.audit_failure_policy, AuditFailurePolicy::BestEffort);
        assert_eq!(config.activity_page_size, 20);
    }

    #[test]
    fn test_config_parse_partial_json() {
        let config: KernelConfig = serde_json::from_str(r#"{"auditFailurePolicy":"strict"}"#).unwrap();
        assert_eq!(config.audit_failure_policy, AuditFailurePolicy::Strict);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_config_from_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"activityPageSize": 5}}"#).unwrap();

        let config = KernelConfig::from_file(file.path()).unwrap();
        assert_eq!(config.activity_page_size, 5);
    }

    #[test]
    fn test_config_from_yaml_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "auditFailurePolicy: strict").unwrap();
        writeln!(file, "logLevel: debug").unwrap();

        let config = KernelConfig::from_file(file.path()).unwrap();
        assert_eq!(config.audit_failure_policy, AuditFailurePolicy::Strict);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_config_missing_file() {
        let err = KernelConfig::from_file(Path::new("/nonexistent/opsdesk.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_config_malformed_json() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "{{not json").unwrap();

        let err = KernelConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }
}
