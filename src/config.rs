//! Harness Configuration
//!
//! Configuration for the detection report: the static template, the sample
//! queries, the attack catalog and timing options. Loaded from a kebab-case
//! JSON file; every key is optional and falls back to the built-in defaults.

use serde::Deserialize;
use std::path::Path;

use crate::catalog::{
    AttackCase, AttackCatalog, DEFAULT_INJECTED_QUERY, DEFAULT_NORMAL_QUERY, DEFAULT_TEMPLATE,
};
use crate::error::ConfigError;
use crate::metrics::MetricsConfig;

/// Harness configuration
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Static query template
    pub template: String,
    /// Legitimate instantiation of the template
    pub normal_query: String,
    /// Injected instantiation of the template
    pub injected_query: String,
    /// Named attack queries to time
    pub attacks: AttackCatalog,
    /// Discarded calls before each timed detection
    pub warmup_iterations: u32,
    /// Metrics configuration
    pub metrics: MetricsConfig,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
            normal_query: DEFAULT_NORMAL_QUERY.to_string(),
            injected_query: DEFAULT_INJECTED_QUERY.to_string(),
            attacks: AttackCatalog::default(),
            warmup_iterations: 0,
            metrics: MetricsConfig::default(),
        }
    }
}

impl HarnessConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Parse configuration from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let parsed: HarnessConfigJson = serde_json::from_str(json)?;
        Self::try_from(parsed)
    }
}

/// JSON-serializable harness config
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct HarnessConfigJson {
    #[serde(default = "default_template")]
    pub template: String,
    #[serde(default = "default_normal_query")]
    pub normal_query: String,
    #[serde(default = "default_injected_query")]
    pub injected_query: String,
    #[serde(default)]
    pub attacks: Option<Vec<AttackCase>>,
    #[serde(default)]
    pub warmup_iterations: u32,
    #[serde(default)]
    pub metrics: Option<MetricsConfig>,
}

fn default_template() -> String {
    DEFAULT_TEMPLATE.to_string()
}

fn default_normal_query() -> String {
    DEFAULT_NORMAL_QUERY.to_string()
}

fn default_injected_query() -> String {
    DEFAULT_INJECTED_QUERY.to_string()
}

impl TryFrom<HarnessConfigJson> for HarnessConfig {
    type Error = ConfigError;

    fn try_from(json: HarnessConfigJson) -> Result<Self, Self::Error> {
        let attacks = match json.attacks {
            Some(cases) => AttackCatalog::from_cases(cases)?,
            None => AttackCatalog::default(),
        };

        Ok(HarnessConfig {
            template: json.template,
            normal_query: json.normal_query,
            injected_query: json.injected_query,
            attacks,
            warmup_iterations: json.warmup_iterations,
            metrics: json.metrics.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_uses_defaults() {
        let config = HarnessConfig::from_json_str("{}").unwrap();
        assert_eq!(config.template, DEFAULT_TEMPLATE);
        assert_eq!(config.normal_query, DEFAULT_NORMAL_QUERY);
        assert_eq!(config.injected_query, DEFAULT_INJECTED_QUERY);
        assert_eq!(config.attacks, AttackCatalog::default());
        assert_eq!(config.warmup_iterations, 0);
        assert!(config.metrics.enabled);
    }

    #[test]
    fn test_kebab_case_keys() {
        let config = HarnessConfig::from_json_str(
            r#"{
                "template": "SELECT * FROM orders WHERE id=0",
                "normal-query": "SELECT * FROM orders WHERE id=17",
                "warmup-iterations": 3,
                "attacks": [
                    {"name": "Stacked", "query": "SELECT * FROM orders WHERE id=1; DELETE FROM orders"}
                ],
                "metrics": {"latency-histograms": false}
            }"#,
        )
        .unwrap();

        assert_eq!(config.template, "SELECT * FROM orders WHERE id=0");
        assert_eq!(config.normal_query, "SELECT * FROM orders WHERE id=17");
        assert_eq!(config.injected_query, DEFAULT_INJECTED_QUERY);
        assert_eq!(config.warmup_iterations, 3);
        assert_eq!(config.attacks.len(), 1);
        assert!(config.attacks.get("Stacked").is_some());
        assert!(!config.metrics.latency_histograms);
        assert!(config.metrics.enabled);
    }

    #[test]
    fn test_empty_attack_list_rejected() {
        let result = HarnessConfig::from_json_str(r#"{"attacks": []}"#);
        assert!(matches!(result, Err(ConfigError::EmptyCatalog)));
    }

    #[test]
    fn test_duplicate_attack_rejected() {
        let result = HarnessConfig::from_json_str(
            r#"{"attacks": [{"name": "A", "query": "x"}, {"name": "A", "query": "y"}]}"#,
        );
        assert!(matches!(result, Err(ConfigError::DuplicateAttack(name)) if name == "A"));
    }

    #[test]
    fn test_invalid_json_rejected() {
        let result = HarnessConfig::from_json_str("{not json");
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = HarnessConfig::from_file("/nonexistent/sqlguard.json");
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
