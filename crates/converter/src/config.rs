//! Run configuration
//!
//! Settings arrive as a flat key/value map (from the CLI, a settings file or
//! [`Converter::put_setting`](crate::Converter::put_setting)) and are read
//! once per run into a [`ConverterConfig`].

use oas2smithy_common::{ConverterError, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

/// Flat settings map
pub type Settings = BTreeMap<String, Value>;

pub const NAMESPACE: &str = "namespace";
pub const SERVICE_NAME: &str = "service.name";
pub const UNIQUE_ITEMS_AS_LIST: &str = "uniqueItems.list";
pub const MAX_SCHEMA_DEPTH: &str = "schema.maxDepth";

pub const DEFAULT_NAMESPACE: &str = "ns.foo";
pub const DEFAULT_SERVICE_NAME: &str = "TestService";
pub const DEFAULT_MAX_SCHEMA_DEPTH: usize = 64;

/// Configuration for one conversion run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterConfig {
    /// Namespace of every generated shape
    pub namespace: String,

    /// Name of the service shape
    pub service_name: String,

    /// Keep `uniqueItems` arrays as lists (with a `uniqueItems` trait) instead of sets
    pub unique_items_as_list: bool,

    /// Deepest inline schema nesting accepted before failing
    pub max_schema_depth: usize,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            unique_items_as_list: false,
            max_schema_depth: DEFAULT_MAX_SCHEMA_DEPTH,
        }
    }
}

impl ConverterConfig {
    /// Read the known keys from a settings map, defaulting the rest
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let mut config = Self::default();

        for (key, value) in settings {
            match key.as_str() {
                NAMESPACE => config.namespace = string_setting(key, value)?,
                SERVICE_NAME => config.service_name = string_setting(key, value)?,
                UNIQUE_ITEMS_AS_LIST => config.unique_items_as_list = bool_setting(key, value)?,
                MAX_SCHEMA_DEPTH => config.max_schema_depth = usize_setting(key, value)?,
                _ => debug!(setting = %key, "ignoring unknown setting"),
            }
        }

        if !config.namespace.split('.').all(oas2smithy_common::is_identifier) {
            return Err(invalid(NAMESPACE, "a dot-separated namespace such as ns.foo"));
        }
        if !oas2smithy_common::is_identifier(&config.service_name) {
            return Err(invalid(SERVICE_NAME, "a shape name such as PetService"));
        }

        Ok(config)
    }
}

fn invalid(key: &str, expected: &str) -> ConverterError {
    ConverterError::InvalidSetting {
        key: key.to_string(),
        expected: expected.to_string(),
    }
}

fn string_setting(key: &str, value: &Value) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| invalid(key, "a string"))
}

fn bool_setting(key: &str, value: &Value) -> Result<bool> {
    match value {
        Value::Bool(flag) => Ok(*flag),
        Value::String(text) => text.parse().map_err(|_| invalid(key, "true or false")),
        _ => Err(invalid(key, "true or false")),
    }
}

fn usize_setting(key: &str, value: &Value) -> Result<usize> {
    let number = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(text) => text.parse().ok(),
        _ => None,
    };

    number
        .and_then(|n| usize::try_from(n).ok())
        .filter(|n| *n > 0)
        .ok_or_else(|| invalid(key, "a positive integer"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let config = ConverterConfig::from_settings(&Settings::new()).unwrap();
        assert_eq!(config, ConverterConfig::default());
        assert_eq!(config.namespace, "ns.foo");
        assert_eq!(config.service_name, "TestService");
        assert!(!config.unique_items_as_list);
    }

    #[test]
    fn test_overrides_and_string_flags() {
        let settings = Settings::from([
            (NAMESPACE.to_string(), json!("example.pets")),
            (SERVICE_NAME.to_string(), json!("PetStore")),
            (UNIQUE_ITEMS_AS_LIST.to_string(), json!("true")),
            (MAX_SCHEMA_DEPTH.to_string(), json!(8)),
            ("openapi.filename".to_string(), json!("petstore.yaml")),
        ]);

        let config = ConverterConfig::from_settings(&settings).unwrap();
        assert_eq!(config.namespace, "example.pets");
        assert_eq!(config.service_name, "PetStore");
        assert!(config.unique_items_as_list);
        assert_eq!(config.max_schema_depth, 8);
    }

    #[test]
    fn test_invalid_values() {
        let wrong_type = Settings::from([(UNIQUE_ITEMS_AS_LIST.to_string(), json!(3))]);
        assert!(matches!(
            ConverterConfig::from_settings(&wrong_type),
            Err(ConverterError::InvalidSetting { key, .. }) if key == UNIQUE_ITEMS_AS_LIST
        ));

        let bad_namespace = Settings::from([(NAMESPACE.to_string(), json!("ns..foo"))]);
        assert!(ConverterConfig::from_settings(&bad_namespace).is_err());

        let zero_depth = Settings::from([(MAX_SCHEMA_DEPTH.to_string(), json!(0))]);
        assert!(ConverterConfig::from_settings(&zero_depth).is_err());
    }
}
