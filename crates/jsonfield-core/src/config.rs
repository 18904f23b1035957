//! Declarative field configuration loaded from TOML.
//!
//! ```toml
//! [fields.data]
//! db_column = "meta_data"
//! null_to_empty = false
//! default = "{}"
//! ```

use crate::{
    codec::JsonCodec,
    field::{JsonField, JsonFieldBuilder},
};
use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ConfigError {
    #[error("failed to parse field config: {message}")]
    Parse { message: String },

    #[error("{what} name is empty")]
    EmptyName { what: &'static str },

    #[error("no config for field '{name}'")]
    UnknownField { name: String },

    #[error("default for field '{name}' is not valid JSON: {message}")]
    InvalidDefault { name: String, message: String },
}

///
/// FieldConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FieldConfig {
    #[serde(default)]
    pub db_column: Option<String>,

    #[serde(default = "FieldConfig::default_null_to_empty")]
    pub null_to_empty: bool,

    #[serde(default)]
    pub ensure_ascii: bool,

    #[serde(default)]
    pub pretty: bool,

    /// JSON text of the value used when the stored column is NULL.
    #[serde(default)]
    pub default: Option<String>,
}

impl FieldConfig {
    const fn default_null_to_empty() -> bool {
        true
    }

    /// Build a field descriptor for the logical attribute `name`.
    pub fn build(&self, name: &str) -> Result<JsonField, ConfigError> {
        let codec = JsonCodec {
            ensure_ascii: self.ensure_ascii,
            pretty: self.pretty,
        };
        let mut builder: JsonFieldBuilder = JsonField::builder(name)
            .codec(codec)
            .null_to_empty(self.null_to_empty);

        if let Some(column) = &self.db_column {
            builder = builder.db_column(column.clone());
        }
        if let Some(text) = &self.default {
            let value =
                serde_json::from_str(text).map_err(|err| ConfigError::InvalidDefault {
                    name: name.to_string(),
                    message: err.to_string(),
                })?;
            builder = builder.default(value);
        }

        builder.build()
    }
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            db_column: None,
            null_to_empty: Self::default_null_to_empty(),
            ensure_ascii: false,
            pretty: false,
            default: None,
        }
    }
}

///
/// JsonFieldsConfig
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct JsonFieldsConfig {
    #[serde(default)]
    pub fields: BTreeMap<String, FieldConfig>,
}

impl JsonFieldsConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|err| ConfigError::Parse {
            message: err.to_string(),
        })
    }

    pub fn field(&self, name: &str) -> Result<JsonField, ConfigError> {
        self.fields
            .get(name)
            .ok_or_else(|| ConfigError::UnknownField {
                name: name.to_string(),
            })?
            .build(name)
    }

    /// Build every configured field, keyed by logical name.
    pub fn build_all(&self) -> Result<BTreeMap<String, JsonField>, ConfigError> {
        self.fields
            .iter()
            .map(|(name, config)| Ok((name.clone(), config.build(name)?)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::NullPolicy;
    use serde_json::json;

    #[test]
    fn toml_config_builds_fields() {
        let config = JsonFieldsConfig::from_toml_str(
            r#"
            [fields.data]
            db_column = "meta_data"
            null_to_empty = false
            default = '{"tags": []}'

            [fields.extra]
            ensure_ascii = true
            "#,
        )
        .expect("valid config");

        let data = config.field("data").expect("data field");
        assert_eq!(data.column(), "meta_data");
        assert_eq!(data.null_policy(), NullPolicy::Propagate);
        assert_eq!(data.from_db(None).expect("read"), Some(json!({"tags": []})));

        let extra = config.field("extra").expect("extra field");
        assert_eq!(extra.column(), "extra");
        assert_eq!(extra.null_policy(), NullPolicy::CoerceToDefault);
        assert_eq!(
            extra.to_db(Some(&json!("é"))).expect("write"),
            Some(r#""\u00e9""#.to_string())
        );

        assert_eq!(config.build_all().expect("all").len(), 2);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = JsonFieldsConfig::from_toml_str("[fields.data]\ncolumn = \"x\"\n")
            .expect_err("must fail");

        assert!(matches!(err, ConfigError::Parse { .. }), "{err}");
    }

    #[test]
    fn invalid_default_is_reported_with_field_name() {
        let config = FieldConfig {
            default: Some("{oops".to_string()),
            ..FieldConfig::default()
        };

        assert!(matches!(
            config.build("data"),
            Err(ConfigError::InvalidDefault { name, .. }) if name == "data"
        ));
    }

    #[test]
    fn missing_field_is_reported() {
        let config = JsonFieldsConfig::default();

        assert_eq!(
            config.field("data").expect_err("must fail"),
            ConfigError::UnknownField {
                name: "data".to_string()
            }
        );
    }

    #[test]
    fn empty_db_column_is_rejected() {
        let config = FieldConfig {
            db_column: Some(String::new()),
            ..FieldConfig::default()
        };

        assert_eq!(
            config.build("data").expect_err("must fail"),
            ConfigError::EmptyName { what: "db_column" }
        );
    }
}
