use super::{JsonField, NullPolicy};
use crate::{
    codec::{Codec, DumpsFn, FnCodec, JsonCodec, LoadsFn},
    config::ConfigError,
};
use serde_json::Value;
use std::sync::Arc;

///
/// JsonFieldBuilder
///
/// Field construction options: `default`, `dumps`, `loads`, `db_column`,
/// `null_to_empty`, plus codec selection.
///

#[derive(Clone)]
pub struct JsonFieldBuilder {
    name: String,
    db_column: Option<String>,
    default: Option<Value>,
    codec: Option<Arc<dyn Codec>>,
    dumps: Option<DumpsFn>,
    loads: Option<LoadsFn>,
    null_to_empty: bool,
    ensure_ascii: bool,
}

impl JsonFieldBuilder {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            db_column: None,
            default: None,
            codec: None,
            dumps: None,
            loads: None,
            null_to_empty: true,
            ensure_ascii: false,
        }
    }

    /// Value used when the stored column is NULL.
    #[must_use]
    pub fn default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    #[must_use]
    pub fn db_column(mut self, column: impl Into<String>) -> Self {
        self.db_column = Some(column.into());
        self
    }

    #[must_use]
    pub const fn null_to_empty(mut self, null_to_empty: bool) -> Self {
        self.null_to_empty = null_to_empty;
        self
    }

    /// Escape non-ASCII characters in the default codec's output.
    #[must_use]
    pub const fn ensure_ascii(mut self, ensure_ascii: bool) -> Self {
        self.ensure_ascii = ensure_ascii;
        self
    }

    /// Replace the base codec.
    #[must_use]
    pub fn codec(mut self, codec: impl Codec + 'static) -> Self {
        self.codec = Some(Arc::new(codec));
        self
    }

    #[must_use]
    pub fn dumps<F>(mut self, dumps: F) -> Self
    where
        F: Fn(&Value) -> Result<String, String> + Send + Sync + 'static,
    {
        self.dumps = Some(Arc::new(dumps));
        self
    }

    #[must_use]
    pub fn loads<F>(mut self, loads: F) -> Self
    where
        F: Fn(&str) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.loads = Some(Arc::new(loads));
        self
    }

    pub fn build(self) -> Result<JsonField, ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::EmptyName { what: "field" });
        }
        if self.db_column.as_deref().is_some_and(|c| c.trim().is_empty()) {
            return Err(ConfigError::EmptyName { what: "db_column" });
        }

        let base = self.codec.unwrap_or_else(|| {
            Arc::new(JsonCodec::compact().with_ensure_ascii(self.ensure_ascii))
        });
        let codec: Arc<dyn Codec> = if self.dumps.is_some() || self.loads.is_some() {
            Arc::new(FnCodec::new(self.dumps, self.loads, base))
        } else {
            base
        };

        let null_policy = if self.null_to_empty {
            NullPolicy::CoerceToDefault
        } else {
            NullPolicy::Propagate
        };

        Ok(JsonField {
            name: self.name,
            db_column: self.db_column,
            codec,
            null_policy,
            default: self.default,
        })
    }
}
