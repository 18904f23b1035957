//! Module: field
//! Responsibility: bind one logical attribute to a storage column, a codec
//! and a null policy, and expose query/DDL entry points keyed by the
//! storage column.
//! Boundary: composition root over `path`, `codec`, `predicate`, `schema`.

mod builder;

#[cfg(test)]
mod tests;

use crate::{
    codec::{Codec, CodecError},
    error::Error,
    path::{IntoJsonPath, PathError, compile},
    predicate::{self, Predicate, ScalarHandle, SqlFragment},
    schema::{self, IndexOptions, IndexStatement},
    traits::{ColumnType, TableModel},
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use std::{fmt, sync::Arc};

// re-exports
pub use builder::JsonFieldBuilder;

///
/// NullPolicy
///
/// `CoerceToDefault` maps both storage NULL and a stored JSON null to the
/// field default on read, and writes the default in place of null.
/// `Propagate` keeps them apart: storage NULL reads as absent, JSON null
/// reads as `Value::Null`.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum NullPolicy {
    Propagate,
    #[default]
    CoerceToDefault,
}

///
/// FieldInput
///
/// Input accepted by `validate_input`: a decoded value, or JSON text.
///

#[derive(Clone, Debug, PartialEq)]
pub enum FieldInput {
    Value(Value),
    Text(String),
}

impl From<Value> for FieldInput {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<&str> for FieldInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for FieldInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

///
/// JsonField
///
/// Field descriptor built once at schema-definition time and read-only
/// afterwards. Cheap to clone; the codec is shared.
///

#[derive(Clone)]
pub struct JsonField {
    name: String,
    db_column: Option<String>,
    codec: Arc<dyn Codec>,
    null_policy: NullPolicy,
    default: Option<Value>,
}

impl JsonField {
    #[must_use]
    pub fn builder(name: impl Into<String>) -> JsonFieldBuilder {
        JsonFieldBuilder::new(name)
    }

    /// Logical attribute name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Storage column name: the `db_column` override, else the logical name.
    #[must_use]
    pub fn column(&self) -> &str {
        self.db_column.as_deref().unwrap_or(&self.name)
    }

    #[must_use]
    pub const fn null_policy(&self) -> NullPolicy {
        self.null_policy
    }

    #[must_use]
    pub fn codec(&self) -> &dyn Codec {
        self.codec.as_ref()
    }

    /// Value substituted for null under `CoerceToDefault`; an empty object
    /// unless a default was configured.
    #[must_use]
    pub fn default_value(&self) -> Value {
        self.default
            .clone()
            .unwrap_or_else(|| Value::Object(Map::new()))
    }

    // ------------------------------------------------------------------
    // Write path
    // ------------------------------------------------------------------

    /// Encode a native value for storage. `Ok(None)` means storage NULL.
    pub fn to_db(&self, value: Option<&Value>) -> Result<Option<String>, Error> {
        let coerce = self.null_policy == NullPolicy::CoerceToDefault;

        match value {
            None if !coerce => Ok(None),
            None => self.serialize(&self.default_value()).map(Some),
            Some(value) => self.encode(value).map(Some),
        }
    }

    /// Encode any `Serialize` type through this field's codec.
    pub fn to_db_typed<T: Serialize>(&self, value: &T) -> Result<Option<String>, Error> {
        let value = serde_json::to_value(value)
            .map_err(|err| CodecError::serialize(err).with_column(self.column()))?;

        self.to_db(Some(&value))
    }

    /// Store pre-encoded JSON text. It is decoded and re-encoded through the
    /// codec under the null policy, so it lands exactly as `to_db` would store
    /// the same value.
    pub fn to_db_text(&self, text: &str) -> Result<String, Error> {
        let value = self.deserialize(text)?;

        self.encode(&value)
    }

    // A present value: JSON null becomes the default when coercing.
    fn encode(&self, value: &Value) -> Result<String, Error> {
        match value {
            Value::Null if self.null_policy == NullPolicy::CoerceToDefault => {
                self.serialize(&self.default_value())
            }
            value => self.serialize(value),
        }
    }

    // ------------------------------------------------------------------
    // Read path
    // ------------------------------------------------------------------

    /// Decode stored text. `Ok(None)` means storage NULL with no default.
    pub fn from_db(&self, stored: Option<&str>) -> Result<Option<Value>, Error> {
        let coerce = self.null_policy == NullPolicy::CoerceToDefault;

        let Some(text) = stored else {
            return Ok(if coerce {
                Some(self.default_value())
            } else {
                self.default.clone()
            });
        };

        match self.deserialize(text)? {
            Value::Null if coerce => Ok(Some(self.default_value())),
            value => Ok(Some(value)),
        }
    }

    /// Decode stored text into any `DeserializeOwned` type.
    pub fn from_db_typed<T: DeserializeOwned>(
        &self,
        stored: Option<&str>,
    ) -> Result<Option<T>, Error> {
        let Some(value) = self.from_db(stored)? else {
            return Ok(None);
        };

        serde_json::from_value(value).map(Some).map_err(|err| {
            CodecError::deserialize(stored.unwrap_or_default(), err)
                .with_column(self.column())
                .into()
        })
    }

    /// Accept a decoded value as-is, or JSON text that must decode.
    pub fn validate_input(&self, input: impl Into<FieldInput>) -> Result<Value, Error> {
        match input.into() {
            FieldInput::Value(value) => Ok(value),
            FieldInput::Text(text) => self.deserialize(&text),
        }
    }

    fn serialize(&self, value: &Value) -> Result<String, Error> {
        self.codec
            .serialize(value)
            .map_err(|err| err.with_column(self.column()).into())
    }

    fn deserialize(&self, text: &str) -> Result<Value, Error> {
        self.codec.deserialize(text).map_err(|err| {
            tracing::warn!(column = self.column(), error = %err, "stored json failed to decode");
            err.with_column(self.column()).into()
        })
    }

    // ------------------------------------------------------------------
    // Query entry points
    // ------------------------------------------------------------------

    pub fn extract(&self, path: impl IntoJsonPath) -> Result<ScalarHandle, PathError> {
        ScalarHandle::new(self.column(), path)
    }

    /// Key present at `path`, including a present JSON null.
    pub fn contains_key(&self, path: impl IntoJsonPath) -> Result<Predicate, PathError> {
        predicate::contains_key(self.column(), path)
    }

    /// Key present at `path` with a non-null value.
    pub fn has_value(&self, path: impl IntoJsonPath) -> Result<Predicate, PathError> {
        predicate::has_value(self.column(), path)
    }

    pub fn path_eq(
        &self,
        path: impl IntoJsonPath,
        value: impl Into<Value>,
    ) -> Result<Predicate, PathError> {
        Ok(self.extract(path)?.eq(value))
    }

    /// UPDATE assignment writing `value` at `path`, encoded by this field's codec.
    pub fn set_expr(&self, path: impl IntoJsonPath, value: &Value) -> Result<SqlFragment, Error> {
        let text = self.serialize(value)?;

        Ok(predicate::set_expr(self.column(), path, text)?)
    }

    pub fn remove_expr(&self, path: impl IntoJsonPath) -> Result<SqlFragment, PathError> {
        predicate::remove_expr(self.column(), path)
    }

    // ------------------------------------------------------------------
    // DDL
    // ------------------------------------------------------------------

    #[must_use]
    pub fn ddl_check_valid(&self) -> String {
        schema::check_valid_fragment(self.column())
    }

    /// Column definition for CREATE TABLE, optionally with the validity check.
    #[must_use]
    pub fn column_ddl(&self, with_check: bool) -> String {
        let mut ddl = format!(
            "{} {}",
            predicate::quote_ident(self.column()),
            <Self as ColumnType>::SQL_TYPE
        );
        if with_check {
            ddl.push(' ');
            ddl.push_str(&schema::check_constraint(self.column()));
        }

        ddl
    }

    pub fn create_index<I, P>(
        &self,
        table: &str,
        paths: I,
        options: &IndexOptions,
    ) -> Result<IndexStatement, Error>
    where
        I: IntoIterator<Item = P>,
        P: IntoJsonPath,
    {
        let paths = paths
            .into_iter()
            .map(compile)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(schema::create_index_statement(
            table,
            self.column(),
            &paths,
            options,
        )?)
    }
}

impl fmt::Debug for JsonField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonField")
            .field("name", &self.name)
            .field("column", &self.column())
            .field("codec", &self.codec)
            .field("null_policy", &self.null_policy)
            .field("default", &self.default)
            .finish()
    }
}

impl ColumnType for JsonField {
    const SQL_TYPE: &'static str = "TEXT";

    fn column_name(&self) -> &str {
        self.column()
    }

    fn to_db(&self, value: Option<&Value>) -> Result<Option<String>, Error> {
        Self::to_db(self, value)
    }

    fn from_db(&self, stored: Option<&str>) -> Result<Option<Value>, Error> {
        Self::from_db(self, stored)
    }
}

/// Emit the CREATE INDEX statement for one path of `field` on `model`'s table.
pub fn create_json_index<M>(
    model: &M,
    field: &JsonField,
    path: impl IntoJsonPath,
    options: &IndexOptions,
) -> Result<IndexStatement, Error>
where
    M: TableModel + ?Sized,
{
    field.create_index(model.table_name(), [path], options)
}
