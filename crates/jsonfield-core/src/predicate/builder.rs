use crate::{
    path::{IntoJsonPath, PathError, StoragePath, compile},
    predicate::{
        CompareOp, ComparePredicate, Operand, Predicate, Renderer, SqlFragment, SqlValue,
        quote_ident, quote_literal,
    },
};
use serde_json::Value;

///
/// ScalarHandle
///
/// Path extraction over one storage column.
/// Comparisons run against the engine's unwrapped scalar, so comparing to
/// the native string `Alice` matches a stored `"Alice"`.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ScalarHandle {
    column: String,
    path: StoragePath,
}

impl ScalarHandle {
    pub fn new(column: impl Into<String>, path: impl IntoJsonPath) -> Result<Self, PathError> {
        Ok(Self {
            column: column.into(),
            path: compile(path)?,
        })
    }

    #[must_use]
    pub fn column(&self) -> &str {
        &self.column
    }

    #[must_use]
    pub const fn path(&self) -> &StoragePath {
        &self.path
    }

    #[must_use]
    pub fn operand(&self) -> Operand {
        Operand::Extract {
            column: self.column.clone(),
            path: self.path.clone(),
        }
    }

    /// The extraction expression itself, e.g. `json_extract("meta", '$.a')`.
    #[must_use]
    pub fn to_sql(&self) -> String {
        let mut out = Renderer::new(true);
        self.operand().render(&mut out);
        out.finish().sql
    }

    /// Select expression yielding the JSON text of the extracted value.
    /// Strings come back quoted; decode with `codec::unwrap_extracted`.
    #[must_use]
    pub fn select_sql(&self) -> String {
        format!(
            "{} -> {}",
            quote_ident(&self.column),
            quote_literal(self.path.as_str())
        )
    }

    // ------------------------------------------------------------------
    // Comparison predicates
    // ------------------------------------------------------------------

    /// Equality by JSON type and value.
    ///
    /// `true`/`false` match only JSON booleans, never a stored `1`/`0`.
    /// Arrays and objects match structurally, whatever the stored key order.
    /// `null` matches an absent key or a JSON null.
    /// Numbers and strings compare against the extracted scalar, which reads
    /// a stored boolean as 1/0.
    #[must_use]
    pub fn eq(&self, value: impl Into<Value>) -> Predicate {
        self.compare(CompareOp::Eq, value.into())
    }

    #[must_use]
    pub fn ne(&self, value: impl Into<Value>) -> Predicate {
        self.compare(CompareOp::Ne, value.into())
    }

    /// Ordering uses the engine's scalar extraction, so booleans order as 1/0
    /// and compound values compare as JSON text.
    #[must_use]
    pub fn lt(&self, value: impl Into<Value>) -> Predicate {
        self.compare(CompareOp::Lt, value.into())
    }

    #[must_use]
    pub fn lte(&self, value: impl Into<Value>) -> Predicate {
        self.compare(CompareOp::Lte, value.into())
    }

    #[must_use]
    pub fn gt(&self, value: impl Into<Value>) -> Predicate {
        self.compare(CompareOp::Gt, value.into())
    }

    #[must_use]
    pub fn gte(&self, value: impl Into<Value>) -> Predicate {
        self.compare(CompareOp::Gte, value.into())
    }

    /// Membership test against a fixed list, with the same matching as `eq`.
    #[must_use]
    pub fn in_list<I, V>(&self, values: I) -> Predicate
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.compare(CompareOp::In, Value::Array(values))
    }

    #[must_use]
    pub fn not_in_list<I, V>(&self, values: I) -> Predicate
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.compare(CompareOp::NotIn, Value::Array(values))
    }

    // ------------------------------------------------------------------
    // Structural predicates
    // ------------------------------------------------------------------

    /// Absent, or present with a JSON null value.
    #[must_use]
    pub fn is_null(&self) -> Predicate {
        Predicate::IsNull(self.operand())
    }

    /// Present with a non-null value.
    #[must_use]
    pub fn is_not_null(&self) -> Predicate {
        Predicate::IsNotNull(self.operand())
    }

    fn compare(&self, op: CompareOp, value: Value) -> Predicate {
        Predicate::Compare(ComparePredicate {
            operand: self.operand(),
            op,
            value,
        })
    }
}

/// Key is present at `path`, whatever its value (JSON null included).
/// False only when the key is absent.
pub fn contains_key(column: &str, path: impl IntoJsonPath) -> Result<Predicate, PathError> {
    Ok(Predicate::IsNotNull(Operand::Type {
        column: column.to_string(),
        path: compile(path)?,
    }))
}

/// Key is present at `path` and its value is not JSON null.
pub fn has_value(column: &str, path: impl IntoJsonPath) -> Result<Predicate, PathError> {
    Ok(ScalarHandle::new(column, path)?.is_not_null())
}

/// UPDATE assignment expression writing `json_text` at `path`.
///
/// The value is parsed by the engine, so strings, numbers, booleans and
/// compound values keep their JSON types.
pub fn set_expr(
    column: &str,
    path: impl IntoJsonPath,
    json_text: String,
) -> Result<SqlFragment, PathError> {
    let path = compile(path)?;
    let mut out = Renderer::new(false);
    out.push(&format!(
        "json_set({}, {}, json(",
        quote_ident(column),
        quote_literal(path.as_str())
    ));
    out.param(SqlValue::Text(json_text));
    out.push("))");

    Ok(out.finish())
}

/// UPDATE assignment expression removing the value at `path`.
pub fn remove_expr(column: &str, path: impl IntoJsonPath) -> Result<SqlFragment, PathError> {
    let path = compile(path)?;

    Ok(SqlFragment {
        sql: format!(
            "json_remove({}, {})",
            quote_ident(column),
            quote_literal(path.as_str())
        ),
        params: Vec::new(),
    })
}
