//! Module: predicate
//! Responsibility: boolean and comparison fragments over path extractions.
//! Does not own: path grammar (see `path`) or value encoding (see `codec`).
//! Boundary: the host query builder embeds rendered `SqlFragment`s verbatim.

mod builder;
mod sql;


use crate::{
    codec::encode_scalar,
    path::{PathSegment, StoragePath},
};
use serde_json::Value;
use std::ops::{BitAnd, BitOr, Not};

// re-exports
pub use builder::{ScalarHandle, contains_key, has_value, remove_expr, set_expr};
pub use sql::{SqlFragment, SqlValue, quote_ident, quote_literal};

pub(crate) use sql::Renderer;

///
/// Operand
///
/// Engine function applied to a storage column. The path is always written
/// as a literal so query expressions match index expressions textually.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Operand {
    Extract { column: String, path: StoragePath },
    Type { column: String, path: StoragePath },
    Valid { column: String },
}

impl Operand {
    pub(crate) fn render(&self, out: &mut Renderer) {
        let text = match self {
            Self::Extract { column, path } => format!(
                "json_extract({}, {})",
                quote_ident(column),
                quote_literal(path.as_str())
            ),
            Self::Type { column, path } => format!(
                "json_type({}, {})",
                quote_ident(column),
                quote_literal(path.as_str())
            ),
            Self::Valid { column } => format!("json_valid({})", quote_ident(column)),
        };
        out.push(&text);
    }
}

///
/// CompareOp
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    In,
    NotIn,
}

impl CompareOp {
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::In => "IN",
            Self::NotIn => "NOT IN",
        }
    }
}

///
/// ComparePredicate
///
/// The right-hand side is a native value. Scalars are encoded with the
/// codec's scalar rules at render time; equality against booleans, arrays
/// and objects is expanded structurally, never compared as raw JSON text.
///

#[derive(Clone, Debug, PartialEq)]
pub struct ComparePredicate {
    pub operand: Operand,
    pub op: CompareOp,
    pub value: Value,
}

///
/// Predicate
///
/// Opaque boolean fragment owned by the query being built.
/// Composes with `&`, `|` and `!` without further escaping.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Predicate {
    And(Vec<Self>),
    Or(Vec<Self>),
    Not(Box<Self>),
    Compare(ComparePredicate),
    IsNull(Operand),
    IsNotNull(Operand),
}

impl Predicate {
    #[must_use]
    pub const fn and(preds: Vec<Self>) -> Self {
        Self::And(preds)
    }

    #[must_use]
    pub const fn or(preds: Vec<Self>) -> Self {
        Self::Or(preds)
    }

    /// Render with `?` placeholders and positional parameters.
    #[must_use]
    pub fn to_sql(&self) -> SqlFragment {
        let mut out = Renderer::new(false);
        self.render(&mut out);
        out.finish()
    }

    /// Render with every parameter written as a literal.
    #[must_use]
    pub fn to_inline_sql(&self) -> String {
        let mut out = Renderer::new(true);
        self.render(&mut out);
        out.finish().sql
    }

    pub(crate) fn render(&self, out: &mut Renderer) {
        match self {
            Self::And(preds) => render_joined(out, preds, " AND ", "1"),
            Self::Or(preds) => render_joined(out, preds, " OR ", "0"),
            Self::Not(inner) => {
                out.push("NOT (");
                inner.render(out);
                out.push(")");
            }
            Self::Compare(cmp) => render_compare(out, cmp),
            Self::IsNull(operand) => {
                operand.render(out);
                out.push(" IS NULL");
            }
            Self::IsNotNull(operand) => {
                operand.render(out);
                out.push(" IS NOT NULL");
            }
        }
    }
}

fn render_joined(out: &mut Renderer, preds: &[Predicate], sep: &str, empty: &str) {
    if preds.is_empty() {
        out.push(empty);
        return;
    }

    out.push("(");
    for (i, pred) in preds.iter().enumerate() {
        if i > 0 {
            out.push(sep);
        }
        pred.render(out);
    }
    out.push(")");
}

fn render_compare(out: &mut Renderer, cmp: &ComparePredicate) {
    if let Operand::Extract { column, path } = &cmp.operand
        && render_structural(out, column, path, cmp.op, &cmp.value)
    {
        return;
    }

    match (cmp.op, &cmp.value) {
        // equality against null means "absent or JSON null"
        (CompareOp::Eq, Value::Null) => {
            cmp.operand.render(out);
            out.push(" IS NULL");
        }
        (CompareOp::Ne, Value::Null) => {
            cmp.operand.render(out);
            out.push(" IS NOT NULL");
        }
        (CompareOp::In | CompareOp::NotIn, value) => {
            let items = match value {
                Value::Array(items) => items.as_slice(),
                single => std::slice::from_ref(single),
            };
            if items.is_empty() {
                out.push(if cmp.op == CompareOp::In { "0" } else { "1" });
                return;
            }

            cmp.operand.render(out);
            out.push(" ");
            out.push(cmp.op.symbol());
            out.push(" (");
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(", ");
                }
                out.scalar(encode_scalar(item));
            }
            out.push(")");
        }
        (op, value) => {
            cmp.operand.render(out);
            out.push(" ");
            out.push(op.symbol());
            out.push(" ");
            out.scalar(encode_scalar(value));
        }
    }
}

// ---- Structural equality ----
//
// Booleans, arrays and objects cannot be compared as one scalar: the engine
// extracts booleans as 1/0 and compound values as text in stored key order.
// Equality against them is expanded into type, shape and per-leaf checks.
// Every check uses `IS`, so a missing nested key is false rather than NULL.

fn is_structural(value: &Value) -> bool {
    matches!(value, Value::Bool(_) | Value::Array(_) | Value::Object(_))
}

// Returns false when the plain scalar rendering applies.
fn render_structural(
    out: &mut Renderer,
    column: &str,
    path: &StoragePath,
    op: CompareOp,
    value: &Value,
) -> bool {
    match (op, value) {
        (CompareOp::Eq | CompareOp::Ne, value) if is_structural(value) => {
            render_negated(out, column, path, op == CompareOp::Ne, |out| {
                render_match(out, column, path, value);
            });
        }
        (CompareOp::In | CompareOp::NotIn, Value::Array(items))
            if items.iter().any(is_structural) =>
        {
            render_negated(out, column, path, op == CompareOp::NotIn, |out| {
                out.push("(");
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(" OR ");
                    }
                    // a null list member never matches, as in `IN (NULL)`
                    if item.is_null() {
                        out.push("0");
                    } else {
                        render_match(out, column, path, item);
                    }
                }
                out.push(")");
            });
        }
        _ => return false,
    }

    true
}

// Negation keeps scalar `!=` behaviour: an absent path matches neither form.
fn render_negated(
    out: &mut Renderer,
    column: &str,
    path: &StoragePath,
    negate: bool,
    body: impl FnOnce(&mut Renderer),
) {
    if !negate {
        body(out);
        return;
    }

    out.push("(");
    type_operand(column, path).render(out);
    out.push(" IS NOT NULL AND NOT (");
    body(out);
    out.push("))");
}

// The JSON value at `path` equals `value`, independent of stored key order.
fn render_match(out: &mut Renderer, column: &str, path: &StoragePath, value: &Value) {
    match value {
        Value::Null => render_type_is(out, column, path, "null"),
        Value::Bool(true) => render_type_is(out, column, path, "true"),
        Value::Bool(false) => render_type_is(out, column, path, "false"),
        Value::Number(_) | Value::String(_) => {
            Operand::Extract {
                column: column.to_string(),
                path: path.clone(),
            }
            .render(out);
            out.push(" IS ");
            out.scalar(encode_scalar(value));
        }
        Value::Array(items) => {
            out.push("(");
            render_type_is(out, column, path, "array");
            out.push(&format!(
                " AND json_array_length({}, {}) IS {}",
                quote_ident(column),
                quote_literal(path.as_str()),
                items.len()
            ));
            for (i, item) in items.iter().enumerate() {
                out.push(" AND ");
                render_child(out, column, path, PathSegment::Index(i), item);
            }
            out.push(")");
        }
        Value::Object(map) => {
            out.push("(");
            render_type_is(out, column, path, "object");

            // removing every expected key must leave an empty object
            let keys = map
                .keys()
                .filter_map(|key| path.child(PathSegment::key(key.as_str())).ok())
                .map(|child| quote_literal(child.as_str()))
                .collect::<Vec<_>>();
            let stripped = if keys.is_empty() {
                quote_ident(column)
            } else {
                format!("json_remove({}, {})", quote_ident(column), keys.join(", "))
            };
            out.push(&format!(
                " AND json_extract({stripped}, {}) IS '{{}}'",
                quote_literal(path.as_str())
            ));

            for (key, item) in map {
                out.push(" AND ");
                render_child(out, column, path, PathSegment::key(key.as_str()), item);
            }
            out.push(")");
        }
    }
}

fn render_child(
    out: &mut Renderer,
    column: &str,
    path: &StoragePath,
    segment: PathSegment,
    value: &Value,
) {
    match path.child(segment) {
        Ok(child) => render_match(out, column, &child, value),
        // keys the path grammar cannot address never match
        Err(_) => out.push("0"),
    }
}

fn render_type_is(out: &mut Renderer, column: &str, path: &StoragePath, json_type: &str) {
    type_operand(column, path).render(out);
    out.push(" IS ");
    out.push(&quote_literal(json_type));
}

fn type_operand(column: &str, path: &StoragePath) -> Operand {
    Operand::Type {
        column: column.to_string(),
        path: path.clone(),
    }
}

impl BitAnd for Predicate {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self::And(vec![self, rhs])
    }
}

impl BitAnd for &Predicate {
    type Output = Predicate;

    fn bitand(self, rhs: Self) -> Self::Output {
        Predicate::And(vec![self.clone(), rhs.clone()])
    }
}

impl BitOr for Predicate {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self::Or(vec![self, rhs])
    }
}

impl BitOr for &Predicate {
    type Output = Predicate;

    fn bitor(self, rhs: Self) -> Self::Output {
        Predicate::Or(vec![self.clone(), rhs.clone()])
    }
}

impl Not for Predicate {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self::Not(Box::new(self))
    }
}
