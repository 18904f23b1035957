use crate::codec::ScalarEncoding;

///
/// SqlValue
///
/// A bound parameter in the engine's storage classes.
///

#[derive(Clone, Debug, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl SqlValue {
    /// Render as an inline SQL literal.
    #[must_use]
    pub fn to_literal(&self) -> String {
        match self {
            Self::Null => "NULL".to_string(),
            Self::Integer(i) => i.to_string(),
            Self::Real(f) if f.is_finite() => format!("{f:?}"),
            Self::Real(_) => "NULL".to_string(),
            Self::Text(text) => quote_literal(text),
        }
    }
}

///
/// SqlFragment
///
/// Rendered SQL text plus its positional parameters, in `?` order.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SqlFragment {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

/// Quote an identifier, doubling embedded double quotes.
#[must_use]
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote a string literal, doubling embedded single quotes.
#[must_use]
pub fn quote_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

///
/// Renderer
///
/// Accumulates SQL text. In inline mode parameters are written as literals,
/// which DDL contexts such as partial-index WHERE clauses require.
///

pub(crate) struct Renderer {
    sql: String,
    params: Vec<SqlValue>,
    inline: bool,
}

impl Renderer {
    pub(crate) const fn new(inline: bool) -> Self {
        Self {
            sql: String::new(),
            params: Vec::new(),
            inline,
        }
    }

    pub(crate) fn push(&mut self, text: &str) {
        self.sql.push_str(text);
    }

    pub(crate) fn param(&mut self, value: SqlValue) {
        if self.inline {
            self.sql.push_str(&value.to_literal());
        } else {
            self.sql.push('?');
            self.params.push(value);
        }
    }

    /// Write a scalar right-hand side; compound values are parsed by the engine.
    pub(crate) fn scalar(&mut self, encoding: ScalarEncoding) {
        match encoding {
            ScalarEncoding::Null => self.param(SqlValue::Null),
            ScalarEncoding::Integer(i) => self.param(SqlValue::Integer(i)),
            ScalarEncoding::Real(f) => self.param(SqlValue::Real(f)),
            ScalarEncoding::Text(text) => self.param(SqlValue::Text(text)),
            ScalarEncoding::Json(text) => {
                self.push("json(");
                self.param(SqlValue::Text(text));
                self.push(")");
            }
        }
    }

    pub(crate) fn finish(self) -> SqlFragment {
        SqlFragment {
            sql: self.sql,
            params: self.params,
        }
    }
}
