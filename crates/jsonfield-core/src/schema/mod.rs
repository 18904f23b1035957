//! Module: schema
//! Responsibility: DDL fragments for JSON columns: validity CHECK
//! constraints and expression indexes over path extractions.
//! Does not own: DDL execution (the host runs these strings verbatim).
//! Boundary: always keyed by the storage column name, never the logical name.

#[cfg(test)]
mod tests;

use crate::{
    path::{PathSegment, StoragePath},
    predicate::{Operand, Predicate, Renderer, quote_ident},
};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error as ThisError;
use xxhash_rust::xxh3::xxh3_64;

///
/// CONSTANTS
///

// SQLite reserves object names with this prefix.
const RESERVED_NAME_PREFIX: &str = "sqlite_";

///
/// IndexSpecError
///
/// Raised while generating DDL, before anything is executed.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum IndexSpecError {
    #[error("index on {table}.{column} needs at least one path")]
    NoPaths { table: String, column: String },

    #[error("path '{path}' appears more than once in index on {table}.{column}")]
    DuplicatePath {
        table: String,
        column: String,
        path: String,
    },

    #[error("{what} name is empty")]
    EmptyIdentifier { what: &'static str },

    #[error("invalid index name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("index name '{name}' is shared by different definitions: {first} / {second}")]
    NameCollision {
        name: String,
        first: String,
        second: String,
    },
}

///
/// IndexOptions
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct IndexOptions {
    /// Explicit index name; derived from (table, column, paths) when absent.
    pub name: Option<String>,
    pub unique: bool,
    /// Partial-index predicate, rendered with inline literals.
    pub where_clause: Option<Predicate>,
}

impl IndexOptions {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub const fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    #[must_use]
    pub fn where_clause(mut self, predicate: Predicate) -> Self {
        self.where_clause = Some(predicate);
        self
    }
}

///
/// IndexSpec
///
/// Everything needed to emit one CREATE INDEX statement.
///

#[derive(Clone, Debug, PartialEq)]
pub struct IndexSpec {
    pub table: String,
    pub column: String,
    pub paths: Vec<StoragePath>,
    pub options: IndexOptions,
}

impl IndexSpec {
    #[must_use]
    pub fn new(table: impl Into<String>, column: impl Into<String>, paths: Vec<StoragePath>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            paths,
            options: IndexOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: IndexOptions) -> Self {
        self.options = options;
        self
    }

    pub fn statement(&self) -> Result<IndexStatement, IndexSpecError> {
        create_index_statement(&self.table, &self.column, &self.paths, &self.options)
    }
}

///
/// IndexStatement
///

#[derive(Clone, Debug, Eq, PartialEq, derive_more::Display)]
#[display("{sql}")]
pub struct IndexStatement {
    pub name: String,
    pub sql: String,
}

/// Engine validity predicate for the column's stored text.
#[must_use]
pub fn check_valid_fragment(column: &str) -> String {
    let mut out = Renderer::new(true);
    Operand::Valid {
        column: column.to_string(),
    }
    .render(&mut out);

    out.finish().sql
}

/// Column constraint clause wrapping [`check_valid_fragment`].
#[must_use]
pub fn check_constraint(column: &str) -> String {
    format!("CHECK ({})", check_valid_fragment(column))
}

/// Deterministic default name derived from (table, column, paths).
///
/// The readable prefix is lossy (`$.a_b`, `$.a.b` and `[$.a, $.b]` all read
/// `a_b`), so it is followed by a digest of the exact identifiers and
/// rendered paths. Distinct definitions get distinct names.
#[must_use]
pub fn default_index_name(table: &str, column: &str, paths: &[StoragePath]) -> String {
    let mut parts = vec![sanitize(table), sanitize(column)];
    for path in paths {
        for segment in path.segments() {
            parts.push(match segment {
                PathSegment::Key(key) => sanitize(key),
                PathSegment::Index(index) => index.to_string(),
            });
        }
    }
    parts.push(format!("{:016x}", definition_digest(table, column, paths)));
    parts.push("idx".to_string());

    parts.join("_")
}

// Length-prefixed framing, so no pair of definitions hashes the same bytes.
fn definition_digest(table: &str, column: &str, paths: &[StoragePath]) -> u64 {
    let mut bytes = Vec::new();
    for part in [table, column]
        .into_iter()
        .chain(paths.iter().map(StoragePath::as_str))
    {
        bytes.extend_from_slice(&(part.len() as u64).to_le_bytes());
        bytes.extend_from_slice(part.as_bytes());
    }

    xxh3_64(&bytes)
}

fn sanitize(ident: &str) -> String {
    ident
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

fn validate_name(name: &str) -> Result<(), IndexSpecError> {
    if name.trim().is_empty() {
        return Err(IndexSpecError::EmptyIdentifier { what: "index" });
    }
    if name.to_ascii_lowercase().starts_with(RESERVED_NAME_PREFIX) {
        return Err(IndexSpecError::InvalidName {
            name: name.to_string(),
            reason: "names starting with 'sqlite_' are reserved",
        });
    }

    Ok(())
}

/// Emit one CREATE INDEX statement over the path extraction(s).
///
/// Repeated generation with the same arguments yields identical text.
pub fn create_index_statement(
    table: &str,
    column: &str,
    paths: &[StoragePath],
    options: &IndexOptions,
) -> Result<IndexStatement, IndexSpecError> {
    if table.trim().is_empty() {
        return Err(IndexSpecError::EmptyIdentifier { what: "table" });
    }
    if column.trim().is_empty() {
        return Err(IndexSpecError::EmptyIdentifier { what: "column" });
    }
    if paths.is_empty() {
        return Err(IndexSpecError::NoPaths {
            table: table.to_string(),
            column: column.to_string(),
        });
    }

    let mut seen = BTreeSet::new();
    for path in paths {
        if !seen.insert(path.as_str()) {
            return Err(IndexSpecError::DuplicatePath {
                table: table.to_string(),
                column: column.to_string(),
                path: path.to_string(),
            });
        }
    }

    let name = match &options.name {
        Some(name) => name.clone(),
        None => default_index_name(table, column, paths),
    };
    validate_name(&name)?;

    let mut out = Renderer::new(true);
    out.push(if options.unique {
        "CREATE UNIQUE INDEX IF NOT EXISTS "
    } else {
        "CREATE INDEX IF NOT EXISTS "
    });
    out.push(&quote_ident(&name));
    out.push(" ON ");
    out.push(&quote_ident(table));
    out.push(" (");
    for (i, path) in paths.iter().enumerate() {
        if i > 0 {
            out.push(", ");
        }
        Operand::Extract {
            column: column.to_string(),
            path: path.clone(),
        }
        .render(&mut out);
    }
    out.push(")");
    if let Some(predicate) = &options.where_clause {
        out.push(" WHERE ");
        predicate.render(&mut out);
    }

    let sql = out.finish().sql;
    tracing::debug!(index = %name, table, column, "generated json index ddl");

    Ok(IndexStatement { name, sql })
}

/// Generate statements for a batch of specs.
///
/// Identical definitions collapse into one statement. A supplied name that
/// is also used by a different definition is rejected, since the engine
/// would silently skip the second `IF NOT EXISTS` statement.
pub fn index_statements(specs: &[IndexSpec]) -> Result<Vec<IndexStatement>, IndexSpecError> {
    let mut by_name: BTreeMap<String, String> = BTreeMap::new();
    let mut out = Vec::with_capacity(specs.len());

    for spec in specs {
        let statement = spec.statement()?;
        match by_name.get(&statement.name) {
            Some(existing) if *existing == statement.sql => {}
            Some(existing) => {
                return Err(IndexSpecError::NameCollision {
                    name: statement.name,
                    first: existing.clone(),
                    second: statement.sql,
                });
            }
            None => {
                by_name.insert(statement.name.clone(), statement.sql.clone());
                out.push(statement);
            }
        }
    }

    Ok(out)
}
