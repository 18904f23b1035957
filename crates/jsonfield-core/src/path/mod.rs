//! Module: path
//! Responsibility: parse user-facing JSON path expressions and render them
//! into the storage engine's native path grammar.
//! Does not own: predicate or DDL composition.
//! Boundary: every other component receives a compiled `StoragePath`.

mod parse;


use std::{fmt, str::FromStr};
use thiserror::Error as ThisError;

///
/// PathError
///
/// Grammar failures for path expressions.
/// Raised at call time; malformed paths are never repaired.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum PathError {
    #[error("path expression is empty")]
    Empty,

    #[error("unterminated bracket at offset {offset} in '{path}'")]
    UnterminatedBracket { path: String, offset: usize },

    #[error("unterminated quoted key at offset {offset} in '{path}'")]
    UnterminatedQuote { path: String, offset: usize },

    #[error("invalid array index '{index}' at offset {offset} in '{path}'")]
    InvalidIndex {
        path: String,
        offset: usize,
        index: String,
    },

    #[error("empty key segment at offset {offset} in '{path}'")]
    EmptyKey { path: String, offset: usize },

    #[error("unexpected character '{found}' at offset {offset} in '{path}'")]
    UnexpectedChar {
        path: String,
        offset: usize,
        found: char,
    },

    #[error("key '{key}' cannot be expressed in a storage path")]
    UnsupportedKey { key: String },
}

///
/// PathSegment
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl PathSegment {
    #[must_use]
    pub fn key(key: impl Into<String>) -> Self {
        Self::Key(key.into())
    }

    #[must_use]
    pub const fn index(index: usize) -> Self {
        Self::Index(index)
    }

    fn validate(&self) -> Result<(), PathError> {
        match self {
            Self::Key(key) if key.is_empty() => Err(PathError::EmptyKey {
                path: String::new(),
                offset: 0,
            }),
            Self::Key(key) if key.contains('"') => {
                Err(PathError::UnsupportedKey { key: key.clone() })
            }
            _ => Ok(()),
        }
    }
}

///
/// JsonPath
///
/// Ordered, non-empty sequence of segments below the document root.
/// Construction validates every segment, so a held `JsonPath` always renders.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct JsonPath {
    segments: Vec<PathSegment>,
}

impl JsonPath {
    pub fn new(segments: Vec<PathSegment>) -> Result<Self, PathError> {
        if segments.is_empty() {
            return Err(PathError::Empty);
        }
        for segment in &segments {
            segment.validate()?;
        }

        Ok(Self { segments })
    }

    /// Parse a dotted/bracketed expression. The `$` root marker is optional.
    pub fn parse(expr: &str) -> Result<Self, PathError> {
        parse::parse(expr)
    }

    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Render into the engine's native path grammar.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::from("$");
        for segment in &self.segments {
            match segment {
                PathSegment::Key(key) if is_bare_key(key) => {
                    out.push('.');
                    out.push_str(key);
                }
                PathSegment::Key(key) => {
                    out.push_str(".\"");
                    out.push_str(key);
                    out.push('"');
                }
                PathSegment::Index(index) => {
                    out.push('[');
                    out.push_str(&index.to_string());
                    out.push(']');
                }
            }
        }

        out
    }

    #[must_use]
    pub fn compile(&self) -> StoragePath {
        StoragePath {
            rendered: self.render(),
            path: self.clone(),
        }
    }
}

impl FromStr for JsonPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

// Keys that render without quoting in the SQLite path grammar.
fn is_bare_key(key: &str) -> bool {
    !key.is_empty() && key.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

///
/// StoragePath
///
/// A compiled path in the engine's native grammar, e.g. `$.a.b[0]`.
/// Only produced by compilation; one `JsonPath` maps to exactly one rendering.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq, derive_more::Display)]
#[display("{rendered}")]
pub struct StoragePath {
    rendered: String,
    path: JsonPath,
}

impl StoragePath {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.rendered
    }

    #[must_use]
    pub const fn json_path(&self) -> &JsonPath {
        &self.path
    }

    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        self.path.segments()
    }

    /// The path one segment deeper.
    pub fn child(&self, segment: PathSegment) -> Result<Self, PathError> {
        let mut segments = self.segments().to_vec();
        segments.push(segment);

        Ok(JsonPath::new(segments)?.compile())
    }
}

impl AsRef<str> for StoragePath {
    fn as_ref(&self) -> &str {
        &self.rendered
    }
}

///
/// IntoJsonPath
///
/// Accepts either a pre-structured path or a conventional path string.
///

pub trait IntoJsonPath {
    fn into_json_path(self) -> Result<JsonPath, PathError>;
}

impl IntoJsonPath for JsonPath {
    fn into_json_path(self) -> Result<JsonPath, PathError> {
        Ok(self)
    }
}

impl IntoJsonPath for &JsonPath {
    fn into_json_path(self) -> Result<JsonPath, PathError> {
        Ok(self.clone())
    }
}

impl IntoJsonPath for StoragePath {
    fn into_json_path(self) -> Result<JsonPath, PathError> {
        Ok(self.path)
    }
}

impl IntoJsonPath for &StoragePath {
    fn into_json_path(self) -> Result<JsonPath, PathError> {
        Ok(self.path.clone())
    }
}

impl IntoJsonPath for &str {
    fn into_json_path(self) -> Result<JsonPath, PathError> {
        JsonPath::parse(self)
    }
}

impl IntoJsonPath for String {
    fn into_json_path(self) -> Result<JsonPath, PathError> {
        JsonPath::parse(&self)
    }
}

impl IntoJsonPath for &String {
    fn into_json_path(self) -> Result<JsonPath, PathError> {
        JsonPath::parse(self)
    }
}

impl IntoJsonPath for Vec<PathSegment> {
    fn into_json_path(self) -> Result<JsonPath, PathError> {
        JsonPath::new(self)
    }
}

/// Compile a path expression into its canonical storage rendering.
///
/// Compiling an already-canonical storage path returns it unchanged.
pub fn compile(path: impl IntoJsonPath) -> Result<StoragePath, PathError> {
    Ok(path.into_json_path()?.compile())
}
