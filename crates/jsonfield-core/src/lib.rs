//! Core runtime for JsonField: JSON document columns over SQLite JSON1.
//!
//! A column stores serialized JSON text; callers work with decoded values,
//! query it through compiled path expressions, and index or constrain it
//! with generated DDL. Every operation here is a pure function of its
//! arguments; row I/O belongs to the host.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod codec;
pub mod config;
pub mod error;
pub mod field;
pub mod path;
pub mod predicate;
pub mod schema;
pub mod traits;

// re-exports
pub use error::Error;
pub use field::create_json_index;
pub use serde_json::Value;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No codecs, config loaders, or error types are re-exported here.
///

pub mod prelude {
    pub use crate::{
        field::{JsonField, NullPolicy},
        path::{JsonPath, StoragePath},
        predicate::{Predicate, ScalarHandle},
        schema::{IndexOptions, IndexStatement},
        traits::{ColumnType, TableModel},
        value::Value,
    };
}

/// Decoded JSON value type used throughout the crate.
pub mod value {
    pub use serde_json::{Map, Value, json};
}
