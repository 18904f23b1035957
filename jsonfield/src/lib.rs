//! JsonField — JSON Document Columns for SQLite
//!
//! This is the public meta-crate. Downstream users depend on **jsonfield** only.
//!
//! It re-exports the stable public API from:
//!   - `jsonfield-core` (paths, codecs, predicates, index DDL, field descriptors)

pub use jsonfield_core as core;

pub use jsonfield_core::{codec, config, error, path, predicate, schema, traits, value};

//
// Entry points
//

pub use jsonfield_core::{Error, Value, create_json_index};

//
// Prelude
//

pub mod prelude {
    pub use jsonfield_core::prelude::*;
}
