//! Narrow interfaces consumed from, and offered to, the host ORM.

use crate::{error::Error, schema::IndexStatement};
use serde_json::Value;

///
/// ColumnType
///
/// Column-type registration point: the host invokes these hooks on every
/// row write and read.
///

pub trait ColumnType {
    /// Declared storage type of the column.
    const SQL_TYPE: &'static str;

    fn column_name(&self) -> &str;

    fn to_db(&self, value: Option<&Value>) -> Result<Option<String>, Error>;

    fn from_db(&self, stored: Option<&str>) -> Result<Option<Value>, Error>;
}

///
/// TableModel
///
/// Anything that can name the table a field lives on.
///

pub trait TableModel {
    fn table_name(&self) -> &str;
}

impl TableModel for str {
    fn table_name(&self) -> &str {
        self
    }
}

impl TableModel for String {
    fn table_name(&self) -> &str {
        self
    }
}

///
/// DdlExecutor
///
/// Host entry point that runs generated DDL verbatim.
///

pub trait DdlExecutor {
    type Error;

    fn execute_ddl(&mut self, sql: &str) -> Result<(), Self::Error>;

    fn execute_indexes(&mut self, statements: &[IndexStatement]) -> Result<(), Self::Error> {
        for statement in statements {
            self.execute_ddl(&statement.sql)?;
        }

        Ok(())
    }
}
