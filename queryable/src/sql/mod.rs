//! Reference retrieval backend: renders descriptors as a parameterized SQL
//! `SELECT`.
//!
//! ```
//! use queryable::{AllowedFieldSet, QueryParser};
//! use queryable::sql::postgres;
//!
//! let parser =
//!     QueryParser::new(AllowedFieldSet::new().with_fields(["name", "age", "order_by"]));
//! let query = parser
//!     .apply("age>=18&name=*son&order_by=name,desc", postgres("users"))
//!     .build();
//!
//! assert_eq!(
//!     query.sql,
//!     "SELECT * FROM users WHERE age >= $1 AND name LIKE $2 ORDER BY name DESC"
//! );
//! ```

mod dialect;
mod ident;
mod select;

pub use dialect::{Dialect, Postgres, Sqlite};
pub use ident::{assert_valid_sql_identifier, is_valid_sql_identifier};
pub use select::SelectQuery;

/// A bound parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Param {
    /// A single text value.
    Text(String),
    /// An array value (Postgres `ANY` / `ALL`).
    List(Vec<String>),
}

/// Rendered SQL with its parameters, in placeholder order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[must_use = "SqlQuery must be used to execute the query"]
pub struct SqlQuery {
    /// SQL text with placeholders.
    pub sql: String,
    /// Parameters for the placeholders.
    pub params: Vec<Param>,
}

/// Start a Postgres `SELECT` for `table`.
///
/// # Panics
///
/// Panics if the table name is not a valid SQL identifier.
pub fn postgres(table: &str) -> SelectQuery<Postgres> {
    SelectQuery::new(Postgres, table)
}

/// Start a `SQLite` `SELECT` for `table`.
///
/// # Panics
///
/// Panics if the table name is not a valid SQL identifier.
pub fn sqlite(table: &str) -> SelectQuery<Sqlite> {
    SelectQuery::new(Sqlite, table)
}
