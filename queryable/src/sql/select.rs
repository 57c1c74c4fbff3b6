//! SELECT builder driven by filter descriptors.

use super::dialect::Dialect;
use super::ident::{assert_valid_sql_identifier, is_valid_sql_identifier};
use super::{Param, SqlQuery};
use crate::apply::FilterSink;
use crate::descriptor::SortDir;

/// Parameterized `SELECT` for one table.
///
/// Conditions are joined with `AND` in the order they were applied and
/// sort directives become `ORDER BY` terms in order. Field names that are
/// not plain SQL identifiers are skipped, never interpolated.
#[derive(Debug, Clone)]
pub struct SelectQuery<D: Dialect> {
    dialect: D,
    table: String,
    columns: Vec<String>,
    conditions: Vec<String>,
    params: Vec<Param>,
    sorts: Vec<(String, SortDir)>,
    limit: Option<u32>,
}

impl<D: Dialect> SelectQuery<D> {
    /// Create a query for `table`.
    ///
    /// # Panics
    ///
    /// Panics if the table name is not a valid SQL identifier.
    pub fn new(dialect: D, table: impl Into<String>) -> Self {
        let table = table.into();
        assert_valid_sql_identifier(&table, "table");
        Self {
            dialect,
            table,
            columns: Vec::new(),
            conditions: Vec::new(),
            params: Vec::new(),
            sorts: Vec::new(),
            limit: None,
        }
    }

    /// Set the selected columns (default `*`).
    ///
    /// # Panics
    ///
    /// Panics if any column name is not a valid SQL identifier.
    pub fn columns(mut self, columns: &[&str]) -> Self {
        for column in columns {
            assert_valid_sql_identifier(column, "column");
        }
        self.columns = columns.iter().map(|c| (*c).to_string()).collect();
        self
    }

    /// Set a row limit.
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    fn next_idx(&self) -> usize {
        self.params.len() + 1
    }

    fn accept(field: &str) -> bool {
        if is_valid_sql_identifier(field) {
            true
        } else {
            crate::log::warn!("field skipped, not a SQL identifier", field: field);
            false
        }
    }

    fn compare(mut self, field: &str, op: &str, value: &str) -> Self {
        if Self::accept(field) {
            let placeholder = self.dialect.param(self.next_idx());
            self.conditions.push(format!("{field} {op} {placeholder}"));
            self.params.push(Param::Text(value.to_string()));
        }
        self
    }

    fn condition(mut self, field: &str, sql: String) -> Self {
        if Self::accept(field) {
            self.conditions.push(sql);
        }
        self
    }

    /// Render the SQL and its parameters.
    pub fn build(self) -> SqlQuery {
        let columns = if self.columns.is_empty() {
            "*".to_string()
        } else {
            self.columns.join(", ")
        };
        let mut sql = format!("SELECT {columns} FROM {}", self.table);

        if !self.conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.conditions.join(" AND "));
        }

        if !self.sorts.is_empty() {
            let terms: Vec<String> = self
                .sorts
                .iter()
                .map(|(field, dir)| {
                    let dir = match dir {
                        SortDir::Asc => "ASC",
                        SortDir::Desc => "DESC",
                    };
                    format!("{field} {dir}")
                })
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&terms.join(", "));
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        SqlQuery {
            sql,
            params: self.params,
        }
    }
}

impl<D: Dialect> FilterSink for SelectQuery<D> {
    fn equals(self, field: &str, value: &str) -> Self {
        self.compare(field, "=", value)
    }

    fn not_equals(self, field: &str, value: &str) -> Self {
        self.compare(field, "!=", value)
    }

    fn less_than(self, field: &str, value: &str) -> Self {
        self.compare(field, "<", value)
    }

    fn greater_than(self, field: &str, value: &str) -> Self {
        self.compare(field, ">", value)
    }

    fn less_or_equal(self, field: &str, value: &str) -> Self {
        self.compare(field, "<=", value)
    }

    fn greater_or_equal(self, field: &str, value: &str) -> Self {
        self.compare(field, ">=", value)
    }

    fn is_null(self, field: &str) -> Self {
        self.condition(field, format!("{field} IS NULL"))
    }

    fn is_not_null(self, field: &str) -> Self {
        self.condition(field, format!("{field} IS NOT NULL"))
    }

    fn like(self, field: &str, pattern: &str) -> Self {
        self.compare(field, "LIKE", pattern)
    }

    fn in_list(mut self, field: &str, values: &[String]) -> Self {
        if !Self::accept(field) {
            return self;
        }
        if values.is_empty() {
            // Empty IN matches nothing; empty NOT IN below matches everything
            self.conditions.push("1=0".to_string());
            return self;
        }
        let (sql, params) = self.dialect.in_clause(field, values, self.next_idx());
        self.conditions.push(sql);
        self.params.extend(params);
        self
    }

    fn not_in_list(mut self, field: &str, values: &[String]) -> Self {
        if !Self::accept(field) {
            return self;
        }
        if values.is_empty() {
            // Empty NOT IN excludes nothing, so it adds no condition
            return self;
        }
        let (sql, params) = self.dialect.not_in_clause(field, values, self.next_idx());
        self.conditions.push(sql);
        self.params.extend(params);
        self
    }

    fn order_by(mut self, field: &str, direction: SortDir) -> Self {
        if Self::accept(field) {
            self.sorts.push((field.to_string(), direction));
        }
        self
    }
}
