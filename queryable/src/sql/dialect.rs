//! SQL dialects for Postgres and `SQLite`.
//!
//! Each dialect handles the placeholder syntax and how lists are bound.

use super::Param;

/// Database-specific syntax.
pub trait Dialect: Clone + Copy {
    /// Parameter placeholder (`$1` for Postgres, `?1` for `SQLite`).
    fn param(&self, idx: usize) -> String;

    /// `field IN (...)` condition starting at placeholder `start_idx`.
    /// `values` is never empty.
    fn in_clause(&self, field: &str, values: &[String], start_idx: usize) -> (String, Vec<Param>);

    /// `field NOT IN (...)` condition starting at placeholder `start_idx`.
    /// `values` is never empty.
    fn not_in_clause(
        &self,
        field: &str,
        values: &[String],
        start_idx: usize,
    ) -> (String, Vec<Param>);
}

/// Postgres dialect.
#[derive(Debug, Clone, Copy, Default)]
#[non_exhaustive]
pub struct Postgres;

impl Dialect for Postgres {
    #[inline]
    fn param(&self, idx: usize) -> String {
        format!("${idx}")
    }

    fn in_clause(&self, field: &str, values: &[String], start_idx: usize) -> (String, Vec<Param>) {
        // One array parameter: field = ANY($1)
        (
            format!("{field} = ANY(${start_idx})"),
            vec![Param::List(values.to_vec())],
        )
    }

    fn not_in_clause(
        &self,
        field: &str,
        values: &[String],
        start_idx: usize,
    ) -> (String, Vec<Param>) {
        (
            format!("{field} != ALL(${start_idx})"),
            vec![Param::List(values.to_vec())],
        )
    }
}

/// `SQLite` dialect.
#[derive(Debug, Clone, Copy, Default)]
#[non_exhaustive]
pub struct Sqlite;

impl Sqlite {
    fn placeholders(values: &[String], start_idx: usize) -> String {
        (0..values.len())
            .map(|i| format!("?{}", start_idx + i))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Dialect for Sqlite {
    #[inline]
    fn param(&self, idx: usize) -> String {
        format!("?{idx}")
    }

    fn in_clause(&self, field: &str, values: &[String], start_idx: usize) -> (String, Vec<Param>) {
        // Expanded parameters: field IN (?1, ?2, ?3)
        let sql = format!("{field} IN ({})", Self::placeholders(values, start_idx));
        (sql, values.iter().cloned().map(Param::Text).collect())
    }

    fn not_in_clause(
        &self,
        field: &str,
        values: &[String],
        start_idx: usize,
    ) -> (String, Vec<Param>) {
        let sql = format!("{field} NOT IN ({})", Self::placeholders(values, start_idx));
        (sql, values.iter().cloned().map(Param::Text).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(Postgres.param(1), "$1");
        assert_eq!(Postgres.param(12), "$12");
        assert_eq!(Sqlite.param(1), "?1");
        assert_eq!(Sqlite.param(12), "?12");
    }

    #[test]
    fn test_postgres_lists_bind_one_array() {
        let (sql, params) = Postgres.in_clause("status", &list(&["a", "b"]), 3);
        assert_eq!(sql, "status = ANY($3)");
        assert_eq!(params, vec![Param::List(list(&["a", "b"]))]);

        let (sql, params) = Postgres.not_in_clause("status", &list(&["a"]), 1);
        assert_eq!(sql, "status != ALL($1)");
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_sqlite_lists_expand() {
        let (sql, params) = Sqlite.in_clause("status", &list(&["a", "b", "c"]), 2);
        assert_eq!(sql, "status IN (?2, ?3, ?4)");
        assert_eq!(
            params,
            vec![
                Param::Text("a".into()),
                Param::Text("b".into()),
                Param::Text("c".into())
            ]
        );

        let (sql, params) = Sqlite.not_in_clause("status", &list(&["x"]), 1);
        assert_eq!(sql, "status NOT IN (?1)");
        assert_eq!(params.len(), 1);
    }
}
