//! SQL identifier checks.
//!
//! Field names reach the SQL text verbatim, so anything outside
//! `[A-Za-z_][A-Za-z0-9_]*` is refused even when the field policy is
//! allow-all.

/// Maximum identifier length (`PostgreSQL` limit is 63).
const MAX_IDENTIFIER_LENGTH: usize = 63;

/// Whether `s` can be interpolated into SQL as a bare identifier.
///
/// ```
/// use queryable::sql::is_valid_sql_identifier;
///
/// assert!(is_valid_sql_identifier("created_at"));
/// assert!(!is_valid_sql_identifier("name; DROP TABLE users"));
/// assert!(!is_valid_sql_identifier("1abc"));
/// ```
#[inline]
pub fn is_valid_sql_identifier(s: &str) -> bool {
    let bytes = s.as_bytes();
    match bytes.split_first() {
        Some((first, rest)) if bytes.len() <= MAX_IDENTIFIER_LENGTH => {
            (first.is_ascii_alphabetic() || *first == b'_')
                && rest.iter().all(|b| b.is_ascii_alphanumeric() || *b == b'_')
        },
        _ => false,
    }
}

/// Panic unless `s` is a valid identifier.
///
/// For names that come from code (table, selected columns), not from the
/// query string.
///
/// # Panics
///
/// Panics with the offending name and `context`.
#[inline]
pub fn assert_valid_sql_identifier(s: &str, context: &str) {
    assert!(
        is_valid_sql_identifier(s),
        "Invalid SQL {context} name '{s}': must start with letter/underscore, \
         contain only ASCII alphanumeric/underscore, and be 1-63 chars"
    );
}
