//! Field-name normalization.
//!
//! Query keys arrive in whatever convention the client uses (`createdAt`,
//! `created-at`, `CreatedAt`). A [`Normalizer`] maps them onto the backend's
//! column names before authorization, so the allow-list only ever holds
//! backend names.

/// Maps a client-supplied field name onto a backend field name.
pub trait Normalizer {
    /// Normalize one field name.
    fn normalize(&self, key: &str) -> String;
}

impl<F> Normalizer for F
where
    F: Fn(&str) -> String,
{
    fn normalize(&self, key: &str) -> String {
        self(key)
    }
}

/// Converts `camelCase`, `PascalCase` and `kebab-case` keys to `snake_case`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnakeCase;

impl Normalizer for SnakeCase {
    fn normalize(&self, key: &str) -> String {
        to_snake_case(key)
    }
}

/// Leaves field names untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Verbatim;

impl Normalizer for Verbatim {
    fn normalize(&self, key: &str) -> String {
        key.to_string()
    }
}

/// Convert a field name to `snake_case`.
///
/// - `createdAt` → `created_at`
/// - `CreatedAt` → `created_at`
/// - `created-at` → `created_at`
/// - `HTTPStatus` → `http_status`
///
/// ```
/// use queryable::to_snake_case;
///
/// assert_eq!(to_snake_case("firstName"), "first_name");
/// assert_eq!(to_snake_case("order_by"), "order_by");
/// ```
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.trim().chars().collect();
    let mut out = String::with_capacity(chars.len() + 4);
    // Start as true to avoid a leading underscore
    let mut prev_was_sep = true;
    let mut prev_was_upper = false;

    for (i, &c) in chars.iter().enumerate() {
        if c == '_' {
            out.push('_');
            prev_was_sep = true;
            prev_was_upper = false;
        } else if c == '-' || c.is_whitespace() {
            if !prev_was_sep {
                out.push('_');
            }
            prev_was_sep = true;
            prev_was_upper = false;
        } else if c.is_uppercase() {
            // "HTTPStatus": split before the last capital of a run
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if !prev_was_sep && (!prev_was_upper || next_is_lower) {
                out.push('_');
            }
            out.extend(c.to_lowercase());
            prev_was_sep = false;
            prev_was_upper = true;
        } else {
            out.push(c);
            prev_was_sep = false;
            prev_was_upper = false;
        }
    }

    out
}
