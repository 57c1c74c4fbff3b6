//! Centralized limits and reserved words for the query parser.
//!
//! # Environment Variables
//!
//! The default [`Limits`] can be tuned via environment variables:
//!
//! | Variable                    | Default | Description                              |
//! |-----------------------------|---------|------------------------------------------|
//! | `QUERYABLE_MAX_QUERY_LEN`   | 65536   | Maximum decoded query string length      |
//! | `QUERYABLE_MAX_FRAGMENTS`   | 100     | Fragments considered per query string    |
//! | `QUERYABLE_MAX_LIST_VALUES` | 1000    | Values accepted in one `~` / `!~` list   |
//!
//! Values are read once and cached for the lifetime of the process.

use std::sync::OnceLock;

// ============================================================================
// GRAMMAR
// ============================================================================

/// Separator between fragments of a query string.
pub const FRAGMENT_SEPARATOR: char = '&';

/// Separator inside `~` / `!~` value lists and `order_by` values.
pub const LIST_SEPARATOR: char = ',';

/// Reserved key that turns a fragment into a sort directive.
pub const ORDER_BY_KEY: &str = "order_by";

/// Literal value that turns a comparison into a null test.
pub const NULL_LITERAL: &str = "null";

/// Wildcard marker accepted in user input.
pub const WILDCARD: char = '*';

/// Wildcard marker handed to the backend (`LIKE` syntax).
pub const BACKEND_WILDCARD: char = '%';

/// Allow-list entry that means "every field".
pub const ALLOW_ALL_MARKER: &str = "*";

// ============================================================================
// LIMITS
// ============================================================================

const DEFAULT_MAX_QUERY_LEN: usize = 65536;
const DEFAULT_MAX_FRAGMENTS: usize = 100;
const DEFAULT_MAX_LIST_VALUES: usize = 1000;

static ENV_LIMITS: OnceLock<Limits> = OnceLock::new();

/// Resource limits applied while parsing a query string.
///
/// Exceeding a limit never fails a parse: the excess input is ignored and a
/// warning is logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct Limits {
    /// Maximum decoded length of a query string, in bytes.
    pub max_query_len: usize,
    /// Maximum number of fragments considered; later fragments are ignored.
    pub max_fragments: usize,
    /// Maximum number of values in an inclusion list; longer lists are rejected.
    pub max_list_values: usize,
}

impl Limits {
    /// Built-in defaults, ignoring the environment.
    pub const fn new() -> Self {
        Self {
            max_query_len: DEFAULT_MAX_QUERY_LEN,
            max_fragments: DEFAULT_MAX_FRAGMENTS,
            max_list_values: DEFAULT_MAX_LIST_VALUES,
        }
    }

    /// Defaults with `QUERYABLE_*` environment overrides applied.
    #[inline]
    pub fn from_env() -> Self {
        *ENV_LIMITS.get_or_init(|| Self {
            max_query_len: env_usize("QUERYABLE_MAX_QUERY_LEN", DEFAULT_MAX_QUERY_LEN),
            max_fragments: env_usize("QUERYABLE_MAX_FRAGMENTS", DEFAULT_MAX_FRAGMENTS),
            max_list_values: env_usize("QUERYABLE_MAX_LIST_VALUES", DEFAULT_MAX_LIST_VALUES),
        })
    }

    /// Set the maximum decoded query length.
    #[must_use]
    pub const fn max_query_len(mut self, len: usize) -> Self {
        self.max_query_len = len;
        self
    }

    /// Set the maximum number of fragments per query string.
    #[must_use]
    pub const fn max_fragments(mut self, count: usize) -> Self {
        self.max_fragments = count;
        self
    }

    /// Set the maximum number of values in one inclusion list.
    #[must_use]
    pub const fn max_list_values(mut self, count: usize) -> Self {
        self.max_list_values = count;
        self
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::new()
    }
}

fn env_usize(name: &str, default: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}
