// =============================================================================
// CRATE-LEVEL QUALITY LINTS
// =============================================================================
#![forbid(unsafe_code)]
#![deny(unused_must_use)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]
#![warn(unreachable_pub)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
// =============================================================================
// CLIPPY CONFIGURATION
// =============================================================================
#![allow(clippy::doc_markdown)] // Code items in docs
#![allow(clippy::module_name_repetitions)] // Type names matching module - acceptable
#![allow(clippy::return_self_not_must_use)] // Builder and sink methods return Self
#![allow(clippy::must_use_candidate)] // Fluent API doesn't need must_use everywhere
#![allow(clippy::format_push_string)] // String building style
#![allow(clippy::double_must_use)] // Functions returning must_use types can have their own docs

//! # queryable - URL query strings to filter and sort operations
//!
//! Turns a query string such as `age>=18&name=*son&status~a,b&order_by=created_at,desc`
//! into an ordered list of [`FilterDescriptor`]s, keeping only the fields a
//! resource has authorized. The descriptors can be applied to any backend
//! that implements [`FilterSink`]; a parameterized SQL backend ships in
//! [`sql`].
//!
//! ## Quick Start
//!
//! ```
//! use queryable::prelude::*;
//!
//! let parser = QueryParser::new(
//!     AllowedFieldSet::new()
//!         .with_fields(["name", "age", "status", "created_at", "order_by"])
//!         .with_hidden(["password"]),
//! );
//!
//! let result = parser.parse("age>=18&name=*son&password=x&order_by=createdAt,desc");
//! assert_eq!(result.len(), 3);
//!
//! let query = result.apply_to(sqlite("users")).build();
//! assert_eq!(
//!     query.sql,
//!     "SELECT * FROM users WHERE age >= ?1 AND name LIKE ?2 ORDER BY created_at DESC"
//! );
//! ```
//!
//! ## Fragment Grammar
//!
//! | Fragment | Descriptor | Backend operation |
//! |----------|------------|-------------------|
//! | `age>=18` | comparison | `greater_or_equal` |
//! | `name!=bob` | comparison | `not_equals` |
//! | `deleted_at=null` | null test | `is_null` |
//! | `deleted_at!=null` | null test | `is_not_null` |
//! | `name=*son` | pattern match `%son` | `like` |
//! | `status~a,b` | inclusion | `in_list` |
//! | `status!~a,b` | exclusion | `not_in_list` |
//! | `order_by=name,desc` | sort directive | `order_by` |
//!
//! Fragments that are malformed, unauthorized, or use an unsupported
//! operator are dropped; [`QueryParser::parse`] never fails.
//!
//! ## Field Policy
//!
//! [`AllowedFieldSet`] combines an allowlist (or allow-all) with a denylist.
//! The denylist always wins, including over allow-all. Keys are normalized
//! (to `snake_case` by default) before the check. Sorting needs the
//! reserved `order_by` key itself to be authorized as well as the field
//! being sorted on.

mod apply;
mod case;
pub mod constants;
mod decode;
mod descriptor;
mod fields;
pub mod log;
mod parser;
pub mod sql;
mod token;

pub use apply::{FilterSink, RecordingSink, apply_all, apply_descriptor};
pub use case::{Normalizer, SnakeCase, Verbatim, to_snake_case};
pub use constants::Limits;
pub use decode::{DecodeError, url_decode};
pub use descriptor::{
    ApplyOp, CompareOp, FieldContext, FilterDescriptor, SortDir, build_descriptor,
};
pub use fields::{AllowedFieldSet, AllowedFields};
pub use parser::{ParseResult, QueryParser};
pub use token::{OPERATOR_CHARS, RawToken, is_operator_char, tokenize};

/// Commonly used types.
pub mod prelude {
    pub use crate::sql::{Param, SqlQuery, postgres, sqlite};
    pub use crate::{
        AllowedFieldSet, AllowedFields, ApplyOp, CompareOp, FilterDescriptor, FilterSink,
        Limits, ParseResult, QueryParser, SnakeCase, SortDir, Verbatim,
    };
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_end_to_end_postgres() {
        let parser = QueryParser::new(AllowedFieldSet::new().with_fields([
            "name",
            "age",
            "status",
            "deleted_at",
            "order_by",
        ]));

        let query = parser
            .apply(
                "name=*oh*&age<30&status!~banned,deleted&deletedAt=null&order_by=age,desc",
                postgres("users"),
            )
            .build();

        assert_eq!(
            query.sql,
            "SELECT * FROM users WHERE name LIKE $1 AND age < $2 AND status != ALL($3) \
             AND deleted_at IS NULL ORDER BY age DESC"
        );
        assert_eq!(
            query.params,
            vec![
                Param::Text("%oh%".into()),
                Param::Text("30".into()),
                Param::List(vec!["banned".into(), "deleted".into()]),
            ]
        );
    }

    #[test]
    fn test_denylist_beats_allow_all() {
        let parser = QueryParser::new(AllowedFieldSet::all().with_hidden(["password"]));
        let result = parser.parse("password=x&email=a@b.c");

        assert_eq!(result.len(), 1);
        assert_eq!(result.iter().next().map(FilterDescriptor::key), Some("email"));
    }

    #[test]
    fn test_policy_changes_apply_to_next_parse() {
        let mut parser = QueryParser::new(AllowedFieldSet::new());
        assert!(parser.parse("name=bob").is_empty());

        parser.fields_mut().add("name");
        assert_eq!(parser.parse("name=bob").len(), 1);

        parser.fields_mut().hide("name");
        assert!(parser.parse("name=bob").is_empty());
    }
}

// ============================================================================
// API Contract Tests (compile-time assertions)
// ============================================================================
