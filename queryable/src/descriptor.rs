//! Filter descriptors and the builder that turns a [`RawToken`] into one.
//!
//! | Fragment             | Descriptor                                         |
//! |----------------------|----------------------------------------------------|
//! | `age<=30`            | `Comparison { age, Lte, "30" }`                    |
//! | `deleted_at=null`    | `NullTest { deleted_at, is_null: true }`           |
//! | `deleted_at!=null`   | `NullTest { deleted_at, is_null: false }`          |
//! | `name=*oh*`          | `PatternMatch { name, "%oh%" }`                    |
//! | `status~a,b`         | `InclusionTest { status, negated: false, [a, b] }` |
//! | `status!~a`          | `InclusionTest { status, negated: true, [a] }`     |
//! | `order_by=name,desc` | `SortDirective { name, Desc }`                     |

use crate::constants::{
    BACKEND_WILDCARD, LIST_SEPARATOR, NULL_LITERAL, ORDER_BY_KEY, WILDCARD,
};
use crate::token::RawToken;
use std::fmt;

/// Comparison operators accepted in `key<op>value` fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CompareOp {
    /// `=`
    #[cfg_attr(feature = "serde", serde(rename = "="))]
    Eq,
    /// `!=`
    #[cfg_attr(feature = "serde", serde(rename = "!="))]
    Ne,
    /// `<`
    #[cfg_attr(feature = "serde", serde(rename = "<"))]
    Lt,
    /// `>`
    #[cfg_attr(feature = "serde", serde(rename = ">"))]
    Gt,
    /// `<=`
    #[cfg_attr(feature = "serde", serde(rename = "<="))]
    Lte,
    /// `>=`
    #[cfg_attr(feature = "serde", serde(rename = ">="))]
    Gte,
}

impl CompareOp {
    /// Parse an operator symbol as it appears in a fragment.
    ///
    /// ```
    /// use queryable::CompareOp;
    ///
    /// assert_eq!(CompareOp::from_symbol("<="), Some(CompareOp::Lte));
    /// assert_eq!(CompareOp::from_symbol("=<"), None);
    /// ```
    pub fn from_symbol(s: &str) -> Option<Self> {
        match s {
            "=" => Some(Self::Eq),
            "!=" => Some(Self::Ne),
            "<" => Some(Self::Lt),
            ">" => Some(Self::Gt),
            "<=" => Some(Self::Lte),
            ">=" => Some(Self::Gte),
            _ => None,
        }
    }

    /// The operator symbol.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Lte => "<=",
            Self::Gte => ">=",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SortDir {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

impl SortDir {
    /// Parse `asc` / `desc` in any letter case.
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("asc") {
            Some(Self::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Some(Self::Desc)
        } else {
            None
        }
    }

    /// Lowercase name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Backend operation a descriptor is applied with.
///
/// This is the closed table the retrieval engine implements; see
/// [`FilterSink`](crate::FilterSink).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ApplyOp {
    /// `field = value`
    Equals,
    /// `field != value`
    NotEquals,
    /// `field < value`
    LessThan,
    /// `field > value`
    GreaterThan,
    /// `field <= value`
    LessOrEqual,
    /// `field >= value`
    GreaterOrEqual,
    /// `field IS NULL`
    IsNull,
    /// `field IS NOT NULL`
    IsNotNull,
    /// `field LIKE pattern`
    Like,
    /// `field IN (values)`
    InList,
    /// `field NOT IN (values)`
    NotInList,
    /// `ORDER BY field direction`
    OrderBy,
}

/// One filter or sort operation extracted from a query string.
///
/// Every `key` has been normalized and authorized; descriptors are never
/// built for denied fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum FilterDescriptor {
    /// `key <op> value`.
    Comparison {
        /// Field name.
        key: String,
        /// Comparison operator.
        op: CompareOp,
        /// Value text, untouched.
        value: String,
    },
    /// `key IS NULL` or `key IS NOT NULL`.
    NullTest {
        /// Field name.
        key: String,
        /// `true` for `IS NULL`.
        is_null: bool,
    },
    /// `key LIKE pattern`, with `%` where the input had `*`.
    PatternMatch {
        /// Field name.
        key: String,
        /// Backend pattern.
        pattern: String,
    },
    /// `key IN (values)` or `key NOT IN (values)`.
    InclusionTest {
        /// Field name.
        key: String,
        /// `true` for `NOT IN`.
        negated: bool,
        /// Values in input order.
        values: Vec<String>,
    },
    /// `ORDER BY key direction`.
    SortDirective {
        /// Field to sort by.
        key: String,
        /// Sort direction.
        direction: SortDir,
    },
}

impl FilterDescriptor {
    /// Field the descriptor refers to.
    pub fn key(&self) -> &str {
        match self {
            Self::Comparison { key, .. }
            | Self::NullTest { key, .. }
            | Self::PatternMatch { key, .. }
            | Self::InclusionTest { key, .. }
            | Self::SortDirective { key, .. } => key,
        }
    }

    /// The backend operation this descriptor maps to.
    pub const fn apply_op(&self) -> ApplyOp {
        match self {
            Self::Comparison { op, .. } => match op {
                CompareOp::Eq => ApplyOp::Equals,
                CompareOp::Ne => ApplyOp::NotEquals,
                CompareOp::Lt => ApplyOp::LessThan,
                CompareOp::Gt => ApplyOp::GreaterThan,
                CompareOp::Lte => ApplyOp::LessOrEqual,
                CompareOp::Gte => ApplyOp::GreaterOrEqual,
            },
            Self::NullTest { is_null: true, .. } => ApplyOp::IsNull,
            Self::NullTest { is_null: false, .. } => ApplyOp::IsNotNull,
            Self::PatternMatch { .. } => ApplyOp::Like,
            Self::InclusionTest { negated: false, .. } => ApplyOp::InList,
            Self::InclusionTest { negated: true, .. } => ApplyOp::NotInList,
            Self::SortDirective { .. } => ApplyOp::OrderBy,
        }
    }

    /// Whether this is a sort directive rather than a filter.
    pub const fn is_sort(&self) -> bool {
        matches!(self, Self::SortDirective { .. })
    }
}

/// Normalization and authorization used while building descriptors.
pub trait FieldContext {
    /// Map a client field name onto a backend field name.
    fn normalize(&self, key: &str) -> String;

    /// Whether a normalized field may be filtered or sorted on.
    fn is_authorized(&self, field: &str) -> bool;

    /// Longest inclusion list accepted.
    fn max_list_values(&self) -> usize {
        usize::MAX
    }
}

/// Why a token produced no descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Rejection {
    Unauthorized,
    UnsupportedOperator,
    InvalidDirection,
    ListTooLong,
}

impl Rejection {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::UnsupportedOperator => "unsupported operator",
            Self::InvalidDirection => "invalid sort direction",
            Self::ListTooLong => "list too long",
        }
    }
}

/// Build the descriptor for a token whose key is already normalized.
///
/// Returns `None` for unauthorized fields, unknown operators, unknown sort
/// directions and oversized lists. A sort directive needs both the
/// `order_by` key and its target field to be authorized.
///
/// Two behaviors are kept on purpose:
/// - any comparison against the literal `null` other than `=` is a
///   not-null test, so `age<null` means `age IS NOT NULL`;
/// - a wildcard value turns any comparison operator into `LIKE`, so
///   `name!=*oh` matches rather than excludes.
///
/// # Example
///
/// ```
/// use queryable::{AllowedFieldSet, FilterDescriptor, QueryParser, RawToken, build_descriptor};
///
/// let parser = QueryParser::new(AllowedFieldSet::new().with_fields(["name"]));
/// let desc = build_descriptor(RawToken::new("name", "=", "*oh"), &parser);
/// assert_eq!(
///     desc,
///     Some(FilterDescriptor::PatternMatch { key: "name".into(), pattern: "%oh".into() })
/// );
/// ```
pub fn build_descriptor<C: FieldContext + ?Sized>(
    token: RawToken,
    ctx: &C,
) -> Option<FilterDescriptor> {
    build(token, ctx).ok()
}

pub(crate) fn build<C: FieldContext + ?Sized>(
    token: RawToken,
    ctx: &C,
) -> Result<FilterDescriptor, Rejection> {
    let (key, operator, value) = token.into_parts();
    let authorize = |key: &str| {
        if ctx.is_authorized(key) {
            Ok(())
        } else {
            Err(Rejection::Unauthorized)
        }
    };

    if let Some(op) = CompareOp::from_symbol(&operator) {
        authorize(&key)?;

        if value == NULL_LITERAL {
            return Ok(FilterDescriptor::NullTest {
                key,
                is_null: op == CompareOp::Eq,
            });
        }

        if value.contains(WILDCARD) {
            return Ok(match wildcard_pattern(&value) {
                Some(pattern) => FilterDescriptor::PatternMatch { key, pattern },
                // Wildcard only in the middle: compared literally
                None => FilterDescriptor::Comparison { key, op, value },
            });
        }

        // The sort target needs its own authorization on top of `order_by`
        if key == ORDER_BY_KEY {
            return sort_directive(&value, ctx);
        }

        return Ok(FilterDescriptor::Comparison { key, op, value });
    }

    let negated = match operator.as_str() {
        "~" => false,
        "!~" => true,
        _ => return Err(Rejection::UnsupportedOperator),
    };
    authorize(&key)?;

    let values: Vec<String> = value.split(LIST_SEPARATOR).map(str::to_string).collect();
    if values.len() > ctx.max_list_values() {
        return Err(Rejection::ListTooLong);
    }
    Ok(FilterDescriptor::InclusionTest {
        key,
        negated,
        values,
    })
}

/// Replace a leading and/or trailing `*` with the backend wildcard.
///
/// The trailing check runs on the already rewritten value, so a lone `*`
/// becomes a single `%`.
fn wildcard_pattern(value: &str) -> Option<String> {
    let mut pattern = value.to_string();
    let mut matched = false;

    if let Some(rest) = pattern.strip_prefix(WILDCARD) {
        pattern = format!("{BACKEND_WILDCARD}{rest}");
        matched = true;
    }
    if let Some(rest) = pattern.strip_suffix(WILDCARD) {
        pattern = format!("{rest}{BACKEND_WILDCARD}");
        matched = true;
    }

    matched.then_some(pattern)
}

/// `order_by=field[,direction]`.
///
/// The direction is only read when the value has exactly two parts; any
/// other shape sorts ascending.
fn sort_directive<C: FieldContext + ?Sized>(
    value: &str,
    ctx: &C,
) -> Result<FilterDescriptor, Rejection> {
    let parts: Vec<&str> = value.split(LIST_SEPARATOR).collect();
    let field = ctx.normalize(parts.first().copied().unwrap_or_default());
    if !ctx.is_authorized(&field) {
        return Err(Rejection::Unauthorized);
    }

    let direction = match parts.as_slice() {
        [_, dir] => SortDir::parse(dir).ok_or(Rejection::InvalidDirection)?,
        _ => SortDir::Asc,
    };

    Ok(FilterDescriptor::SortDirective {
        key: field,
        direction,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::to_snake_case;

    struct Ctx(&'static [&'static str]);

    impl FieldContext for Ctx {
        fn normalize(&self, key: &str) -> String {
            to_snake_case(key)
        }

        fn is_authorized(&self, field: &str) -> bool {
            self.0.contains(&field)
        }

        fn max_list_values(&self) -> usize {
            3
        }
    }

    const CTX: Ctx = Ctx(&["name", "age", "status", "deleted_at", "created_at", "order_by"]);
    const NO_SORT: Ctx = Ctx(&["name", "age", "status", "deleted_at", "created_at"]);

    fn build_one(key: &str, op: &str, value: &str) -> Option<FilterDescriptor> {
        build_descriptor(RawToken::new(key, op, value), &CTX)
    }

    #[test]
    fn test_comparisons() {
        for (sym, op) in [
            ("=", CompareOp::Eq),
            ("!=", CompareOp::Ne),
            ("<", CompareOp::Lt),
            (">", CompareOp::Gt),
            ("<=", CompareOp::Lte),
            (">=", CompareOp::Gte),
        ] {
            assert_eq!(
                build_one("age", sym, "30"),
                Some(FilterDescriptor::Comparison {
                    key: "age".into(),
                    op,
                    value: "30".into(),
                })
            );
        }
    }

    #[test]
    fn test_null_tests() {
        let null = |op| build_one("deleted_at", op, "null");
        assert_eq!(
            null("="),
            Some(FilterDescriptor::NullTest { key: "deleted_at".into(), is_null: true })
        );
        assert_eq!(
            null("!="),
            Some(FilterDescriptor::NullTest { key: "deleted_at".into(), is_null: false })
        );
    }

    #[test]
    fn test_null_with_ordering_operator_is_not_null() {
        // Kept as-is: `<null`, `>null`, `<=null`, `>=null` all mean IS NOT NULL
        for op in ["<", ">", "<=", ">="] {
            assert_eq!(
                build_one("deleted_at", op, "null"),
                Some(FilterDescriptor::NullTest { key: "deleted_at".into(), is_null: false }),
                "operator {op}"
            );
        }
    }

    #[test]
    fn test_null_literal_is_case_sensitive() {
        assert_eq!(
            build_one("name", "=", "NULL"),
            Some(FilterDescriptor::Comparison {
                key: "name".into(),
                op: CompareOp::Eq,
                value: "NULL".into(),
            })
        );
    }

    #[test]
    fn test_wildcards() {
        let pattern = |v| match build_one("name", "=", v) {
            Some(FilterDescriptor::PatternMatch { pattern, .. }) => Some(pattern),
            _ => None,
        };
        assert_eq!(pattern("*oh*").as_deref(), Some("%oh%"));
        assert_eq!(pattern("oh*").as_deref(), Some("oh%"));
        assert_eq!(pattern("*oh").as_deref(), Some("%oh"));
        assert_eq!(pattern("*").as_deref(), Some("%"));
        assert_eq!(pattern("**").as_deref(), Some("%%"));
    }

    #[test]
    fn test_wildcard_discards_comparison_operator() {
        assert_eq!(
            build_one("name", "!=", "*oh"),
            Some(FilterDescriptor::PatternMatch { key: "name".into(), pattern: "%oh".into() })
        );
    }

    #[test]
    fn test_inner_wildcard_is_literal() {
        assert_eq!(
            build_one("name", "=", "j*n"),
            Some(FilterDescriptor::Comparison {
                key: "name".into(),
                op: CompareOp::Eq,
                value: "j*n".into(),
            })
        );
    }

    #[test]
    fn test_inclusion_lists() {
        assert_eq!(
            build_one("status", "~", "a,b,c"),
            Some(FilterDescriptor::InclusionTest {
                key: "status".into(),
                negated: false,
                values: vec!["a".into(), "b".into(), "c".into()],
            })
        );
        assert_eq!(
            build_one("status", "!~", "a"),
            Some(FilterDescriptor::InclusionTest {
                key: "status".into(),
                negated: true,
                values: vec!["a".into()],
            })
        );
    }

    #[test]
    fn test_inclusion_list_keeps_empty_entries() {
        let Some(FilterDescriptor::InclusionTest { values, .. }) = build_one("status", "~", "a,,b")
        else {
            panic!("expected inclusion test");
        };
        assert_eq!(values, vec!["a", "", "b"]);
    }

    #[test]
    fn test_inclusion_list_limit() {
        assert!(build_one("status", "~", "a,b,c").is_some());
        assert_eq!(
            build(RawToken::new("status", "~", "a,b,c,d"), &CTX),
            Err(Rejection::ListTooLong)
        );
    }

    #[test]
    fn test_order_by() {
        assert_eq!(
            build_one("order_by", "=", "name,desc"),
            Some(FilterDescriptor::SortDirective { key: "name".into(), direction: SortDir::Desc })
        );
        assert_eq!(
            build_one("order_by", "=", "name"),
            Some(FilterDescriptor::SortDirective { key: "name".into(), direction: SortDir::Asc })
        );
        assert_eq!(
            build_one("order_by", "=", "name,DESC"),
            Some(FilterDescriptor::SortDirective { key: "name".into(), direction: SortDir::Desc })
        );
    }

    #[test]
    fn test_order_by_normalizes_field() {
        assert_eq!(
            build_one("order_by", "=", "createdAt,desc"),
            Some(FilterDescriptor::SortDirective {
                key: "created_at".into(),
                direction: SortDir::Desc,
            })
        );
    }

    #[test]
    fn test_order_by_unauthorized_field_has_no_fallback() {
        assert_eq!(build_one("order_by", "=", "password,desc"), None);
        assert_eq!(
            build(RawToken::new("order_by", "=", "password"), &CTX),
            Err(Rejection::Unauthorized)
        );
    }

    #[test]
    fn test_order_by_direction_shapes() {
        assert_eq!(
            build(RawToken::new("order_by", "=", "name,sideways"), &CTX),
            Err(Rejection::InvalidDirection)
        );
        // Only a two-part value carries a direction
        assert_eq!(
            build_one("order_by", "=", "name,desc,extra"),
            Some(FilterDescriptor::SortDirective { key: "name".into(), direction: SortDir::Asc })
        );
        assert_eq!(build_one("order_by", "=", ",desc"), None);
    }

    #[test]
    fn test_order_by_key_needs_authorization() {
        // Sorting on an allowed field still needs `order_by` itself allowed
        assert_eq!(
            build(RawToken::new("order_by", "=", "name,desc"), &NO_SORT),
            Err(Rejection::Unauthorized)
        );
        assert_eq!(build_descriptor(RawToken::new("order_by", "=", "name"), &NO_SORT), None);
        assert_eq!(build_descriptor(RawToken::new("order_by", "=", "null"), &NO_SORT), None);
        assert_eq!(build_descriptor(RawToken::new("order_by", "=", "name*"), &NO_SORT), None);
        assert_eq!(build_descriptor(RawToken::new("order_by", "~", "name"), &NO_SORT), None);
    }

    #[test]
    fn test_allowed_order_by_key_outside_sorting() {
        // Once allowed, `order_by` behaves like any other key for these shapes
        assert_eq!(
            build_one("order_by", "=", "null"),
            Some(FilterDescriptor::NullTest { key: "order_by".into(), is_null: true })
        );
        assert_eq!(
            build_one("order_by", "=", "name*"),
            Some(FilterDescriptor::PatternMatch { key: "order_by".into(), pattern: "name%".into() })
        );
    }

    #[test]
    fn test_unauthorized_key() {
        assert_eq!(build_one("password", "=", "x"), None);
        assert_eq!(build_one("password", "=", "null"), None);
        assert_eq!(build_one("password", "=", "*x"), None);
        assert_eq!(build_one("password", "~", "x"), None);
    }

    #[test]
    fn test_unsupported_operators() {
        for op in ["!", "~~", "==", "<>", "=b", "=<"] {
            assert_eq!(
                build(RawToken::new("name", op, "x"), &CTX),
                Err(Rejection::UnsupportedOperator),
                "operator {op}"
            );
        }
    }

    #[test]
    fn test_apply_op_mapping() {
        let cmp = |op| FilterDescriptor::Comparison { key: "a".into(), op, value: "1".into() };
        assert_eq!(cmp(CompareOp::Eq).apply_op(), ApplyOp::Equals);
        assert_eq!(cmp(CompareOp::Ne).apply_op(), ApplyOp::NotEquals);
        assert_eq!(cmp(CompareOp::Lt).apply_op(), ApplyOp::LessThan);
        assert_eq!(cmp(CompareOp::Gt).apply_op(), ApplyOp::GreaterThan);
        assert_eq!(cmp(CompareOp::Lte).apply_op(), ApplyOp::LessOrEqual);
        assert_eq!(cmp(CompareOp::Gte).apply_op(), ApplyOp::GreaterOrEqual);

        let null = |is_null| FilterDescriptor::NullTest { key: "a".into(), is_null };
        assert_eq!(null(true).apply_op(), ApplyOp::IsNull);
        assert_eq!(null(false).apply_op(), ApplyOp::IsNotNull);

        let list = |negated| FilterDescriptor::InclusionTest {
            key: "a".into(),
            negated,
            values: vec![],
        };
        assert_eq!(list(false).apply_op(), ApplyOp::InList);
        assert_eq!(list(true).apply_op(), ApplyOp::NotInList);

        let sort = FilterDescriptor::SortDirective { key: "a".into(), direction: SortDir::Asc };
        assert_eq!(sort.apply_op(), ApplyOp::OrderBy);
        assert!(sort.is_sort());
        assert_eq!(sort.key(), "a");
    }

    #[test]
    fn test_sort_dir_parse() {
        assert_eq!(SortDir::parse("asc"), Some(SortDir::Asc));
        assert_eq!(SortDir::parse("Desc"), Some(SortDir::Desc));
        assert_eq!(SortDir::parse(""), None);
        assert_eq!(SortDir::Desc.as_str(), "desc");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_shape() {
        let desc = FilterDescriptor::Comparison {
            key: "age".into(),
            op: CompareOp::Lte,
            value: "30".into(),
        };
        assert_eq!(
            serde_json::to_string(&desc).unwrap(),
            r#"{"kind":"comparison","key":"age","op":"<=","value":"30"}"#
        );

        let sort = FilterDescriptor::SortDirective { key: "name".into(), direction: SortDir::Desc };
        assert_eq!(
            serde_json::to_string(&sort).unwrap(),
            r#"{"kind":"sort_directive","key":"name","direction":"desc"}"#
        );
    }
}
