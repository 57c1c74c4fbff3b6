//! Query string driver: splits on `&` and runs every fragment through the
//! tokenizer and the descriptor builder.

use crate::apply::{FilterSink, apply_all};
use crate::case::{Normalizer, SnakeCase};
use crate::constants::{FRAGMENT_SEPARATOR, Limits};
use crate::decode::url_decode;
use crate::descriptor::{FieldContext, FilterDescriptor, build};
use crate::fields::AllowedFieldSet;
use crate::token::tokenize;

/// Ordered descriptors extracted from one query string.
///
/// Order follows the fragments of the input, filters and sort directives
/// interleaved as given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ParseResult {
    descriptors: Vec<FilterDescriptor>,
}

impl ParseResult {
    /// Wrap an already ordered descriptor list.
    pub const fn new(descriptors: Vec<FilterDescriptor>) -> Self {
        Self { descriptors }
    }

    /// Number of descriptors.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// `true` when nothing was extracted.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Iterate in fragment order.
    pub fn iter(&self) -> std::slice::Iter<'_, FilterDescriptor> {
        self.descriptors.iter()
    }

    /// Borrow as a slice.
    pub fn as_slice(&self) -> &[FilterDescriptor] {
        &self.descriptors
    }

    /// Filters only, sort directives skipped.
    pub fn filters(&self) -> impl Iterator<Item = &FilterDescriptor> {
        self.descriptors.iter().filter(|d| !d.is_sort())
    }

    /// Sort directives only.
    pub fn sorts(&self) -> impl Iterator<Item = &FilterDescriptor> {
        self.descriptors.iter().filter(|d| d.is_sort())
    }

    /// Apply every descriptor, in order, to a retrieval backend.
    pub fn apply_to<S: FilterSink>(&self, sink: S) -> S {
        apply_all(sink, &self.descriptors)
    }

    /// Take the descriptors.
    pub fn into_vec(self) -> Vec<FilterDescriptor> {
        self.descriptors
    }
}

impl IntoIterator for ParseResult {
    type Item = FilterDescriptor;
    type IntoIter = std::vec::IntoIter<FilterDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.descriptors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ParseResult {
    type Item = &'a FilterDescriptor;
    type IntoIter = std::slice::Iter<'a, FilterDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.descriptors.iter()
    }
}

impl From<Vec<FilterDescriptor>> for ParseResult {
    fn from(descriptors: Vec<FilterDescriptor>) -> Self {
        Self::new(descriptors)
    }
}

/// Turns query strings into [`ParseResult`]s for one field policy.
///
/// Parsing keeps no state between calls, so a parser can be shared across
/// threads and reused for any number of query strings.
///
/// # Example
///
/// ```
/// use queryable::{AllowedFieldSet, CompareOp, FilterDescriptor, QueryParser, SortDir};
///
/// let parser = QueryParser::new(
///     AllowedFieldSet::new().with_fields(["name", "age", "created_at", "order_by"]),
/// );
///
/// let result = parser.parse("age>=18&password=x&order_by=createdAt,desc");
/// assert_eq!(
///     result.into_vec(),
///     vec![
///         FilterDescriptor::Comparison {
///             key: "age".into(),
///             op: CompareOp::Gte,
///             value: "18".into(),
///         },
///         FilterDescriptor::SortDirective { key: "created_at".into(), direction: SortDir::Desc },
///     ]
/// );
/// ```
#[derive(Debug, Clone)]
pub struct QueryParser<N = SnakeCase> {
    fields: AllowedFieldSet,
    normalizer: N,
    limits: Limits,
}

impl QueryParser<SnakeCase> {
    /// A parser that normalizes keys to `snake_case`, with limits from the
    /// environment.
    pub fn new(fields: AllowedFieldSet) -> Self {
        Self::with_normalizer(fields, SnakeCase)
    }
}

impl Default for QueryParser<SnakeCase> {
    fn default() -> Self {
        Self::new(AllowedFieldSet::default())
    }
}

impl<N: Normalizer> QueryParser<N> {
    /// A parser with a custom key normalizer.
    pub fn with_normalizer(fields: AllowedFieldSet, normalizer: N) -> Self {
        Self {
            fields,
            normalizer,
            limits: Limits::from_env(),
        }
    }

    /// Replace the limits.
    #[must_use]
    pub fn limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Current limits.
    pub const fn current_limits(&self) -> &Limits {
        &self.limits
    }

    /// The field policy.
    pub const fn fields(&self) -> &AllowedFieldSet {
        &self.fields
    }

    /// Mutable access to the field policy.
    pub const fn fields_mut(&mut self) -> &mut AllowedFieldSet {
        &mut self.fields
    }

    /// Parse a URL-decoded query string.
    ///
    /// Never fails: fragments that are malformed, unauthorized or
    /// unsupported are dropped and the rest is returned in order.
    pub fn parse(&self, query: &str) -> ParseResult {
        let mut descriptors = Vec::new();

        if query.is_empty() {
            return ParseResult::new(descriptors);
        }

        for (i, fragment) in query.split(FRAGMENT_SEPARATOR).enumerate() {
            if i >= self.limits.max_fragments {
                crate::log::warn!(
                    "fragment limit reached, ignoring the rest",
                    max: self.limits.max_fragments
                );
                break;
            }
            if let Some(descriptor) = self.parse_fragment(fragment) {
                descriptors.push(descriptor);
            }
        }

        ParseResult::new(descriptors)
    }

    /// Parse a raw (still URL-encoded) query string.
    ///
    /// The whole string is decoded before splitting, so an encoded `%26`
    /// separates fragments like a literal `&`. A missing query string
    /// yields an empty result.
    pub fn parse_encoded(&self, raw: Option<&str>) -> ParseResult {
        let Some(raw) = raw else {
            return ParseResult::default();
        };

        match url_decode(raw, self.limits.max_query_len) {
            Ok(decoded) => self.parse(&decoded),
            Err(e) => {
                crate::log::warn!("query string ignored", error: e);
                ParseResult::default()
            },
        }
    }

    /// Parse a decoded query string and apply the result to a backend.
    pub fn apply<S: FilterSink>(&self, query: &str, sink: S) -> S {
        self.parse(query).apply_to(sink)
    }

    /// Tokenize, normalize, authorize and build one fragment.
    pub fn parse_fragment(&self, fragment: &str) -> Option<FilterDescriptor> {
        let Some(token) = tokenize(fragment) else {
            crate::log::debug!("fragment dropped", fragment: fragment, reason: "malformed");
            return None;
        };

        let key = self.normalizer.normalize(token.key());
        match build(token.with_key(key), self) {
            Ok(descriptor) => Some(descriptor),
            Err(rejection) => {
                crate::log::debug!(
                    "fragment dropped",
                    fragment: fragment,
                    reason: rejection.as_str()
                );
                None
            },
        }
    }
}

impl<N: Normalizer> FieldContext for QueryParser<N> {
    fn normalize(&self, key: &str) -> String {
        self.normalizer.normalize(key)
    }

    fn is_authorized(&self, field: &str) -> bool {
        self.fields.is_authorized(field)
    }

    fn max_list_values(&self) -> usize {
        self.limits.max_list_values
    }
}
