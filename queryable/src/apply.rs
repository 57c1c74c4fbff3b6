//! The retrieval-engine boundary.
//!
//! A backend implements [`FilterSink`], one method per [`ApplyOp`]. The
//! descriptor-to-method table lives in [`apply_descriptor`]; nothing is
//! looked up by name at runtime.

use crate::descriptor::{ApplyOp, CompareOp, FilterDescriptor, SortDir};

/// A backend that accumulates filter and sort operations.
///
/// Methods take `self` by value and return the updated state, so builders
/// (`QueryBuilder`-style) and plain accumulators both fit.
pub trait FilterSink: Sized {
    /// `field = value`
    fn equals(self, field: &str, value: &str) -> Self;
    /// `field != value`
    fn not_equals(self, field: &str, value: &str) -> Self;
    /// `field < value`
    fn less_than(self, field: &str, value: &str) -> Self;
    /// `field > value`
    fn greater_than(self, field: &str, value: &str) -> Self;
    /// `field <= value`
    fn less_or_equal(self, field: &str, value: &str) -> Self;
    /// `field >= value`
    fn greater_or_equal(self, field: &str, value: &str) -> Self;
    /// `field IS NULL`
    fn is_null(self, field: &str) -> Self;
    /// `field IS NOT NULL`
    fn is_not_null(self, field: &str) -> Self;
    /// `field LIKE pattern`, `%` as wildcard.
    fn like(self, field: &str, pattern: &str) -> Self;
    /// `field IN (values)`
    fn in_list(self, field: &str, values: &[String]) -> Self;
    /// `field NOT IN (values)`
    fn not_in_list(self, field: &str, values: &[String]) -> Self;
    /// `ORDER BY field direction`, appended after earlier sorts.
    fn order_by(self, field: &str, direction: SortDir) -> Self;
}

/// Apply one descriptor through the fixed operation table.
pub fn apply_descriptor<S: FilterSink>(sink: S, descriptor: &FilterDescriptor) -> S {
    match descriptor {
        FilterDescriptor::Comparison { key, op, value } => match op {
            CompareOp::Eq => sink.equals(key, value),
            CompareOp::Ne => sink.not_equals(key, value),
            CompareOp::Lt => sink.less_than(key, value),
            CompareOp::Gt => sink.greater_than(key, value),
            CompareOp::Lte => sink.less_or_equal(key, value),
            CompareOp::Gte => sink.greater_or_equal(key, value),
        },
        FilterDescriptor::NullTest { key, is_null: true } => sink.is_null(key),
        FilterDescriptor::NullTest { key, is_null: false } => sink.is_not_null(key),
        FilterDescriptor::PatternMatch { key, pattern } => sink.like(key, pattern),
        FilterDescriptor::InclusionTest {
            key,
            negated: false,
            values,
        } => sink.in_list(key, values),
        FilterDescriptor::InclusionTest {
            key,
            negated: true,
            values,
        } => sink.not_in_list(key, values),
        FilterDescriptor::SortDirective { key, direction } => sink.order_by(key, *direction),
    }
}

/// Apply descriptors in sequence and return the final backend state.
pub fn apply_all<'a, S, I>(sink: S, descriptors: I) -> S
where
    S: FilterSink,
    I: IntoIterator<Item = &'a FilterDescriptor>,
{
    descriptors.into_iter().fold(sink, apply_descriptor)
}

/// A [`FilterSink`] that records every call as `(op, field, args)`.
///
/// Useful for asserting exactly what a backend would receive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingSink {
    /// Calls in the order they were made.
    pub calls: Vec<(ApplyOp, String, Vec<String>)>,
}

impl RecordingSink {
    /// An empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, op: ApplyOp, field: &str, args: Vec<String>) -> Self {
        self.calls.push((op, field.to_string(), args));
        self
    }
}

impl FilterSink for RecordingSink {
    fn equals(self, field: &str, value: &str) -> Self {
        self.push(ApplyOp::Equals, field, vec![value.to_string()])
    }

    fn not_equals(self, field: &str, value: &str) -> Self {
        self.push(ApplyOp::NotEquals, field, vec![value.to_string()])
    }

    fn less_than(self, field: &str, value: &str) -> Self {
        self.push(ApplyOp::LessThan, field, vec![value.to_string()])
    }

    fn greater_than(self, field: &str, value: &str) -> Self {
        self.push(ApplyOp::GreaterThan, field, vec![value.to_string()])
    }

    fn less_or_equal(self, field: &str, value: &str) -> Self {
        self.push(ApplyOp::LessOrEqual, field, vec![value.to_string()])
    }

    fn greater_or_equal(self, field: &str, value: &str) -> Self {
        self.push(ApplyOp::GreaterOrEqual, field, vec![value.to_string()])
    }

    fn is_null(self, field: &str) -> Self {
        self.push(ApplyOp::IsNull, field, vec![])
    }

    fn is_not_null(self, field: &str) -> Self {
        self.push(ApplyOp::IsNotNull, field, vec![])
    }

    fn like(self, field: &str, pattern: &str) -> Self {
        self.push(ApplyOp::Like, field, vec![pattern.to_string()])
    }

    fn in_list(self, field: &str, values: &[String]) -> Self {
        self.push(ApplyOp::InList, field, values.to_vec())
    }

    fn not_in_list(self, field: &str, values: &[String]) -> Self {
        self.push(ApplyOp::NotInList, field, values.to_vec())
    }

    fn order_by(self, field: &str, direction: SortDir) -> Self {
        self.push(ApplyOp::OrderBy, field, vec![direction.as_str().to_string()])
    }
}
