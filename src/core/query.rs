//! Filter, sort and limit constraints for collection queries
//!
//! A [`QuerySpec`] conjoins zero or more [`FilterCondition`]s, an optional
//! single [`SortOption`] and an optional result cap. Backends receive the spec
//! whole; [`QuerySpec::constraints`] lowers it to the ordered constraint list
//! a remote query builder expects, and [`QuerySpec::apply`] evaluates it
//! locally with the document store's semantics.
//!
//! # Example
//! ```rust,ignore
//! let spec = QuerySpec::new()
//!     .filter("status", FilterOp::Equal, "done")
//!     .order_by("createdAt", SortDirection::Desc)
//!     .limit(2);
//!
//! let result = documents.query("tasks", &spec).await;
//! ```
//!
//! # Evaluation rules
//! - A document lacking a filtered field never matches, whatever the operator.
//! - Range operators (`<`, `<=`, `>`, `>=`) only match values of the same type.
//! - Numbers compare numerically: `1 == 1.0`.
//! - `!=` and `not-in` also exclude `null` fields.
//! - Sorting drops documents lacking the sort field and orders values across
//!   types as null < boolean < number < string < array < map. Ties fall back
//!   to the document id, in the same direction.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::document::{Document, Record, get_path, json_type_name, validate_path};
use crate::core::error::StoreError;

/// Maximum number of values in an `in`, `not-in` or `array-contains-any` filter
pub const MAX_DISJUNCTION_VALUES: usize = 30;

/// Comparison operator of a filter condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterOp {
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = "<=")]
    LessThanOrEqual,
    #[serde(rename = "==")]
    Equal,
    #[serde(rename = "!=")]
    NotEqual,
    #[serde(rename = ">=")]
    GreaterThanOrEqual,
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = "array-contains")]
    ArrayContains,
    #[serde(rename = "in")]
    In,
    #[serde(rename = "not-in")]
    NotIn,
    #[serde(rename = "array-contains-any")]
    ArrayContainsAny,
}

impl FilterOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOp::LessThan => "<",
            FilterOp::LessThanOrEqual => "<=",
            FilterOp::Equal => "==",
            FilterOp::NotEqual => "!=",
            FilterOp::GreaterThanOrEqual => ">=",
            FilterOp::GreaterThan => ">",
            FilterOp::ArrayContains => "array-contains",
            FilterOp::In => "in",
            FilterOp::NotIn => "not-in",
            FilterOp::ArrayContainsAny => "array-contains-any",
        }
    }

    /// Operators whose value must be a list of candidates
    pub fn takes_array(&self) -> bool {
        matches!(self, FilterOp::In | FilterOp::NotIn | FilterOp::ArrayContainsAny)
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterOp {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "<" => FilterOp::LessThan,
            "<=" => FilterOp::LessThanOrEqual,
            "==" => FilterOp::Equal,
            "!=" => FilterOp::NotEqual,
            ">=" => FilterOp::GreaterThanOrEqual,
            ">" => FilterOp::GreaterThan,
            "array-contains" => FilterOp::ArrayContains,
            "in" => FilterOp::In,
            "not-in" => FilterOp::NotIn,
            "array-contains-any" => FilterOp::ArrayContainsAny,
            other => {
                return Err(StoreError::invalid_argument(format!(
                    "Invalid query. '{}' is not a valid filter operator",
                    other
                )));
            }
        })
    }
}

/// A single `field <op> value` test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCondition {
    pub field: String,
    pub operator: FilterOp,
    pub value: Value,
}

impl FilterCondition {
    pub fn new(field: impl Into<String>, operator: FilterOp, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    /// Whether `record` satisfies this condition
    pub fn matches(&self, record: &Record) -> bool {
        let Some(actual) = get_path(record, &self.field) else {
            return false;
        };

        match self.operator {
            FilterOp::Equal => values_equal(actual, &self.value),
            FilterOp::NotEqual => !actual.is_null() && !values_equal(actual, &self.value),
            FilterOp::LessThan => range_cmp(actual, &self.value).is_some_and(Ordering::is_lt),
            FilterOp::LessThanOrEqual => {
                range_cmp(actual, &self.value).is_some_and(Ordering::is_le)
            }
            FilterOp::GreaterThan => range_cmp(actual, &self.value).is_some_and(Ordering::is_gt),
            FilterOp::GreaterThanOrEqual => {
                range_cmp(actual, &self.value).is_some_and(Ordering::is_ge)
            }
            FilterOp::ArrayContains => actual
                .as_array()
                .is_some_and(|items| items.iter().any(|item| values_equal(item, &self.value))),
            FilterOp::In => candidates(&self.value)
                .iter()
                .any(|candidate| values_equal(actual, candidate)),
            FilterOp::NotIn => {
                !actual.is_null()
                    && !candidates(&self.value)
                        .iter()
                        .any(|candidate| values_equal(actual, candidate))
            }
            FilterOp::ArrayContainsAny => actual.as_array().is_some_and(|items| {
                items.iter().any(|item| {
                    candidates(&self.value)
                        .iter()
                        .any(|candidate| values_equal(item, candidate))
                })
            }),
        }
    }

    fn validate(&self) -> Result<(), StoreError> {
        validate_path(&self.field)?;

        if self.operator.takes_array() {
            match self.value.as_array() {
                Some(values) if !values.is_empty() && values.len() <= MAX_DISJUNCTION_VALUES => {}
                Some(values) if values.len() > MAX_DISJUNCTION_VALUES => {
                    return Err(StoreError::invalid_argument(format!(
                        "Invalid Query. '{}' filters support a maximum of {} elements in the value array",
                        self.operator, MAX_DISJUNCTION_VALUES
                    )));
                }
                _ => {
                    return Err(StoreError::invalid_argument(format!(
                        "Invalid Query. A non-empty array is required for '{}' filters, but it was: {}",
                        self.operator,
                        json_type_name(&self.value)
                    )));
                }
            }
        } else if self.value.is_null()
            && !matches!(self.operator, FilterOp::Equal | FilterOp::NotEqual)
        {
            return Err(StoreError::invalid_argument(format!(
                "Invalid query. Null supports only '==' and '!=' comparisons, but it was used with '{}'",
                self.operator
            )));
        }

        Ok(())
    }
}

/// Sort order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Single-field ordering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOption {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortOption {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Desc)
    }
}

/// One step of a lowered query, in application order
#[derive(Debug, Clone, PartialEq)]
pub enum QueryConstraint {
    Where(FilterCondition),
    OrderBy(SortOption),
    Limit(usize),
}

/// Conditions, ordering and cap of a collection query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuerySpec {
    /// Conjoined filters
    pub conditions: Vec<FilterCondition>,

    pub sort: Option<SortOption>,

    /// Result-count ceiling
    pub limit: Option<usize>,
}

impl QuerySpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble a spec from its parts
    pub fn from_parts(
        conditions: Vec<FilterCondition>,
        sort: Option<SortOption>,
        limit: Option<usize>,
    ) -> Self {
        Self {
            conditions,
            sort,
            limit,
        }
    }

    /// Add a filter condition
    pub fn filter(
        mut self,
        field: impl Into<String>,
        operator: FilterOp,
        value: impl Into<Value>,
    ) -> Self {
        self.conditions.push(FilterCondition::new(field, operator, value));
        self
    }

    /// Shorthand for an equality filter
    pub fn where_eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(field, FilterOp::Equal, value)
    }

    /// Set the ordering, replacing any previous one
    pub fn order_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort = Some(SortOption::new(field, direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Lower to constraints: every filter, then the ordering, then the limit
    pub fn constraints(&self) -> Vec<QueryConstraint> {
        let mut constraints: Vec<QueryConstraint> = self
            .conditions
            .iter()
            .cloned()
            .map(QueryConstraint::Where)
            .collect();

        if let Some(sort) = &self.sort {
            constraints.push(QueryConstraint::OrderBy(sort.clone()));
        }

        if let Some(limit) = self.limit {
            constraints.push(QueryConstraint::Limit(limit));
        }

        constraints
    }

    /// Reject specs the document store would refuse to run
    pub fn validate(&self) -> Result<(), StoreError> {
        for condition in &self.conditions {
            condition.validate()?;
        }

        let negations = self
            .conditions
            .iter()
            .filter(|c| matches!(c.operator, FilterOp::NotEqual | FilterOp::NotIn))
            .count();
        if negations > 1 {
            return Err(StoreError::invalid_argument(
                "Invalid query. You cannot use more than one '!=' or 'not-in' filter.",
            ));
        }

        if let Some(sort) = &self.sort {
            if sort.field.is_empty() {
                return Err(StoreError::invalid_argument(
                    "Function orderBy() called with an empty field path",
                ));
            }
            validate_path(&sort.field)?;
        }

        if self.limit == Some(0) {
            return Err(StoreError::invalid_argument(
                "Function limit() requires a positive number, but it was: 0.",
            ));
        }

        Ok(())
    }

    /// Evaluate against a set of documents
    pub fn apply(&self, documents: Vec<Document>) -> Vec<Document> {
        let mut matched: Vec<Document> = documents
            .into_iter()
            .filter(|doc| self.conditions.iter().all(|c| c.matches(&doc.data)))
            .collect();

        if let Some(sort) = &self.sort {
            matched.retain(|doc| doc.get(&sort.field).is_some());
            matched.sort_by(|a, b| {
                let ordering = match (a.get(&sort.field), b.get(&sort.field)) {
                    (Some(x), Some(y)) => compare_values(x, y),
                    _ => Ordering::Equal,
                }
                .then_with(|| a.id.cmp(&b.id));
                match sort.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            });
        }

        if let Some(limit) = self.limit {
            matched.truncate(limit);
        }

        matched
    }
}

fn candidates(value: &Value) -> &[Value] {
    value.as_array().map(Vec::as_slice).unwrap_or(&[])
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Equality with numeric coercion (`1 == 1.0`), applied recursively
pub fn values_equal(a: &Value, b: &Value) -> bool {
    compare_values(a, b) == Ordering::Equal
}

fn range_cmp(actual: &Value, bound: &Value) -> Option<Ordering> {
    (type_rank(actual) == type_rank(bound)).then(|| compare_values(actual, bound))
}

/// Total order over JSON values, across types
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            // JSON numbers are finite; -0.0 and 0.0 compare equal
            _ => {
                let x = x.as_f64().unwrap_or_default();
                let y = y.as_f64().unwrap_or_default();
                x.partial_cmp(&y).unwrap_or(Ordering::Equal)
            }
        },
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => x
            .iter()
            .zip(y.iter())
            .map(|(x, y)| compare_values(x, y))
            .find(|o| o.is_ne())
            .unwrap_or_else(|| x.len().cmp(&y.len())),
        (Value::Object(x), Value::Object(y)) => {
            let mut xs: Vec<_> = x.iter().collect();
            let mut ys: Vec<_> = y.iter().collect();
            xs.sort_by(|a, b| a.0.cmp(b.0));
            ys.sort_by(|a, b| a.0.cmp(b.0));
            xs.iter()
                .zip(ys.iter())
                .map(|((kx, vx), (ky, vy))| kx.cmp(ky).then_with(|| compare_values(vx, vy)))
                .find(|o| o.is_ne())
                .unwrap_or_else(|| xs.len().cmp(&ys.len()))
        }
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}
