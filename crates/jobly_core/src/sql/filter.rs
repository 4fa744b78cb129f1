//! Declarative filter compilation.
//!
//! # Responsibility
//! - Describe each resource's supported filters as a static `FilterField`
//!   table and compile caller-supplied raw values against it.
//!
//! # Invariants
//! - Filters are visited in the table's declared order, never request order.
//! - Placeholder indices come from a running counter over emitted params.
//! - Range pairs (`Min`/`Max` on one column) are checked before any fragment
//!   is produced; a failed check yields no partial predicate.
//! - An empty raw value counts as not supplied.
//! - `Contains` folds both sides through `CASEFOLD_FN`, so matching is
//!   case-insensitive beyond ASCII.

use super::{quote_column, QueryError, CASEFOLD_FN};
use log::debug;
use rusqlite::types::Value;
use serde::Deserialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Literal accepted by presence filters as "yes".
pub const TRUE_TOKEN: &str = "true";
/// Literal accepted by presence filters as "no".
pub const FALSE_TOKEN: &str = "false";

/// Comparison applied by one filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    /// Case-insensitive (Unicode lowercase) substring match.
    Contains,
    /// Column value must be `>=` the filter value.
    Min,
    /// Column value must be `<=` the filter value.
    Max,
    /// `true` keeps rows whose column differs from `zero`, `false` keeps
    /// rows equal to it. Other values leave the filter unapplied.
    Presence { zero: &'static str },
}

/// Type raw filter values are coerced to before binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Integer,
}

/// One recognized filter name bound to a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterField {
    /// Caller-facing query key, e.g. `minSalary`.
    pub name: &'static str,
    /// Physical column compared by this filter.
    pub column: &'static str,
    pub mode: FilterMode,
    pub kind: ValueKind,
}

impl FilterField {
    fn coerce(&self, raw: &str) -> Result<Value, QueryError> {
        match self.kind {
            ValueKind::Text => Ok(Value::Text(raw.to_string())),
            ValueKind::Integer => raw.trim().parse::<i64>().map(Value::Integer).map_err(|_| {
                QueryError::InvalidFilterValue {
                    filter: self.name,
                    value: raw.to_string(),
                }
            }),
        }
    }
}

/// Raw filter values keyed by filter name, as parsed from a query string.
///
/// Names that no `FilterField` recognizes are carried but ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct FilterRequest {
    values: BTreeMap<String, String>,
}

impl FilterRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Value for `name` unless missing or empty.
    fn supplied(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|raw| !raw.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for FilterRequest
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut request = Self::new();
        for (name, value) in iter {
            request.insert(name, value);
        }
        request
    }
}

/// AND-joined predicate fragments with positionally aligned params.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledPredicate {
    fragments: Vec<String>,
    params: Vec<Value>,
}

impl CompiledPredicate {
    /// Appends one fragment bound to the next placeholder index.
    ///
    /// Keeping this the only mutation path ties fragment `k` to param `k`.
    fn push(&mut self, operand: String, operator: &str, suffix: &str, value: Value) {
        let index = self.params.len() + 1;
        self.fragments
            .push(format!("{operand} {operator} ?{index}{suffix}"));
        self.params.push(value);
    }

    /// True when no filter matched; callers must then omit WHERE entirely.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    /// Predicate text without the `WHERE` keyword.
    pub fn sql(&self) -> String {
        self.fragments.join(" AND ")
    }

    /// ` WHERE ...` suffix, or an empty string for an empty predicate.
    pub fn where_clause(&self) -> String {
        if self.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.sql())
        }
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    pub fn into_params(self) -> Vec<Value> {
        self.params
    }
}

/// Compiles `request` against the declarative `fields` table.
///
/// # Errors
/// - `QueryError::InvalidFilterValue` when a numeric filter does not parse.
/// - `QueryError::InvertedRange` when a minimum exceeds its maximum.
pub fn compile_filters(
    request: &FilterRequest,
    fields: &[FilterField],
) -> Result<CompiledPredicate, QueryError> {
    check_ranges(request, fields)?;

    let mut predicate = CompiledPredicate::default();
    for field in fields {
        let Some(raw) = request.supplied(field.name) else {
            continue;
        };
        let column = quote_column(field.column);

        match field.mode {
            FilterMode::Contains => predicate.push(
                format!("{CASEFOLD_FN}({column})"),
                "LIKE",
                " ESCAPE '\\'",
                Value::Text(format!("%{}%", escape_like(&raw.to_lowercase()))),
            ),
            FilterMode::Min => predicate.push(column, ">=", "", field.coerce(raw)?),
            FilterMode::Max => predicate.push(column, "<=", "", field.coerce(raw)?),
            FilterMode::Presence { zero } => {
                let operator = match raw {
                    TRUE_TOKEN => "<>",
                    FALSE_TOKEN => "=",
                    _ => continue,
                };
                predicate.push(column, operator, "", Value::Text(zero.to_string()));
            }
        }
    }

    debug!(
        "event=filter_compile module=sql status=ok fragments={}",
        predicate.len()
    );
    Ok(predicate)
}

fn check_ranges(request: &FilterRequest, fields: &[FilterField]) -> Result<(), QueryError> {
    for min_field in fields.iter().filter(|field| field.mode == FilterMode::Min) {
        let Some(min_raw) = request.supplied(min_field.name) else {
            continue;
        };
        let max_fields = fields
            .iter()
            .filter(|field| field.mode == FilterMode::Max && field.column == min_field.column);

        for max_field in max_fields {
            let Some(max_raw) = request.supplied(max_field.name) else {
                continue;
            };
            let min = min_field.coerce(min_raw)?;
            let max = max_field.coerce(max_raw)?;
            if compare(&min, &max) == Some(Ordering::Greater) {
                return Err(QueryError::InvertedRange {
                    min_filter: min_field.name,
                    max_filter: max_field.name,
                });
            }
        }
    }
    Ok(())
}

fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
        (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::{compile_filters, FilterField, FilterMode, FilterRequest, ValueKind};
    use crate::sql::QueryError;
    use rusqlite::types::Value;

    const FIELDS: &[FilterField] = &[
        FilterField {
            name: "name",
            column: "name",
            mode: FilterMode::Contains,
            kind: ValueKind::Text,
        },
        FilterField {
            name: "minEmp",
            column: "num_employees",
            mode: FilterMode::Min,
            kind: ValueKind::Integer,
        },
        FilterField {
            name: "maxEmp",
            column: "num_employees",
            mode: FilterMode::Max,
            kind: ValueKind::Integer,
        },
        FilterField {
            name: "hasEquity",
            column: "equity",
            mode: FilterMode::Presence { zero: "0" },
            kind: ValueKind::Text,
        },
    ];

    #[test]
    fn compiles_three_filters_in_declared_order() {
        let request = FilterRequest::new()
            .with("maxEmp", "1000")
            .with("name", "ba")
            .with("minEmp", "200");

        let predicate = compile_filters(&request, FIELDS).unwrap();
        assert_eq!(
            predicate.sql(),
            "casefold(\"name\") LIKE ?1 ESCAPE '\\' AND \"num_employees\" >= ?2 AND \"num_employees\" <= ?3"
        );
        assert_eq!(
            predicate.params(),
            &[
                Value::Text("%ba%".to_string()),
                Value::Integer(200),
                Value::Integer(1000),
            ]
        );
    }

    #[test]
    fn single_filter_starts_at_placeholder_one() {
        let request = FilterRequest::new().with("maxEmp", "1000");
        let predicate = compile_filters(&request, FIELDS).unwrap();
        assert_eq!(predicate.sql(), "\"num_employees\" <= ?1");
        assert_eq!(predicate.params(), &[Value::Integer(1000)]);
    }

    #[test]
    fn identical_values_keep_distinct_placeholders() {
        let request = FilterRequest::new()
            .with("minEmp", "500")
            .with("maxEmp", "500");
        let predicate = compile_filters(&request, FIELDS).unwrap();
        assert_eq!(
            predicate.fragments(),
            &[
                "\"num_employees\" >= ?1".to_string(),
                "\"num_employees\" <= ?2".to_string(),
            ]
        );
        assert_eq!(predicate.params().len(), 2);
    }

    #[test]
    fn inverted_range_fails_before_any_fragment() {
        let request = FilterRequest::new()
            .with("name", "ba")
            .with("minEmp", "3")
            .with("maxEmp", "2");
        let err = compile_filters(&request, FIELDS).unwrap_err();
        assert_eq!(
            err,
            QueryError::InvertedRange {
                min_filter: "minEmp",
                max_filter: "maxEmp",
            }
        );
    }

    #[test]
    fn range_check_compares_numerically_not_lexically() {
        let request = FilterRequest::new()
            .with("minEmp", "9")
            .with("maxEmp", "10");
        assert!(compile_filters(&request, FIELDS).is_ok());
    }

    #[test]
    fn non_numeric_range_value_is_rejected() {
        let request = FilterRequest::new().with("minEmp", "lots");
        let err = compile_filters(&request, FIELDS).unwrap_err();
        assert!(matches!(
            err,
            QueryError::InvalidFilterValue { filter: "minEmp", .. }
        ));
    }

    #[test]
    fn presence_filter_binds_zero_sentinel() {
        let has = compile_filters(&FilterRequest::new().with("hasEquity", "true"), FIELDS).unwrap();
        assert_eq!(has.sql(), "\"equity\" <> ?1");
        assert_eq!(has.params(), &[Value::Text("0".to_string())]);

        let none = compile_filters(&FilterRequest::new().with("hasEquity", "false"), FIELDS).unwrap();
        assert_eq!(none.sql(), "\"equity\" = ?1");
    }

    #[test]
    fn presence_filter_ignores_other_tokens() {
        let request = FilterRequest::new()
            .with("hasEquity", "maybe")
            .with("maxEmp", "10");
        let predicate = compile_filters(&request, FIELDS).unwrap();
        assert_eq!(predicate.sql(), "\"num_employees\" <= ?1");
    }

    #[test]
    fn unknown_names_produce_empty_predicate() {
        let request = FilterRequest::new().with("color", "blue");
        let predicate = compile_filters(&request, FIELDS).unwrap();
        assert!(predicate.is_empty());
        assert!(predicate.params().is_empty());
        assert_eq!(predicate.where_clause(), "");
    }

    #[test]
    fn contains_value_is_bound_not_interpolated() {
        let request = FilterRequest::new().with("name", "x' OR 1=1 --");
        let predicate = compile_filters(&request, FIELDS).unwrap();
        assert!(!predicate.sql().contains("OR 1=1"));
        assert_eq!(
            predicate.params(),
            &[Value::Text("%x' OR 1=1 --%".to_string())]
        );
    }

    #[test]
    fn contains_value_is_lowercased_beyond_ascii() {
        let request = FilterRequest::new().with("name", "ÄRZ");
        let predicate = compile_filters(&request, FIELDS).unwrap();
        assert_eq!(predicate.params(), &[Value::Text("%ärz%".to_string())]);
    }

    #[test]
    fn empty_values_are_treated_as_absent() {
        let request = FilterRequest::new()
            .with("name", "")
            .with("minEmp", "")
            .with("hasEquity", "");
        let predicate = compile_filters(&request, FIELDS).unwrap();
        assert!(predicate.is_empty());

        let half_range = FilterRequest::new()
            .with("minEmp", "")
            .with("maxEmp", "5");
        let predicate = compile_filters(&half_range, FIELDS).unwrap();
        assert_eq!(predicate.sql(), "\"num_employees\" <= ?1");
        assert_eq!(predicate.params(), &[Value::Integer(5)]);
    }

    #[test]
    fn contains_value_escapes_like_wildcards() {
        let request = FilterRequest::new().with("name", "50%_off");
        let predicate = compile_filters(&request, FIELDS).unwrap();
        assert_eq!(
            predicate.params(),
            &[Value::Text("%50\\%\\_off%".to_string())]
        );
    }
}
