//! SET-clause compilation for single-row partial updates.
//!
//! # Invariants
//! - Key `k` (1-based, in payload order) becomes `"column"=?k` and value `k`
//!   becomes param `k`.
//! - An empty payload never reaches SQL.

use super::{quote_column, QueryError};
use rusqlite::types::Value;

/// Static logical-name to column-name mapping.
///
/// Logical names missing from the table are used as column names unchanged.
pub type FieldTranslationTable = [(&'static str, &'static str)];

/// Ordered logical field names with their new values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdatePayload {
    fields: Vec<(String, Value)>,
}

impl UpdatePayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style `set`.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Sets a field. Re-setting an existing name keeps its original position.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|(existing, _)| existing == name)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }
}

/// Comma-joined assignment fragments with positionally aligned params.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledAssignment {
    fragments: Vec<String>,
    params: Vec<Value>,
}

impl CompiledAssignment {
    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    /// Assignment text for the SET clause, without the `SET` keyword.
    pub fn set_clause(&self) -> String {
        self.fragments.join(", ")
    }

    /// Placeholder index available to the caller's trailing key predicate.
    pub fn next_placeholder(&self) -> usize {
        self.params.len() + 1
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    pub fn into_params(self) -> Vec<Value> {
        self.params
    }
}

/// Compiles `payload` into a SET clause, renaming fields through `table`.
///
/// Value types are not checked here; typed payloads validate before this.
///
/// # Errors
/// - `QueryError::NoData` when `payload` is empty.
pub fn sql_for_partial_update(
    payload: &UpdatePayload,
    table: &FieldTranslationTable,
) -> Result<CompiledAssignment, QueryError> {
    if payload.is_empty() {
        return Err(QueryError::NoData);
    }

    let mut fragments = Vec::with_capacity(payload.len());
    let mut params = Vec::with_capacity(payload.len());
    for (position, (name, value)) in payload.iter().enumerate() {
        fragments.push(format!(
            "{}=?{}",
            quote_column(translate(table, name)),
            position + 1
        ));
        params.push(value.clone());
    }

    Ok(CompiledAssignment { fragments, params })
}

fn translate<'a>(table: &'a FieldTranslationTable, name: &'a str) -> &'a str {
    table
        .iter()
        .find(|(logical, _)| *logical == name)
        .map_or(name, |(_, physical)| *physical)
}

#[cfg(test)]
mod tests {
    use super::{sql_for_partial_update, UpdatePayload};
    use crate::sql::QueryError;
    use proptest::prelude::*;
    use rusqlite::types::Value;

    const USER_COLUMNS: &[(&str, &str)] = &[("firstName", "first_name"), ("lastName", "last_name")];

    #[test]
    fn translates_single_field() {
        let payload = UpdatePayload::new().with("firstName", "Aliya".to_string());
        let compiled = sql_for_partial_update(&payload, &[("firstName", "first_name")]).unwrap();
        assert_eq!(compiled.set_clause(), "\"first_name\"=?1");
        assert_eq!(compiled.params(), &[Value::Text("Aliya".to_string())]);
        assert_eq!(compiled.next_placeholder(), 2);
    }

    #[test]
    fn keeps_supplied_order_and_untranslated_names() {
        let payload = UpdatePayload::new()
            .with("lastName", "Names".to_string())
            .with("email", "new@email.com".to_string())
            .with("firstName", "Updated".to_string());
        let compiled = sql_for_partial_update(&payload, USER_COLUMNS).unwrap();
        assert_eq!(
            compiled.set_clause(),
            "\"last_name\"=?1, \"email\"=?2, \"first_name\"=?3"
        );
        assert_eq!(
            compiled.params(),
            &[
                Value::Text("Names".to_string()),
                Value::Text("new@email.com".to_string()),
                Value::Text("Updated".to_string()),
            ]
        );
    }

    #[test]
    fn null_values_are_bound_as_params() {
        let payload = UpdatePayload::new()
            .with("salary", Value::Null)
            .with("title", "Updated".to_string());
        let compiled = sql_for_partial_update(&payload, &[]).unwrap();
        assert_eq!(compiled.set_clause(), "\"salary\"=?1, \"title\"=?2");
        assert_eq!(compiled.params()[0], Value::Null);
    }

    #[test]
    fn resetting_a_field_keeps_its_position() {
        let mut payload = UpdatePayload::new().with("a", 1_i64).with("b", 2_i64);
        payload.set("a", 3_i64);
        let compiled = sql_for_partial_update(&payload, &[]).unwrap();
        assert_eq!(compiled.set_clause(), "\"a\"=?1, \"b\"=?2");
        assert_eq!(compiled.params(), &[Value::Integer(3), Value::Integer(2)]);
    }

    #[test]
    fn empty_payload_is_rejected() {
        let err = sql_for_partial_update(&UpdatePayload::new(), USER_COLUMNS).unwrap_err();
        assert_eq!(err, QueryError::NoData);
    }

    proptest! {
        #[test]
        fn fragment_k_references_param_k(
            fields in proptest::collection::btree_map("[a-zA-Z]{1,12}", any::<i64>(), 1..12)
        ) {
            let mut payload = UpdatePayload::new();
            for (name, value) in &fields {
                payload.set(name.clone(), *value);
            }

            let compiled = sql_for_partial_update(&payload, USER_COLUMNS).unwrap();
            prop_assert_eq!(compiled.fragments().len(), fields.len());
            prop_assert_eq!(compiled.params().len(), fields.len());
            for (position, ((_, value), fragment)) in
                fields.iter().zip(compiled.fragments()).enumerate()
            {
                let placeholder = format!("=?{}", position + 1);
                prop_assert!(fragment.ends_with(&placeholder));
                prop_assert_eq!(&compiled.params()[position], &Value::Integer(*value));
            }
        }
    }
}
