//! Object-level validation.
//!
//! Object schemas validate each named field independently and collect every
//! failure before reporting, so one pass shows all problems at once. Errors
//! from a field are re-rooted under its name.

use std::collections::BTreeMap;

use signup_core::error::ValidationError;

use crate::fields::Validator;
use crate::value::RawValue;

static MISSING: RawValue = RawValue::Null;

/// Returns the named values of an object input.
///
/// `Null` is an object with no fields; any other non-map value fails at the
/// object's own path.
pub fn object_fields(
    raw: &RawValue,
) -> Result<Option<&BTreeMap<String, RawValue>>, ValidationError> {
    match raw {
        RawValue::Map(map) => Ok(Some(map)),
        RawValue::Null => Ok(None),
        other => Err(ValidationError::single(
            format!("Expected an object, received {}", other.type_name()),
            "invalid_type",
        )),
    }
}

/// Validates the field `name` of an object, recording any error under `name`.
///
/// A missing field is validated as `Null`. Returns `None` when the field
/// failed; the caller keeps going so later fields are still checked.
///
/// # Examples
///
/// ```
/// use signup_core::error::ValidationError;
/// use signup_forms::fields::Text;
/// use signup_forms::validation::clean_field;
///
/// let mut errors = ValidationError::new();
/// let required = Text::new().required("Title is necessary");
/// let title = clean_field(None, "title", &required, &mut errors);
/// assert!(title.is_none());
/// assert_eq!(errors.message("title"), Some("Title is necessary"));
/// ```
pub fn clean_field<V: Validator>(
    fields: Option<&BTreeMap<String, RawValue>>,
    name: &str,
    validator: &V,
    errors: &mut ValidationError,
) -> Option<V::Output> {
    let raw = fields.and_then(|f| f.get(name)).unwrap_or(&MISSING);
    match validator.validate(raw) {
        Ok(value) => Some(value),
        Err(e) => {
            errors.merge(e.prefixed(name));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{Integer, Text};

    fn map(pairs: &[(&str, RawValue)]) -> RawValue {
        RawValue::Map(pairs.iter().map(|(k, v)| ((*k).to_string(), v.clone())).collect())
    }

    #[test]
    fn test_object_fields() {
        assert!(object_fields(&RawValue::Null).unwrap().is_none());
        let raw = map(&[("a", RawValue::from("x"))]);
        assert_eq!(object_fields(&raw).unwrap().unwrap().len(), 1);
        let err = object_fields(&RawValue::from("x")).unwrap_err();
        assert_eq!(err.message(""), Some("Expected an object, received text"));
    }

    #[test]
    fn test_clean_field_errors_accumulate() {
        let raw = map(&[("title", RawValue::from("")), ("knowledge", RawValue::from("x"))]);
        let fields = object_fields(&raw).unwrap();
        let mut errors = ValidationError::new();

        let title_field = Text::new().required("Title is necessary");
        let knowledge_field = Integer::new().invalid_message("nan");

        let title = clean_field(fields, "title", &title_field, &mut errors);
        let knowledge = clean_field(fields, "knowledge", &knowledge_field, &mut errors);

        assert!(title.is_none());
        assert!(knowledge.is_none());
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.message("title"), Some("Title is necessary"));
        assert_eq!(errors.message("knowledge"), Some("nan"));
    }

    #[test]
    fn test_clean_field_partial_valid() {
        let raw = map(&[("title", RawValue::from("Rust"))]);
        let fields = object_fields(&raw).unwrap();
        let mut errors = ValidationError::new();

        let title = clean_field(fields, "title", &Text::new(), &mut errors);
        let knowledge = clean_field(fields, "knowledge", &Integer::new(), &mut errors);

        assert_eq!(title.as_deref(), Some("Rust"));
        assert!(knowledge.is_none());
        assert_eq!(errors.message("knowledge"), Some("Enter a number."));
    }
}
