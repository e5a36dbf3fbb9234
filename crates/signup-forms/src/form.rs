//! Form state and explicit two-way binding.
//!
//! [`FormState`] owns the raw values of a form: named scalar fields plus any
//! number of [`FieldArray`]s. Inputs write through [`FormState::set_field`]
//! and read back through [`FormState::field`] and [`FormState::bound_fields`];
//! nothing is bound implicitly.
//!
//! Validation results are stored per field. An error on a row of a field
//! array is stored against the row's [`EntryId`], not its position, so it
//! stays next to that row when other rows are inserted or removed, and
//! disappears with the row.

use std::collections::BTreeMap;

use signup_core::error::{join_path, SignupError, SignupResult, ValidationError, NON_FIELD_ERRORS};

use crate::bound_field::BoundField;
use crate::fields::Validator;
use crate::formset::{EntryId, FieldArray};
use crate::schema::{default_tech_row, AVATAR, EMAIL, NAME, PASSWORD, TECHS};
use crate::value::{split_path, RawValue};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum ErrorKey {
    Path(String),
    Entry {
        array: String,
        id: EntryId,
        key: String,
    },
}

/// The mutable state of one form instance.
///
/// # Examples
///
/// ```
/// use signup_forms::{FormState, RegistrationSchema};
///
/// let mut form = FormState::registration();
/// form.set_field("name", "  ada lovelace ").unwrap();
/// form.array_mut("techs").unwrap().append_default();
/// form.set_field("techs.0.title", "Rust").unwrap();
///
/// assert!(form.validate(&RegistrationSchema::default()).is_err());
/// assert_eq!(form.error("avatar"), Some("Avatar is required"));
/// assert_eq!(form.error("techs.0.knowledge"), Some("Knowledge must be at least 1"));
/// assert!(form.error("name").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct FormState {
    fields: Vec<String>,
    values: BTreeMap<String, RawValue>,
    arrays: Vec<FieldArray>,
    errors: BTreeMap<ErrorKey, String>,
    non_field_errors: Vec<String>,
}

impl FormState {
    /// Creates a form with no fields.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the registration form: avatar, name, email, password, and the
    /// `techs` array whose new rows start as `{title: "", knowledge: 0}`.
    pub fn registration() -> Self {
        Self::new()
            .with_field(AVATAR)
            .with_field(NAME)
            .with_field(EMAIL)
            .with_field(PASSWORD)
            .with_array(FieldArray::new(TECHS).with_default_row(default_tech_row()))
    }

    /// Binds a scalar field. Fields are rendered in the order they are bound.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.fields.contains(&name) {
            self.fields.push(name);
        }
        self
    }

    /// Binds a field array. Arrays are rendered after the scalar fields.
    #[must_use]
    pub fn with_array(mut self, array: FieldArray) -> Self {
        self.arrays.retain(|a| a.name() != array.name());
        self.arrays.push(array);
        self
    }

    /// Returns the field array named `name`.
    pub fn array(&self, name: &str) -> Option<&FieldArray> {
        self.arrays.iter().find(|a| a.name() == name)
    }

    /// Returns the field array named `name` for editing.
    pub fn array_mut(&mut self, name: &str) -> Option<&mut FieldArray> {
        self.arrays.iter_mut().find(|a| a.name() == name)
    }

    fn unknown(path: &str) -> SignupError {
        SignupError::UnknownField(path.to_string())
    }

    /// Writes a value at a field path and clears the error shown there.
    ///
    /// `name` targets a scalar field; `array.<index>.<key>` targets the row
    /// currently displayed at `index`. Unbound names and positions fail with
    /// [`SignupError::UnknownField`].
    pub fn set_field(&mut self, path: &str, value: impl Into<RawValue>) -> SignupResult<()> {
        let value = value.into();
        let key = self.error_key(path);
        match split_path(path).as_slice() {
            [name] if self.fields.iter().any(|f| f.as_str() == *name) => {
                self.values.insert((*name).to_string(), value);
            }
            [array, index, rest @ ..] if !rest.is_empty() => {
                let array = self.array_mut(array).ok_or_else(|| Self::unknown(path))?;
                let id = index
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| array.id_at(i))
                    .ok_or_else(|| Self::unknown(path))?;
                array.set(id, rest.join("."), value);
            }
            _ => return Err(Self::unknown(path)),
        }
        self.errors.remove(&key);
        Ok(())
    }

    /// Writes a value into the row with the given id, wherever it is displayed.
    pub fn set_entry_field(
        &mut self,
        array: &str,
        id: EntryId,
        key: &str,
        value: impl Into<RawValue>,
    ) -> SignupResult<()> {
        let updated = self
            .array_mut(array)
            .is_some_and(|a| a.set(id, key, value.into()));
        if !updated {
            return Err(Self::unknown(&format!("{array}.{id}.{key}")));
        }
        self.errors.remove(&ErrorKey::Entry {
            array: array.to_string(),
            id,
            key: key.to_string(),
        });
        Ok(())
    }

    /// Reads the value at a field path.
    pub fn field(&self, path: &str) -> Option<&RawValue> {
        match split_path(path).as_slice() {
            [name] => self.values.get(*name),
            [array, index, key] => {
                let array = self.array(array)?;
                let id = array.id_at(index.parse().ok()?)?;
                array.get(id)?.get(*key)
            }
            _ => None,
        }
    }

    /// Assembles every bound value into one raw object, rows in display order.
    pub fn raw_data(&self) -> RawValue {
        let mut data = BTreeMap::new();
        for name in &self.fields {
            data.insert(name.clone(), self.values.get(name).cloned().unwrap_or_default());
        }
        for array in &self.arrays {
            data.insert(array.name().to_string(), array.to_raw());
        }
        RawValue::Map(data)
    }

    /// Validates the current values, replacing every stored error with the
    /// result of this pass.
    pub fn validate<V: Validator>(&mut self, validator: &V) -> Result<V::Output, ValidationError> {
        let result = validator.validate(&self.raw_data());
        self.clear_errors();
        if let Err(errors) = &result {
            for (path, error) in errors.iter() {
                if path.is_empty() || path == NON_FIELD_ERRORS {
                    self.non_field_errors.push(error.message.clone());
                } else {
                    let key = self.error_key(path);
                    self.errors.insert(key, error.message.clone());
                }
            }
        }
        result
    }

    fn error_key(&self, path: &str) -> ErrorKey {
        let mut parts = path.splitn(3, '.');
        if let (Some(head), Some(index)) = (parts.next(), parts.next()) {
            let id = self
                .array(head)
                .zip(index.parse::<usize>().ok())
                .and_then(|(array, i)| array.id_at(i));
            if let Some(id) = id {
                return ErrorKey::Entry {
                    array: head.to_string(),
                    id,
                    key: parts.next().unwrap_or_default().to_string(),
                };
            }
        }
        ErrorKey::Path(path.to_string())
    }

    fn current_path(&self, key: &ErrorKey) -> Option<String> {
        match key {
            ErrorKey::Path(path) => Some(path.clone()),
            ErrorKey::Entry { array, id, key } => {
                let position = self.array(array)?.position(*id)?;
                Some(join_path(&format!("{array}.{position}"), key))
            }
        }
    }

    /// Returns the error shown at a field path.
    pub fn error(&self, path: &str) -> Option<&str> {
        self.errors.get(&self.error_key(path)).map(String::as_str)
    }

    /// Returns every field error keyed by current field path.
    ///
    /// Errors of rows that have since been removed are not included.
    pub fn errors(&self) -> BTreeMap<String, String> {
        self.errors
            .iter()
            .filter_map(|(key, message)| Some((self.current_path(key)?, message.clone())))
            .collect()
    }

    /// Returns the form-level errors (not tied to one field).
    pub fn non_field_errors(&self) -> &[String] {
        &self.non_field_errors
    }

    /// Records a form-level error, e.g. a failed upload.
    pub fn add_non_field_error(&mut self, message: impl Into<String>) {
        self.non_field_errors.push(message.into());
    }

    /// Returns `true` if any field or form-level error is shown.
    pub fn has_errors(&self) -> bool {
        !self.non_field_errors.is_empty() || !self.errors().is_empty()
    }

    /// Removes every error.
    pub fn clear_errors(&mut self) {
        self.errors.clear();
        self.non_field_errors.clear();
    }

    /// Returns every input in display order: scalar fields first, then the
    /// fields of each array row.
    pub fn bound_fields(&self) -> Vec<BoundField> {
        let mut bound: Vec<BoundField> = self
            .fields
            .iter()
            .map(|name| {
                let value = self.values.get(name).cloned().unwrap_or_default();
                let error = self.errors.get(&ErrorKey::Path(name.clone())).cloned();
                BoundField::new(name.clone(), None, value, error)
            })
            .collect();

        for array in &self.arrays {
            for (position, (id, row)) in array.iter().enumerate() {
                for (key, value) in row {
                    let error = self
                        .errors
                        .get(&ErrorKey::Entry {
                            array: array.name().to_string(),
                            id,
                            key: key.clone(),
                        })
                        .cloned();
                    let path = format!("{}.{position}.{key}", array.name());
                    bound.push(BoundField::new(path, Some(id), value.clone(), error));
                }
            }
        }
        bound
    }
}
