//! Bound fields: one field path paired with its current value and error.
//!
//! [`FormState::bound_fields`](crate::form::FormState::bound_fields) yields one
//! [`BoundField`] per input in display order. Rows of a field array carry
//! their [`EntryId`], and [`BoundField::key`] is built from it, so a renderer
//! that keys on it keeps each input attached to the right row while rows are
//! added and removed.

use signup_core::utils::capfirst;

use crate::formset::EntryId;
use crate::value::RawValue;

/// A field path with its value and validation state.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundField {
    /// The positional field path, e.g. `techs.1.title`.
    pub path: String,
    /// The row identity, for fields inside a field array.
    pub entry: Option<EntryId>,
    /// The current raw value.
    pub value: RawValue,
    /// The error shown next to the field, if any.
    pub error: Option<String>,
}

impl BoundField {
    /// Creates a new `BoundField`.
    pub fn new(
        path: impl Into<String>,
        entry: Option<EntryId>,
        value: RawValue,
        error: Option<String>,
    ) -> Self {
        Self {
            path: path.into(),
            entry,
            value,
            error,
        }
    }

    /// Returns the last path segment, the field's own name.
    pub fn name(&self) -> &str {
        self.path.rsplit('.').next().unwrap_or(&self.path)
    }

    /// A human-readable label derived from the name.
    pub fn label(&self) -> String {
        capfirst(&self.name().replace('_', " "))
    }

    /// A rendering key that stays the same while the row exists.
    ///
    /// Scalar fields use their path. Array fields use the array name, the
    /// row's id and the field name, so the key does not change when the row
    /// moves.
    pub fn key(&self) -> String {
        match self.entry {
            Some(id) => {
                let array = self.path.split('.').next().unwrap_or_default();
                format!("{array}.{id}.{}", self.name())
            }
            None => self.path.clone(),
        }
    }

    /// Returns the auto-generated HTML `id` for this field.
    pub fn auto_id(&self) -> String {
        format!("id_{}", self.path.replace('.', "-"))
    }

    /// Returns `true` if an error is shown for this field.
    pub const fn has_error(&self) -> bool {
        self.error.is_some()
    }
}
