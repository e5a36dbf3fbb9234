//! Identity-stable dynamic lists of form rows.
//!
//! A [`FieldArray`] holds the rows of a repeated group of fields (one row per
//! technology). Every row gets an [`EntryId`] when it is added; the id stays
//! attached to the row for as long as it exists, whatever is inserted or
//! removed around it. Positions are display order only. Anything that needs
//! to follow a row across edits (rendering keys, errors) holds its id.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::value::RawValue;

/// The field values of one row, keyed by field name.
pub type Row = BTreeMap<String, RawValue>;

/// The stable identity of a row within one [`FieldArray`].
///
/// Ids come from a per-array counter and are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(u64);

impl EntryId {
    /// Returns the raw counter value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entry-{}", self.0)
    }
}

/// An ordered list of rows with stable identities.
///
/// # Examples
///
/// ```
/// use signup_forms::formset::FieldArray;
/// use signup_forms::RawValue;
///
/// let mut techs = FieldArray::new("techs");
/// let rust = techs.append_default();
/// let go = techs.append_default();
/// techs.set(go, "title", RawValue::from("Go"));
///
/// techs.remove(rust);
/// assert_eq!(techs.position(go), Some(0));
/// assert_eq!(techs.get(go).unwrap()["title"], RawValue::from("Go"));
/// ```
#[derive(Debug, Clone)]
pub struct FieldArray {
    name: String,
    entries: HashMap<EntryId, Row>,
    order: Vec<EntryId>,
    next_id: u64,
    default_row: Row,
}

impl FieldArray {
    /// Creates an empty array whose default row is empty.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: HashMap::new(),
            order: Vec::new(),
            next_id: 0,
            default_row: Row::new(),
        }
    }

    /// Sets the row used by [`append_default`](Self::append_default).
    #[must_use]
    pub fn with_default_row(mut self, row: Row) -> Self {
        self.default_row = row;
        self
    }

    /// Returns the field name of the array.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn allocate(&mut self, row: Row) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        self.entries.insert(id, row);
        id
    }

    /// Adds a row at the end.
    pub fn append(&mut self, row: Row) -> EntryId {
        let id = self.allocate(row);
        self.order.push(id);
        id
    }

    /// Adds a copy of the default row at the end.
    pub fn append_default(&mut self) -> EntryId {
        self.append(self.default_row.clone())
    }

    /// Adds a row at `index`, shifting later rows down. An index past the end appends.
    pub fn insert(&mut self, index: usize, row: Row) -> EntryId {
        let id = self.allocate(row);
        let index = index.min(self.order.len());
        self.order.insert(index, id);
        id
    }

    /// Removes the row at `index`. Out-of-range indices are ignored.
    pub fn remove_at(&mut self, index: usize) -> Option<Row> {
        if index >= self.order.len() {
            return None;
        }
        let id = self.order.remove(index);
        self.entries.remove(&id)
    }

    /// Removes the row with the given id.
    pub fn remove(&mut self, id: EntryId) -> Option<Row> {
        let index = self.position(id)?;
        self.remove_at(index)
    }

    /// Returns the current display position of a row.
    pub fn position(&self, id: EntryId) -> Option<usize> {
        self.order.iter().position(|candidate| *candidate == id)
    }

    /// Returns the id of the row currently at `index`.
    pub fn id_at(&self, index: usize) -> Option<EntryId> {
        self.order.get(index).copied()
    }

    /// Returns a row by id.
    pub fn get(&self, id: EntryId) -> Option<&Row> {
        self.entries.get(&id)
    }

    /// Sets one field of a row. Returns `false` if the row no longer exists.
    pub fn set(&mut self, id: EntryId, key: impl Into<String>, value: RawValue) -> bool {
        match self.entries.get_mut(&id) {
            Some(row) => {
                row.insert(key.into(), value);
                true
            }
            None => false,
        }
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterates over `(id, row)` in display order.
    pub fn iter(&self) -> impl Iterator<Item = (EntryId, &Row)> {
        self.order
            .iter()
            .filter_map(|id| self.entries.get(id).map(|row| (*id, row)))
    }

    /// Returns the rows as a raw list, in display order.
    pub fn to_raw(&self) -> RawValue {
        RawValue::List(self.iter().map(|(_, row)| RawValue::Map(row.clone())).collect())
    }
}
