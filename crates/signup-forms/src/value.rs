//! Raw, untyped form input.
//!
//! [`RawValue`] is what the rendering layer hands over before validation:
//! text typed into inputs, numbers from number inputs, the files selected in
//! a file input, and nested lists/maps for structured fields. Values are
//! located with dotted field paths where numeric segments index lists, e.g.
//! `techs.1.knowledge`.

use std::collections::BTreeMap;

use signup_storage::UploadedFile;

/// An unvalidated input value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RawValue {
    /// No value (an untouched or cleared input).
    #[default]
    Null,
    /// Text from a text, email, or password input.
    Text(String),
    /// A number from a number input.
    Number(f64),
    /// The files selected in a file input (possibly none).
    Files(Vec<UploadedFile>),
    /// An ordered list of values.
    List(Vec<RawValue>),
    /// A nested group of named values.
    Map(BTreeMap<String, RawValue>),
}

/// Splits a dotted field path into its segments.
///
/// # Examples
///
/// ```
/// use signup_forms::value::split_path;
///
/// assert_eq!(split_path("techs.1.knowledge"), vec!["techs", "1", "knowledge"]);
/// assert!(split_path("").is_empty());
/// ```
pub fn split_path(path: &str) -> Vec<&str> {
    if path.is_empty() {
        Vec::new()
    } else {
        path.split('.').collect()
    }
}

impl RawValue {
    /// A short name of the variant, used in type-mismatch messages.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "nothing",
            Self::Text(_) => "text",
            Self::Number(_) => "number",
            Self::Files(_) => "files",
            Self::List(_) => "list",
            Self::Map(_) => "object",
        }
    }

    /// Returns `true` for `Null`.
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Looks up one child: a key of a map, or an index of a list.
    pub fn child(&self, segment: &str) -> Option<&Self> {
        match self {
            Self::Map(map) => map.get(segment),
            Self::List(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }
    }

    /// Looks up a value by dotted field path. The empty path is `self`.
    ///
    /// # Examples
    ///
    /// ```
    /// use signup_forms::value::RawValue;
    ///
    /// let raw = RawValue::from_json(serde_json::json!({
    ///     "techs": [{"title": "Rust", "knowledge": "80"}]
    /// }));
    /// assert_eq!(raw.lookup("techs.0.title"), Some(&RawValue::from("Rust")));
    /// assert_eq!(raw.lookup("techs.3.title"), None);
    /// ```
    pub fn lookup(&self, path: &str) -> Option<&Self> {
        split_path(path)
            .into_iter()
            .try_fold(self, |value, segment| value.child(segment))
    }

    /// Inserts `value` at a dotted path below a map, creating intermediate
    /// maps as needed. Non-map values along the way are replaced.
    pub fn insert_path(&mut self, path: &str, value: Self) {
        let segments = split_path(path);
        let Some((last, parents)) = segments.split_last() else {
            *self = value;
            return;
        };

        let mut current = self;
        for segment in parents {
            current = current.ensure_map().entry((*segment).to_string()).or_default();
        }
        current.ensure_map().insert((*last).to_string(), value);
    }

    fn ensure_map(&mut self) -> &mut BTreeMap<String, Self> {
        if !matches!(self, Self::Map(_)) {
            *self = Self::Map(BTreeMap::new());
        }
        match self {
            Self::Map(map) => map,
            _ => unreachable!("value was just replaced with a map"),
        }
    }

    /// Converts a JSON document into raw input.
    ///
    /// Booleans become text (`"true"`/`"false"`), the way a form posts them.
    /// Files cannot be expressed in JSON and are attached separately.
    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Text(b.to_string()),
            serde_json::Value::Number(n) => n.as_f64().map_or(Self::Null, Self::Number),
            serde_json::Value::String(s) => Self::Text(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from_json).collect())
            }
            serde_json::Value::Object(map) => Self::Map(
                map.into_iter()
                    .map(|(k, v)| (k, Self::from_json(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for RawValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for RawValue {
    #[allow(clippy::cast_precision_loss)]
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<UploadedFile> for RawValue {
    fn from(file: UploadedFile) -> Self {
        Self::Files(vec![file])
    }
}

impl From<Vec<UploadedFile>> for RawValue {
    fn from(files: Vec<UploadedFile>) -> Self {
        Self::Files(files)
    }
}

impl From<Vec<Self>> for RawValue {
    fn from(items: Vec<Self>) -> Self {
        Self::List(items)
    }
}

impl From<BTreeMap<String, Self>> for RawValue {
    fn from(map: BTreeMap<String, Self>) -> Self {
        Self::Map(map)
    }
}
