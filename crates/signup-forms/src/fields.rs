//! Field validators and their combinators.
//!
//! A [`Validator`] turns one [`RawValue`] into a typed output or a
//! [`ValidationError`] keyed by paths relative to the validated value. Each
//! combinator coerces first and then runs its [`Rule`]s in order, stopping at
//! the first failure so that every path carries exactly one message.
//!
//! Composite validators ([`ListOf`], the object schemas in
//! [`schema`](crate::schema)) re-root the errors of their children, so a
//! failure deep inside a list surfaces at a full path like `techs.1.title`.

use signup_core::error::{FieldError, ValidationError};
use signup_storage::UploadedFile;

use crate::validators::{EmailRule, MaxValueRule, MinLengthRule, MinValueRule, Rule, SuffixRule};
use crate::value::RawValue;

/// Validates and normalizes one raw value.
///
/// # Examples
///
/// ```
/// use signup_forms::fields::{Text, Validator};
/// use signup_forms::RawValue;
///
/// let name = Text::new().trim().required("Name is necessary").map(|s| s.to_uppercase());
/// assert_eq!(name.validate(&RawValue::from("  ada ")).unwrap(), "ADA");
///
/// let err = name.validate(&RawValue::from("   ")).unwrap_err();
/// assert_eq!(err.message(""), Some("Name is necessary"));
/// ```
pub trait Validator: Send + Sync {
    /// The normalized value produced on success.
    type Output;

    /// Validates `raw`. Error paths are relative to `raw` itself.
    fn validate(&self, raw: &RawValue) -> Result<Self::Output, ValidationError>;

    /// Transforms the output of a successful validation.
    fn map<F, U>(self, f: F) -> Map<Self, F>
    where
        Self: Sized,
        F: Fn(Self::Output) -> U + Send + Sync,
    {
        Map { inner: self, f }
    }
}

impl<V: Validator + ?Sized> Validator for Box<V> {
    type Output = V::Output;

    fn validate(&self, raw: &RawValue) -> Result<Self::Output, ValidationError> {
        (**self).validate(raw)
    }
}

fn invalid_type(expected: &str, raw: &RawValue) -> ValidationError {
    ValidationError::single(
        format!("Expected {expected}, received {}", raw.type_name()),
        "invalid_type",
    )
}

fn run_rules<T: ?Sized>(rules: &[Box<dyn Rule<T>>], value: &T) -> Result<(), ValidationError> {
    for rule in rules {
        rule.check(value).map_err(|e| {
            let mut err = ValidationError::new();
            err.insert("", e);
            err
        })?;
    }
    Ok(())
}

/// A text input.
///
/// `Null` is treated as the empty string. With [`trim`](Self::trim) the value
/// is trimmed before any check, so whitespace-only input counts as empty.
#[derive(Debug, Default)]
pub struct Text {
    trim: bool,
    required: Option<String>,
    rules: Vec<Box<dyn Rule<str>>>,
}

impl Text {
    /// Creates an optional, untrimmed text validator with no rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Trims surrounding whitespace before validating.
    #[must_use]
    pub fn trim(mut self) -> Self {
        self.trim = true;
        self
    }

    /// Rejects empty input with `message`.
    #[must_use]
    pub fn required(mut self, message: impl Into<String>) -> Self {
        self.required = Some(message.into());
        self
    }

    /// Appends a rule; rules run in the order they were added.
    #[must_use]
    pub fn rule(mut self, rule: impl Rule<str> + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Requires at least `min_length` characters.
    #[must_use]
    pub fn min_length(self, min_length: usize, message: impl Into<String>) -> Self {
        self.rule(MinLengthRule::new(min_length, message))
    }

    /// Requires a syntactically valid email address.
    #[must_use]
    pub fn email(self, message: impl Into<String>) -> Self {
        self.rule(EmailRule::new(message))
    }

    /// Requires the exact suffix `suffix`.
    #[must_use]
    pub fn ends_with(self, suffix: impl Into<String>, message: impl Into<String>) -> Self {
        self.rule(SuffixRule::new(suffix, message))
    }
}

impl Validator for Text {
    type Output = String;

    fn validate(&self, raw: &RawValue) -> Result<String, ValidationError> {
        let text = match raw {
            RawValue::Null => "",
            RawValue::Text(s) => s.as_str(),
            other => return Err(invalid_type("text", other)),
        };
        let text = if self.trim { text.trim() } else { text };

        if text.is_empty() {
            if let Some(message) = &self.required {
                return Err(ValidationError::single(message.clone(), "required"));
            }
        }
        run_rules(&self.rules, text)?;
        Ok(text.to_string())
    }
}

/// A whole-number input.
///
/// Accepts a number, or text holding a number (surrounding whitespace is
/// ignored). Empty text, `Null`, and non-numeric text fail with the
/// "invalid" message; numbers with a fractional part fail with the
/// "fraction" message. Out-of-range values are caught by the range rules.
#[derive(Debug)]
pub struct Integer {
    invalid: String,
    fraction: String,
    rules: Vec<Box<dyn Rule<i64>>>,
}

impl Default for Integer {
    fn default() -> Self {
        Self {
            invalid: "Enter a number.".to_string(),
            fraction: "Enter a whole number.".to_string(),
            rules: Vec::new(),
        }
    }
}

impl Integer {
    /// Creates an integer validator with the default messages.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the message for input that is not a number.
    #[must_use]
    pub fn invalid_message(mut self, message: impl Into<String>) -> Self {
        self.invalid = message.into();
        self
    }

    /// Sets the message for numbers with a fractional part.
    #[must_use]
    pub fn fraction_message(mut self, message: impl Into<String>) -> Self {
        self.fraction = message.into();
        self
    }

    /// Appends a rule; rules run in the order they were added.
    #[must_use]
    pub fn rule(mut self, rule: impl Rule<i64> + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Requires a value of at least `min`.
    #[must_use]
    pub fn min(self, min: i64, message: impl Into<String>) -> Self {
        self.rule(MinValueRule::new(min, message))
    }

    /// Requires a value of at most `max`.
    #[must_use]
    pub fn max(self, max: i64, message: impl Into<String>) -> Self {
        self.rule(MaxValueRule::new(max, message))
    }

    fn coerce(&self, raw: &RawValue) -> Result<f64, ValidationError> {
        let number = match raw {
            RawValue::Number(n) => Some(*n),
            RawValue::Text(s) => s.trim().parse::<f64>().ok(),
            RawValue::Null => None,
            other => return Err(invalid_type("a number", other)),
        };
        number
            .filter(|n| n.is_finite())
            .ok_or_else(|| ValidationError::single(self.invalid.clone(), "invalid"))
    }
}

impl Validator for Integer {
    type Output = i64;

    #[allow(clippy::cast_possible_truncation)]
    fn validate(&self, raw: &RawValue) -> Result<i64, ValidationError> {
        let number = self.coerce(raw)?;
        if number.fract() != 0.0 {
            return Err(ValidationError::single(self.fraction.clone(), "fraction"));
        }
        // Saturates at the i64 bounds, which the range rules then reject.
        let value = number as i64;
        run_rules(&self.rules, &value)?;
        Ok(value)
    }
}

/// A file input that must hold exactly one file.
#[derive(Debug)]
pub struct SingleFile {
    required: String,
    multiple: String,
    max_bytes: Option<(u64, String)>,
}

impl Default for SingleFile {
    fn default() -> Self {
        Self {
            required: "This field is required.".to_string(),
            multiple: "Select a single file.".to_string(),
            max_bytes: None,
        }
    }
}

impl SingleFile {
    /// Creates a file validator with the default messages and no size limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the message for an empty selection.
    #[must_use]
    pub fn required(mut self, message: impl Into<String>) -> Self {
        self.required = message.into();
        self
    }

    /// Sets the message for a selection of more than one file.
    #[must_use]
    pub fn multiple(mut self, message: impl Into<String>) -> Self {
        self.multiple = message.into();
        self
    }

    /// Rejects files larger than `max_bytes`. A file of exactly `max_bytes` passes.
    #[must_use]
    pub fn max_bytes(mut self, max_bytes: u64, message: impl Into<String>) -> Self {
        self.max_bytes = Some((max_bytes, message.into()));
        self
    }
}

impl Validator for SingleFile {
    type Output = UploadedFile;

    fn validate(&self, raw: &RawValue) -> Result<UploadedFile, ValidationError> {
        let files: &[UploadedFile] = match raw {
            RawValue::Null => &[],
            RawValue::Files(files) => files,
            other => return Err(invalid_type("a file", other)),
        };
        let file = match files {
            [] => return Err(ValidationError::single(self.required.clone(), "required")),
            [file] => file,
            _ => return Err(ValidationError::single(self.multiple.clone(), "multiple")),
        };
        // The declared size is untrusted; the limit applies to the bytes held.
        let size = file.content.len() as u64;
        if let Some((max, message)) = &self.max_bytes {
            if size > *max {
                return Err(ValidationError::single(message.clone(), "max_size"));
            }
        }
        let mut file = file.clone();
        file.size = size;
        Ok(file)
    }
}

/// A list whose items are each validated by `item`.
///
/// Item errors are reported at `<index>.<path>`; the list-level minimum is
/// reported at the list's own path. Both are collected in one pass. `Null`
/// counts as an empty list.
#[derive(Debug)]
pub struct ListOf<V> {
    item: V,
    min_length: Option<(usize, String)>,
}

impl<V: Validator> ListOf<V> {
    /// Creates a list validator with no length constraint.
    pub fn new(item: V) -> Self {
        Self {
            item,
            min_length: None,
        }
    }

    /// Requires at least `min_length` items.
    #[must_use]
    pub fn min_length(mut self, min_length: usize, message: impl Into<String>) -> Self {
        self.min_length = Some((min_length, message.into()));
        self
    }
}

impl<V: Validator> Validator for ListOf<V> {
    type Output = Vec<V::Output>;

    fn validate(&self, raw: &RawValue) -> Result<Self::Output, ValidationError> {
        let items: &[RawValue] = match raw {
            RawValue::Null => &[],
            RawValue::List(items) => items,
            other => return Err(invalid_type("a list", other)),
        };

        let mut errors = ValidationError::new();
        if let Some((min, message)) = &self.min_length {
            if items.len() < *min {
                errors.insert("", FieldError::new(message.clone(), "min_items"));
            }
        }

        let mut output = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            match self.item.validate(item) {
                Ok(value) => output.push(value),
                Err(e) => errors.merge(e.prefixed(&index.to_string())),
            }
        }

        if errors.is_empty() {
            Ok(output)
        } else {
            Err(errors)
        }
    }
}

/// The output of `inner` passed through `f`. Built by [`Validator::map`].
pub struct Map<V, F> {
    inner: V,
    f: F,
}

impl<V: std::fmt::Debug, F> std::fmt::Debug for Map<V, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Map").field("inner", &self.inner).finish_non_exhaustive()
    }
}

impl<V, F, U> Validator for Map<V, F>
where
    V: Validator,
    F: Fn(V::Output) -> U + Send + Sync,
{
    type Output = U;

    fn validate(&self, raw: &RawValue) -> Result<U, ValidationError> {
        self.inner.validate(raw).map(&self.f)
    }
}
