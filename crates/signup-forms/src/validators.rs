//! Rules applied to a field after type coercion.
//!
//! A [`Rule`] checks one constraint on an already-coerced value (a string
//! or an integer) and returns the [`FieldError`] to show when it is not met.
//! Field validators in [`fields`](crate::fields) run their rules in order and
//! stop at the first failure, so each field path carries a single message.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use signup_core::error::FieldError;

/// A single post-coercion constraint.
///
/// # Examples
///
/// ```
/// use signup_forms::validators::{MinLengthRule, Rule};
///
/// let rule = MinLengthRule::new(6, "Must be 6 or more characters long");
/// assert!(rule.check("secret").is_ok());
/// assert_eq!(rule.check("abc").unwrap_err().message, "Must be 6 or more characters long");
/// ```
pub trait Rule<T: ?Sized>: Send + Sync + fmt::Debug {
    /// Checks the value, returning the error to display if it fails.
    fn check(&self, value: &T) -> Result<(), FieldError>;

    /// Returns a human-readable name for this rule.
    fn name(&self) -> &str;
}

/// Requires at least `min_length` characters.
#[derive(Debug, Clone)]
pub struct MinLengthRule {
    /// The minimum number of characters.
    pub min_length: usize,
    message: String,
}

impl MinLengthRule {
    /// Creates a new `MinLengthRule`.
    pub fn new(min_length: usize, message: impl Into<String>) -> Self {
        Self {
            min_length,
            message: message.into(),
        }
    }
}

impl Rule<str> for MinLengthRule {
    fn check(&self, value: &str) -> Result<(), FieldError> {
        if value.chars().count() < self.min_length {
            return Err(FieldError::new(self.message.clone(), "min_length"));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "MinLengthRule"
    }
}

/// Dot-separated atoms; no leading, trailing or doubled dots.
const EMAIL_LOCAL_PART: &str = r"[A-Za-z0-9_'+\-]+(\.[A-Za-z0-9_'+\-]+)*";
/// Hyphenated labels plus an alphabetic top-level domain.
const EMAIL_DOMAIN: &str = r"([A-Za-z0-9]([A-Za-z0-9\-]*[A-Za-z0-9])?\.)+[A-Za-z]{2,}";

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(&format!("^{EMAIL_LOCAL_PART}@{EMAIL_DOMAIN}$")).expect("valid regex")
    })
}

/// Requires a syntactically valid email address.
///
/// The local part is dot-separated atoms (no leading, trailing or doubled
/// dots); the domain is dot-separated labels ending in an alphabetic TLD.
#[derive(Debug, Clone)]
pub struct EmailRule {
    message: String,
}

impl EmailRule {
    /// Creates a new `EmailRule`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Rule<str> for EmailRule {
    fn check(&self, value: &str) -> Result<(), FieldError> {
        if email_regex().is_match(value) {
            Ok(())
        } else {
            Err(FieldError::new(self.message.clone(), "invalid_email"))
        }
    }

    fn name(&self) -> &str {
        "EmailRule"
    }
}

/// Requires an exact, case-sensitive suffix.
#[derive(Debug, Clone)]
pub struct SuffixRule {
    /// The required suffix.
    pub suffix: String,
    message: String,
}

impl SuffixRule {
    /// Creates a new `SuffixRule`.
    pub fn new(suffix: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
            message: message.into(),
        }
    }
}

impl Rule<str> for SuffixRule {
    fn check(&self, value: &str) -> Result<(), FieldError> {
        if value.ends_with(&self.suffix) {
            Ok(())
        } else {
            Err(FieldError::new(self.message.clone(), "suffix"))
        }
    }

    fn name(&self) -> &str {
        "SuffixRule"
    }
}

/// Requires an integer greater than or equal to `min_value`.
#[derive(Debug, Clone)]
pub struct MinValueRule {
    /// The smallest accepted value.
    pub min_value: i64,
    message: String,
}

impl MinValueRule {
    /// Creates a new `MinValueRule`.
    pub fn new(min_value: i64, message: impl Into<String>) -> Self {
        Self {
            min_value,
            message: message.into(),
        }
    }
}

impl Rule<i64> for MinValueRule {
    fn check(&self, value: &i64) -> Result<(), FieldError> {
        if *value < self.min_value {
            return Err(FieldError::new(self.message.clone(), "min_value"));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "MinValueRule"
    }
}

/// Requires an integer less than or equal to `max_value`.
#[derive(Debug, Clone)]
pub struct MaxValueRule {
    /// The largest accepted value.
    pub max_value: i64,
    message: String,
}

impl MaxValueRule {
    /// Creates a new `MaxValueRule`.
    pub fn new(max_value: i64, message: impl Into<String>) -> Self {
        Self {
            max_value,
            message: message.into(),
        }
    }
}

impl Rule<i64> for MaxValueRule {
    fn check(&self, value: &i64) -> Result<(), FieldError> {
        if *value > self.max_value {
            return Err(FieldError::new(self.message.clone(), "max_value"));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "MaxValueRule"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_length_counts_chars() {
        let rule = MinLengthRule::new(3, "short");
        assert!(rule.check("äöü").is_ok());
        assert!(rule.check("ab").is_err());
        assert_eq!(rule.check("ab").unwrap_err().code, "min_length");
    }

    #[test]
    fn test_email_rule_accepts() {
        let rule = EmailRule::new("Invalid email address");
        for ok in [
            "a@github.com",
            "first.last+tag@github.com",
            "o'neil@mail.example.org",
            "a@GITHUB.com",
        ] {
            assert!(rule.check(ok).is_ok(), "{ok} should be accepted");
        }
    }

    #[test]
    fn test_email_rule_rejects() {
        let rule = EmailRule::new("Invalid email address");
        for bad in [
            "",
            "plain",
            "@github.com",
            "a@",
            "a@github",
            "a..b@github.com",
            ".a@github.com",
            "a b@github.com",
            "a@-x.com",
        ] {
            assert!(rule.check(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_suffix_rule_is_case_sensitive() {
        let rule = SuffixRule::new("@github.com", "wrong domain");
        assert!(rule.check("a@github.com").is_ok());
        assert!(rule.check("a@GITHUB.com").is_err());
        assert!(rule.check("a@github.com.evil").is_err());
    }

    #[test]
    fn test_value_rules_are_inclusive() {
        let min = MinValueRule::new(1, "too low");
        let max = MaxValueRule::new(100, "too high");
        assert!(min.check(&1).is_ok());
        assert!(min.check(&0).is_err());
        assert!(max.check(&100).is_ok());
        assert!(max.check(&101).is_err());
    }

    #[test]
    fn test_rule_names() {
        assert_eq!(MinLengthRule::new(1, "").name(), "MinLengthRule");
        assert_eq!(EmailRule::new("").name(), "EmailRule");
        assert_eq!(SuffixRule::new("", "").name(), "SuffixRule");
        assert_eq!(MinValueRule::new(0, "").name(), "MinValueRule");
        assert_eq!(MaxValueRule::new(0, "").name(), "MaxValueRule");
    }
}
