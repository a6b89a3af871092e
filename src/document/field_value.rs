//! Field value types for documents.
//!
//! A [`FieldValue`] is the scalar or text value stored under a field name in a
//! [`Document`](crate::document::document::Document). Values serialize
//! untagged, so a document's fields look like a plain JSON object:
//!
//! ```
//! use ferret::document::field_value::FieldValue;
//!
//! let values: Vec<FieldValue> = serde_json::from_str(r#"["laptop", 3, 9.5, true, null]"#).unwrap();
//! assert_eq!(values[0], FieldValue::Text("laptop".to_string()));
//! assert_eq!(values[1], FieldValue::Integer(3));
//! assert_eq!(values[2], FieldValue::Float(9.5));
//! assert_eq!(values[3], FieldValue::Boolean(true));
//! assert_eq!(values[4], FieldValue::Null);
//! ```
//!
//! # Rendering
//!
//! Tokenization, BM25 field lengths, facet keys and highlighting all work on the
//! string rendering of a value (see [`FieldValue::render`]). `Null` renders to
//! nothing and is treated as an absent value everywhere.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Represents a value for a field in a document.
///
/// `PartialEq` is structural: `Integer(1)` and `Float(1.0)` are different
/// values. Facet filters use [`FieldValue::same_value`] instead, which compares
/// numbers by value. Text is compared verbatim (no analysis) by both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Null value
    Null,
    /// Boolean value
    Boolean(bool),
    /// Integer value
    Integer(i64),
    /// Floating point value
    Float(f64),
    /// Text value
    Text(String),
}

impl FieldValue {
    /// Convert to text if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Convert to an integer if this is an integer value.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Convert to a float; integers are widened.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            FieldValue::Float(f) => Some(*f),
            FieldValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Convert to boolean.
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            FieldValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Check whether this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Filter equality: numbers compare by value across `Integer` and `Float`,
    /// every other pair compares structurally.
    pub fn same_value(&self, other: &FieldValue) -> bool {
        match (self, other) {
            (FieldValue::Integer(i), FieldValue::Float(f))
            | (FieldValue::Float(f), FieldValue::Integer(i)) => *i as f64 == *f,
            _ => self == other,
        }
    }

    /// True for null, `false`, zero, NaN and empty text.
    ///
    /// Such values carry no weight in relevance scoring.
    pub fn is_falsy(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Boolean(b) => !b,
            FieldValue::Integer(i) => *i == 0,
            FieldValue::Float(f) => *f == 0.0 || f.is_nan(),
            FieldValue::Text(s) => s.is_empty(),
        }
    }

    /// String rendering of the value, or `None` for null.
    ///
    /// Floats use the shortest round-trip form, so `3.0` renders as `"3"` and
    /// `0.5` as `"0.5"`.
    pub fn render(&self) -> Option<Cow<'_, str>> {
        match self {
            FieldValue::Null => None,
            FieldValue::Text(s) => Some(Cow::Borrowed(s.as_str())),
            FieldValue::Boolean(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
            FieldValue::Integer(i) => Some(Cow::Owned(i.to_string())),
            FieldValue::Float(f) => Some(Cow::Owned(f.to_string())),
        }
    }

    /// Character length of the rendered value; `0` for null.
    pub fn rendered_len(&self) -> usize {
        self.render().map(|s| s.chars().count()).unwrap_or(0)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.render() {
            Some(s) => f.write_str(&s),
            None => f.write_str("null"),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Integer(value as i64)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}
