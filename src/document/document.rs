//! Document structure for indexing.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::field_value::FieldValue;

/// A document represents a single item to be indexed.
///
/// Documents are identified by a caller-supplied string id and carry a flat
/// map of field values. Timestamps are optional on input; the index manager
/// fills them in when the document is indexed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Unique identifier within an index.
    pub id: String,
    /// The field values for this document.
    #[serde(default)]
    pub fields: HashMap<String, FieldValue>,
    /// When the document was first indexed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// When the document was last indexed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Document {
    /// Create a new empty document with the given id.
    pub fn new<S: Into<String>>(id: S) -> Self {
        Document {
            id: id.into(),
            fields: HashMap::new(),
            created_at: None,
            updated_at: None,
        }
    }

    /// Create a builder for constructing documents.
    pub fn builder<S: Into<String>>(id: S) -> DocumentBuilder {
        DocumentBuilder::new(id)
    }

    /// Add a field value to the document.
    pub fn add_field<S: Into<String>, V: Into<FieldValue>>(&mut self, name: S, value: V) {
        self.fields.insert(name.into(), value.into());
    }

    /// Get a field value from the document.
    pub fn get_field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Get a field value, treating null as absent.
    pub fn present_field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name).filter(|value| !value.is_null())
    }

    /// Check if the document has a field.
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Get the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the document has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A builder for constructing documents in a fluent manner.
#[derive(Debug)]
pub struct DocumentBuilder {
    document: Document,
}

impl DocumentBuilder {
    /// Create a new document builder.
    pub fn new<S: Into<String>>(id: S) -> Self {
        DocumentBuilder {
            document: Document::new(id),
        }
    }

    /// Add a field of any supported value type.
    pub fn field<S: Into<String>, V: Into<FieldValue>>(mut self, name: S, value: V) -> Self {
        self.document.add_field(name, value);
        self
    }

    /// Set the creation timestamp explicitly.
    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.document.created_at = Some(at);
        self
    }

    /// Build the document.
    pub fn build(self) -> Document {
        self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let doc = Document::builder("p-1")
            .field("title", "Mechanical keyboard")
            .field("price", 89.5)
            .field("in_stock", true)
            .build();

        assert_eq!(doc.id, "p-1");
        assert_eq!(doc.len(), 3);
        assert_eq!(doc.get_field("price"), Some(&FieldValue::Float(89.5)));
        assert!(doc.created_at.is_none());
    }

    #[test]
    fn test_present_field_skips_null() {
        let doc = Document::builder("d")
            .field("brand", FieldValue::Null)
            .build();

        assert!(doc.has_field("brand"));
        assert!(doc.present_field("brand").is_none());
        assert!(doc.present_field("missing").is_none());
    }

    #[test]
    fn test_deserialize_plain_json() {
        let doc: Document = serde_json::from_str(
            r#"{"id": "a", "fields": {"title": "Dune", "year": 1965}, "createdAt": "2024-03-01T10:00:00Z"}"#,
        )
        .unwrap();

        assert_eq!(doc.get_field("year"), Some(&FieldValue::Integer(1965)));
        assert_eq!(
            doc.created_at.unwrap().to_rfc3339(),
            "2024-03-01T10:00:00+00:00"
        );
        assert!(doc.updated_at.is_none());
    }
}
