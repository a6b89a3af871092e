//! Document module.
//!
//! Documents are flat collections of field values identified by a string id.
//! They are owned by the [`IndexData`](crate::index::IndexData) that contains
//! them.
//!
//! # Examples
//!
//! ```
//! use ferret::document::document::Document;
//!
//! let doc = Document::builder("book-1")
//!     .field("title", "The Rust Programming Language")
//!     .field("year", 2019)
//!     .build();
//!
//! assert_eq!(doc.len(), 2);
//! ```

#[allow(clippy::module_inception)]
pub mod document;
pub mod field_value;

pub use document::{Document, DocumentBuilder};
pub use field_value::FieldValue;
