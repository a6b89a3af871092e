//! In-memory inverted index: term → document id → posting.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A per-term, per-document record of the matched field, frequency and positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    /// Field in which the term was first seen for this document.
    pub field: String,
    /// Number of occurrences recorded for this document.
    pub frequency: u32,
    /// Token positions, in insertion order.
    pub positions: Vec<u32>,
}

impl Posting {
    fn new(field: &str) -> Self {
        Posting {
            field: field.to_string(),
            frequency: 0,
            positions: Vec::new(),
        }
    }
}

/// Postings of one term, keyed by document id.
pub type PostingMap = HashMap<String, Posting>;

/// Mapping from term to the documents (and positions) in which it occurs.
///
/// A term whose posting map becomes empty is removed immediately, so every
/// term present in the index has at least one posting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvertedIndex {
    terms: HashMap<String, PostingMap>,
}

impl InvertedIndex {
    /// Create an empty inverted index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one occurrence of `term` in `doc_id` at `position`.
    ///
    /// The posting is created on first sight with `field`; later occurrences
    /// add to it regardless of field.
    pub fn add_occurrence(&mut self, term: &str, doc_id: &str, field: &str, position: u32) {
        let posting = self
            .terms
            .entry(term.to_string())
            .or_default()
            .entry(doc_id.to_string())
            .or_insert_with(|| Posting::new(field));
        posting.frequency += 1;
        posting.positions.push(position);
    }

    /// Remove every posting of `doc_id`, pruning terms left without postings.
    ///
    /// Returns the number of postings removed.
    pub fn remove_document(&mut self, doc_id: &str) -> usize {
        let mut removed = 0;
        self.terms.retain(|_, postings| {
            if postings.remove(doc_id).is_some() {
                removed += 1;
            }
            !postings.is_empty()
        });
        removed
    }

    /// Postings of a term.
    pub fn postings(&self, term: &str) -> Option<&PostingMap> {
        self.terms.get(term)
    }

    /// Posting of a term for one document.
    pub fn posting(&self, term: &str, doc_id: &str) -> Option<&Posting> {
        self.terms.get(term).and_then(|postings| postings.get(doc_id))
    }

    /// Number of documents having any posting for the term.
    pub fn document_frequency(&self, term: &str) -> usize {
        self.terms.get(term).map_or(0, HashMap::len)
    }

    /// Check whether the term is indexed.
    pub fn contains_term(&self, term: &str) -> bool {
        self.terms.contains_key(term)
    }

    /// Iterate over all terms and their postings.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &PostingMap)> {
        self.terms.iter()
    }

    /// Number of distinct terms.
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    /// Check whether the index holds no terms.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}
