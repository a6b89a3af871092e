//! Query processing: parsing, fuzzy matching and relevance scoring.

pub mod fuzzy;
pub mod parser;
pub mod scorer;

pub use fuzzy::FuzzyMatcher;
pub use parser::QueryParser;
pub use scorer::{RelevanceScorer, ScoringContext};
