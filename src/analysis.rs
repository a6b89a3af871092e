//! Text analysis module.
//!
//! Analysis turns raw text into terms: [`QueryParser`](crate::query::parser::QueryParser)
//! normalizes the text and an [`Analyzer`](analyzer::Analyzer) splits it into tokens.

pub mod analyzer;

pub use analyzer::Analyzer;
