//! Analyzer selection and tokenization strategies.

use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{FerretError, Result};

lazy_static! {
    static ref NON_WORD_RUN: Regex = Regex::new(r"\W+").unwrap();
}

/// The tokenization strategy applied to text before indexing or querying.
///
/// `Standard` and `Whitespace` split on whitespace runs, `Simple` splits on any
/// run of non-word characters. Because query and field text are normalized
/// before tokenization (punctuation is already replaced by spaces), the three
/// strategies currently produce the same tokens for normalized input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Analyzer {
    /// Whitespace splitting after normalization.
    #[default]
    Standard,
    /// Splits on non-word character runs.
    Simple,
    /// Splits on whitespace runs.
    Whitespace,
}

impl Analyzer {
    /// Get the name of this analyzer (for debugging and configuration).
    pub fn name(&self) -> &'static str {
        match self {
            Analyzer::Standard => "standard",
            Analyzer::Simple => "simple",
            Analyzer::Whitespace => "whitespace",
        }
    }

    /// Split already-normalized text into tokens. Empty tokens are dropped.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        match self {
            Analyzer::Standard | Analyzer::Whitespace => {
                text.split_whitespace().map(str::to_string).collect()
            }
            Analyzer::Simple => NON_WORD_RUN
                .split(text)
                .filter(|token| !token.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

impl fmt::Display for Analyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Analyzer {
    type Err = FerretError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Analyzer::Standard),
            "simple" => Ok(Analyzer::Simple),
            "whitespace" => Ok(Analyzer::Whitespace),
            other => Err(FerretError::invalid_argument(format!(
                "unknown analyzer '{other}' (expected standard, simple or whitespace)"
            ))),
        }
    }
}
