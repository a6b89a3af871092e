//! Shared utility modules.

pub mod levenshtein;
