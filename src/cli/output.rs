//! Output formatting for CLI commands.

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::cli::args::{FerretArgs, OutputFormat};
use crate::document::FieldValue;
use crate::error::Result;
use crate::index::IndexInfo;
use crate::search::{SearchResponse, Suggestion};

/// A command result that can be printed for humans as well as serialized.
pub trait Render: Serialize {
    /// Write the human-readable form.
    fn render_human(&self, out: &mut dyn Write) -> std::io::Result<()>;
}

/// Result structure for document addition.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentAdditionResult {
    pub index: String,
    pub documents_added: usize,
    pub document_count: usize,
    pub duration_ms: u64,
}

/// Result structure for document removal.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRemovalResult {
    pub index: String,
    pub id: String,
    pub removed: bool,
}

/// Result structure for index deletion.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexDeletionResult {
    pub index: String,
}

/// Names of the stored indexes.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexList {
    pub indexes: Vec<String>,
}

/// Suggestions for a partial query.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionList {
    pub query: String,
    pub suggestions: Vec<Suggestion>,
}

/// Output a result in the format selected on the command line.
pub fn output_result<T: Render>(
    message: &str,
    result: &T,
    args: &FerretArgs,
    out: &mut dyn Write,
) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            if args.verbosity() > 1 {
                writeln!(out, "{message}")?;
                writeln!(out)?;
            }
            result.render_human(out)?;
        }
        OutputFormat::Json => {
            if args.pretty {
                serde_json::to_writer_pretty(&mut *out, result)?;
            } else {
                serde_json::to_writer(&mut *out, result)?;
            }
            writeln!(out)?;
        }
    }
    Ok(())
}

impl Render for IndexInfo {
    fn render_human(&self, out: &mut dyn Write) -> std::io::Result<()> {
        writeln!(out, "Index: {}", self.name)?;
        writeln!(out, "Documents: {}", self.document_count)?;
        writeln!(out, "Created: {}", self.created_at.to_rfc3339())?;
        writeln!(out, "Updated: {}", self.updated_at.to_rfc3339())
    }
}

impl Render for DocumentAdditionResult {
    fn render_human(&self, out: &mut dyn Write) -> std::io::Result<()> {
        writeln!(
            out,
            "Added {} document(s) to {} in {}ms ({} total)",
            self.documents_added, self.index, self.duration_ms, self.document_count
        )
    }
}

impl Render for DocumentRemovalResult {
    fn render_human(&self, out: &mut dyn Write) -> std::io::Result<()> {
        if self.removed {
            writeln!(out, "Removed document {} from {}", self.id, self.index)
        } else {
            writeln!(out, "Document {} not found in {}", self.id, self.index)
        }
    }
}

impl Render for IndexDeletionResult {
    fn render_human(&self, out: &mut dyn Write) -> std::io::Result<()> {
        writeln!(out, "Deleted index {}", self.index)
    }
}

impl Render for IndexList {
    fn render_human(&self, out: &mut dyn Write) -> std::io::Result<()> {
        if self.indexes.is_empty() {
            return writeln!(out, "No indexes found");
        }
        for name in &self.indexes {
            writeln!(out, "{name}")?;
        }
        Ok(())
    }
}

impl Render for SuggestionList {
    fn render_human(&self, out: &mut dyn Write) -> std::io::Result<()> {
        if self.suggestions.is_empty() {
            return writeln!(out, "No suggestions for '{}'", self.query);
        }
        for suggestion in &self.suggestions {
            writeln!(out, "{} ({:.3})", suggestion.text, suggestion.score)?;
        }
        Ok(())
    }
}

impl Render for SearchResponse {
    fn render_human(&self, out: &mut dyn Write) -> std::io::Result<()> {
        writeln!(out, "Search Results:")?;
        writeln!(out, "═══════════════")?;

        for (i, hit) in self.results.iter().enumerate() {
            writeln!(out)?;
            writeln!(
                out,
                "Result {}: {} (Score: {:.3})",
                i + 1,
                hit.document.id,
                hit.score
            )?;
            writeln!(out, "─────────────")?;

            let mut fields: Vec<(&String, &FieldValue)> = hit.document.fields.iter().collect();
            fields.sort_by(|a, b| a.0.cmp(b.0));
            for (field_name, value) in fields {
                writeln!(out, "{field_name}: {value}")?;
            }
            for (field_name, matches) in &hit.highlights {
                writeln!(out, "  matched in {field_name}: {}", matches.join(", "))?;
            }
        }

        writeln!(out)?;
        writeln!(out, "Total hits: {}", self.total)?;
        writeln!(out, "Search time: {}ms", self.took_ms)?;

        if let Some(facets) = &self.facets {
            writeln!(out)?;
            writeln!(out, "Facets:")?;
            writeln!(out, "───────")?;
            for (field_name, counts) in facets {
                writeln!(out, "{field_name}:")?;
                for (label, count) in counts {
                    writeln!(out, "  {label} ({count})")?;
                }
            }
        }
        Ok(())
    }
}
