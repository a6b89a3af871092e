//! Command line argument parsing for the Ferret CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::analysis::Analyzer;

/// Ferret - an embeddable full-text search engine
#[derive(Parser, Debug, Clone)]
#[command(name = "ferret")]
#[command(about = "Manage and query Ferret full-text indexes")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct FerretArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Directory holding the index files
    #[arg(
        short,
        long,
        value_name = "DIR",
        env = "FERRET_DIR",
        default_value = "./indexes",
        global = true
    )]
    pub dir: PathBuf,

    /// Engine configuration file (JSON); overrides --dir
    #[arg(short, long, value_name = "CONFIG_FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl FerretArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create (or replace) an index
    #[command(name = "create-index")]
    CreateIndex(CreateIndexArgs),

    /// Add documents from a JSONL file
    #[command(name = "add-documents")]
    AddDocuments(AddDocumentsArgs),

    /// Remove a document by id
    #[command(name = "remove-document")]
    RemoveDocument(RemoveDocumentArgs),

    /// Search an index
    Search(SearchArgs),

    /// Suggest completions for partial input
    Suggest(SuggestArgs),

    /// Show index information
    Info(IndexNameArgs),

    /// List all indexes
    List,

    /// Delete an index
    #[command(name = "delete-index")]
    DeleteIndex(IndexNameArgs),
}

/// Arguments for creating an index
#[derive(Parser, Debug, Clone)]
pub struct CreateIndexArgs {
    /// Index name
    #[arg(value_name = "INDEX")]
    pub name: String,

    /// Analyzer (standard, simple, whitespace)
    #[arg(short, long)]
    pub analyzer: Option<Analyzer>,

    /// Field configuration file: JSON object of field name to options
    #[arg(short, long, value_name = "SCHEMA_FILE")]
    pub schema: Option<PathBuf>,
}

/// Arguments for adding documents
#[derive(Parser, Debug, Clone)]
pub struct AddDocumentsArgs {
    /// Index name
    #[arg(value_name = "INDEX")]
    pub name: String,

    /// Document file, one JSON object per line
    #[arg(value_name = "DOCUMENT_FILE")]
    pub document_file: PathBuf,

    /// Field configuration applied to these documents
    #[arg(short, long, value_name = "SCHEMA_FILE")]
    pub schema: Option<PathBuf>,
}

/// Arguments for removing a document
#[derive(Parser, Debug, Clone)]
pub struct RemoveDocumentArgs {
    /// Index name
    #[arg(value_name = "INDEX")]
    pub name: String,

    /// Document id
    #[arg(value_name = "ID")]
    pub id: String,
}

/// Arguments for searching
#[derive(Parser, Debug, Clone)]
pub struct SearchArgs {
    /// Index name
    #[arg(value_name = "INDEX")]
    pub name: String,

    /// Query text
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Field to search (repeatable)
    #[arg(long = "field", value_name = "FIELD")]
    pub fields: Vec<String>,

    /// Exact-match filter as FIELD=VALUE (repeatable)
    #[arg(long = "filter", value_name = "FIELD=VALUE", value_parser = parse_filter)]
    pub filters: Vec<(String, String)>,

    /// Facet field to count over the returned page (repeatable)
    #[arg(long = "facet", value_name = "FIELD")]
    pub facets: Vec<String>,

    /// Maximum number of results
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Number of results to skip
    #[arg(short, long)]
    pub offset: Option<usize>,

    /// Minimum score
    #[arg(long)]
    pub min_score: Option<f64>,

    /// Score by edit-distance similarity instead of BM25
    #[arg(long)]
    pub fuzzy: bool,
}

/// Arguments for suggestions
#[derive(Parser, Debug, Clone)]
pub struct SuggestArgs {
    /// Index name
    #[arg(value_name = "INDEX")]
    pub name: String,

    /// Partial input
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Restrict suggestions to one field
    #[arg(long)]
    pub field: Option<String>,

    /// Maximum number of suggestions
    #[arg(short, long)]
    pub limit: Option<usize>,
}

/// Arguments naming a single index
#[derive(Parser, Debug, Clone)]
pub struct IndexNameArgs {
    /// Index name
    #[arg(value_name = "INDEX")]
    pub name: String,
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

fn parse_filter(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((field, value)) if !field.is_empty() => Ok((field.to_string(), value.to_string())),
        _ => Err(format!("expected FIELD=VALUE, got '{s}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_search_command() {
        let args = FerretArgs::try_parse_from([
            "ferret",
            "search",
            "products",
            "wireless mouse",
            "--field",
            "title",
            "--filter",
            "brand=acme",
            "--facet",
            "category",
            "--limit",
            "20",
            "--fuzzy",
        ])
        .unwrap();

        if let Command::Search(search_args) = args.command {
            assert_eq!(search_args.name, "products");
            assert_eq!(search_args.query, "wireless mouse");
            assert_eq!(search_args.fields, vec!["title"]);
            assert_eq!(
                search_args.filters,
                vec![("brand".to_string(), "acme".to_string())]
            );
            assert_eq!(search_args.facets, vec!["category"]);
            assert_eq!(search_args.limit, Some(20));
            assert!(search_args.fuzzy);
        } else {
            panic!("Expected Search command");
        }
    }

    #[test]
    fn test_create_index_command() {
        let args = FerretArgs::try_parse_from([
            "ferret",
            "--dir",
            "/data/idx",
            "create-index",
            "books",
            "--analyzer",
            "simple",
            "--schema",
            "schema.json",
        ])
        .unwrap();

        assert_eq!(args.dir, PathBuf::from("/data/idx"));
        if let Command::CreateIndex(create_args) = args.command {
            assert_eq!(create_args.name, "books");
            assert_eq!(create_args.analyzer, Some(Analyzer::Simple));
            assert_eq!(create_args.schema, Some(PathBuf::from("schema.json")));
        } else {
            panic!("Expected CreateIndex command");
        }
    }

    #[test]
    fn test_invalid_filter_rejected() {
        let result = FerretArgs::try_parse_from(["ferret", "search", "p", "q", "--filter", "novalue"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_verbosity_levels() {
        // Default verbosity
        let args = FerretArgs::try_parse_from(["ferret", "list"]).unwrap();
        assert_eq!(args.verbosity(), 1);

        // Multiple verbose flags
        let args = FerretArgs::try_parse_from(["ferret", "-vv", "list"]).unwrap();
        assert_eq!(args.verbosity(), 2);

        // Quiet flag
        let args = FerretArgs::try_parse_from(["ferret", "--quiet", "list"]).unwrap();
        assert_eq!(args.verbosity(), 0);
    }

    #[test]
    fn test_output_format() {
        let args = FerretArgs::try_parse_from(["ferret", "list", "--format", "json"]).unwrap();
        assert_eq!(args.output_format, OutputFormat::Json);
    }
}
