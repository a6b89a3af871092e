//! Command implementations for the Ferret CLI.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::time::Instant;

use log::{debug, info};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::EngineConfig;
use crate::document::{Document, FieldValue};
use crate::engine::{Engine, IndexOptions};
use crate::error::{FerretError, Result};
use crate::index::FieldConfigMap;
use crate::search::{FacetFilters, SearchQuery, SuggestionQuery};
use crate::storage::StorageConfig;
use crate::storage::file::FileStorageConfig;

/// Execute a CLI command, writing its result to `out`.
pub async fn execute_command(args: FerretArgs, out: &mut dyn Write) -> Result<()> {
    let engine = Engine::new(engine_config(&args)?)?;

    match &args.command {
        Command::CreateIndex(create_args) => create_index(&engine, create_args, &args, out).await,
        Command::AddDocuments(add_args) => add_documents(&engine, add_args, &args, out).await,
        Command::RemoveDocument(remove_args) => {
            remove_document(&engine, remove_args, &args, out).await
        }
        Command::Search(search_args) => search_index(&engine, search_args, &args, out).await,
        Command::Suggest(suggest_args) => suggest(&engine, suggest_args, &args, out).await,
        Command::Info(info_args) => {
            let info = engine.get_index_info(&info_args.name).await?;
            output_result("Index information", &info, &args, out)
        }
        Command::List => {
            let indexes = engine.list_indexes().await?;
            output_result("Indexes", &IndexList { indexes }, &args, out)
        }
        Command::DeleteIndex(delete_args) => {
            engine.delete_index(&delete_args.name).await?;
            let result = IndexDeletionResult {
                index: delete_args.name.clone(),
            };
            output_result("Index deleted", &result, &args, out)
        }
    }
}

/// Engine configuration from `--config`, else file storage under `--dir`.
fn engine_config(args: &FerretArgs) -> Result<EngineConfig> {
    match &args.config {
        Some(path) => {
            debug!("Loading configuration from {}", path.display());
            EngineConfig::from_file(path)
        }
        None => Ok(EngineConfig::default()
            .with_storage(StorageConfig::File(FileStorageConfig::new(&args.dir)))),
    }
}

/// Create a new index.
async fn create_index(
    engine: &Engine,
    args: &CreateIndexArgs,
    cli_args: &FerretArgs,
    out: &mut dyn Write,
) -> Result<()> {
    let mut options = IndexOptions::new(&args.name);
    if let Some(analyzer) = args.analyzer {
        options = options.analyzer(analyzer);
    }
    if let Some(schema) = &args.schema {
        options = options.field_config(load_field_config(schema)?);
    }

    let info = engine.create_index(options).await?;
    output_result("Index created successfully", &info, cli_args, out)
}

/// Add the documents of a JSONL file in one batch.
async fn add_documents(
    engine: &Engine,
    args: &AddDocumentsArgs,
    cli_args: &FerretArgs,
    out: &mut dyn Write,
) -> Result<()> {
    let start = Instant::now();
    let documents = load_documents(&args.document_file)?;
    let documents_added = documents.len();
    info!(
        "Loaded {documents_added} document(s) from {}",
        args.document_file.display()
    );

    let field_config = match &args.schema {
        Some(schema) => load_field_config(schema)?,
        None => FieldConfigMap::new(),
    };
    let data = engine
        .manager()
        .add_documents(&args.name, documents, &field_config)
        .await?;

    let result = DocumentAdditionResult {
        index: args.name.clone(),
        documents_added,
        document_count: data.metadata.document_count,
        duration_ms: start.elapsed().as_millis() as u64,
    };
    output_result("Documents added", &result, cli_args, out)
}

async fn remove_document(
    engine: &Engine,
    args: &RemoveDocumentArgs,
    cli_args: &FerretArgs,
    out: &mut dyn Write,
) -> Result<()> {
    let removed = engine.remove(&args.name, &args.id).await?;
    let result = DocumentRemovalResult {
        index: args.name.clone(),
        id: args.id.clone(),
        removed,
    };
    output_result("Document removal", &result, cli_args, out)
}

async fn search_index(
    engine: &Engine,
    args: &SearchArgs,
    cli_args: &FerretArgs,
    out: &mut dyn Write,
) -> Result<()> {
    let mut query = SearchQuery::new(&args.name, &args.query).fuzzy(args.fuzzy);
    if !args.fields.is_empty() {
        query.fields = Some(args.fields.clone());
    }
    if !args.filters.is_empty() {
        let filters: FacetFilters = args
            .filters
            .iter()
            .map(|(field, value)| (field.clone(), parse_filter_value(value)))
            .collect();
        query.filters = Some(filters);
    }
    if !args.facets.is_empty() {
        query.facets = Some(args.facets.clone());
    }
    query.limit = args.limit;
    query.offset = args.offset;
    query.min_score = args.min_score;

    let response = engine.search(&query).await?;
    output_result("Search completed", &response, cli_args, out)
}

async fn suggest(
    engine: &Engine,
    args: &SuggestArgs,
    cli_args: &FerretArgs,
    out: &mut dyn Write,
) -> Result<()> {
    let mut query = SuggestionQuery::new(&args.name, &args.query);
    query.field = args.field.clone();
    query.limit = args.limit;

    let suggestions = engine.suggest(&query).await?;
    let result = SuggestionList {
        query: args.query.clone(),
        suggestions,
    };
    output_result("Suggestions", &result, cli_args, out)
}

/// Load a field configuration file: a JSON object of field name to options.
pub fn load_field_config(path: &Path) -> Result<FieldConfigMap> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| {
        FerretError::invalid_argument(format!("invalid schema file {}: {e}", path.display()))
    })
}

/// Read one flat JSON object per line. Blank lines are skipped.
pub fn load_documents(path: &Path) -> Result<Vec<Document>> {
    let reader = BufReader::new(File::open(path)?);
    let mut documents = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let object: Map<String, Value> = serde_json::from_str(&line).map_err(|e| {
            FerretError::invalid_argument(format!("line {}: {e}", line_no + 1))
        })?;
        documents.push(
            document_from_json(object)
                .map_err(|e| FerretError::invalid_argument(format!("line {}: {e}", line_no + 1)))?,
        );
    }

    Ok(documents)
}

/// Build a document from a flat JSON object; a missing id gets a random UUID.
pub fn document_from_json(mut object: Map<String, Value>) -> std::result::Result<Document, String> {
    let id = match object.remove("id") {
        Some(Value::String(id)) => id,
        Some(Value::Number(id)) => id.to_string(),
        None | Some(Value::Null) => Uuid::new_v4().to_string(),
        Some(other) => return Err(format!("unsupported id {other}")),
    };

    let mut document = Document::new(id);
    for (name, value) in object {
        let value: FieldValue = serde_json::from_value(value)
            .map_err(|_| format!("field '{name}' must be a string, number, boolean or null"))?;
        document.add_field(name, value);
    }
    Ok(document)
}

/// Interpret a command line filter value as JSON when it parses as a scalar,
/// else as text: `5` is an integer, `true` a boolean, `red` a string.
fn parse_filter_value(value: &str) -> FieldValue {
    match serde_json::from_str::<FieldValue>(value) {
        Ok(parsed) => parsed,
        Err(_) => FieldValue::from(value),
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use tempfile::TempDir;

    use super::*;

    fn run_args(dir: &Path, extra: &[&str]) -> FerretArgs {
        let mut argv = vec!["ferret", "-f", "json", "--dir"];
        let dir = dir.to_str().unwrap();
        argv.push(dir);
        argv.extend_from_slice(extra);
        FerretArgs::try_parse_from(argv).unwrap()
    }

    async fn run(dir: &Path, extra: &[&str]) -> Value {
        let mut out = Vec::new();
        execute_command(run_args(dir, extra), &mut out).await.unwrap();
        serde_json::from_slice(&out).unwrap()
    }

    #[test]
    fn test_document_from_json() {
        let object: Map<String, Value> =
            serde_json::from_str(r#"{"id": 7, "title": "Lamp", "price": 9.5, "tag": null}"#).unwrap();
        let doc = document_from_json(object).unwrap();
        assert_eq!(doc.id, "7");
        assert_eq!(doc.get_field("price"), Some(&FieldValue::Float(9.5)));
        assert_eq!(doc.get_field("tag"), Some(&FieldValue::Null));

        let object: Map<String, Value> = serde_json::from_str(r#"{"title": "no id"}"#).unwrap();
        let doc = document_from_json(object).unwrap();
        assert!(Uuid::parse_str(&doc.id).is_ok());

        let object: Map<String, Value> = serde_json::from_str(r#"{"tags": ["a"]}"#).unwrap();
        assert!(document_from_json(object).is_err());
    }

    #[test]
    fn test_parse_filter_value() {
        assert_eq!(parse_filter_value("5"), FieldValue::Integer(5));
        assert_eq!(parse_filter_value("true"), FieldValue::Boolean(true));
        assert_eq!(parse_filter_value("red"), FieldValue::from("red"));
        assert_eq!(parse_filter_value("\"5\""), FieldValue::from("5"));
    }

    #[tokio::test]
    async fn test_end_to_end_commands() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("indexes");
        let docs = temp_dir.path().join("docs.jsonl");
        fs::write(
            &docs,
            concat!(
                r#"{"id": "1", "title": "Rust in Action", "lang": "en"}"#,
                "\n\n",
                r#"{"id": "2", "title": "Programming Rust", "lang": "en"}"#,
                "\n",
                r#"{"id": "3", "title": "Go Programming", "lang": "de"}"#,
                "\n",
            ),
        )
        .unwrap();

        let created = run(&dir, &["create-index", "books"]).await;
        assert_eq!(created["name"], "books");

        let added = run(&dir, &["add-documents", "books", docs.to_str().unwrap()]).await;
        assert_eq!(added["documentsAdded"], 3);
        assert_eq!(added["documentCount"], 3);
        assert!(added["durationMs"].is_u64());

        let found = run(&dir, &["search", "books", "rust", "--filter", "lang=en", "--facet", "lang"]).await;
        assert_eq!(found["total"], 2);
        assert_eq!(found["facets"]["lang"]["en"], 2);
        assert!(found["took"].is_u64());

        let suggestions = run(&dir, &["suggest", "books", "prog"]).await;
        assert_eq!(suggestions["suggestions"][0]["text"], "programming");

        let removed = run(&dir, &["remove-document", "books", "1"]).await;
        assert_eq!(removed["removed"], true);
        let info = run(&dir, &["info", "books"]).await;
        assert_eq!(info["documentCount"], 2);

        let listed = run(&dir, &["list"]).await;
        assert_eq!(listed["indexes"], serde_json::json!(["books"]));

        run(&dir, &["delete-index", "books"]).await;
        let listed = run(&dir, &["list"]).await;
        assert_eq!(listed["indexes"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_missing_index_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let mut out = Vec::new();
        let err = execute_command(run_args(temp_dir.path(), &["info", "ghost"]), &mut out)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INDEX_NOT_FOUND");
    }
}
