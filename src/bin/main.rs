//! Composer CLI - inspect and write Malloy queries against a source
//!
//! Usage:
//!   composer list [--source <source.json>]
//!   composer summary [--source <source.json>] [--query <name> | --query-file <query.json>]
//!   composer write [--source <source.json>] [--query <name>] [--form <form>]
//!   composer search <term> [--top-values <values.json>] [--field <path>] [--limit <n>]
//!
//! Examples:
//!   composer list --source flights.json
//!   composer write --source flights.json --query by_carrier --form model
//!   composer search unit --top-values flights.top_values.json --field carrier

use clap::{Parser, Subcommand, ValueEnum};
use composer::config::Settings;
use composer::model::{kind_of_field, type_of_field, FieldDef, SourceDef, TurtleDef};
use composer::modifiers::QueryBuilder;
use composer::search::{SearchIndex, TopValues};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "composer")]
#[command(about = "Composer - summarize and write Malloy queries built against a source")]
#[command(version)]
struct Cli {
    /// Settings file (defaults to COMPOSER_CONFIG, ./composer.toml, then the user config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log edits and compile activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the fields and views of a source
    List {
        #[command(flatten)]
        input: SourceArgs,
    },

    /// Print the summary tree of a query as JSON
    Summary {
        #[command(flatten)]
        input: SourceArgs,

        #[command(flatten)]
        query: QueryArgs,
    },

    /// Write a query as Malloy text
    Write {
        #[command(flatten)]
        input: SourceArgs,

        #[command(flatten)]
        query: QueryArgs,

        /// Text form to produce
        #[arg(short, long, default_value = "notebook")]
        form: Form,

        /// View name for the source form
        #[arg(long)]
        view_name: Option<String>,

        /// Model file imported by the markdown form
        #[arg(long)]
        import: Option<String>,
    },

    /// Search the top values of string fields
    Search {
        /// Text to look for
        term: String,

        /// Top values JSON file (defaults to [model] top_values)
        #[arg(short, long)]
        top_values: Option<PathBuf>,

        /// Only search this field
        #[arg(long)]
        field: Option<String>,

        /// Maximum number of results (defaults to [search] max_results)
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

#[derive(clap::Args)]
struct SourceArgs {
    /// Source definition JSON file (defaults to [model] source)
    #[arg(short, long)]
    source: Option<PathBuf>,
}

#[derive(clap::Args)]
struct QueryArgs {
    /// Name of a view defined on the source
    #[arg(short, long, conflicts_with = "query_file")]
    query: Option<String>,

    /// Query pipeline JSON file
    #[arg(long)]
    query_file: Option<PathBuf>,
}

#[derive(Clone, ValueEnum)]
enum Form {
    /// `run: source -> { ... }`
    Notebook,
    /// `query: name is source -> { ... }`
    Model,
    /// `view: name is { ... }`
    Source,
    /// Notebook form in a fenced malloy block
    Markdown,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    };
    let settings = match settings {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading settings: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_logging(&settings, cli.verbose);

    let result = match cli.command {
        Commands::List { input } => cmd_list(&settings, input),
        Commands::Summary { input, query } => cmd_summary(&settings, input, query),
        Commands::Write {
            input,
            query,
            form,
            view_name,
            import,
        } => cmd_write(&settings, input, query, form, view_name, import),
        Commands::Search {
            term,
            top_values,
            field,
            limit,
        } => cmd_search(&settings, term, top_values, field, limit),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("Error: {}", message);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(settings: &Settings, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("composer=debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_list(settings: &Settings, input: SourceArgs) -> Result<(), String> {
    let source = load_source(settings, input)?;

    println!("Source: {}", source.name);
    println!();
    print_fields(&source, "");

    if source.turtles().next().is_none() {
        println!();
        println!("No views defined.");
    }
    Ok(())
}

fn print_fields(source: &SourceDef, prefix: &str) {
    for field in &source.fields {
        let path = format!("{}{}", prefix, field.name());
        println!(
            "  - {} ({}, {})",
            path,
            kind_of_field(field),
            type_of_field(field).as_str()
        );
        if let FieldDef::Struct(joined) = field {
            print_fields(joined, &format!("{}.", path));
        }
    }
}

fn cmd_summary(settings: &Settings, input: SourceArgs, query: QueryArgs) -> Result<(), String> {
    let builder = load_builder(settings, input, query)?;
    let summary = builder.summary();
    let json = serde_json::to_string_pretty(&summary)
        .map_err(|e| format!("failed to serialize summary: {}", e))?;
    println!("{}", json);
    Ok(())
}

fn cmd_write(
    settings: &Settings,
    input: SourceArgs,
    query: QueryArgs,
    form: Form,
    view_name: Option<String>,
    import: Option<String>,
) -> Result<(), String> {
    let builder = load_builder(settings, input, query)?;
    let writer = builder.writer().with_options(settings.writer.clone());

    let text = match form {
        Form::Notebook => writer.query_string_for_notebook(),
        Form::Model => writer.query_string_for_model(),
        Form::Source => {
            let name = view_name.unwrap_or_else(|| builder.query().name.clone());
            writer.query_string_for_source(&name)
        }
        Form::Markdown => writer.query_string_for_markdown(import.as_deref()),
    };
    println!("{}", text);
    Ok(())
}

fn cmd_search(
    settings: &Settings,
    term: String,
    top_values: Option<PathBuf>,
    field: Option<String>,
    limit: Option<usize>,
) -> Result<(), String> {
    let path = match top_values {
        Some(path) => path,
        None => settings
            .model
            .top_values_path()
            .map_err(|e| e.to_string())?
            .ok_or("no top values file given and none configured")?,
    };
    let values: Vec<TopValues> = read_json(&path)?;
    let index = SearchIndex::new(values);

    let limit = limit.unwrap_or(settings.search.max_results);
    let hits = index.search(&term, field.as_deref(), limit);
    if hits.is_empty() {
        println!("No matches for '{}'.", term);
    }
    for hit in hits {
        println!("{}\t{}\t{}", hit.field_path, hit.value, hit.weight);
    }
    Ok(())
}

fn load_source(settings: &Settings, input: SourceArgs) -> Result<SourceDef, String> {
    let path = match input.source {
        Some(path) => path,
        None => settings
            .model
            .source_path()
            .map_err(|e| e.to_string())?
            .ok_or("no source file given and none configured")?,
    };
    read_json(&path)
}

fn load_builder(
    settings: &Settings,
    input: SourceArgs,
    query: QueryArgs,
) -> Result<QueryBuilder, String> {
    let source = Arc::new(load_source(settings, input)?);
    let builder = QueryBuilder::new(source);

    match (query.query, query.query_file) {
        (Some(name), _) => builder.load_query(&name).map_err(|e| e.to_string()),
        (None, Some(path)) => {
            let turtle: TurtleDef = read_json(&path)?;
            debug!(query = %turtle.name, "loaded query file");
            Ok(builder.replace_query(turtle))
        }
        (None, None) => Ok(builder),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("reading file '{}': {}", path.display(), e))?;
    serde_json::from_str(&content).map_err(|e| format!("parsing '{}': {}", path.display(), e))
}
