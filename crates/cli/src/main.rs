//! oas2smithy CLI
//!
//! Command-line interface for converting OpenAPI 3.0 documents into Smithy
//! models.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use oas2smithy_common::{trait_ids, Model, Shape, ShapeId, ShapeKind, Trait, Traitable};
use oas2smithy_converter::config::{NAMESPACE, SERVICE_NAME, UNIQUE_ITEMS_AS_LIST};
use oas2smithy_converter::{Converter, DocumentFormat, OpenApiParser, Settings};
use oas2smithy_generator::{generate, generate_to_file, OutputFormat};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "oas2smithy")]
#[command(version, about = "Convert OpenAPI 3.0 documents into Smithy models", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an OpenAPI document into a Smithy model
    #[command(after_help = "EXAMPLES:\n  \
        # Print the JSON AST of a YAML document\n  \
        oas2smithy convert --spec petstore.yaml\n\n  \
        # Write IDL into a custom namespace\n  \
        oas2smithy convert \\\n    \
        --spec petstore.json \\\n    \
        --format idl \\\n    \
        --namespace example.petstore \\\n    \
        --service PetStore \\\n    \
        --output ./model/petstore.smithy\n\n  \
        # Pass settings from a file and override one of them\n  \
        oas2smithy convert --spec api.yaml --settings settings.yaml --set schema.maxDepth=32")]
    Convert {
        /// Path to the OpenAPI document (JSON, or YAML with a .yaml/.yml extension)
        #[arg(short, long)]
        spec: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = FormatArg::Json)]
        format: FormatArg,

        /// Namespace of the generated shapes
        #[arg(long)]
        namespace: Option<String>,

        /// Name of the generated service shape
        #[arg(long)]
        service: Option<String>,

        /// Model uniqueItems arrays as lists instead of sets
        #[arg(long)]
        unique_items_as_list: bool,

        /// Settings file (flat JSON or YAML map)
        #[arg(long)]
        settings: Option<PathBuf>,

        /// Individual setting, as key=value (repeatable)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
    },

    /// Convert a document and summarise the resulting model
    Inspect {
        /// Path to the OpenAPI document
        #[arg(short, long)]
        spec: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    /// Smithy JSON AST
    Json,
    /// Smithy IDL
    Idl,
}

impl From<FormatArg> for OutputFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Idl => OutputFormat::Idl,
        }
    }
}

/// Options of the convert command
struct ConvertConfig<'a> {
    spec: &'a Path,
    output: Option<&'a Path>,
    format: OutputFormat,
    namespace: Option<&'a str>,
    service: Option<&'a str>,
    unique_items_as_list: bool,
    settings_file: Option<&'a Path>,
    overrides: &'a [String],
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Convert {
            spec,
            output,
            format,
            namespace,
            service,
            unique_items_as_list,
            settings,
            set,
        } => {
            convert_command(ConvertConfig {
                spec: spec.as_path(),
                output: output.as_deref(),
                format: format.into(),
                namespace: namespace.as_deref(),
                service: service.as_deref(),
                unique_items_as_list,
                settings_file: settings.as_deref(),
                overrides: &set,
            })?;
        }
        Commands::Inspect { spec } => {
            inspect_command(spec.as_path(), cli.verbose)?;
        }
    }

    Ok(())
}

/// Log to stderr; `RUST_LOG` wins over the verbosity flag
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn convert_command(config: ConvertConfig<'_>) -> Result<()> {
    eprintln!("{} Loading OpenAPI document: {}", "→".cyan(), config.spec.display());

    let parser = load_document(config.spec)?;
    let settings = collect_settings(&config)?;

    let model = Converter::new()
        .with_settings(settings)
        .convert(parser.document())
        .context("Failed to convert OpenAPI document")?;

    eprintln!(
        "{} Converted {} shape(s)",
        "✓".green(),
        model.len().to_string().yellow()
    );

    match config.output {
        Some(output) => {
            generate_to_file(&model, config.format, output)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            eprintln!(
                "{} Wrote {} model to {}",
                "✓".green().bold(),
                config.format,
                output.display().to_string().yellow()
            );
        }
        None => {
            let rendered = generate(&model, config.format).context("Failed to render model")?;
            println!("{}", rendered);
        }
    }

    Ok(())
}

fn inspect_command(spec: &Path, verbose: bool) -> Result<()> {
    eprintln!("{} Loading OpenAPI document: {}", "→".cyan(), spec.display());

    let parser = load_document(spec)?;
    let model = Converter::new()
        .convert(parser.document())
        .context("Failed to convert OpenAPI document")?;

    println!("\n{}", "✓ Conversion successful!".green().bold());

    let Some(service) = model.service() else {
        bail!("Converted model has no service shape");
    };
    println!("\n{}", "Service:".bold());
    println!("  Id: {}", service.id.to_string().yellow());
    if let Some(body) = service.as_service() {
        println!("  Version: {}", body.version.yellow());
    }

    println!("\n{}", "Shapes:".bold());
    for kind in [
        ShapeKind::Structure,
        ShapeKind::List,
        ShapeKind::Set,
        ShapeKind::Operation,
        ShapeKind::Resource,
    ] {
        let count = model.shapes_of_kind(kind).count();
        if count > 0 {
            println!("  {}: {}", kind.keyword(), count);
        }
    }
    let scalars = model.shapes().filter(|s| s.kind().is_simple()).count();
    if scalars > 0 {
        println!("  scalar: {}", scalars);
    }

    println!("\n{}", "Resources:".bold());
    if let Some(body) = service.as_service() {
        for id in &body.resources {
            print_resource(&model, id, 1);
        }
        for id in &body.operations {
            println!("  • {} (service)", id.name().cyan());
        }
    }

    if verbose {
        println!("\n{}", "Operations:".bold());
        for operation in model.shapes_of_kind(ShapeKind::Operation) {
            println!("  • {}", describe_operation(operation));
        }
    }

    Ok(())
}

fn print_resource(model: &Model, id: &ShapeId, depth: usize) {
    let indent = "  ".repeat(depth);
    let Some(resource) = model.get(id).and_then(|shape| shape.as_resource()) else {
        println!("{}• {} (missing)", indent, id.name().red());
        return;
    };

    let mut lifecycle = Vec::new();
    if resource.create.is_some() {
        lifecycle.push("C");
    }
    if resource.read.is_some() {
        lifecycle.push("R");
    }
    if resource.update.is_some() {
        lifecycle.push("U");
    }
    if resource.delete.is_some() {
        lifecycle.push("D");
    }

    let identifiers: Vec<&str> = resource.identifiers.keys().map(String::as_str).collect();
    println!(
        "{}• {} [{}] ({})",
        indent,
        id.name().cyan(),
        identifiers.join(", "),
        lifecycle.join("")
    );
    for operation in &resource.operations {
        println!("{}  - {}", indent, operation.name());
    }
    for child in &resource.resources {
        print_resource(model, child, depth + 1);
    }
}

fn describe_operation(operation: &Shape) -> String {
    match operation.traits.get(trait_ids::HTTP) {
        Some(Trait::Http { method, uri, .. }) => {
            format!("{} {} {}", operation.id.name().cyan(), method, uri)
        }
        _ => operation.id.name().cyan().to_string(),
    }
}

fn load_document(spec: &Path) -> Result<OpenApiParser> {
    OpenApiParser::from_file(spec)
        .with_context(|| format!("Failed to load OpenAPI document {}", spec.display()))
}

/// Settings file, then `--set` entries, then dedicated flags
fn collect_settings(config: &ConvertConfig<'_>) -> Result<Settings> {
    let mut settings = match config.settings_file {
        Some(path) => load_settings(path)?,
        None => Settings::new(),
    };

    for entry in config.overrides {
        let (key, value) = parse_setting(entry)?;
        settings.insert(key, value);
    }

    if let Some(namespace) = config.namespace {
        settings.insert(NAMESPACE.to_string(), Value::from(namespace));
    }
    if let Some(service) = config.service {
        settings.insert(SERVICE_NAME.to_string(), Value::from(service));
    }
    if config.unique_items_as_list {
        settings.insert(UNIQUE_ITEMS_AS_LIST.to_string(), Value::Bool(true));
    }

    debug!(?settings, "resolved settings");
    Ok(settings)
}

fn load_settings(path: &Path) -> Result<Settings> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file {}", path.display()))?;

    let settings = match DocumentFormat::from_path(path) {
        DocumentFormat::Yaml => serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse settings file {}", path.display()))?,
        DocumentFormat::Json => serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings file {}", path.display()))?,
    };

    Ok(settings)
}

/// `key=value`; the value is read as JSON when possible (`true`, `32`)
fn parse_setting(entry: &str) -> Result<(String, Value)> {
    let Some((key, raw)) = entry.split_once('=') else {
        bail!("Invalid setting '{}': expected KEY=VALUE", entry);
    };
    let key = key.trim();
    if key.is_empty() {
        bail!("Invalid setting '{}': key is empty", entry);
    }

    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}
