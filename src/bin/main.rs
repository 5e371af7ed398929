//! Quarry CLI - Compile entity queries to SQL
//!
//! Usage:
//!   quarry compile <entity> --metadata <entities.json> [--params <params.json>] [--dialect <dialect>]
//!   quarry entities --metadata <entities.json>
//!
//! Examples:
//!   quarry compile Lead --metadata crm.json --params open_leads.json
//!   quarry compile Contact --metadata crm.toml --dialect postgres --strict
//!   quarry entities --metadata crm.json

use clap::{Parser, Subcommand, ValueEnum};
use quarry::config::Settings;
use quarry::metadata::{EntityRegistry, MetadataProvider};
use quarry::{Dialect, QueryCompiler, SelectParams};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "quarry")]
#[command(about = "Quarry - Compiles declarative entity queries into dialect-specific SQL")]
#[command(version)]
struct Cli {
    /// Config file (defaults to $QUARRY_CONFIG, ./quarry.toml, then the user config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a select for one entity type
    Compile {
        /// Entity type, e.g. `Lead`
        entity: String,

        /// Entity definitions (.json or .toml); overrides the config file
        #[arg(short, long)]
        metadata: Option<PathBuf>,

        /// Select parameters as JSON (stdin when `-`, empty when omitted)
        #[arg(short, long)]
        params: Option<PathBuf>,

        /// SQL dialect to generate; overrides the config file
        #[arg(short, long)]
        dialect: Option<DialectArg>,

        /// Keep soft-deleted rows
        #[arg(long)]
        include_deleted: bool,

        /// Fail instead of dropping unknown fields and relations
        #[arg(long)]
        strict: bool,
    },

    /// List entity types in a metadata file
    Entities {
        /// Entity definitions (.json or .toml); overrides the config file
        #[arg(short, long)]
        metadata: Option<PathBuf>,
    },
}

#[derive(Clone, ValueEnum)]
enum DialectArg {
    Mysql,
    Postgres,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Mysql => Dialect::MySql,
            DialectArg::Postgres => Dialect::Postgres,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_env("QUARRY_LOG").unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    };
    let settings = match settings {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Compile {
            entity,
            metadata,
            params,
            dialect,
            include_deleted,
            strict,
        } => cmd_compile(&settings, entity, metadata, params, dialect, include_deleted, strict),
        Commands::Entities { metadata } => cmd_entities(&settings, metadata),
    }
}

fn load_registry(settings: &Settings, metadata: Option<PathBuf>) -> Result<EntityRegistry, String> {
    let path = match metadata {
        Some(path) => path,
        None => settings
            .metadata_path()
            .map_err(|e| e.to_string())?
            .ok_or("no metadata file given (use --metadata or [metadata] path)")?,
    };
    EntityRegistry::from_file(&path).map_err(|e| format!("'{}': {}", path.display(), e))
}

fn read_params(params: Option<PathBuf>) -> Result<SelectParams, String> {
    let source = match params {
        None => return Ok(SelectParams::default()),
        Some(path) if path.as_os_str() == "-" => {
            std::io::read_to_string(std::io::stdin()).map_err(|e| format!("stdin: {}", e))?
        }
        Some(path) => fs::read_to_string(&path).map_err(|e| format!("'{}': {}", path.display(), e))?,
    };
    serde_json::from_str(&source).map_err(|e| format!("invalid select parameters: {}", e))
}

fn cmd_compile(
    settings: &Settings,
    entity: String,
    metadata: Option<PathBuf>,
    params: Option<PathBuf>,
    dialect: Option<DialectArg>,
    include_deleted: bool,
    strict: bool,
) -> ExitCode {
    let mut options = match settings.compile_options() {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(dialect) = dialect {
        options = options.with_dialect(dialect.into());
    }
    if strict {
        options = options.with_strict(true);
    }

    let registry = match load_registry(settings, metadata) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error loading metadata {}", e);
            return ExitCode::FAILURE;
        }
    };

    let params = match read_params(params) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error reading parameters {}", e);
            return ExitCode::FAILURE;
        }
    };

    let compiler = QueryCompiler::new(Arc::new(registry), options);
    match compiler.build_select(&entity, &params, include_deleted) {
        Ok(compiled) => {
            for diagnostic in &compiled.diagnostics {
                eprintln!("warning: {}", diagnostic);
            }
            println!("{}", compiled.sql);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Compilation error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_entities(settings: &Settings, metadata: Option<PathBuf>) -> ExitCode {
    let registry = match load_registry(settings, metadata) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error loading metadata {}", e);
            return ExitCode::FAILURE;
        }
    };

    for name in registry.entity_types() {
        let Some(entity) = registry.entity(&name) else {
            continue;
        };
        println!(
            "{} ({} fields, {} relations)",
            name,
            entity.fields.len(),
            entity.relations.len()
        );
    }
    ExitCode::SUCCESS
}
