use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use logcube_engine::{Criteria, Schema, generate_cube};

mod config;
mod output;

use config::{AppConfig, OutputFormat};

/// Logcube - turn line-oriented logs into a queryable cube
#[derive(Parser, Debug)]
#[command(name = "logcube")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log files to ingest, processed in order
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,

    /// Configuration file (defaults to ./logcube.toml when present)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Schema definition file (json or toml)
    #[arg(short, long, value_name = "PATH")]
    schema: Option<PathBuf>,

    /// Fields to group by, in key order
    #[arg(short, long, value_name = "FIELD", value_delimiter = ',')]
    group_by: Vec<String>,

    /// Keep records whose field equals a value (FIELD=VALUE)
    #[arg(short, long, value_name = "FIELD=VALUE", value_parser = parse_pair)]
    filter: Vec<(String, String)>,

    /// Keep records whose field matches a regex (FIELD=PATTERN)
    #[arg(long, value_name = "FIELD=PATTERN", value_parser = parse_pair)]
    search: Vec<(String, String)>,

    /// Output format
    #[arg(short, long, value_enum)]
    output: Option<OutputFormat>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_pair(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .filter(|(field, _)| !field.is_empty())
        .map(|(field, value)| (field.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{s}'"))
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = AppConfig::load(args.config.as_deref())?;

    let level = match args.verbose {
        0 => config.log_level.clone(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    };

    // Diagnostics go to stderr so stdout stays clean for results
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(
                    level
                        .parse::<tracing_subscriber::filter::Directive>()
                        .context("Invalid log level")?,
                ),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = run(args, config);

    if let Err(e) = &result {
        eprintln!("Error: {:#}", e);
    }

    result
}

fn run(args: Args, config: AppConfig) -> Result<()> {
    let schema_path = args
        .schema
        .or(config.schema)
        .context("No schema definition given. Use --schema or set `schema` in the config file")?;

    let schema = Schema::load(&schema_path)
        .with_context(|| format!("Failed to load schema {}", schema_path.display()))?;
    info!(schema = schema.name(), fields = schema.fields().len(), "schema loaded");

    let mut cube = generate_cube(&args.files, Arc::new(schema))?;

    let mut criteria: Criteria = args.filter.into_iter().collect();
    for (field, pattern) in &args.search {
        criteria = criteria
            .with_pattern(field.as_str(), pattern)
            .with_context(|| format!("Invalid pattern for {field}"))?;
    }
    if !criteria.is_empty() {
        cube = cube.filter_by(&criteria);
    }

    if !args.group_by.is_empty() {
        cube = cube.group_by(&args.group_by)?;
    }

    let rendered = match args.output.unwrap_or(config.output) {
        OutputFormat::Table => output::render_table(&cube),
        OutputFormat::Json => output::render_json(&cube)?,
    };
    println!("{}", rendered.trim_end());

    Ok(())
}
