//! `cypher-debug`: checks a Cypher query against a Neo4j database or a
//! fixture graph before it is run.

use clap::{Args, Parser, ValueEnum};
use cypher_debugger::config::{ConfigError, DATABASE_VAR, PASSWORD_VAR, URI_VAR, USER_VAR};
use cypher_debugger::{
    ConnectionConfig, DebugReport, Debugger, InMemoryGraph, Neo4jOracle, Severity, SourceFile,
};
use miette::{IntoDiagnostic, WrapErr};
use std::env;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Exit code for setup failures, shared with aborted sessions.
const EXIT_ABORTED: u8 = 2;

/// Debug a Cypher query against the schema and data it will run on
#[derive(Parser, Debug)]
#[command(name = "cypher-debug")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Query text (read from --file or stdin when omitted)
    query: Option<String>,

    /// Read the query from a file
    #[arg(short, long, conflicts_with = "query")]
    file: Option<PathBuf>,

    /// Check against a JSON fixture graph instead of a live database
    #[arg(long)]
    fixture: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Exit with status 1 when there are warnings but no errors
    #[arg(long)]
    deny_warnings: bool,

    /// Do not print confirmations for names that exist
    #[arg(long)]
    no_confirmations: bool,

    /// Skip type and satisfiability checks on conditions
    #[arg(long)]
    skip_conditions: bool,

    /// Skip relationship direction and connectivity checks
    #[arg(long)]
    skip_connectivity: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(flatten)]
    connection: ConnectionArgs,
}

/// Neo4j connection settings; flags override the NEO4J_* environment
#[derive(Args, Debug)]
struct ConnectionArgs {
    /// Bolt URI of the server [env: NEO4J_URI, default: bolt://localhost:7687]
    #[arg(long)]
    uri: Option<String>,

    /// User name [env: NEO4J_USER, default: neo4j]
    #[arg(long)]
    user: Option<String>,

    /// Password [env: NEO4J_PASSWORD]
    #[arg(long)]
    password: Option<String>,

    /// Database name, server default when omitted [env: NEO4J_DATABASE]
    #[arg(long)]
    database: Option<String>,
}

impl ConnectionArgs {
    /// Layers the flags over the environment, so blank values on either
    /// side fall through to the defaults.
    fn to_config(&self) -> Result<ConnectionConfig, ConfigError> {
        ConnectionConfig::from_lookup(|key| {
            let flag = match key {
                URI_VAR => self.uri.as_deref(),
                USER_VAR => self.user.as_deref(),
                PASSWORD_VAR => self.password.as_deref(),
                DATABASE_VAR => self.database.as_deref(),
                _ => None,
            };
            flag.filter(|value| !value.trim().is_empty())
                .map(str::to_string)
                .or_else(|| env::var(key).ok())
        })
    }
}

/// Output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    /// Confirmations on stdout, rendered diagnostics on stderr
    Text,
    /// The whole report as JSON on stdout
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(code) => ExitCode::from(code),
        Err(report) => {
            eprintln!("{report:?}");
            ExitCode::from(EXIT_ABORTED)
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> miette::Result<u8> {
    let (query, source_name) = read_query(cli)?;
    let debugger = Debugger::new()
        .with_report_existing(!cli.no_confirmations)
        .with_condition_checks(!cli.skip_conditions)
        .with_connectivity_checks(!cli.skip_connectivity);

    let report = match &cli.fixture {
        Some(path) => {
            let mut graph = InMemoryGraph::from_json_file(path)
                .into_diagnostic()
                .wrap_err_with(|| format!("failed to load fixture {}", path.display()))?;
            debugger.debug(&query, &mut graph)
        }
        None => {
            let config = cli
                .connection
                .to_config()
                .into_diagnostic()
                .wrap_err("invalid connection settings")?;
            tracing::debug!(?config, "using Neo4j connection");
            debugger.debug_with(&query, || Neo4jOracle::connect(&config))
        }
    };

    match cli.format {
        OutputFormat::Text => print_text(&report, SourceFile::with_name(query, source_name)),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report).into_diagnostic()?;
            println!("{json}");
        }
    }
    Ok(report.exit_code(cli.deny_warnings))
}

fn read_query(cli: &Cli) -> miette::Result<(String, String)> {
    if let Some(query) = &cli.query {
        return Ok((query.clone(), "query".to_string()));
    }
    if let Some(path) = &cli.file {
        let query = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to read {}", path.display()))?;
        return Ok((query, path.display().to_string()));
    }
    let mut query = String::new();
    std::io::stdin()
        .read_to_string(&mut query)
        .into_diagnostic()
        .wrap_err("failed to read the query from stdin")?;
    Ok((query, "<stdin>".to_string()))
}

fn print_text(report: &DebugReport, source: SourceFile) {
    for finding in report.findings.iter().filter(|f| f.severity == Severity::Info) {
        println!("{finding}");
    }
    for rendered in report.reports(&source) {
        eprintln!("{rendered:?}");
    }
    eprintln!("{}", report.summary());
}
