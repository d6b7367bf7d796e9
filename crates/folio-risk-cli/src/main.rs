//! folio-risk: analyze insurance folios from the command line or over HTTP.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use folio_risk_runtime::{AnalyzerConfig, Pipeline};

mod server;

#[derive(Parser, Debug)]
#[command(name = "folio-risk", author, version, about = "Risk analysis for insurance folios", long_about = None)]
struct Cli {
    /// YAML configuration file; environment variables are used when omitted
    #[arg(long, global = true, env = "FOLIO_RISK_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze one folio and print its report
    Analyze {
        /// Folio identifier
        #[arg(long)]
        id: String,

        /// Print the full result as JSON instead of the report
        #[arg(long)]
        json: bool,
    },
    /// Serve the HTTP API
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "0.0.0.0:8000")]
        bind: SocketAddr,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let config = load_config(cli.config.as_deref())?;
    let pipeline = Pipeline::from_config(&config).context("Failed to set up analysis pipeline")?;

    match cli.command {
        Commands::Analyze { id, json } => analyze(&pipeline, &id, json).await,
        Commands::Serve { bind } => serve(pipeline, bind).await,
    }
}

/// Logs go to stderr so stdout carries only the report.
fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<AnalyzerConfig> {
    match path {
        Some(path) => AnalyzerConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => AnalyzerConfig::from_env().context("Failed to load config from environment"),
    }
}

async fn analyze(pipeline: &Pipeline, id: &str, json: bool) -> Result<()> {
    let result = pipeline
        .run(id)
        .await
        .with_context(|| format!("Analysis failed for folio '{}'", id))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", result.report);
    }
    Ok(())
}

async fn serve(pipeline: Pipeline, bind: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    info!(address = %bind, "risk analyzer listening");

    axum::serve(listener, server::router(Arc::new(pipeline)))
        .await
        .context("HTTP server failed")
}
