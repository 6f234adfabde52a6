use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use opsguard_cli::{build_authorizer, check, load_grants};
use opsguard_config::AppConfig;
use opsguard_observability::MetricsRegistry;

/// Authorize infrastructure operations against a grant table.
#[derive(Parser)]
#[command(name = "opsguard")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, env = "OPSGUARD_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (overrides configuration)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether an operation document may proceed
    Check {
        /// JSON operation document
        #[arg(long, value_name = "FILE")]
        operation: PathBuf,

        /// JSON grant table (overrides `authorization.grants_file`)
        #[arg(long, value_name = "FILE")]
        grants: Option<PathBuf>,

        /// Caller principal; anonymous when omitted
        #[arg(long)]
        principal: Option<String>,

        /// Print the decision as JSON
        #[arg(long)]
        json: bool,

        /// Print Prometheus counters after evaluation
        #[arg(long)]
        metrics: bool,
    },
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;

    let level = cli.log_level.as_deref().unwrap_or(&config.telemetry.log_level);
    opsguard_observability::init_with(level, config.telemetry.log_format);

    match cli.command {
        Commands::Check {
            operation,
            grants,
            principal,
            json,
            metrics,
        } => {
            let prometheus = if metrics {
                Some(opsguard_observability::install_prometheus_recorder()?)
            } else {
                None
            };

            let grants = match grants.or_else(|| config.authorization.grants_file.clone()) {
                Some(path) => Some(load_grants(&path)?),
                None => None,
            };
            let authorizer = build_authorizer(&config, grants, Arc::new(MetricsRegistry));

            let document = std::fs::read_to_string(&operation)
                .with_context(|| format!("reading operation document {}", operation.display()))?;
            let outcome = check(&authorizer, &config, &document, principal.as_deref())?;

            for rejection in &outcome.rejections {
                println!("{}: {}", rejection.code, rejection.message);
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome.decision)?);
            }
            if let Some(handle) = prometheus {
                print!("{}", handle.render());
            }

            tracing::info!(allowed = outcome.is_allowed(), "operation checked");

            Ok(if outcome.is_allowed() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}
