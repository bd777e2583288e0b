//! Command-line host for the ERP assistant tools.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use erp_assistant::config::{AppConfig, LogFormat};
use erp_assistant::runtime::Runtime;
use erp_assistant::tools::ToolCallRequest;
use erp_assistant::tools::catalog::MissPolicy;
use serde_json::Value;
use tokio::io::BufReader;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "erp-assistant", version, about = "Expose ERP business queries as callable tools")]
struct Cli {
    /// JSON configuration file.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log line format (`text` or `json`).
    #[arg(long, global = true, value_name = "FORMAT")]
    log_format: Option<LogFormat>,

    /// Behaviour on lookup misses (`surface` or `zero-default`).
    #[arg(long, global = true, value_name = "POLICY")]
    miss_policy: Option<MissPolicy>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the agent manifest with every tool declaration.
    Tools,
    /// Invoke one tool and print the response.
    Call {
        /// Tool name, e.g. `get_stock_balance`.
        name: String,
        /// Arguments as a JSON object.
        #[arg(long, default_value = "{}")]
        args: String,
    },
    /// Answer line-delimited JSON requests from stdin until EOF.
    Serve,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(format) = cli.log_format {
        config.log.format = format;
    }
    if let Some(policy) = cli.miss_policy {
        config.miss_policy = policy;
    }

    erp_assistant::telemetry::init(&config.log).context("failed to initialise logging")?;

    let runtime = Runtime::from_config(&config).context("failed to assemble tool runtime")?;

    match cli.command {
        Command::Tools => {
            let manifest = serde_json::to_string_pretty(&runtime.manifest())?;
            println!("{manifest}");
            Ok(ExitCode::SUCCESS)
        }
        Command::Call { name, args } => {
            let arguments: Value =
                serde_json::from_str(&args).context("--args must be a JSON document")?;
            let response = runtime.handle(ToolCallRequest::new(name, arguments));
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(if response.is_ok() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Serve => {
            info!("serving tool calls on stdin");
            let summary = runtime
                .serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
                .await
                .context("tool session failed")?;
            info!(stats = ?runtime.stats(), requests = summary.requests, "session finished");
            Ok(ExitCode::SUCCESS)
        }
    }
}
