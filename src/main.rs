#![allow(clippy::uninlined_format_args)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use webharness::config::Config;
use webharness::errors::HarnessError;
use webharness::runner;
use webharness::session_manager::SessionManager;

#[derive(Parser)]
#[command(name = "webharness")]
#[command(about = "Browser end-to-end test harness", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the login feature against a configuration file
    Run {
        /// Path to the TOML configuration file
        #[arg(short, long, default_value = "config.toml")]
        config: PathBuf,

        /// Run with a visible browser window, overriding the config file
        #[arg(long)]
        headed: bool,

        /// Only run scenarios whose name contains this substring
        #[arg(long)]
        filter: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    match run().await {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            let err = HarnessError::from(e);
            eprintln!("Error: {}", err);
            std::process::exit(err.exit_code());
        }
    }
}

async fn run() -> Result<i32> {
    // Logs to stderr so the JSON summary on stdout stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "webharness=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            headed,
            filter,
        } => {
            let mut config = Config::from_path(&config)?;
            if headed {
                config.set_headless(false);
            }
            let manager = Arc::new(SessionManager::new(config));

            let mut scenarios = runner::login_feature();
            if let Some(filter) = filter {
                scenarios.retain(|s| s.name.contains(&filter));
            }

            let reports = runner::run_all(manager, scenarios).await;
            let failed = reports.iter().filter(|r| r.failed).count();

            let summary = serde_json::json!({
                "total": reports.len(),
                "failed": failed,
                "scenarios": reports,
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);

            Ok(if failed == 0 { 0 } else { 1 })
        }
    }
}
