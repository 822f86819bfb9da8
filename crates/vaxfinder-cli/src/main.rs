mod sinks;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use vaxfinder_checker::{
    build_checker, planned_providers, start_targets, Checker, LocationsSink, Sinks, TracingLogSink,
};
use vaxfinder_core::{AppConfig, SearchConfig};

use crate::sinks::{ConsoleNotifier, LoggedLocations};

#[derive(Debug, Parser)]
#[command(name = "vaxfinder")]
#[command(about = "Polls pharmacy and clinic sites for open vaccine appointments")]
struct Cli {
    /// Search file to use instead of `VAXFINDER_SEARCH_PATH`.
    #[arg(long, global = true)]
    search: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Poll every configured provider until interrupted (the default).
    Run,
    /// Run a single check against each configured provider and exit.
    Once,
    /// Print the providers the search would start.
    Plan,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();
    let config = vaxfinder_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let search_path = cli.search.unwrap_or_else(|| config.search_path.clone());
    let search = vaxfinder_core::load_search_config(&search_path)
        .with_context(|| format!("loading search from {}", search_path.display()))?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run(&config, &search).await,
        Commands::Once => once(&config, &search).await,
        Commands::Plan => {
            for provider in planned_providers(&search) {
                println!("{provider:?}");
            }
            Ok(())
        }
    }
}

async fn run(config: &AppConfig, search: &SearchConfig) -> anyhow::Result<()> {
    let sinks = Sinks::new(Arc::new(TracingLogSink), Arc::new(ConsoleNotifier));
    let locations: Arc<dyn LocationsSink> = Arc::new(LoggedLocations);

    let mut targets = start_targets(config, search, &sinks, Some(locations))?;
    if targets.is_empty() {
        tracing::warn!("no providers enabled for this search; nothing to do");
        return Ok(());
    }
    tracing::info!(targets = ?targets.names().collect::<Vec<_>>(), "search started");

    shutdown_signal().await;
    targets.shutdown_all().await;
    tracing::info!("all targets stopped");
    Ok(())
}

async fn once(config: &AppConfig, search: &SearchConfig) -> anyhow::Result<()> {
    let locations: Arc<dyn LocationsSink> = Arc::new(LoggedLocations);

    for provider in planned_providers(search) {
        let (mut checker, _) = build_checker(provider, config, search, Some(&locations))?;
        match checker.check_availability().await {
            Ok(result) if result.available => {
                println!("{}: available\n{}\n{}", checker.name(), checker.url(), result.message);
            }
            Ok(_) => println!("{}: none", checker.name()),
            Err(e) => println!("{}: check failed: {e}", checker.name()),
        }
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, stopping targets");
}

#[cfg(test)]
mod tests;
