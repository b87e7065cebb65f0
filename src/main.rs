//! co-reviewer: AI-powered code review assistant.
//!
//! Entry point and error handling boundary. Uses `anyhow` for
//! ergonomic error propagation and user-facing messages.

mod cli;

use co_reviewer::config;
use co_reviewer::constants;
use co_reviewer::diff;
use co_reviewer::env;
use co_reviewer::orchestrator;
use co_reviewer::output;
use co_reviewer::providers;
use co_reviewer::server;

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::args::{Cli, Command, OutputFormat, ReviewArgs, ServeArgs};
use config::Config;
use env::Env;
use orchestrator::CoReviewer;
use output::OutputRenderer;
use output::json::JsonRenderer;
use output::terminal::TerminalRenderer;

#[tokio::main]
async fn main() {
    // A `.env` file never overrides variables that are already set.
    dotenvy::dotenv().ok();

    if let Err(err) = run().await {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Review(args) => run_review(args).await,
        Command::Serve(args) => run_serve(args).await,
        Command::Version => run_version(),
    }
}

/// Install the stderr log subscriber. `RUST_LOG` wins unless `--verbose`.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run_version() -> Result<()> {
    use colored::Colorize;

    println!("Co-Reviewer version: {}", constants::VERSION.bold());
    Ok(())
}

async fn run_review(args: ReviewArgs) -> Result<()> {
    use colored::Colorize;

    let workspace = args.resolve_workspace().map_err(|e| anyhow!(e))?;
    let repo_root = diff::git::find_repo_root(&workspace)
        .await
        .ok()
        .map(PathBuf::from);

    let config = Config::load(repo_root.as_deref(), &Env::real())
        .context("failed to load configuration")?;

    let base_branch = args
        .base
        .clone()
        .unwrap_or_else(|| config.review.default_base_branch.clone());
    cli::print_header(&workspace, &base_branch, args.current.as_deref());

    let provider =
        providers::build_provider(&config.provider).context("failed to initialise LLM provider")?;
    let reviewer = CoReviewer::new(provider, config);

    let request = args.to_request(&workspace, &base_branch);
    let review = reviewer.review(&request).await.context("review failed")?;

    let rendered = match args.format {
        OutputFormat::Terminal => TerminalRenderer.render(&review),
        OutputFormat::Json => JsonRenderer.render(&review),
    };
    println!("{rendered}");

    if let Some(path) = &args.output {
        let json = JsonRenderer
            .to_json(&review)
            .context("failed to serialize review")?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
        eprintln!("\n{} Results saved to: {}", "✓".green(), path.display());
    }

    Ok(())
}

async fn run_serve(args: ServeArgs) -> Result<()> {
    let addr = args.socket_addr().map_err(|e| anyhow!(e))?;

    let cwd = std::env::current_dir().context("cannot determine current directory")?;
    let repo_root = diff::git::find_repo_root(&cwd).await.ok().map(PathBuf::from);
    let config = Config::load(repo_root.as_deref(), &Env::real())
        .context("failed to load configuration")?;

    let provider =
        providers::build_provider(&config.provider).context("failed to initialise LLM provider")?;
    let state = Arc::new(CoReviewer::new(provider, config));

    server::run_with_shutdown(state, addr, shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
