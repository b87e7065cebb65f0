//! Clap argument types and validation.

use clap::{Parser, ValueEnum};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use co_reviewer::models::ReviewRequest;

/// Co-Reviewer: AI-powered code review assistant.
#[derive(Parser, Debug)]
#[command(name = "co-reviewer", version = co_reviewer::constants::VERSION)]
pub struct Cli {
    /// Verbose (debug-level) logging.
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Review code changes in a git workspace.
    Review(ReviewArgs),

    /// Serve the review API over HTTP.
    Serve(ServeArgs),

    /// Show version information.
    Version,
}

/// Output format for the review report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Colored report for humans.
    Terminal,
    /// The review result as JSON.
    Json,
}

/// Arguments for the `review` subcommand.
#[derive(Parser, Debug)]
pub struct ReviewArgs {
    /// Path to git workspace (default: current directory).
    pub workspace: Option<PathBuf>,

    /// Base branch to compare against (default: configured, usually `main`).
    #[arg(short = 'b', long = "base")]
    pub base: Option<String>,

    /// Current branch (defaults to HEAD).
    #[arg(short = 'c', long = "current")]
    pub current: Option<String>,

    /// Custom review instructions.
    #[arg(short = 'i', long = "instructions")]
    pub instructions: Option<String>,

    /// Focus areas (can be specified multiple times).
    #[arg(short = 'f', long = "focus")]
    pub focus: Vec<String>,

    /// Output file for JSON results.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Report format on stdout.
    #[arg(long, value_enum, default_value_t = OutputFormat::Terminal)]
    pub format: OutputFormat,
}

impl ReviewArgs {
    /// Resolve the workspace to an absolute, existing directory.
    pub fn resolve_workspace(&self) -> Result<PathBuf, String> {
        let path = match &self.workspace {
            Some(p) => p.clone(),
            None => std::env::current_dir()
                .map_err(|e| format!("cannot determine current directory: {e}"))?,
        };
        let resolved = std::fs::canonicalize(&path)
            .map_err(|_| format!("workspace not found: {}", path.display()))?;
        if !resolved.is_dir() {
            return Err(format!("workspace is not a directory: {}", path.display()));
        }
        Ok(resolved)
    }

    /// Build the review request for a resolved workspace.
    pub fn to_request(&self, workspace: &std::path::Path, base_branch: &str) -> ReviewRequest {
        ReviewRequest {
            workspace_path: workspace.display().to_string(),
            base_branch: Some(base_branch.to_string()),
            current_branch: self.current.clone(),
            custom_instructions: self.instructions.clone(),
            focus_areas: self.focus.clone(),
        }
    }
}

/// Arguments for the `serve` subcommand.
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind.
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 8000)]
    pub port: u16,
}

impl ServeArgs {
    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|_| format!("invalid --host address: {}", self.host))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}
