//! co-reviewer: AI-powered code review assistant (library crate).
//!
//! Compares two revisions of a git workspace, sends the changes to an LLM
//! and returns a structured [`models::CodeReview`]. Re-exports public
//! modules for the binary, integration tests and external use.

pub mod agent;
pub mod config;
pub mod constants;
pub mod context;
pub mod diff;
pub mod env;
pub mod models;
pub mod orchestrator;
pub mod output;
pub mod providers;
pub mod server;
