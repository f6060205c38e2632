//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use super::commands::analyze::AnalyzeArgs;
use super::commands::classify::ClassifyArgs;
use super::commands::deadlocks::DeadlocksArgs;

#[derive(Parser, Debug)]
#[command(name = "flaketrace")]
#[command(about = "Flaky-test diagnostics for build logs and thread dumps", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Load configuration from this file instead of .flaketrace/
    #[arg(short, long, global = true, env = "FLAKETRACE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Diagnose a directory of test-run logs
    Analyze(AnalyzeArgs),

    /// Detect deadlocks in a thread-dump JSON file
    Deadlocks(DeadlocksArgs),

    /// Show the root-cause category for a test name and messages
    Classify(ClassifyArgs),
}
