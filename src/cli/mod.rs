// CLI - Command Line Interface for the KratOs bootstrap source
// Principle: Simple, clear, composable commands

pub mod config;
pub mod runner;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// KratOs Bootstrap - Announce a static list of bootnodes as discovered peers
#[derive(Parser, Debug)]
#[command(name = "kratos-bootstrap")]
#[command(author = "KratOs Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Static bootstrap list peer discovery for KratOs nodes")]
#[command(long_about = r#"
Re-announces every valid bootnode of a fixed list as a discovered peer,
once immediately and then on every interval, until stopped.

Run with a config file:
  kratos-bootstrap run --config bootstrap.toml

Run with explicit bootnodes:
  kratos-bootstrap run --bootnode /ip4/1.2.3.4/tcp/30333/p2p/... --interval 5000

Check a list without running:
  kratos-bootstrap check --config bootstrap.toml
"#)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true, default_value = "false")]
    pub verbose: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info", env = "KRATOS_LOG")]
    pub log_level: String,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the bootstrap source until Ctrl+C
    Run(RunCmd),

    /// Resolve every bootnode once and report the result
    Check(CheckCmd),
}

/// Bootnode list arguments shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// TOML file with `list` and `interval`
    #[arg(short, long, env = "KRATOS_BOOTSTRAP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Bootstrap nodes (can be specified multiple times)
    #[arg(long = "bootnode", value_name = "MULTIADDR")]
    pub bootnodes: Vec<String>,
}

/// Run the bootstrap source
#[derive(Parser, Debug)]
pub struct RunCmd {
    #[command(flatten)]
    pub list: ListArgs,

    /// Milliseconds between discovery passes (overrides the config file)
    #[arg(long, env = "KRATOS_BOOTSTRAP_INTERVAL")]
    pub interval: Option<u64>,
}

/// Check a bootnode list
#[derive(Parser, Debug)]
pub struct CheckCmd {
    #[command(flatten)]
    pub list: ListArgs,
}
