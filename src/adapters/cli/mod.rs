//! CLI Adapter
//!
//! Command-line interface for solana-ops.
//! Uses clap derive macros for argument parsing.

mod batch_file;
mod commands;

pub use batch_file::JsonItemSource;
pub use commands::{
    build_dispatcher, BalanceCmd, BatchCmd, CliApp, Command, HealthCmd, QuoteCmd, SendCmd,
};

use anyhow::Result;

/// Initialize the CLI application
pub fn init() -> CliApp {
    use clap::Parser;
    CliApp::parse()
}

/// Execute the CLI command
pub async fn execute(app: CliApp) -> Result<()> {
    commands::execute(app).await
}
