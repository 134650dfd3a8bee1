//! `todo` command-line client.
//!
//! # Responsibility
//! - Drive the optimistic-sync client from a terminal.
//! - Keep diagnostics on stderr so list output stays scriptable.

mod cli;

use anyhow::Context;
use clap::Parser;
use cli::Cli;
use log::debug;
use todo_core::{core_version, init_logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level(), None)
        .map_err(anyhow::Error::msg)
        .context("failed to initialize logging")?;
    debug!(
        "event=cli_start module=cli status=ok core_version={}",
        core_version()
    );
    cli.run().await
}
