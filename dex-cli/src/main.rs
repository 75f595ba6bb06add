//! DEX command-line interface
//!
//! Entry point for the dex-cli binary. Parses arguments and delegates to the
//! command handlers.

use dex_cli::run_cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    run_cli().await
}
