//! DEX CLI Library
//!
//! Command-line front end for multisig governance, liquidity positions and
//! cross-chain exchange tracking.
//!
//! ## Architecture
//!
//! - **Pure helpers** (`commands/*`): argument parsing and view building, unit tested
//! - **Handlers** (`commands/*::run`): I/O against the chain and the exchange API
//! - **Error Handling** (`error`): structured CLI errors wrapping the library errors
//! - **Output Abstraction** (`output`): testable printing interface

pub mod argument_parsing;
pub mod cli_config;
pub mod commands;
pub mod error;
pub mod output;

pub use argument_parsing::{run_cli, DexCli, DexCommand};
pub use error::{CliError, CliResult};
pub use output::Output;

/// DEX CLI version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
