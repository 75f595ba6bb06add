//! DEX CLI argument parsing and dispatch

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cli_config::{self, NetworkProfile, Overrides};
use crate::commands;
use crate::output::{ConsoleOutput, OutputFormat};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(name = "dex-cli")]
pub struct DexCli {
    /// Configuration file path (default ~/.dex/cli.toml)
    #[arg(short, long, env = "DEX_CONFIG")]
    pub config: Option<String>,

    /// Named network profile from the config file
    #[arg(long, env = "DEX_PROFILE")]
    pub profile: Option<String>,

    /// JSON-RPC endpoint
    #[arg(long, env = "DEX_RPC_URL")]
    pub rpc_url: Option<String>,

    #[arg(long, env = "DEX_CHAIN_ID")]
    pub chain_id: Option<u64>,

    /// Account that signs through the node
    #[arg(long, env = "DEX_ACCOUNT")]
    pub account: Option<String>,

    /// Fixed gas limit; skips estimation
    #[arg(long, env = "DEX_GAS_LIMIT")]
    pub gas_limit: Option<u64>,

    /// SimpleSwap API key
    #[arg(long, env = "DEX_SIMPLESWAP_API_KEY")]
    pub api_key: Option<String>,

    /// Enable debug logging
    #[arg(short, long, env = "DEX_VERBOSE")]
    pub verbose: bool,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table, env = "DEX_FORMAT")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: DexCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum DexCommand {
    /// Multisig governance
    Multisig(MultisigArgs),

    /// Liquidity positions
    Position(PositionArgs),

    /// Cross-chain exchange tracking
    Exchange(ExchangeArgs),
}

#[derive(Args, Debug, Clone)]
pub struct MultisigArgs {
    #[command(subcommand)]
    pub action: MultisigCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum MultisigCommand {
    /// Owners, threshold, delay and transaction count
    Info,
    /// All transactions, newest first
    List,
    /// One transaction
    Show { id: u64 },
    /// Propose an arbitrary call
    Propose {
        #[arg(long)]
        to: String,
        /// Value in wei
        #[arg(long, default_value = "0")]
        value: String,
        /// Hex calldata
        #[arg(long, default_value = "0x")]
        data: String,
    },
    Approve { id: u64 },
    Decline { id: u64 },
    Execute { id: u64 },
    AddOwner { owner: String },
    RemoveOwner { owner: String },
    SetThreshold { threshold: u64 },
    /// Execution delay in seconds
    SetDelay { delay: u64 },
    /// Auto-execute proposals while the threshold is 1
    Watch {
        #[arg(long)]
        from_block: Option<u64>,
        #[arg(long, default_value_t = 4)]
        interval_secs: u64,
    },
}

#[derive(Args, Debug, Clone)]
pub struct PositionArgs {
    #[command(subcommand)]
    pub action: PositionCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum PositionCommand {
    /// Range, amounts and owed fees
    Show { token_id: String },
    /// Collect owed fees
    Collect {
        token_id: String,
        #[arg(long, default_value = "erc20")]
        standard0: String,
        #[arg(long, default_value = "erc20")]
        standard1: String,
    },
    /// Remove a share of the liquidity
    Remove {
        token_id: String,
        #[arg(long)]
        percent: u8,
        #[arg(long, default_value_t = 50)]
        slippage_bps: u16,
        #[arg(long, default_value_t = 20)]
        deadline_mins: u64,
        #[arg(long, default_value = "erc20")]
        standard0: String,
        #[arg(long, default_value = "erc20")]
        standard1: String,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ExchangeArgs {
    /// App base URL serving /api/simpleswap
    #[arg(long, env = "DEX_APP_URL")]
    pub app_url: Option<String>,

    #[command(subcommand)]
    pub action: ExchangeCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ExchangeCommand {
    Show { id: String },
    /// Poll until the exchange settles
    Watch { id: String },
    Currencies,
}

impl DexCli {
    pub fn overrides(&self) -> Result<Overrides> {
        let account = match &self.account {
            Some(raw) => Some(commands::parse_address(raw)?),
            None => None,
        };
        let app_url = match &self.command {
            DexCommand::Exchange(args) => args.app_url.clone(),
            _ => None,
        };
        Ok(Overrides {
            profile: NetworkProfile {
                rpc_url: self.rpc_url.clone(),
                chain_id: self.chain_id,
                account,
                gas_limit: self.gas_limit,
                ..Default::default()
            },
            api_key: self.api_key.clone(),
            app_url,
        })
    }
}

pub fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

pub async fn run_cli() -> Result<()> {
    let cli = DexCli::parse();
    init_tracing(cli.verbose);

    let config = cli_config::load_config(cli.config.as_deref())?;
    let settings = cli_config::resolve_settings(&config, cli.profile.as_deref(), &cli.overrides()?)?;
    let output = ConsoleOutput;

    let result = match &cli.command {
        DexCommand::Multisig(args) => {
            commands::multisig::handle_multisig_command(args, &settings, cli.format, &output).await
        }
        DexCommand::Position(args) => {
            commands::position::handle_position_command(args, &settings, cli.format, &output).await
        }
        DexCommand::Exchange(args) => {
            commands::exchange::handle_exchange_command(args, &settings, cli.format, &output).await
        }
    };

    result.map_err(|e| anyhow::anyhow!(e))
}
