//! Multisig commands

use std::sync::Arc;
use std::time::Duration;

use lib_client::TxStatusStore;
use lib_governance::{
    AutoExecutor, ManagerConfig, MultisigAction, MultisigConfig, MultisigManager, TokenRegistry,
    TransactionDisplayData, UnknownTokenCache,
};
use lib_types::U256;

use crate::argument_parsing::{MultisigArgs, MultisigCommand};
use crate::cli_config::Settings;
use crate::commands::{parse_address, parse_bytes, parse_u256, Context};
use crate::error::CliResult;
use crate::output::{to_json, Output, OutputFormat};

/// Write action for a command; `None` for read-only commands
pub fn command_to_action(command: &MultisigCommand) -> CliResult<Option<MultisigAction>> {
    let action = match command {
        MultisigCommand::Propose { to, value, data } => MultisigAction::Propose {
            to: parse_address(to)?,
            value: parse_u256(value)?,
            data: parse_bytes(data)?,
        },
        MultisigCommand::Approve { id } => MultisigAction::Approve { id: *id },
        MultisigCommand::Decline { id } => MultisigAction::Decline { id: *id },
        MultisigCommand::Execute { id } => MultisigAction::Execute { id: *id },
        MultisigCommand::AddOwner { owner } => MultisigAction::AddOwner {
            owner: parse_address(owner)?,
        },
        MultisigCommand::RemoveOwner { owner } => MultisigAction::RemoveOwner {
            owner: parse_address(owner)?,
        },
        MultisigCommand::SetThreshold { threshold } => MultisigAction::ChangeThreshold {
            threshold: *threshold,
        },
        MultisigCommand::SetDelay { delay } => MultisigAction::ChangeDelay { delay: *delay },
        MultisigCommand::Info
        | MultisigCommand::List
        | MultisigCommand::Show { .. }
        | MultisigCommand::Watch { .. } => return Ok(None),
    };
    Ok(Some(action))
}

pub fn config_rows(config: &MultisigConfig) -> Vec<(&'static str, String)> {
    vec![
        ("owners", config.num_owners.to_string()),
        ("threshold", config.vote_pass_threshold.to_string()),
        ("delay", format!("{}s", config.execution_delay)),
        ("transactions", config.num_txs.to_string()),
    ]
}

pub fn display_rows(view: &TransactionDisplayData) -> Vec<(&'static str, String)> {
    let mut flags = Vec::new();
    if view.can_vote {
        flags.push("can vote");
    }
    if view.can_execute {
        flags.push("can execute");
    }
    vec![
        ("id", format!("#{}", view.id)),
        ("status", view.status.to_string()),
        ("amount", format!("{} {}", view.amount, view.symbol)),
        ("recipient", view.recipient.to_string()),
        (
            "approvals",
            format!("{}/{} ({} votes)", view.num_approvals, view.required_approvals, view.num_votes),
        ),
        ("deadline", view.deadline.to_string()),
        ("actions", if flags.is_empty() { "-".to_string() } else { flags.join(", ") }),
    ]
}

/// One-line summary for list output
pub fn summary_line(view: &TransactionDisplayData) -> String {
    format!(
        "#{:<4} {:<9} {} {} -> {}",
        view.id, view.status, view.amount, view.symbol, view.recipient
    )
}

fn manager(settings: &Settings, ctx: &Context) -> CliResult<MultisigManager> {
    let mut config = ManagerConfig::new(settings.multisig()?);
    config.native_symbol = settings.native_symbol.clone();
    Ok(MultisigManager::new(
        config,
        ctx.submitter.clone(),
        Arc::new(TxStatusStore::new()),
        ctx.gas.clone(),
        Arc::new(TokenRegistry::new(settings.tokens.clone())),
        Arc::new(UnknownTokenCache::new()),
    ))
}

pub async fn handle_multisig_command(
    args: &MultisigArgs,
    settings: &Settings,
    format: OutputFormat,
    output: &dyn Output,
) -> CliResult<()> {
    let ctx = Context::new(settings);
    run(&args.action, settings, &ctx, format, output).await
}

pub async fn run(
    command: &MultisigCommand,
    settings: &Settings,
    ctx: &Context,
    format: OutputFormat,
    output: &dyn Output,
) -> CliResult<()> {
    let manager = manager(settings, ctx)?;

    if let Some(action) = command_to_action(command)? {
        let gas = manager.estimate_action_gas(&action, &ctx.wallet).await;
        output.info(&format!("{} (gas limit ~{})", action, gas))?;
        let hash = manager.handle_action(&action, &ctx.wallet).await?;
        output.success(&format!("{} confirmed: {}", action, hash))?;
        return Ok(());
    }

    match command {
        MultisigCommand::Info => {
            let config = manager.fetch_config().await?;
            match format {
                OutputFormat::Json => output.print(&to_json(&config)?)?,
                OutputFormat::Table => {
                    output.header(&format!("Multisig {}", manager.config().multisig))?;
                    output.rows(&config_rows(&config))?;
                }
            }
        }
        MultisigCommand::List => {
            let views = manager.load_all_display(&ctx.wallet).await?;
            match format {
                OutputFormat::Json => output.print(&to_json(&views)?)?,
                OutputFormat::Table if views.is_empty() => output.info("No transactions")?,
                OutputFormat::Table => {
                    for view in &views {
                        output.print(&summary_line(view))?;
                    }
                }
            }
        }
        MultisigCommand::Show { id } => {
            let view = manager.load_display(*id, &ctx.wallet).await?;
            match format {
                OutputFormat::Json => output.print(&to_json(&view)?)?,
                OutputFormat::Table => output.rows(&display_rows(&view))?,
            }
        }
        MultisigCommand::Watch {
            from_block,
            interval_secs,
        } => {
            let threshold = manager.fetch_config().await?.vote_pass_threshold;
            if threshold != U256::from(1u64) {
                output.warning(&format!(
                    "Threshold is {}; proposals will not be auto-executed until it is 1",
                    threshold
                ))?;
            }
            let executor = Arc::new(AutoExecutor::new(
                manager.config().multisig,
                ctx.submitter.clone(),
                ctx.wallet,
                ctx.gas.clone(),
                Arc::new(TxStatusStore::new()),
            ));
            let handle = executor.spawn(*from_block, Duration::from_secs(*interval_secs));
            output.info("Watching for proposals, press Ctrl-C to stop")?;
            tokio::signal::ctrl_c().await?;
            handle.stop();
            output.info("Stopped")?;
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli_config::{resolve_settings, CliConfig, Overrides};
    use crate::output::testing::MockOutput;
    use alloy_sol_types::SolValue;
    use lib_client::testing::MockContractClient;
    use lib_governance::abi::IMultisig;
    use lib_types::Address;

    fn settings() -> Settings {
        let mut settings =
            resolve_settings(&CliConfig::default(), None, &Overrides::default()).unwrap();
        settings.contracts.multisig = Some(Address::repeat_byte(0x55));
        settings.account = Some(Address::repeat_byte(0xaa));
        settings.chain_id = Some(1);
        settings
    }

    #[test]
    fn test_read_commands_have_no_action() {
        assert!(command_to_action(&MultisigCommand::List).unwrap().is_none());
        assert!(command_to_action(&MultisigCommand::Show { id: 1 }).unwrap().is_none());
    }

    #[test]
    fn test_propose_parsing() {
        let action = command_to_action(&MultisigCommand::Propose {
            to: "0x000000000000000000000000000000000000dEaD".into(),
            value: "1000".into(),
            data: "0x".into(),
        })
        .unwrap()
        .unwrap();
        assert!(matches!(action, MultisigAction::Propose { value, .. } if value == U256::from(1000u64)));

        let bad = command_to_action(&MultisigCommand::AddOwner { owner: "nope".into() });
        assert!(bad.is_err());
    }

    #[tokio::test]
    async fn test_info_prints_config() {
        let client = Arc::new(MockContractClient::new());
        let multisig = Address::repeat_byte(0x55);
        client.respond::<IMultisig::numOwnersCall>(multisig, (U256::from(3u64),).abi_encode_params());
        client.respond::<IMultisig::votePassThresholdCall>(multisig, (U256::from(2u64),).abi_encode_params());
        client.respond::<IMultisig::executionDelayCall>(multisig, (U256::from(60u64),).abi_encode_params());
        client.respond::<IMultisig::numTxsCall>(multisig, (U256::from(4u64),).abi_encode_params());

        let settings = settings();
        let ctx = Context::with_client(&settings, client);
        let output = MockOutput::new();
        run(&MultisigCommand::Info, &settings, &ctx, OutputFormat::Table, &output)
            .await
            .unwrap();

        output.assert_contains_message("threshold");
        output.assert_contains_message("60s");
    }

    #[tokio::test]
    async fn test_approve_submits_one_write() {
        let client = Arc::new(MockContractClient::new());
        let settings = settings();
        let ctx = Context::with_client(&settings, client.clone());
        let output = MockOutput::new();

        run(&MultisigCommand::Approve { id: 3 }, &settings, &ctx, OutputFormat::Table, &output)
            .await
            .unwrap();

        assert_eq!(client.write_count(), 1);
        output.assert_contains_message("Approve multisig tx #3");
    }

    #[tokio::test]
    async fn test_missing_multisig_setting() {
        let mut settings = settings();
        settings.contracts.multisig = None;
        let ctx = Context::with_client(&settings, Arc::new(MockContractClient::new()));
        let err = run(&MultisigCommand::List, &settings, &ctx, OutputFormat::Json, &MockOutput::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("contracts.multisig"));
    }
}
