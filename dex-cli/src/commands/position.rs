//! Liquidity position commands

use serde::Serialize;
use std::sync::Arc;

use lib_client::TxStatusStore;
use lib_positions::{
    fetch_position, simulate_fees, FeeCollector, FeesOwed, LiquidityRemover, Position,
    PriceRange, RemoveOptions,
};
use lib_types::{Address, TokenStandard, U256};

use crate::argument_parsing::{PositionArgs, PositionCommand};
use crate::cli_config::Settings;
use crate::commands::{deadline_from_now, parse_standard, parse_u256, Context};
use crate::error::CliResult;
use crate::output::{to_json, Output, OutputFormat};

/// Snapshot printed by `position show`
#[derive(Debug, Clone, Serialize)]
pub struct PositionView {
    pub token_id: U256,
    pub pair: String,
    pub fee: String,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub liquidity: u128,
    pub in_range: Option<bool>,
    pub prices: PriceRange,
    /// Share held as token0, in percent
    pub ratio: Option<u8>,
    pub amounts: Option<(String, String)>,
    pub fees: Option<(String, String)>,
}

/// Fee tier in hundredths of a bip, e.g. 3000 -> "0.3%"
pub fn fee_tier(fee: u32) -> String {
    let percent = fee as f64 / 10_000.0;
    format!("{}%", percent)
}

pub fn position_view(position: &Position, fees: Option<&FeesOwed>) -> PositionView {
    let (token0, token1) = (&position.pool.token0, &position.pool.token1);
    PositionView {
        token_id: position.token_id,
        pair: format!("{}/{}", token0.symbol, token1.symbol),
        fee: fee_tier(position.pool.fee),
        tick_lower: position.tick_lower,
        tick_upper: position.tick_upper,
        liquidity: position.liquidity,
        in_range: position.in_range(),
        prices: position.price_range(),
        ratio: position.ratio(),
        amounts: position.formatted_amounts().ok(),
        fees: fees.map(|f| f.formatted(token0.decimals, token1.decimals)),
    }
}

pub fn view_rows(view: &PositionView) -> Vec<(&'static str, String)> {
    let unknown = || "unknown".to_string();
    let in_range = match view.in_range {
        Some(true) => "in range".to_string(),
        Some(false) => "out of range".to_string(),
        None => unknown(),
    };
    let mut rows = vec![
        ("position", format!("#{}", view.token_id)),
        ("pair", format!("{} ({})", view.pair, view.fee)),
        ("ticks", format!("{} .. {} ({})", view.tick_lower, view.tick_upper, in_range)),
        (
            "prices",
            format!(
                "{} .. {} (current {})",
                view.prices.lower,
                view.prices.upper,
                view.prices.current.map(|p| p.to_string()).unwrap_or_else(unknown)
            ),
        ),
        ("liquidity", view.liquidity.to_string()),
        (
            "ratio",
            view.ratio
                .map(|r| format!("{}% / {}%", r, 100 - r))
                .unwrap_or_else(unknown),
        ),
    ];
    if let Some((a0, a1)) = &view.amounts {
        rows.push(("amounts", format!("{} / {}", a0, a1)));
    }
    if let Some((f0, f1)) = &view.fees {
        rows.push(("fees owed", format!("{} / {}", f0, f1)));
    }
    rows
}

fn standards(standard0: &str, standard1: &str) -> CliResult<(TokenStandard, TokenStandard)> {
    Ok((parse_standard(standard0)?, parse_standard(standard1)?))
}

pub async fn handle_position_command(
    args: &PositionArgs,
    settings: &Settings,
    format: OutputFormat,
    output: &dyn Output,
) -> CliResult<()> {
    let ctx = Context::new(settings);
    run(&args.action, settings, &ctx, format, output).await
}

pub async fn run(
    command: &PositionCommand,
    settings: &Settings,
    ctx: &Context,
    format: OutputFormat,
    output: &dyn Output,
) -> CliResult<()> {
    let position_manager = settings.position_manager()?;
    let factory = settings.factory()?;
    let wrapped_native = settings.contracts.wrapped_native;

    match command {
        PositionCommand::Show { token_id } => {
            let token_id = parse_u256(token_id)?;
            let position =
                fetch_position(ctx.client.as_ref(), position_manager, factory, token_id).await?;
            let fees = match ctx.wallet.account {
                Some(owner) => load_fees(ctx, position_manager, token_id, owner).await,
                None => None,
            };
            let view = position_view(&position, fees.as_ref());
            match format {
                OutputFormat::Json => output.print(&to_json(&view)?)?,
                OutputFormat::Table => output.rows(&view_rows(&view))?,
            }
        }
        PositionCommand::Collect {
            token_id,
            standard0,
            standard1,
        } => {
            let standards = standards(standard0, standard1)?;
            let position = fetch_position(
                ctx.client.as_ref(),
                position_manager,
                factory,
                parse_u256(token_id)?,
            )
            .await?;
            let collector = FeeCollector::new(
                position_manager,
                wrapped_native,
                ctx.submitter.clone(),
                Arc::new(TxStatusStore::new()),
                ctx.gas.clone(),
            );
            let gas = collector.estimate_gas(&position, &ctx.wallet, standards).await;
            output.info(&format!("Collecting fees (gas limit ~{})", gas))?;
            let hash = collector.collect_fees(&position, &ctx.wallet, standards).await?;
            output.success(&format!("Fees collected: {}", hash))?;
        }
        PositionCommand::Remove {
            token_id,
            percent,
            slippage_bps,
            deadline_mins,
            standard0,
            standard1,
        } => {
            let standards = standards(standard0, standard1)?;
            let position = fetch_position(
                ctx.client.as_ref(),
                position_manager,
                factory,
                parse_u256(token_id)?,
            )
            .await?;
            let options = RemoveOptions {
                percent: *percent,
                slippage_bps: *slippage_bps,
                deadline: deadline_from_now(*deadline_mins),
            };
            let remover = LiquidityRemover::new(
                position_manager,
                wrapped_native,
                ctx.submitter.clone(),
                Arc::new(TxStatusStore::new()),
                ctx.gas.clone(),
            );
            let gas = remover.estimate_gas(&position, &ctx.wallet, standards, &options).await;
            output.info(&format!(
                "Removing {}% of position #{} (gas limit ~{})",
                percent, position.token_id, gas
            ))?;
            let hash = remover.remove(&position, &ctx.wallet, standards, &options).await?;
            output.success(&format!("Liquidity removed: {}", hash))?;
        }
    }
    Ok(())
}

async fn load_fees(
    ctx: &Context,
    position_manager: Address,
    token_id: U256,
    owner: Address,
) -> Option<FeesOwed> {
    match simulate_fees(ctx.client.as_ref(), position_manager, token_id, owner).await {
        Ok(fees) => Some(fees),
        Err(e) => {
            tracing::debug!("Fees for position {} unavailable: {}", token_id, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli_config::{resolve_settings, CliConfig, Overrides};
    use crate::error::CliError;
    use crate::output::testing::MockOutput;
    use lib_client::testing::MockContractClient;
    use lib_positions::{Pool, PoolState};
    use lib_positions::sqrt_ratio_at_tick;
    use lib_types::TokenInfo;

    fn token(byte: u8, symbol: &str) -> TokenInfo {
        TokenInfo {
            address: Address::repeat_byte(byte),
            address_erc223: None,
            symbol: symbol.into(),
            decimals: 18,
            logo: None,
        }
    }

    fn position(state: Option<PoolState>) -> Position {
        let mut pool = Pool::new(token(0x01, "AAA"), token(0x02, "BBB"), 3000);
        if let Some(state) = state {
            pool = pool.with_state(state);
        }
        Position::new(U256::from(7u64), pool, -600, 600, 1_000_000).unwrap()
    }

    #[test]
    fn test_fee_tier() {
        assert_eq!(fee_tier(3000), "0.3%");
        assert_eq!(fee_tier(500), "0.05%");
        assert_eq!(fee_tier(10_000), "1%");
    }

    #[test]
    fn test_view_without_pool_state() {
        let view = position_view(&position(None), None);
        assert_eq!(view.pair, "AAA/BBB");
        assert_eq!(view.in_range, None);
        assert_eq!(view.ratio, None);
        assert!(view.amounts.is_none());

        let rows = view_rows(&view);
        let ratio = rows.iter().find(|(k, _)| *k == "ratio").unwrap();
        assert_eq!(ratio.1, "unknown");
        assert!(rows.iter().all(|(k, _)| *k != "fees owed"));
    }

    #[test]
    fn test_view_in_range() {
        let state = PoolState {
            sqrt_price_x96: sqrt_ratio_at_tick(0).unwrap(),
            tick: 0,
        };
        let fees = FeesOwed {
            fees0: U256::from(1_000_000_000_000_000_000u128),
            fees1: U256::ZERO,
        };
        let view = position_view(&position(Some(state)), Some(&fees));
        assert_eq!(view.in_range, Some(true));
        assert!(view.amounts.is_some());
        assert_eq!(view.fees, Some(("1".to_string(), "0".to_string())));

        let rows = view_rows(&view);
        assert!(rows.iter().any(|(k, v)| *k == "ticks" && v.contains("in range")));
    }

    #[tokio::test]
    async fn test_missing_position_manager() {
        let settings = resolve_settings(&CliConfig::default(), None, &Overrides::default()).unwrap();
        let ctx = Context::with_client(&settings, Arc::new(MockContractClient::new()));
        let err = run(
            &PositionCommand::Show { token_id: "1".into() },
            &settings,
            &ctx,
            OutputFormat::Table,
            &MockOutput::new(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CliError::MissingSetting("contracts.position_manager")));
    }

    #[test]
    fn test_bad_standard_is_rejected() {
        assert!(standards("erc20", "erc721").is_err());
        assert_eq!(
            standards("ERC-223", "a").unwrap(),
            (TokenStandard::Erc223, TokenStandard::Erc20)
        );
    }
}
