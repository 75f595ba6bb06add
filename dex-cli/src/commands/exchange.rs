//! Exchange tracking commands

use std::sync::Arc;

use lib_exchange::{CachedFetcher, Currency, Exchange, ExchangeFetcher, SimpleSwapClient};

use crate::argument_parsing::{ExchangeArgs, ExchangeCommand};
use crate::cli_config::Settings;
use crate::error::CliResult;
use crate::output::{to_json, Output, OutputFormat};

pub fn exchange_rows(exchange: &Exchange) -> Vec<(&'static str, String)> {
    let dash = || "-".to_string();
    vec![
        ("id", exchange.id.clone()),
        ("pair", exchange.pair()),
        ("status", exchange.status.to_string()),
        ("sent", exchange.amount_from.clone().unwrap_or_else(dash)),
        (
            "received",
            exchange
                .amount_to
                .clone()
                .or_else(|| exchange.expected_amount.as_ref().map(|a| format!("~{}", a)))
                .unwrap_or_else(dash),
        ),
        ("deposit", exchange.address_from.clone().unwrap_or_else(dash)),
        ("payout", exchange.address_to.clone().unwrap_or_else(dash)),
        ("updated", exchange.updated_at.clone().unwrap_or_else(dash)),
    ]
}

pub fn currency_line(currency: &Currency) -> String {
    match &currency.network {
        Some(network) => format!("{:<10} {} ({})", currency.symbol, currency.name, network),
        None => format!("{:<10} {}", currency.symbol, currency.name),
    }
}

pub async fn handle_exchange_command(
    args: &ExchangeArgs,
    settings: &Settings,
    format: OutputFormat,
    output: &dyn Output,
) -> CliResult<()> {
    let client = SimpleSwapClient::new(settings.exchange.clone())?;
    let fetcher: Arc<dyn ExchangeFetcher> = Arc::new(CachedFetcher::new(
        client,
        settings.exchange.currency_cache_ttl(),
    ));
    run(&args.action, settings, fetcher, format, output).await
}

pub async fn run(
    command: &ExchangeCommand,
    settings: &Settings,
    fetcher: Arc<dyn ExchangeFetcher>,
    format: OutputFormat,
    output: &dyn Output,
) -> CliResult<()> {
    match command {
        ExchangeCommand::Show { id } => {
            let exchange = fetcher.exchange(id).await?;
            print_exchange(&exchange, format, output)?;
        }
        ExchangeCommand::Watch { id } => {
            let handle = lib_exchange::watch_exchange(
                fetcher,
                id.clone(),
                settings.exchange.poll_interval(),
            );
            let mut updates = handle.subscribe();
            let mut last_status = None;

            loop {
                tokio::select! {
                    changed = updates.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let current = updates.borrow_and_update().clone();
                        let Some(exchange) = current else { continue };
                        if last_status.as_ref() != Some(&exchange.status) {
                            output.info(&format!("{}: {}", exchange.id, exchange.status))?;
                            last_status = Some(exchange.status.clone());
                        }
                        if exchange.status.is_terminal() {
                            print_exchange(&exchange, format, output)?;
                            break;
                        }
                    }
                    _ = tokio::signal::ctrl_c() => {
                        handle.cancel();
                        output.warning("Stopped before the exchange settled")?;
                        break;
                    }
                }
            }
        }
        ExchangeCommand::Currencies => {
            let currencies = fetcher.currencies().await?;
            match format {
                OutputFormat::Json => output.print(&to_json(currencies.as_slice())?)?,
                OutputFormat::Table => {
                    output.header(&format!("{} currencies", currencies.len()))?;
                    for currency in &currencies {
                        output.print(&currency_line(currency))?;
                    }
                }
            }
        }
    }
    Ok(())
}

fn print_exchange(exchange: &Exchange, format: OutputFormat, output: &dyn Output) -> CliResult<()> {
    match format {
        OutputFormat::Json => output.print(&to_json(exchange)?),
        OutputFormat::Table => output.rows(&exchange_rows(exchange)),
    }
}
