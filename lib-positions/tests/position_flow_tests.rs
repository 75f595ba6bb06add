//! Position reads and write flows against the in-memory client

use alloy_primitives::aliases::{I24, U160, U24, U96};
use alloy_sol_types::{SolCall, SolValue};
use std::sync::Arc;

use lib_client::abi::{IERC20, IERC223Depository};
use lib_client::gas::{COLLECT_FEES_GAS, REVOKE_GAS};
use lib_client::testing::MockContractClient;
use lib_client::{
    ClientError, GasSettings, GasSettingsStore, MemorySink, RetryPolicy, Submitter, TxStatus,
    TxStatusStore, WalletContext,
};
use lib_positions::abi::{IFactory, INonfungiblePositionManager, IPool};
use lib_positions::{
    estimate_revoke_gas, fetch_position, revoke, sqrt_ratio_at_tick, AddLiquidityStatus,
    AddLiquidityStore, FeeCollector, LiquidityProvider, LiquidityRemover, MintRequest, Pool,
    PoolState, Position, PositionError, RemoveOptions,
};
use lib_types::{Address, TokenInfo, TokenStandard, TxHash, U256};

fn position_manager() -> Address {
    Address::repeat_byte(0x90)
}

fn factory() -> Address {
    Address::repeat_byte(0x91)
}

fn pool_address() -> Address {
    Address::repeat_byte(0x92)
}

fn weth() -> Address {
    Address::repeat_byte(0xee)
}

fn token_b() -> Address {
    Address::repeat_byte(0x0b)
}

fn token_b_223() -> Address {
    Address::repeat_byte(0x2b)
}

fn owner() -> Address {
    Address::repeat_byte(0xaa)
}

fn wallet() -> WalletContext {
    WalletContext::connected(owner(), 1)
}

struct Harness {
    client: Arc<MockContractClient>,
    sink: Arc<MemorySink>,
    submitter: Submitter,
    status: Arc<TxStatusStore>,
    gas: Arc<GasSettingsStore>,
}

fn harness() -> Harness {
    let client = Arc::new(MockContractClient::new());
    let sink = Arc::new(MemorySink::new());
    let submitter =
        Submitter::new(client.clone(), sink.clone()).with_retry(RetryPolicy::for_testing());
    Harness {
        client,
        sink,
        submitter,
        status: Arc::new(TxStatusStore::new()),
        gas: Arc::new(GasSettingsStore::default()),
    }
}

fn native_position(liquidity: u128) -> Position {
    let pool = Pool::new(
        TokenInfo::new(weth(), "WETH", 18),
        TokenInfo::new(token_b(), "USDX", 6).with_erc223(token_b_223()),
        3000,
    )
    .with_state(PoolState {
        sqrt_price_x96: sqrt_ratio_at_tick(0).unwrap(),
        tick: 0,
    });
    Position::new(U256::from(11u64), pool, -600, 600, liquidity).unwrap()
}

fn respond_fees(client: &MockContractClient, fees0: u64, fees1: u64) {
    client.respond::<INonfungiblePositionManager::collectCall>(
        position_manager(),
        INonfungiblePositionManager::collectCall::abi_encode_returns(&(
            U256::from(fees0),
            U256::from(fees1),
        )),
    );
}

fn collector(h: &Harness) -> FeeCollector {
    FeeCollector::new(
        position_manager(),
        Some(weth()),
        h.submitter.clone(),
        h.status.clone(),
        h.gas.clone(),
    )
}

fn remover(h: &Harness) -> LiquidityRemover {
    LiquidityRemover::new(
        position_manager(),
        Some(weth()),
        h.submitter.clone(),
        h.status.clone(),
        h.gas.clone(),
    )
}

#[tokio::test]
async fn test_fetch_position_with_pool_state() {
    let h = harness();
    let sqrt = sqrt_ratio_at_tick(0).unwrap();
    h.client.respond::<INonfungiblePositionManager::positionsCall>(
        position_manager(),
        INonfungiblePositionManager::positionsCall::abi_encode_returns(&(
            U96::from(0u64),
            Address::ZERO,
            weth(),
            token_b(),
            U24::from(3000u32),
            I24::try_from(-600i32).unwrap(),
            I24::try_from(600i32).unwrap(),
            5_000u128,
            U256::ZERO,
            U256::ZERO,
            0u128,
            0u128,
        )),
    );
    h.client.respond::<IERC20::symbolCall>(weth(), ("WETH".to_string(),).abi_encode_params());
    h.client.respond::<IERC20::decimalsCall>(weth(), (U256::from(18u64),).abi_encode_params());
    h.client.respond::<IERC20::symbolCall>(token_b(), ("USDX".to_string(),).abi_encode_params());
    h.client.respond::<IERC20::decimalsCall>(token_b(), (U256::from(6u64),).abi_encode_params());
    h.client.respond::<IFactory::getPoolCall>(
        factory(),
        IFactory::getPoolCall::abi_encode_returns(&(pool_address(),)),
    );
    h.client.respond::<IPool::slot0Call>(
        pool_address(),
        IPool::slot0Call::abi_encode_returns(&(
            U160::from_limbs_slice(&sqrt.as_limbs()[..3]),
            I24::try_from(0i32).unwrap(),
            0u16,
            1u16,
            1u16,
            0u8,
            true,
        )),
    );

    let position = fetch_position(h.client.as_ref(), position_manager(), factory(), U256::from(11u64))
        .await
        .unwrap();
    assert_eq!(position.tick_lower, -600);
    assert_eq!(position.tick_upper, 600);
    assert_eq!(position.liquidity, 5_000);
    assert_eq!(position.pool.fee, 3000);
    assert_eq!(position.pool.token1.symbol, "USDX");
    assert_eq!(position.pool.token1.decimals, 6);
    assert_eq!(position.in_range(), Some(true));
    assert!(!position.removed());
}

#[tokio::test]
async fn test_fetch_position_without_pool_leaves_state_unknown() {
    let h = harness();
    h.client.respond::<INonfungiblePositionManager::positionsCall>(
        position_manager(),
        INonfungiblePositionManager::positionsCall::abi_encode_returns(&(
            U96::from(0u64),
            Address::ZERO,
            weth(),
            token_b(),
            U24::from(500u32),
            I24::try_from(-10i32).unwrap(),
            I24::try_from(10i32).unwrap(),
            0u128,
            U256::ZERO,
            U256::ZERO,
            0u128,
            0u128,
        )),
    );
    h.client.respond::<IFactory::getPoolCall>(
        factory(),
        IFactory::getPoolCall::abi_encode_returns(&(Address::ZERO,)),
    );

    let position = fetch_position(h.client.as_ref(), position_manager(), factory(), U256::from(1u64))
        .await
        .unwrap();
    // metadata reads failed, placeholders used
    assert_eq!(position.pool.token0.symbol, lib_types::PLACEHOLDER_SYMBOL);
    assert_eq!(position.pool.token0.decimals, lib_types::DEFAULT_DECIMALS);
    assert_eq!(position.in_range(), None);
    assert!(position.removed());
    assert!(matches!(position.amounts(), Err(PositionError::PoolNotLoaded)));
}

#[tokio::test]
async fn test_collect_fees_native_pool_uses_multicall() {
    let h = harness();
    respond_fees(&h.client, 7, 9);

    let hash = collector(&h)
        .collect_fees(
            &native_position(1_000),
            &wallet(),
            (TokenStandard::Erc20, TokenStandard::Erc223),
        )
        .await
        .unwrap();

    assert_eq!(hash, TxHash::new([1; 32]));
    assert_eq!(h.status.status(), TxStatus::Success);
    assert_eq!(h.sink.len(), 1);

    let writes = h.client.writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].to, position_manager());
    let multicall =
        INonfungiblePositionManager::multicallCall::abi_decode(&writes[0].data, true).unwrap();
    assert_eq!(multicall.data.len(), 3);

    let collect =
        INonfungiblePositionManager::collectCall::abi_decode(&multicall.data[0], true).unwrap();
    assert_eq!(collect.params.recipient, Address::ZERO);
    assert_eq!(collect.params.tokensOutCode, 1);

    let unwrap =
        INonfungiblePositionManager::unwrapWETH9Call::abi_decode(&multicall.data[1], true).unwrap();
    assert_eq!(unwrap.amountMinimum, U256::from(7u64));
    assert_eq!(unwrap.recipient, owner());

    let sweep =
        INonfungiblePositionManager::sweepTokenCall::abi_decode(&multicall.data[2], true).unwrap();
    assert_eq!(sweep.token, token_b_223());
    assert_eq!(sweep.amountMinimum, U256::from(9u64));
}

#[tokio::test]
async fn test_collect_fees_simulation_failure_sends_nothing() {
    let h = harness();
    // no collect response: simulation returns empty data that fails to decode

    let err = collector(&h)
        .collect_fees(
            &native_position(1_000),
            &wallet(),
            (TokenStandard::Erc20, TokenStandard::Erc20),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, PositionError::Client(_)));
    assert_eq!(h.status.status(), TxStatus::Error);
    assert_eq!(h.client.write_count(), 0);
}

#[tokio::test]
async fn test_collect_gas_falls_back() {
    let h = harness();
    let collector = collector(&h);
    let standards = (TokenStandard::Erc20, TokenStandard::Erc20);

    let disconnected = collector
        .estimate_gas(&native_position(1), &WalletContext::disconnected(), standards)
        .await;
    assert_eq!(disconnected, COLLECT_FEES_GAS);

    h.client.fail_estimate(ClientError::EstimateGas("out of gas".into()));
    let failed = collector.estimate_gas(&native_position(1), &wallet(), standards).await;
    assert_eq!(failed, COLLECT_FEES_GAS);
}

#[tokio::test]
async fn test_remove_half_liquidity() {
    let h = harness();
    respond_fees(&h.client, 0, 0);
    let options = RemoveOptions {
        percent: 50,
        slippage_bps: 100,
        deadline: 1_800_000_000,
    };

    remover(&h)
        .remove(
            &native_position(1_000_000),
            &wallet(),
            (TokenStandard::Erc20, TokenStandard::Erc20),
            &options,
        )
        .await
        .unwrap();

    let writes = h.client.writes();
    assert_eq!(writes.len(), 1);
    let multicall =
        INonfungiblePositionManager::multicallCall::abi_decode(&writes[0].data, true).unwrap();
    // decrease, collect, unwrap, sweep
    assert_eq!(multicall.data.len(), 4);

    let decrease = INonfungiblePositionManager::decreaseLiquidityCall::abi_decode(
        &multicall.data[0],
        true,
    )
    .unwrap();
    assert_eq!(decrease.params.liquidity, 500_000);
    assert_eq!(decrease.params.tokenId, U256::from(11u64));
    assert_eq!(decrease.params.deadline, U256::from(1_800_000_000u64));
    assert!(decrease.params.amount0Min > U256::ZERO);
    assert_eq!(h.status.status(), TxStatus::Success);
}

#[tokio::test]
async fn test_remove_from_empty_position_fails_early() {
    let h = harness();
    let options = RemoveOptions {
        percent: 100,
        slippage_bps: 50,
        deadline: 0,
    };

    let err = remover(&h)
        .remove(
            &native_position(0),
            &wallet(),
            (TokenStandard::Erc20, TokenStandard::Erc20),
            &options,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, PositionError::NoLiquidity));
    assert_eq!(h.status.status(), TxStatus::Error);
    assert_eq!(h.client.write_count(), 0);
}

fn mint_request(standard0: TokenStandard) -> MintRequest {
    MintRequest {
        token0: TokenInfo::new(Address::repeat_byte(0x01), "AAA", 18)
            .with_erc223(Address::repeat_byte(0x21)),
        token1: TokenInfo::new(token_b(), "USDX", 6).with_erc223(token_b_223()),
        standard0,
        standard1: TokenStandard::Erc20,
        fee: 3000,
        tick_lower: -600,
        tick_upper: 600,
        amount0_desired: U256::from(100u64),
        amount1_desired: U256::from(200u64),
        amount0_min: U256::ZERO,
        amount1_min: U256::ZERO,
        recipient: owner(),
        deadline: 1_800_000_000,
    }
}

fn provider(h: &Harness, store: Arc<AddLiquidityStore>) -> LiquidityProvider {
    LiquidityProvider::new(
        position_manager(),
        h.submitter.clone(),
        store,
        Arc::new(TxStatusStore::new()),
        h.gas.clone(),
    )
}

#[tokio::test]
async fn test_add_liquidity_approves_then_mints() {
    let h = harness();
    let req = mint_request(TokenStandard::Erc20);
    h.client.respond::<IERC20::allowanceCall>(req.token0.address, (U256::ZERO,).abi_encode_params());
    h.client.respond::<IERC20::allowanceCall>(req.token1.address, (U256::ZERO,).abi_encode_params());

    let store = Arc::new(AddLiquidityStore::new());
    let hash = provider(&h, store.clone())
        .add_liquidity(&req, &wallet())
        .await
        .unwrap();

    let writes = h.client.writes();
    assert_eq!(writes.len(), 3);
    assert_eq!(writes[0].selector(), Some(IERC20::approveCall::SELECTOR));
    assert_eq!(writes[1].selector(), Some(IERC20::approveCall::SELECTOR));
    let mint = INonfungiblePositionManager::mintCall::abi_decode(&writes[2].data, true).unwrap();
    assert_eq!(mint.params.amount0Desired, U256::from(100u64));
    assert_eq!(mint.params.recipient, owner());

    assert_eq!(hash, TxHash::new([3; 32]));
    let snapshot = store.snapshot();
    assert_eq!(snapshot.status, AddLiquidityStatus::Success);
    assert_eq!(snapshot.hash, Some(hash));
    // two approvals and the mint
    assert_eq!(h.sink.len(), 3);
}

#[tokio::test]
async fn test_add_liquidity_deposits_erc223_difference() {
    let h = harness();
    let req = mint_request(TokenStandard::Erc223);
    h.client.respond::<IERC223Depository::depositedTokensCall>(
        position_manager(),
        (U256::from(40u64),).abi_encode_params(),
    );
    h.client.respond::<IERC20::allowanceCall>(req.token1.address, (U256::from(500u64),).abi_encode_params());

    provider(&h, Arc::new(AddLiquidityStore::new()))
        .add_liquidity(&req, &wallet())
        .await
        .unwrap();

    let writes = h.client.writes();
    assert_eq!(writes.len(), 2);
    assert_eq!(writes[0].to, Address::repeat_byte(0x21));
    let deposit = IERC20::transferCall::abi_decode(&writes[0].data, true).unwrap();
    assert_eq!(deposit.to, position_manager());
    assert_eq!(deposit.amount, U256::from(60u64));
    assert_eq!(
        writes[1].selector(),
        Some(INonfungiblePositionManager::mintCall::SELECTOR)
    );
}

#[tokio::test]
async fn test_add_liquidity_rejected_mint_resets() {
    let h = harness();
    let req = mint_request(TokenStandard::Erc20);
    h.client.respond::<IERC20::allowanceCall>(req.token0.address, (U256::MAX,).abi_encode_params());
    h.client.respond::<IERC20::allowanceCall>(req.token1.address, (U256::MAX,).abi_encode_params());
    h.client.fail_write(ClientError::UserRejected);

    let store = Arc::new(AddLiquidityStore::new());
    let err = provider(&h, store.clone())
        .add_liquidity(&req, &wallet())
        .await
        .unwrap_err();

    assert!(matches!(err, PositionError::Client(ClientError::UserRejected)));
    assert_eq!(store.snapshot().status, AddLiquidityStatus::Initial);
    assert!(h.sink.is_empty());
}

#[tokio::test]
async fn test_add_liquidity_approval_failure() {
    let h = harness();
    let req = mint_request(TokenStandard::Erc20);
    h.client.respond::<IERC20::allowanceCall>(req.token0.address, (U256::ZERO,).abi_encode_params());
    h.client.fail_write(ClientError::Rpc {
        code: -32000,
        message: "insufficient funds".into(),
    });

    let store = Arc::new(AddLiquidityStore::new());
    provider(&h, store.clone())
        .add_liquidity(&req, &wallet())
        .await
        .unwrap_err();

    let snapshot = store.snapshot();
    assert_eq!(snapshot.status, AddLiquidityStatus::ApproveError);
    assert!(snapshot.error.unwrap().contains("insufficient funds"));
}

#[tokio::test]
async fn test_revoke_sends_zero_approval() {
    let h = harness();
    let token = Address::repeat_byte(0x44);

    revoke(
        &h.submitter,
        &h.status,
        &GasSettings::default(),
        &wallet(),
        token,
        position_manager(),
    )
    .await
    .unwrap();

    let writes = h.client.writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].to, token);
    let approve = IERC20::approveCall::abi_decode(&writes[0].data, true).unwrap();
    assert_eq!(approve.spender, position_manager());
    assert_eq!(approve.amount, U256::ZERO);

    let gas = estimate_revoke_gas(
        &h.submitter,
        &GasSettings::default(),
        &WalletContext::disconnected(),
        token,
        position_manager(),
    )
    .await;
    assert_eq!(gas, REVOKE_GAS);
}
