//! JSON-RPC implementation of [`ContractClient`]
//!
//! Signing is delegated to the node (`eth_sendTransaction`), which is how a
//! wallet-backed or unlocked-account endpoint behaves.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

use lib_types::{Address, Bytes, Gas, TxHash, B256};

use crate::contract::{ContractCall, ContractClient, Log, LogFilter, Receipt};
use crate::error::{ClientError, Result};

/// EIP-1193 user rejection
const USER_REJECTED_CODE: i64 = 4001;
/// Geth execution-reverted code
const EXECUTION_REVERTED_CODE: i64 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcConfig {
    pub url: String,
    pub receipt_poll_interval_ms: u64,
    pub receipt_timeout_secs: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8545".to_string(),
            receipt_poll_interval_ms: 1_000,
            receipt_timeout_secs: 120,
        }
    }
}

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLog {
    address: Address,
    topics: Vec<B256>,
    data: Bytes,
    block_number: Option<String>,
    transaction_hash: Option<TxHash>,
    log_index: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReceipt {
    transaction_hash: TxHash,
    block_number: String,
    status: Option<String>,
    gas_used: String,
    #[serde(default)]
    logs: Vec<RawLog>,
}

#[derive(Debug, Deserialize)]
struct RawTransaction {
    nonce: String,
}

pub fn parse_quantity(raw: &str) -> Result<u64> {
    let digits = raw.strip_prefix("0x").unwrap_or(raw);
    u64::from_str_radix(digits, 16)
        .map_err(|e| ClientError::SerializationError(format!("bad quantity '{}': {}", raw, e)))
}

fn quantity(value: u64) -> String {
    format!("{:#x}", value)
}

impl TryFrom<RawLog> for Log {
    type Error = ClientError;

    fn try_from(raw: RawLog) -> Result<Self> {
        Ok(Log {
            address: raw.address,
            topics: raw.topics,
            data: raw.data,
            block_number: raw.block_number.as_deref().map(parse_quantity).transpose()?,
            tx_hash: raw.transaction_hash,
            log_index: raw.log_index.as_deref().map(parse_quantity).transpose()?,
        })
    }
}

impl TryFrom<RawReceipt> for Receipt {
    type Error = ClientError;

    fn try_from(raw: RawReceipt) -> Result<Self> {
        // pre-Byzantium receipts carry no status
        let success = match raw.status.as_deref() {
            Some(status) => parse_quantity(status)? == 1,
            None => true,
        };
        Ok(Receipt {
            tx_hash: raw.transaction_hash,
            block_number: parse_quantity(&raw.block_number)?,
            success,
            gas_used: parse_quantity(&raw.gas_used)?,
            logs: raw.logs.into_iter().map(Log::try_from).collect::<Result<_>>()?,
        })
    }
}

/// Map a JSON-RPC error object onto the client taxonomy
pub fn classify_rpc_error(code: i64, message: &str) -> ClientError {
    let lower = message.to_lowercase();
    if code == USER_REJECTED_CODE || lower.contains("user rejected") || lower.contains("denied") {
        ClientError::UserRejected
    } else if code == EXECUTION_REVERTED_CODE || lower.contains("revert") {
        ClientError::Reverted(message.to_string())
    } else {
        ClientError::Rpc {
            code,
            message: message.to_string(),
        }
    }
}

fn tx_object(call: &ContractCall) -> Value {
    let mut tx = json!({
        "to": call.to,
        "value": call.value,
        "data": call.data,
    });
    if let Some(from) = call.from {
        tx["from"] = json!(from);
    }
    if let Some(gas) = call.gas {
        tx["gas"] = json!(quantity(gas));
    }
    tx
}

pub struct JsonRpcClient {
    config: RpcConfig,
    http: reqwest::Client,
    next_id: AtomicU64,
}

impl JsonRpcClient {
    pub fn new(config: RpcConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn config(&self) -> &RpcConfig {
        &self.config
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        trace!("rpc #{} {} {}", id, method, params);

        let response: RpcResponse = self
            .http
            .post(&self.config.url)
            .json(&RpcRequest {
                jsonrpc: "2.0",
                id,
                method,
                params,
            })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(err) = response.error {
            debug!("rpc #{} {} failed: {} {}", id, method, err.code, err.message);
            return Err(classify_rpc_error(err.code, &err.message));
        }
        Ok(response.result.unwrap_or(Value::Null))
    }

    async fn request_as<T: for<'de> Deserialize<'de>>(&self, method: &str, params: Value) -> Result<T> {
        let value = self.request(method, params).await?;
        Ok(serde_json::from_value(value)?)
    }
}

#[async_trait]
impl ContractClient for JsonRpcClient {
    async fn read(&self, call: &ContractCall) -> Result<Bytes> {
        self.request_as("eth_call", json!([tx_object(call), "latest"])).await
    }

    async fn estimate_gas(&self, call: &ContractCall) -> Result<Gas> {
        match self
            .request_as::<String>("eth_estimateGas", json!([tx_object(call)]))
            .await
        {
            Ok(raw) => parse_quantity(&raw),
            Err(ClientError::Rpc { message, .. }) => Err(ClientError::EstimateGas(message)),
            Err(e) => Err(e),
        }
    }

    async fn simulate(&self, call: &ContractCall) -> Result<Bytes> {
        self.read(call).await
    }

    async fn write(&self, call: &ContractCall) -> Result<TxHash> {
        self.request_as("eth_sendTransaction", json!([tx_object(call)]))
            .await
    }

    async fn wait_for_receipt(&self, hash: TxHash) -> Result<Receipt> {
        let deadline = Instant::now() + Duration::from_secs(self.config.receipt_timeout_secs);
        let interval = Duration::from_millis(self.config.receipt_poll_interval_ms);

        loop {
            let raw: Option<RawReceipt> = self
                .request_as("eth_getTransactionReceipt", json!([hash]))
                .await?;
            if let Some(raw) = raw {
                return Receipt::try_from(raw);
            }
            if Instant::now() >= deadline {
                return Err(ClientError::ReceiptTimeout(hash));
            }
            tokio::time::sleep(interval).await;
        }
    }

    async fn transaction_nonce(&self, hash: TxHash) -> Result<Option<u64>> {
        let raw: Option<RawTransaction> = self
            .request_as("eth_getTransactionByHash", json!([hash]))
            .await?;
        raw.map(|tx| parse_quantity(&tx.nonce)).transpose()
    }

    async fn logs(&self, filter: &LogFilter) -> Result<Vec<Log>> {
        let raw: Vec<RawLog> = self
            .request_as(
                "eth_getLogs",
                json!([{
                    "address": filter.address,
                    "topics": [filter.topic0],
                    "fromBlock": quantity(filter.from_block),
                    "toBlock": quantity(filter.to_block),
                }]),
            )
            .await?;
        raw.into_iter().map(Log::try_from).collect()
    }

    async fn block_number(&self) -> Result<u64> {
        let raw: String = self.request_as("eth_blockNumber", json!([])).await?;
        parse_quantity(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib_types::U256;

    #[test]
    fn test_classify_user_rejection() {
        assert!(matches!(
            classify_rpc_error(4001, "whatever"),
            ClientError::UserRejected
        ));
        assert!(matches!(
            classify_rpc_error(-32000, "User denied transaction signature"),
            ClientError::UserRejected
        ));
    }

    #[test]
    fn test_classify_revert() {
        assert!(matches!(
            classify_rpc_error(3, "execution reverted: not owner"),
            ClientError::Reverted(_)
        ));
        assert!(matches!(
            classify_rpc_error(-32603, "Transaction reverted without a reason"),
            ClientError::Reverted(_)
        ));
        assert!(matches!(
            classify_rpc_error(-32601, "method not found"),
            ClientError::Rpc { code: -32601, .. }
        ));
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("0x0").unwrap(), 0);
        assert_eq!(parse_quantity("0x1a").unwrap(), 26);
        assert!(parse_quantity("0xzz").is_err());
    }

    #[test]
    fn test_tx_object_fields() {
        let call = ContractCall::new(Address::repeat_byte(1), vec![0xde, 0xad])
            .with_from(Address::repeat_byte(2))
            .with_value(U256::from(16u64))
            .with_gas(21_000);
        let tx = tx_object(&call);
        assert_eq!(tx["gas"], "0x5208");
        assert_eq!(tx["data"], "0xdead");
        assert_eq!(tx["value"], "0x10");
        assert!(tx.get("from").is_some());
    }

    #[test]
    fn test_receipt_conversion() {
        let hash = format!("0x{}", "11".repeat(32));
        let json = json!({
            "transactionHash": hash,
            "blockNumber": "0x10",
            "status": "0x0",
            "gasUsed": "0x5208",
            "logs": [{
                "address": format!("0x{}", "22".repeat(20)),
                "topics": [format!("0x{}", "33".repeat(32))],
                "data": "0x",
                "blockNumber": "0x10",
                "transactionHash": hash,
                "logIndex": "0x2"
            }]
        });
        let raw: RawReceipt = serde_json::from_value(json).unwrap();
        let receipt = Receipt::try_from(raw).unwrap();
        assert!(!receipt.success);
        assert_eq!(receipt.block_number, 16);
        assert_eq!(receipt.gas_used, 21_000);
        assert_eq!(receipt.logs.len(), 1);
        assert_eq!(receipt.logs[0].log_index, Some(2));
        assert_eq!(receipt.logs[0].tx_hash, Some(TxHash::new([0x11; 32])));
    }
}
