use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use alloy_primitives::{Address, B256};
use async_trait::async_trait;
use log::{debug, trace};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::errors::StakeError;
use crate::networking::{BlockTag, ChainClient, TxReceipt};

/// JSON-RPC 2.0 request envelope
#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

/// JSON-RPC 2.0 response envelope
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
struct RawReceipt {
    #[serde(rename = "transactionHash")]
    transaction_hash: B256,
    #[serde(rename = "blockNumber", default)]
    block_number: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

/// Ethereum JSON-RPC over HTTP.
///
/// Transactions are handed to the endpoint with `eth_sendTransaction`, so the
/// wallet or node behind the URL holds the keys and signs, the same way an
/// injected browser provider does.
pub struct HttpRpcClient {
    url: Url,
    client: Client,
    next_id: AtomicU64,
}

impl HttpRpcClient {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, StakeError> {
        let url = Url::parse(url)
            .map_err(|e| StakeError::Config(format!("Invalid RPC URL {}: {}", url, e)))?;
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            url,
            client,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    async fn request<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, StakeError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        trace!("RPC #{} {} {}", id, method, params);

        let response = self
            .client
            .post(self.url.clone())
            .json(&RpcRequest {
                jsonrpc: "2.0",
                id,
                method,
                params,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StakeError::ChainCommunication(format!(
                "{} failed with HTTP status {}",
                method,
                response.status()
            )));
        }

        let envelope: RpcResponse = response.json().await?;
        if let Some(err) = envelope.error {
            return Err(StakeError::ChainCommunication(format!(
                "{} failed with code {}: {}",
                method, err.code, err.message
            )));
        }

        serde_json::from_value(envelope.result.unwrap_or(Value::Null)).map_err(|e| {
            StakeError::ChainCommunication(format!("{} returned an unexpected result: {}", method, e))
        })
    }
}

pub(crate) fn parse_quantity(value: &str) -> Result<u64, StakeError> {
    let digits = value
        .strip_prefix("0x")
        .ok_or_else(|| StakeError::ChainCommunication(format!("quantity without 0x prefix: {}", value)))?;
    u64::from_str_radix(digits, 16)
        .map_err(|e| StakeError::ChainCommunication(format!("bad quantity {}: {}", value, e)))
}

pub(crate) fn parse_data(value: &str) -> Result<Vec<u8>, StakeError> {
    let digits = value.strip_prefix("0x").unwrap_or(value);
    hex::decode(digits).map_err(|e| StakeError::ChainCommunication(format!("bad hex data: {}", e)))
}

fn encode_data(data: &[u8]) -> String {
    format!("0x{}", hex::encode(data))
}

impl RawReceipt {
    fn into_receipt(self) -> Result<TxReceipt, StakeError> {
        let block_number = self.block_number.as_deref().map(parse_quantity).transpose()?;
        let success = match self.status.as_deref() {
            Some(status) => parse_quantity(status)? == 1,
            None => false,
        };
        Ok(TxReceipt {
            tx_hash: self.transaction_hash,
            block_number,
            success,
        })
    }
}

#[async_trait]
impl ChainClient for HttpRpcClient {
    async fn request_accounts(&self) -> Result<Vec<Address>, StakeError> {
        match self.request::<Vec<Address>>("eth_requestAccounts", json!([])).await {
            Ok(accounts) if !accounts.is_empty() => Ok(accounts),
            Ok(_) => {
                debug!("eth_requestAccounts returned no account, falling back to eth_accounts");
                self.request("eth_accounts", json!([])).await
            }
            Err(e) => {
                // Plain nodes do not implement the EIP-1102 method
                debug!("eth_requestAccounts failed ({}), falling back to eth_accounts", e);
                self.request("eth_accounts", json!([])).await
            }
        }
    }

    async fn chain_id(&self) -> Result<u64, StakeError> {
        let id: String = self.request("eth_chainId", json!([])).await?;
        parse_quantity(&id)
    }

    async fn block_number(&self) -> Result<u64, StakeError> {
        let number: String = self.request("eth_blockNumber", json!([])).await?;
        parse_quantity(&number)
    }

    async fn call(&self, to: Address, data: Vec<u8>, block: BlockTag) -> Result<Vec<u8>, StakeError> {
        let result: String = self
            .request(
                "eth_call",
                json!([{ "to": to, "data": encode_data(&data) }, block.to_param()]),
            )
            .await?;
        parse_data(&result)
    }

    async fn send_transaction(&self, from: Address, to: Address, data: Vec<u8>) -> Result<B256, StakeError> {
        let hash: B256 = self
            .request(
                "eth_sendTransaction",
                json!([{ "from": from, "to": to, "data": encode_data(&data) }]),
            )
            .await?;
        debug!("Submitted transaction {} from {} to {}", hash, from, to);
        Ok(hash)
    }

    async fn transaction_receipt(&self, hash: B256) -> Result<Option<TxReceipt>, StakeError> {
        let raw: Option<RawReceipt> = self
            .request("eth_getTransactionReceipt", json!([hash]))
            .await?;
        raw.map(RawReceipt::into_receipt).transpose()
    }
}
