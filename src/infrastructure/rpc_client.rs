//! Solana JSON-RPC 客户端
//!
//! 只实现归集流程用到的四个方法：getBalance、getLatestBlockhash、
//! sendTransaction、getSignatureStatuses。上层通过 `SolanaRpc` trait 调用，
//! 测试中可替换为脚本化的 mock。

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::Engine;
use serde::{de::DeserializeOwned, Deserialize};
use solana_sdk::hash::Hash;

use crate::domain::{address::Address, transaction::parse_blockhash};

/// 承诺级别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commitment {
    Processed,
    Confirmed,
    Finalized,
}

impl Commitment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Commitment::Processed => "processed",
            Commitment::Confirmed => "confirmed",
            Commitment::Finalized => "finalized",
        }
    }
}

/// sendTransaction 选项
#[derive(Debug, Clone, Copy)]
pub struct SendOptions {
    pub skip_preflight: bool,
    pub preflight_commitment: Commitment,
}

impl Default for SendOptions {
    /// 跳过模拟以降低延迟，并容忍余额临界的账户
    fn default() -> Self {
        Self {
            skip_preflight: true,
            preflight_commitment: Commitment::Confirmed,
        }
    }
}

/// getSignatureStatuses 中单个签名的状态
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureStatus {
    pub slot: u64,
    #[serde(default)]
    pub confirmations: Option<u64>,
    #[serde(default)]
    pub err: Option<serde_json::Value>,
    #[serde(default)]
    pub confirmation_status: Option<String>,
}

/// RPC 服务抽象
#[async_trait]
pub trait SolanaRpc: Send + Sync {
    /// 余额（lamports）
    async fn get_balance(&self, address: &Address) -> Result<u64>;

    async fn get_latest_blockhash(&self) -> Result<Hash>;

    /// 提交已签名交易，返回签名（Base58）
    async fn send_transaction(&self, wire: &[u8], options: SendOptions) -> Result<String>;

    /// `None` 表示节点不知道该签名
    async fn get_signature_status(&self, signature: &str) -> Result<Option<SignatureStatus>>;
}

#[derive(Debug, Deserialize)]
struct WithContext<T> {
    value: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LatestBlockhash {
    blockhash: String,
}

/// 解析 JSON-RPC 响应：有 error 字段即失败，否则反序列化 result
pub fn parse_rpc_response<T: DeserializeOwned>(json: serde_json::Value) -> Result<T> {
    if let Some(error) = json.get("error") {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Unknown RPC error");
        anyhow::bail!("Solana RPC error: {}", message);
    }

    let result = json
        .get("result")
        .cloned()
        .context("Missing result in Solana RPC response")?;

    serde_json::from_value(result).context("Unexpected Solana RPC result shape")
}

/// 基于 reqwest 的 JSON-RPC 实现
pub struct SolanaRpcClient {
    http_client: reqwest::Client,
    url: String,
    commitment: Commitment,
}

impl SolanaRpcClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            http_client: client,
            url: url.into(),
            commitment: Commitment::Confirmed,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T> {
        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        tracing::trace!(method = %method, endpoint = %self.url, "Solana RPC request");

        let response = self
            .http_client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .with_context(|| format!("Failed to send Solana RPC request ({})", method))?;

        if !response.status().is_success() {
            anyhow::bail!("Solana RPC HTTP error: {} ({})", response.status(), method);
        }

        let json: serde_json::Value = response
            .json()
            .await
            .context("Failed to parse Solana RPC response")?;

        parse_rpc_response(json)
    }
}

#[async_trait]
impl SolanaRpc for SolanaRpcClient {
    async fn get_balance(&self, address: &Address) -> Result<u64> {
        let result: WithContext<u64> = self
            .call(
                "getBalance",
                serde_json::json!([address.to_string(), { "commitment": self.commitment.as_str() }]),
            )
            .await?;
        Ok(result.value)
    }

    async fn get_latest_blockhash(&self) -> Result<Hash> {
        let result: WithContext<LatestBlockhash> = self
            .call(
                "getLatestBlockhash",
                serde_json::json!([{ "commitment": self.commitment.as_str() }]),
            )
            .await?;
        let blockhash = parse_blockhash(&result.value.blockhash)?;
        Ok(blockhash)
    }

    async fn send_transaction(&self, wire: &[u8], options: SendOptions) -> Result<String> {
        let tx_base64 = base64::engine::general_purpose::STANDARD.encode(wire);
        self.call(
            "sendTransaction",
            serde_json::json!([
                tx_base64,
                {
                    "encoding": "base64",
                    "skipPreflight": options.skip_preflight,
                    "preflightCommitment": options.preflight_commitment.as_str(),
                }
            ]),
        )
        .await
    }

    async fn get_signature_status(&self, signature: &str) -> Result<Option<SignatureStatus>> {
        let result: WithContext<Vec<Option<SignatureStatus>>> = self
            .call(
                "getSignatureStatuses",
                serde_json::json!([[signature], { "searchTransactionHistory": false }]),
            )
            .await?;
        Ok(result.value.into_iter().next().flatten())
    }
}
