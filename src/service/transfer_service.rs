//! 单笔 SOL 转账：取 blockhash → 签名 → 提交（跳过预检）→ 等待结算 → 一次确认查询
//!
//! 提交失败直接返回错误，不自动重发：原交易可能已经上链，重发有双花风险。

use std::{sync::Arc, time::Duration};

use ed25519_dalek::SigningKey;

use crate::{
    domain::{
        transaction::{sign_transfer, TransferRequest},
        Address, ConfirmationOutcome,
    },
    error::{SweepError, SweepResult},
    infrastructure::{Delay, SendOptions, SignatureStatus, SolanaRpc},
};

/// 默认结算等待（毫秒）
pub const DEFAULT_SETTLEMENT_DELAY_MS: u64 = 3000;

/// 已提交转账的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    /// 交易签名（Base58）
    pub signature: String,
    pub confirmation: ConfirmationOutcome,
}

/// 区块浏览器链接
pub fn explorer_url(signature: &str) -> String {
    format!("https://solscan.io/tx/{}", signature)
}

/// 把节点返回的状态映射为确认结果
pub fn classify_status(status: Option<&SignatureStatus>) -> ConfirmationOutcome {
    match status {
        Some(status) if status.err.is_some() => ConfirmationOutcome::Failed,
        Some(status) if status.confirmation_status.is_some() => ConfirmationOutcome::Confirmed,
        _ => ConfirmationOutcome::Failed,
    }
}

pub struct TransferEngine {
    rpc: Arc<dyn SolanaRpc>,
    delay: Arc<dyn Delay>,
    settlement_delay: Duration,
    send_options: SendOptions,
}

impl TransferEngine {
    pub fn new(rpc: Arc<dyn SolanaRpc>, delay: Arc<dyn Delay>, settlement_delay: Duration) -> Self {
        Self {
            rpc,
            delay,
            settlement_delay,
            send_options: SendOptions::default(),
        }
    }

    /// 从 `source` 转出 `lamports` 到 `destination`
    pub async fn sweep(
        &self,
        source: &SigningKey,
        destination: &Address,
        lamports: u64,
    ) -> SweepResult<TransferReceipt> {
        let request = TransferRequest {
            source,
            destination: *destination,
            lamports,
        };
        let from = request.source_address();

        let blockhash = self
            .rpc
            .get_latest_blockhash()
            .await
            .map_err(SweepError::rpc)?;

        let signed = sign_transfer(&request, &blockhash)?;
        let local_signature = signed.signature_b58();

        let signature = self
            .rpc
            .send_transaction(&signed.wire, self.send_options)
            .await
            .map_err(SweepError::rpc)?;

        if signature != local_signature {
            tracing::warn!(
                returned = %signature,
                expected = %local_signature,
                "RPC returned a different signature than the one signed"
            );
        }

        tracing::info!(
            from = %from,
            to = %destination,
            lamports = lamports,
            signature = %signature,
            "📤 Transfer submitted"
        );

        self.delay.sleep(self.settlement_delay).await;

        let confirmation = match self.rpc.get_signature_status(&signature).await {
            Ok(status) => classify_status(status.as_ref()),
            Err(e) => {
                // 已拿到签名，查询失败按已提交处理
                tracing::warn!(
                    signature = %signature,
                    error = %format!("{:#}", e),
                    "Confirmation query failed, assuming success"
                );
                ConfirmationOutcome::UnknownAssumedSuccess
            }
        };

        tracing::info!(
            signature = %signature,
            confirmation = %confirmation,
            "Transfer status resolved"
        );

        Ok(TransferReceipt {
            signature,
            confirmation,
        })
    }
}
