//! 余额查询（带固定间隔重试）
//!
//! 任何错误都重试，最多 `max_retries` 次尝试，每次失败后等待固定间隔（最后一次不等）。
//! 重试耗尽返回 `None`，调用方按“余额未知，跳过”处理，不算失败。

use std::{sync::Arc, time::Duration};

use crate::{
    domain::Address,
    infrastructure::{Delay, SolanaRpc},
};

/// 默认最大尝试次数
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// 固定退避间隔（毫秒）
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;

pub struct BalanceOracle {
    rpc: Arc<dyn SolanaRpc>,
    delay: Arc<dyn Delay>,
    max_retries: u32,
    backoff: Duration,
}

impl BalanceOracle {
    pub fn new(
        rpc: Arc<dyn SolanaRpc>,
        delay: Arc<dyn Delay>,
        max_retries: u32,
        backoff: Duration,
    ) -> Self {
        Self {
            rpc,
            delay,
            max_retries: max_retries.max(1),
            backoff,
        }
    }

    /// 默认参数：3 次尝试，1 秒间隔
    pub fn with_defaults(rpc: Arc<dyn SolanaRpc>, delay: Arc<dyn Delay>) -> Self {
        Self::new(
            rpc,
            delay,
            DEFAULT_MAX_RETRIES,
            Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
        )
    }

    /// 查询余额（lamports）；重试耗尽返回 `None`
    pub async fn get_balance(&self, address: &Address) -> Option<u64> {
        for attempt in 1..=self.max_retries {
            match self.rpc.get_balance(address).await {
                Ok(lamports) => {
                    tracing::debug!(
                        address = %address,
                        attempt = attempt,
                        lamports = lamports,
                        "Balance fetched"
                    );
                    return Some(lamports);
                }
                Err(e) if attempt < self.max_retries => {
                    tracing::warn!(
                        address = %address,
                        attempt = attempt,
                        max_retries = self.max_retries,
                        error = %format!("{:#}", e),
                        next_retry_in_ms = self.backoff.as_millis() as u64,
                        "Balance query failed, will retry"
                    );
                    self.delay.sleep(self.backoff).await;
                }
                Err(e) => {
                    tracing::error!(
                        address = %address,
                        attempts = attempt,
                        error = %format!("{:#}", e),
                        "Balance query failed after all retries"
                    );
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicU32, Ordering},
        Mutex,
    };

    use anyhow::Result;
    use async_trait::async_trait;

    use super::*;
    use solana_sdk::hash::Hash;

    use crate::infrastructure::{SendOptions, SignatureStatus};

    /// 前 `failures` 次失败，之后返回固定余额
    struct FlakyRpc {
        failures: u32,
        calls: AtomicU32,
        lamports: u64,
    }

    #[async_trait]
    impl SolanaRpc for FlakyRpc {
        async fn get_balance(&self, _address: &Address) -> Result<u64> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call <= self.failures {
                anyhow::bail!("connection reset");
            }
            Ok(self.lamports)
        }

        async fn get_latest_blockhash(&self) -> Result<Hash> {
            unimplemented!()
        }

        async fn send_transaction(&self, _wire: &[u8], _options: SendOptions) -> Result<String> {
            unimplemented!()
        }

        async fn get_signature_status(&self, _signature: &str) -> Result<Option<SignatureStatus>> {
            unimplemented!()
        }
    }

    #[derive(Default)]
    struct CountingDelay(Mutex<Vec<Duration>>);

    #[async_trait]
    impl Delay for CountingDelay {
        async fn sleep(&self, duration: Duration) {
            self.0.lock().unwrap().push(duration);
        }
    }

    fn oracle(failures: u32) -> (BalanceOracle, Arc<FlakyRpc>, Arc<CountingDelay>) {
        let rpc = Arc::new(FlakyRpc {
            failures,
            calls: AtomicU32::new(0),
            lamports: 42,
        });
        let delay = Arc::new(CountingDelay::default());
        let oracle = BalanceOracle::with_defaults(rpc.clone(), delay.clone());
        (oracle, rpc, delay)
    }

    #[tokio::test]
    async fn test_fails_twice_then_succeeds() {
        let (oracle, rpc, delay) = oracle(2);
        let address = Address::from_public_key([7u8; 32]);

        assert_eq!(oracle.get_balance(&address).await, Some(42));
        assert_eq!(rpc.calls.load(Ordering::SeqCst), 3);
        assert_eq!(
            *delay.0.lock().unwrap(),
            vec![Duration::from_secs(1), Duration::from_secs(1)]
        );
    }

    #[tokio::test]
    async fn test_always_fails_returns_unknown() {
        let (oracle, rpc, delay) = oracle(u32::MAX);
        let address = Address::from_public_key([7u8; 32]);

        assert_eq!(oracle.get_balance(&address).await, None);
        assert_eq!(rpc.calls.load(Ordering::SeqCst), DEFAULT_MAX_RETRIES);
        // 最后一次失败之后不再等待
        assert_eq!(delay.0.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_first_attempt_success_never_sleeps() {
        let (oracle, _, delay) = oracle(0);
        let address = Address::from_public_key([7u8; 32]);

        assert_eq!(oracle.get_balance(&address).await, Some(42));
        assert!(delay.0.lock().unwrap().is_empty());
    }
}
