//! 固定间隔限流
//!
//! 所有等待都经过 `Delay`，测试中替换为只记录不睡眠的实现。

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;

/// 可注入的等待能力
#[async_trait]
pub trait Delay: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// 生产实现：tokio 定时器
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

/// 编排器使用的三种固定间隔
#[derive(Clone)]
pub struct RateLimiter {
    delay: Arc<dyn Delay>,
    request_delay: Duration,
    post_transfer_delay: Duration,
    wallet_delay: Duration,
}

impl RateLimiter {
    pub fn new(
        delay: Arc<dyn Delay>,
        request_delay: Duration,
        post_transfer_delay: Duration,
        wallet_delay: Duration,
    ) -> Self {
        Self {
            delay,
            request_delay,
            post_transfer_delay,
            wallet_delay,
        }
    }

    /// 每次余额查询之后
    pub async fn after_request(&self) {
        self.delay.sleep(self.request_delay).await;
    }

    /// 每笔已提交的转账之后
    pub async fn after_transfer(&self) {
        self.delay.sleep(self.post_transfer_delay).await;
    }

    /// 两条助记词之间（最后一条之后不调用）
    pub async fn between_wallets(&self) {
        tracing::debug!(
            pause_ms = self.wallet_delay.as_millis() as u64,
            "Pausing before next wallet"
        );
        self.delay.sleep(self.wallet_delay).await;
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("request_delay", &self.request_delay)
            .field("post_transfer_delay", &self.post_transfer_delay)
            .field("wallet_delay", &self.wallet_delay)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<Duration>>);

    #[async_trait]
    impl Delay for Recorder {
        async fn sleep(&self, duration: Duration) {
            self.0.lock().unwrap().push(duration);
        }
    }

    #[tokio::test]
    async fn test_limiter_uses_configured_delays() {
        let recorder = Arc::new(Recorder::default());
        let limiter = RateLimiter::new(
            recorder.clone(),
            Duration::from_millis(500),
            Duration::from_secs(1),
            Duration::from_secs(3),
        );

        limiter.after_request().await;
        limiter.after_transfer().await;
        limiter.between_wallets().await;

        assert_eq!(
            *recorder.0.lock().unwrap(),
            vec![
                Duration::from_millis(500),
                Duration::from_secs(1),
                Duration::from_secs(3)
            ]
        );
    }

    #[tokio::test]
    async fn test_tokio_delay_zero_returns_immediately() {
        TokioDelay.sleep(Duration::ZERO).await;
    }
}
