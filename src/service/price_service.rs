use std::{collections::HashMap, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::config::PriceConfig;

/// CoinGecko API 响应
#[derive(Debug, Deserialize)]
struct CoinGeckoResponse {
    #[serde(flatten)]
    prices: HashMap<String, CoinGeckoCoin>,
}

#[derive(Debug, Deserialize)]
struct CoinGeckoCoin {
    usd: f64,
}

/// 报价来源
#[async_trait]
pub trait PriceFeed: Send + Sync {
    /// 当前 USD 价格
    async fn fetch_usd_price(&self) -> Result<Decimal>;
}

/// CoinGecko simple/price 接口
pub struct CoinGeckoFeed {
    client: reqwest::Client,
    api_url: String,
    coin_id: String,
    timeout: Duration,
}

impl CoinGeckoFeed {
    pub fn new(config: &PriceConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            coin_id: config.coin_id.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    fn url(&self) -> String {
        format!(
            "{}/simple/price?ids={}&vs_currencies=usd",
            self.api_url, self.coin_id
        )
    }
}

/// 从响应中取出指定币种价格
fn extract_price(data: &CoinGeckoResponse, coin_id: &str) -> Result<Decimal> {
    let price_f64 = data
        .prices
        .get(coin_id)
        .ok_or_else(|| anyhow::anyhow!("Price not found for {}", coin_id))?
        .usd;

    // 转换为Decimal以保持精度
    Decimal::from_f64_retain(price_f64)
        .ok_or_else(|| anyhow::anyhow!("Invalid price value: {}", price_f64))
}

#[async_trait]
impl PriceFeed for CoinGeckoFeed {
    async fn fetch_usd_price(&self) -> Result<Decimal> {
        let url = self.url();
        tracing::debug!(url = %url, "Fetching price from CoinGecko");

        let response = self
            .client
            .get(&url)
            .header("User-Agent", "seedsweep/0.1")
            .timeout(self.timeout)
            .send()
            .await
            .context("Failed to fetch price from CoinGecko")?;

        if !response.status().is_success() {
            anyhow::bail!("CoinGecko API error: {}", response.status());
        }

        let data: CoinGeckoResponse = response
            .json()
            .await
            .context("Failed to parse CoinGecko response")?;

        extract_price(&data, &self.coin_id)
    }
}

/// 价格查询：单次尝试，失败只记日志并返回 `None`
pub struct PriceOracle {
    feed: Option<Arc<dyn PriceFeed>>,
}

impl PriceOracle {
    pub fn new(feed: Arc<dyn PriceFeed>) -> Self {
        Self { feed: Some(feed) }
    }

    /// 不查价格，报告只显示 SOL
    pub fn disabled() -> Self {
        Self { feed: None }
    }

    pub fn from_config(config: &PriceConfig) -> Self {
        if config.enabled {
            Self::new(Arc::new(CoinGeckoFeed::new(config)))
        } else {
            Self::disabled()
        }
    }

    pub async fn get_quote(&self) -> Option<Decimal> {
        let feed = self.feed.as_ref()?;
        match feed.fetch_usd_price().await {
            Ok(price) => {
                tracing::info!(price_usd = %price, "💱 SOL price fetched");
                Some(price)
            }
            Err(e) => {
                tracing::warn!(error = %format!("{:#}", e), "Price lookup failed, showing SOL only");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedFeed(Option<Decimal>);

    #[async_trait]
    impl PriceFeed for FixedFeed {
        async fn fetch_usd_price(&self) -> Result<Decimal> {
            self.0.ok_or_else(|| anyhow::anyhow!("rate limited"))
        }
    }

    #[test]
    fn test_extract_price() {
        let data: CoinGeckoResponse =
            serde_json::from_str(r#"{"solana":{"usd":142.5}}"#).unwrap();
        assert_eq!(
            extract_price(&data, "solana").unwrap(),
            Decimal::new(1425, 1)
        );
        assert!(extract_price(&data, "bitcoin").is_err());
    }

    #[test]
    fn test_url() {
        let feed = CoinGeckoFeed::new(&PriceConfig {
            enabled: true,
            api_url: "https://api.coingecko.com/api/v3/".into(),
            coin_id: "solana".into(),
            timeout_secs: 10,
        });
        assert_eq!(
            feed.url(),
            "https://api.coingecko.com/api/v3/simple/price?ids=solana&vs_currencies=usd"
        );
    }

    #[tokio::test]
    async fn test_failure_is_swallowed() {
        let oracle = PriceOracle::new(Arc::new(FixedFeed(None)));
        assert_eq!(oracle.get_quote().await, None);

        let oracle = PriceOracle::new(Arc::new(FixedFeed(Some(Decimal::new(150, 0)))));
        assert_eq!(oracle.get_quote().await, Some(Decimal::new(150, 0)));

        assert_eq!(PriceOracle::disabled().get_quote().await, None);
    }
}
