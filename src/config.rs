//! 配置管理模块
//! 支持从环境变量和配置文件加载配置

use std::{path::Path, str::FromStr, time::Duration};

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    domain::{amount::sol_to_lamports, ConfirmationPolicy},
    service::sweep_orchestrator::SweepSettings,
};

/// 应用配置结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub rpc: RpcConfig,
    #[serde(default)]
    pub sweep: SweepConfig,
    #[serde(default)]
    pub price: PriceConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Solana RPC 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    pub url: String,
    pub timeout_secs: u64,
    /// 余额查询总尝试次数
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
}

/// 归集参数（金额以 SOL 计）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Convention A 扫描的账户数（0..num_accounts）
    pub num_accounts: u32,
    pub min_balance_sol: Decimal,
    pub commission_sol: Decimal,
    pub request_delay_ms: u64,
    pub post_transfer_delay_ms: u64,
    pub wallet_delay_ms: u64,
    pub settlement_delay_ms: u64,
    pub confirmation_policy: ConfirmationPolicy,
}

/// 价格服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceConfig {
    pub enabled: bool,
    pub api_url: String,
    pub coin_id: String,
    pub timeout_secs: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub enable_file_logging: bool,
    pub log_file_path: Option<String>,
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: std::env::var("SOLANA_RPC_URL")
                .unwrap_or_else(|_| "https://api.mainnet-beta.solana.com".into()),
            timeout_secs: env_parse("SOLANA_RPC_TIMEOUT_SECS", 30),
            max_retries: env_parse("BALANCE_MAX_RETRIES", 3),
            retry_backoff_ms: env_parse("BALANCE_RETRY_BACKOFF_MS", 1000),
        }
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            num_accounts: env_parse("SWEEP_NUM_ACCOUNTS", 5),
            min_balance_sol: env_parse("SWEEP_MIN_BALANCE_SOL", Decimal::new(1, 3)),
            commission_sol: env_parse("SWEEP_COMMISSION_SOL", Decimal::new(1, 3)),
            request_delay_ms: env_parse("SWEEP_REQUEST_DELAY_MS", 500),
            post_transfer_delay_ms: env_parse("SWEEP_POST_TRANSFER_DELAY_MS", 1000),
            wallet_delay_ms: env_parse("SWEEP_WALLET_DELAY_MS", 3000),
            settlement_delay_ms: env_parse("SWEEP_SETTLEMENT_DELAY_MS", 3000),
            confirmation_policy: std::env::var("SWEEP_CONFIRMATION_POLICY")
                .ok()
                .and_then(|v| ConfirmationPolicy::parse(&v))
                .unwrap_or_default(),
        }
    }
}

impl Default for PriceConfig {
    fn default() -> Self {
        Self {
            enabled: env_flag("PRICE_ENABLED", true),
            api_url: std::env::var("PRICE_API_URL")
                .unwrap_or_else(|_| "https://api.coingecko.com/api/v3".into()),
            coin_id: std::env::var("PRICE_COIN_ID").unwrap_or_else(|_| "solana".into()),
            timeout_secs: env_parse("PRICE_TIMEOUT_SECS", 10),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            format: std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".into()),
            enable_file_logging: env_flag("LOG_FILE_ENABLED", false),
            log_file_path: std::env::var("LOG_FILE_PATH").ok(),
        }
    }
}

impl RpcConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

impl SweepConfig {
    /// 转换为编排器参数（SOL → lamports）
    pub fn to_settings(&self) -> Result<SweepSettings> {
        Ok(SweepSettings {
            num_accounts: self.num_accounts,
            min_balance: sol_to_lamports(self.min_balance_sol)
                .context("Invalid sweep.min_balance_sol")?,
            commission: sol_to_lamports(self.commission_sol)
                .context("Invalid sweep.commission_sol")?,
            confirmation_policy: self.confirmation_policy,
        })
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn post_transfer_delay(&self) -> Duration {
        Duration::from_millis(self.post_transfer_delay_ms)
    }

    pub fn wallet_delay(&self) -> Duration {
        Duration::from_millis(self.wallet_delay_ms)
    }

    pub fn settlement_delay(&self) -> Duration {
        Duration::from_millis(self.settlement_delay_ms)
    }
}

impl Config {
    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            rpc: RpcConfig::default(),
            sweep: SweepConfig::default(),
            price: PriceConfig::default(),
            logging: LoggingConfig::default(),
        })
    }

    /// 从配置文件加载配置（缺省的字段取环境变量 / 默认值）
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: Config =
            toml::from_str(&content).with_context(|| "Failed to parse config file as TOML")?;

        Ok(config)
    }

    /// 从环境变量和配置文件合并加载（配置文件优先级更高）
    pub fn from_env_and_file<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let mut config = Self::from_env()?;

        if let Some(path) = path {
            if path.as_ref().exists() {
                config = Self::from_file(path)?;
            } else {
                tracing::warn!(path = ?path.as_ref(), "Config file not found, using environment");
            }
        }

        Ok(config)
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<()> {
        if self.rpc.url.trim().is_empty() {
            anyhow::bail!("SOLANA_RPC_URL must not be empty");
        }
        if !self.rpc.url.starts_with("http://") && !self.rpc.url.starts_with("https://") {
            anyhow::bail!("SOLANA_RPC_URL must start with http:// or https://");
        }
        if self.rpc.max_retries == 0 {
            anyhow::bail!("BALANCE_MAX_RETRIES must be at least 1");
        }

        if self.sweep.min_balance_sol.is_sign_negative() {
            anyhow::bail!("SWEEP_MIN_BALANCE_SOL must not be negative");
        }
        if self.sweep.commission_sol.is_sign_negative() {
            anyhow::bail!("SWEEP_COMMISSION_SOL must not be negative");
        }

        if self.price.enabled && self.price.api_url.trim().is_empty() {
            anyhow::bail!("PRICE_API_URL must not be empty when price lookup is enabled");
        }

        // 验证日志级别
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            anyhow::bail!("LOG_LEVEL must be one of: {:?}", valid_levels);
        }

        // 验证日志格式
        if self.logging.format != "json" && self.logging.format != "text" {
            anyhow::bail!("LOG_FORMAT must be 'json' or 'text'");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_config_from_env() {
        let config = Config::from_env().unwrap();
        assert!(!config.rpc.url.is_empty());
        assert!(config.rpc.max_retries >= 1);
    }

    #[test]
    fn test_config_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[rpc]
url = "https://rpc.example.org"
timeout_secs = 15
max_retries = 4
retry_backoff_ms = 1000

[sweep]
num_accounts = 3
min_balance_sol = "0.002"
commission_sol = "0.0005"
request_delay_ms = 250
post_transfer_delay_ms = 1000
wallet_delay_ms = 3000
settlement_delay_ms = 3000
confirmation_policy = "strict"

[price]
enabled = false

[logging]
level = "debug"
format = "json"
enable_file_logging = false
"#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.rpc.url, "https://rpc.example.org");
        assert_eq!(config.rpc.max_retries, 4);
        assert_eq!(config.sweep.num_accounts, 3);
        assert_eq!(config.sweep.confirmation_policy, ConfirmationPolicy::Strict);
        assert!(!config.price.enabled);
        assert_eq!(config.logging.format, "json");

        let settings = config.sweep.to_settings().unwrap();
        assert_eq!(settings.min_balance, 2_000_000);
        assert_eq!(settings.commission, 500_000);
        assert_eq!(settings.num_accounts, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[rpc]
url = "https://rpc.example.org"
"#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.rpc.url, "https://rpc.example.org");
        assert!(config.rpc.max_retries >= 1);
    }

    #[test]
    fn test_missing_file_falls_back_to_env() {
        let config = Config::from_env_and_file(Some("/nonexistent/seedsweep.toml")).unwrap();
        assert!(!config.rpc.url.is_empty());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::from_env().unwrap();
        config.rpc.url = "https://rpc.example.org".into();
        config.logging.level = "info".into();
        config.logging.format = "text".into();
        assert!(config.validate().is_ok());

        let mut bad = config.clone();
        bad.rpc.max_retries = 0;
        assert!(bad.validate().is_err());

        let mut bad = config.clone();
        bad.rpc.url = "ftp://rpc.example.org".into();
        assert!(bad.validate().is_err());

        let mut bad = config.clone();
        bad.sweep.commission_sol = Decimal::new(-1, 3);
        assert!(bad.validate().is_err());

        let mut bad = config;
        bad.logging.format = "xml".into();
        assert!(bad.validate().is_err());
    }
}
