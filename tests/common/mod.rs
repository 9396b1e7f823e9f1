//! 测试辅助模块
//! 脚本化 RPC、只记录不睡眠的 Delay、固定报价

#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
    time::Duration,
};

use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use seedsweep::{
    domain::{Address, DerivationConvention, DerivationStrategy, SeedPhrase, StandardDerivation},
    infrastructure::{CancelFlag, Delay, RateLimiter, SendOptions, SignatureStatus, SolanaRpc},
    service::{BalanceOracle, PriceFeed, SweepOrchestrator, SweepSettings, TransferEngine},
};
use solana_sdk::hash::Hash;

pub const ABANDON: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
pub const LEGAL: &str =
    "legal winner thank year wave sausage worth useful legal winner thank yellow";

pub const REQUEST_DELAY: Duration = Duration::from_millis(500);
pub const POST_TRANSFER_DELAY: Duration = Duration::from_secs(1);
pub const WALLET_DELAY: Duration = Duration::from_secs(3);
pub const SETTLEMENT_DELAY: Duration = Duration::from_millis(3000);
pub const RETRY_DELAY: Duration = Duration::from_secs(1);

/// 收款地址
pub fn recipient() -> Address {
    Address::from_public_key([5u8; 32])
}

pub fn address_of(phrase: &str, convention: DerivationConvention) -> Address {
    let seed = SeedPhrase::parse(phrase).unwrap();
    StandardDerivation
        .derive_keypair(&seed, convention)
        .unwrap()
        .address
}

/// 确认查询的脚本行为
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusMode {
    Confirmed,
    NotFound,
    ExecutionError,
    QueryError,
}

pub struct MockRpc {
    balances: Mutex<HashMap<Address, u64>>,
    always_fail: Mutex<HashSet<Address>>,
    pub balance_calls: Mutex<Vec<Address>>,
    pub sent: Mutex<Vec<Vec<u8>>>,
    pub status_mode: Mutex<StatusMode>,
    pub fail_send: Mutex<bool>,
}

impl Default for MockRpc {
    fn default() -> Self {
        Self {
            balances: Mutex::new(HashMap::new()),
            always_fail: Mutex::new(HashSet::new()),
            balance_calls: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
            status_mode: Mutex::new(StatusMode::Confirmed),
            fail_send: Mutex::new(false),
        }
    }
}

impl MockRpc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_balance(self, address: Address, lamports: u64) -> Self {
        self.balances.lock().unwrap().insert(address, lamports);
        self
    }

    pub fn with_failing_balance(self, address: Address) -> Self {
        self.always_fail.lock().unwrap().insert(address);
        self
    }

    pub fn with_status(self, mode: StatusMode) -> Self {
        *self.status_mode.lock().unwrap() = mode;
        self
    }

    pub fn with_failing_send(self) -> Self {
        *self.fail_send.lock().unwrap() = true;
        self
    }

    /// 已提交交易的金额（transfer 指令数据的最后 8 字节）
    pub fn sent_lamports(&self) -> Vec<u64> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|wire| {
                let tail: [u8; 8] = wire[wire.len() - 8..].try_into().unwrap();
                u64::from_le_bytes(tail)
            })
            .collect()
    }
}

#[async_trait]
impl SolanaRpc for MockRpc {
    async fn get_balance(&self, address: &Address) -> Result<u64> {
        self.balance_calls.lock().unwrap().push(*address);
        if self.always_fail.lock().unwrap().contains(address) {
            anyhow::bail!("429 Too Many Requests");
        }
        Ok(self
            .balances
            .lock()
            .unwrap()
            .get(address)
            .copied()
            .unwrap_or(0))
    }

    async fn get_latest_blockhash(&self) -> Result<Hash> {
        Ok(Hash::new_from_array([9u8; 32]))
    }

    async fn send_transaction(&self, wire: &[u8], options: SendOptions) -> Result<String> {
        assert!(options.skip_preflight);
        if *self.fail_send.lock().unwrap() {
            anyhow::bail!("Solana RPC error: Blockhash not found");
        }
        self.sent.lock().unwrap().push(wire.to_vec());
        // 第一个签名紧跟在 shortvec(1) 之后
        Ok(bs58::encode(&wire[1..65]).into_string())
    }

    async fn get_signature_status(&self, _signature: &str) -> Result<Option<SignatureStatus>> {
        let mode = *self.status_mode.lock().unwrap();
        match mode {
            StatusMode::Confirmed => Ok(Some(SignatureStatus {
                slot: 100,
                confirmations: Some(1),
                err: None,
                confirmation_status: Some("confirmed".into()),
            })),
            StatusMode::ExecutionError => Ok(Some(SignatureStatus {
                slot: 100,
                confirmations: Some(1),
                err: Some(serde_json::json!({ "InstructionError": [0, { "Custom": 1 }] })),
                confirmation_status: Some("confirmed".into()),
            })),
            StatusMode::NotFound => Ok(None),
            StatusMode::QueryError => anyhow::bail!("request timed out"),
        }
    }
}

/// 只记录时长，不真正等待；可选在第 n 次等待时触发取消
#[derive(Default)]
pub struct RecordingDelay {
    pub sleeps: Mutex<Vec<Duration>>,
    cancel_at: Mutex<Option<(usize, CancelFlag)>>,
}

impl RecordingDelay {
    pub fn cancel_after(self, sleeps: usize, flag: CancelFlag) -> Self {
        *self.cancel_at.lock().unwrap() = Some((sleeps, flag));
        self
    }

    pub fn count(&self, duration: Duration) -> usize {
        self.sleeps
            .lock()
            .unwrap()
            .iter()
            .filter(|d| **d == duration)
            .count()
    }

    pub fn total(&self) -> usize {
        self.sleeps.lock().unwrap().len()
    }
}

#[async_trait]
impl Delay for RecordingDelay {
    async fn sleep(&self, duration: Duration) {
        let mut sleeps = self.sleeps.lock().unwrap();
        sleeps.push(duration);
        if let Some((n, flag)) = &*self.cancel_at.lock().unwrap() {
            if sleeps.len() >= *n {
                flag.cancel();
            }
        }
    }
}

pub struct MockPriceFeed(pub Option<Decimal>);

#[async_trait]
impl PriceFeed for MockPriceFeed {
    async fn fetch_usd_price(&self) -> Result<Decimal> {
        self.0.ok_or_else(|| anyhow::anyhow!("price service unavailable"))
    }
}

pub struct Harness {
    pub rpc: Arc<MockRpc>,
    pub delay: Arc<RecordingDelay>,
    pub orchestrator: SweepOrchestrator,
}

pub fn harness_with_delay(
    rpc: MockRpc,
    delay: RecordingDelay,
    settings: SweepSettings,
) -> Harness {
    let rpc = Arc::new(rpc);
    let delay = Arc::new(delay);

    let balances = BalanceOracle::new(rpc.clone(), delay.clone(), 3, RETRY_DELAY);
    let transfers = TransferEngine::new(rpc.clone(), delay.clone(), SETTLEMENT_DELAY);
    let limiter = RateLimiter::new(
        delay.clone(),
        REQUEST_DELAY,
        POST_TRANSFER_DELAY,
        WALLET_DELAY,
    );

    Harness {
        rpc,
        delay,
        orchestrator: SweepOrchestrator::new(balances, transfers, limiter, settings),
    }
}

pub fn harness(rpc: MockRpc, settings: SweepSettings) -> Harness {
    harness_with_delay(rpc, RecordingDelay::default(), settings)
}
