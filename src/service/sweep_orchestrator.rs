//! 扫描 / 归集编排
//!
//! 每条助记词：先 Phantom 地址，再账户 0..num_accounts。严格串行，
//! 同一时间最多一笔转账在途。每个账户步骤返回 `AccountReport`，
//! 由调用方折叠进 `SweepReport`；单个账户出错不会中断后续账户和钱包。

use std::sync::Arc;

use anyhow::Result;

use crate::{
    config::Config,
    domain::{
        amount::format_sol, AccountOutcome, AccountReport, Address, ConfirmationPolicy,
        DerivationConvention, DerivationStrategy, SeedPhrase, SkipReason, StandardDerivation,
        SweepReport, WalletReport,
    },
    infrastructure::{
        log_redact::{mask_phrase, redact_address},
        CancelFlag, Delay, RateLimiter, SolanaRpc,
    },
    service::{
        balance_service::BalanceOracle,
        transfer_service::{explorer_url, TransferEngine},
    },
};

/// 归集参数（金额为 lamports）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepSettings {
    pub num_accounts: u32,
    /// 余额必须严格大于该值才归集
    pub min_balance: u64,
    /// 预留手续费，转出金额 = 余额 - commission
    pub commission: u64,
    pub confirmation_policy: ConfirmationPolicy,
}

impl Default for SweepSettings {
    fn default() -> Self {
        Self {
            num_accounts: 5,
            min_balance: 1_000_000,
            commission: 1_000_000,
            confirmation_policy: ConfirmationPolicy::Optimistic,
        }
    }
}

impl SweepSettings {
    /// 归集决策：返回应转出的金额，或跳过原因
    pub fn sweep_amount(&self, balance: u64) -> Result<u64, SkipReason> {
        if balance <= self.min_balance {
            return Err(SkipReason::BalanceTooLow);
        }
        match balance.checked_sub(self.commission) {
            Some(amount) if amount > 0 => Ok(amount),
            _ => Err(SkipReason::NothingAfterCommission),
        }
    }
}

/// 一条归集指令：助记词 + 收款地址（原始字符串，处理时才校验）
#[derive(Clone, PartialEq, Eq)]
pub struct SweepJob {
    pub phrase: String,
    pub recipient: String,
}

impl std::fmt::Debug for SweepJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SweepJob")
            .field("phrase", &mask_phrase(&self.phrase))
            .field("recipient", &self.recipient)
            .finish()
    }
}

pub struct SweepOrchestrator {
    derivation: Arc<dyn DerivationStrategy>,
    balances: BalanceOracle,
    transfers: TransferEngine,
    limiter: RateLimiter,
    settings: SweepSettings,
    cancel: CancelFlag,
}

impl SweepOrchestrator {
    pub fn new(
        balances: BalanceOracle,
        transfers: TransferEngine,
        limiter: RateLimiter,
        settings: SweepSettings,
    ) -> Self {
        Self {
            derivation: Arc::new(StandardDerivation),
            balances,
            transfers,
            limiter,
            settings,
            cancel: CancelFlag::new(),
        }
    }

    /// 按配置组装全部组件
    pub fn from_config(
        config: &Config,
        rpc: Arc<dyn SolanaRpc>,
        delay: Arc<dyn Delay>,
    ) -> Result<Self> {
        let settings = config.sweep.to_settings()?;
        let balances = BalanceOracle::new(
            Arc::clone(&rpc),
            Arc::clone(&delay),
            config.rpc.max_retries,
            config.rpc.retry_backoff(),
        );
        let transfers = TransferEngine::new(
            rpc,
            Arc::clone(&delay),
            config.sweep.settlement_delay(),
        );
        let limiter = RateLimiter::new(
            delay,
            config.sweep.request_delay(),
            config.sweep.post_transfer_delay(),
            config.sweep.wallet_delay(),
        );
        Ok(Self::new(balances, transfers, limiter, settings))
    }

    pub fn with_derivation(mut self, derivation: Arc<dyn DerivationStrategy>) -> Self {
        self.derivation = derivation;
        self
    }

    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn settings(&self) -> &SweepSettings {
        &self.settings
    }

    /// 检查模式：只查余额
    pub async fn run_check(&self, phrases: &[String]) -> SweepReport {
        tracing::info!(wallets = phrases.len(), "🔍 Starting balance check");
        let items: Vec<(&str, Option<&str>)> =
            phrases.iter().map(|p| (p.as_str(), None)).collect();
        self.run(&items).await
    }

    /// 归集模式
    pub async fn run_sweep(&self, jobs: &[SweepJob]) -> SweepReport {
        tracing::info!(
            wallets = jobs.len(),
            min_balance = self.settings.min_balance,
            commission = self.settings.commission,
            policy = ?self.settings.confirmation_policy,
            "🚀 Starting sweep"
        );
        let items: Vec<(&str, Option<&str>)> = jobs
            .iter()
            .map(|j| (j.phrase.as_str(), Some(j.recipient.as_str())))
            .collect();
        self.run(&items).await
    }

    async fn run(&self, items: &[(&str, Option<&str>)]) -> SweepReport {
        let mut report = SweepReport::default();
        let total = items.len();

        for (i, (phrase, recipient)) in items.iter().enumerate() {
            if self.cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }

            tracing::info!(wallet = i + 1, total = total, "📝 Processing wallet");
            let wallet = self.process_wallet(i + 1, phrase, *recipient).await;
            report.record_wallet(wallet);

            if i + 1 < total {
                if self.cancel.is_cancelled() {
                    report.cancelled = true;
                    break;
                }
                self.limiter.between_wallets().await;
            }
        }

        if report.cancelled {
            tracing::warn!(
                wallets_processed = report.wallets_processed,
                "Run cancelled, returning partial report"
            );
        }

        report
    }

    /// 处理一条助记词；`recipient` 为 `None` 时只查余额
    pub async fn process_wallet(
        &self,
        index: usize,
        phrase: &str,
        recipient: Option<&str>,
    ) -> WalletReport {
        let mut wallet = WalletReport {
            index,
            phrase: mask_phrase(phrase),
            ..Default::default()
        };

        let recipient = match recipient.map(str::parse::<Address>).transpose() {
            Ok(recipient) => recipient,
            Err(e) => {
                tracing::warn!(wallet = index, error = %e, "Invalid recipient, skipping wallet");
                wallet.error = Some(e.to_string());
                return wallet;
            }
        };
        wallet.recipient = recipient;

        let seed = match SeedPhrase::parse(phrase) {
            Ok(seed) => seed,
            Err(e) => {
                tracing::warn!(wallet = index, error = %e, "Invalid seed phrase, skipping wallet");
                wallet.error = Some(e.to_string());
                return wallet;
            }
        };

        let order = DerivationConvention::scan_order(self.settings.num_accounts);
        for (n, convention) in order.into_iter().enumerate() {
            if n > 0 && self.cancel.is_cancelled() {
                break;
            }
            let account = self
                .process_account(&seed, convention, recipient.as_ref())
                .await;
            wallet.accounts.push(account);
        }

        wallet
    }

    /// 派生 → 查余额 → （可选）归集
    pub async fn process_account(
        &self,
        seed: &SeedPhrase,
        convention: DerivationConvention,
        recipient: Option<&Address>,
    ) -> AccountReport {
        let label = convention.label();

        let keypair = match self.derivation.derive_keypair(seed, convention) {
            Ok(keypair) => keypair,
            Err(e) => {
                tracing::warn!(account = %label, error = %e, "Derivation failed");
                return AccountReport::failed(label, None, e.code(), e.to_string());
            }
        };
        let address = keypair.address;

        let balance = self.balances.get_balance(&address).await;
        self.limiter.after_request().await;

        let Some(balance) = balance else {
            tracing::warn!(account = %label, address = %address, "Balance unknown, skipping");
            return AccountReport {
                label,
                address: Some(address),
                balance: None,
                outcome: AccountOutcome::Skipped {
                    reason: SkipReason::BalanceUnknown,
                },
            };
        };

        tracing::info!(
            account = %label,
            address = %address,
            balance_sol = %format_sol(balance),
            "Balance"
        );

        let Some(recipient) = recipient else {
            return AccountReport {
                label,
                address: Some(address),
                balance: Some(balance),
                outcome: AccountOutcome::Checked,
            };
        };

        let amount = match self.settings.sweep_amount(balance) {
            Ok(amount) => amount,
            Err(reason) => {
                tracing::debug!(account = %label, reason = reason.description(), "Skipping");
                return AccountReport {
                    label,
                    address: Some(address),
                    balance: Some(balance),
                    outcome: AccountOutcome::Skipped { reason },
                };
            }
        };

        tracing::info!(
            account = %label,
            amount_sol = %format_sol(amount),
            to = %redact_address(&recipient.to_string()),
            "💸 Sweeping"
        );

        let outcome = match self
            .transfers
            .sweep(keypair.signing_key(), recipient, amount)
            .await
        {
            Ok(receipt) => {
                let succeeded = receipt
                    .confirmation
                    .counts_as_success(self.settings.confirmation_policy);
                if succeeded {
                    tracing::info!(
                        account = %label,
                        signature = %receipt.signature,
                        explorer = %explorer_url(&receipt.signature),
                        confirmation = %receipt.confirmation,
                        "✅ Transfer succeeded"
                    );
                } else {
                    tracing::warn!(
                        account = %label,
                        signature = %receipt.signature,
                        explorer = %explorer_url(&receipt.signature),
                        confirmation = %receipt.confirmation,
                        "❌ Transfer not confirmed"
                    );
                }
                self.limiter.after_transfer().await;
                AccountOutcome::Swept {
                    signature: receipt.signature,
                    lamports: amount,
                    confirmation: receipt.confirmation,
                    succeeded,
                }
            }
            Err(e) => {
                tracing::warn!(account = %label, address = %address, error = %e, "Transfer failed");
                AccountOutcome::Failed {
                    code: e.code(),
                    message: e.to_string(),
                }
            }
        };

        AccountReport {
            label,
            address: Some(address),
            balance: Some(balance),
            outcome,
        }
    }
}
