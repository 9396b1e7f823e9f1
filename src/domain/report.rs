//! 扫描 / 归集结果
//!
//! 不使用全局计数器：每个账户步骤返回一个 `AccountReport`，
//! 由调用方折叠进 `SweepReport`。

use serde::Serialize;

use crate::{
    domain::{address::Address, transaction_status::ConfirmationOutcome},
    error::SweepErrorCode,
};

/// 跳过归集的原因（不是错误）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// 余额不大于最小归集额
    BalanceTooLow,
    /// 扣除手续费后不剩余额
    NothingAfterCommission,
    /// 重试耗尽仍拿不到余额
    BalanceUnknown,
}

impl SkipReason {
    pub fn description(&self) -> &'static str {
        match self {
            SkipReason::BalanceTooLow => "balance too low",
            SkipReason::NothingAfterCommission => "insufficient funds after commission",
            SkipReason::BalanceUnknown => "balance unknown",
        }
    }
}

/// 单个账户的处理结果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AccountOutcome {
    /// 只查询余额（检查模式）
    Checked,
    Skipped { reason: SkipReason },
    Swept {
        signature: String,
        lamports: u64,
        confirmation: ConfirmationOutcome,
        /// 按确认策略折算后的结果
        succeeded: bool,
    },
    Failed {
        #[serde(skip)]
        code: SweepErrorCode,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountReport {
    pub label: String,
    pub address: Option<Address>,
    /// lamports；`None` 表示余额未知
    pub balance: Option<u64>,
    pub outcome: AccountOutcome,
}

impl AccountReport {
    pub fn failed(
        label: String,
        address: Option<Address>,
        code: SweepErrorCode,
        message: String,
    ) -> Self {
        Self {
            label,
            address,
            balance: None,
            outcome: AccountOutcome::Failed { code, message },
        }
    }
}

/// 单条助记词的处理结果
#[derive(Debug, Clone, Default, Serialize)]
pub struct WalletReport {
    /// 输入中的序号（从 1 开始）
    pub index: usize,
    /// 脱敏后的助记词
    pub phrase: String,
    pub recipient: Option<Address>,
    pub accounts: Vec<AccountReport>,
    /// 整个钱包级别的错误（助记词无效、收款地址无效）
    pub error: Option<String>,
}

impl WalletReport {
    /// 本钱包所有已知余额之和
    pub fn observed_lamports(&self) -> u64 {
        self.accounts.iter().filter_map(|a| a.balance).sum()
    }
}

/// 汇总统计
#[derive(Debug, Clone, Default, Serialize)]
pub struct SweepReport {
    pub wallets_processed: u64,
    pub transfers_succeeded: u64,
    pub transfers_failed: u64,
    pub lamports_moved: u64,
    pub lamports_observed: u64,
    pub cancelled: bool,
    pub wallets: Vec<WalletReport>,
}

impl SweepReport {
    /// 折叠一个账户结果
    pub fn record_account(&mut self, account: &AccountReport) {
        if let Some(balance) = account.balance {
            self.lamports_observed += balance;
        }

        match &account.outcome {
            AccountOutcome::Swept {
                lamports,
                succeeded,
                ..
            } => {
                if *succeeded {
                    self.transfers_succeeded += 1;
                    self.lamports_moved += lamports;
                } else {
                    self.transfers_failed += 1;
                }
            }
            AccountOutcome::Failed { .. } => self.transfers_failed += 1,
            AccountOutcome::Checked | AccountOutcome::Skipped { .. } => {}
        }
    }

    /// 折叠一个钱包结果（包括其下所有账户）
    pub fn record_wallet(&mut self, wallet: WalletReport) {
        self.wallets_processed += 1;
        if wallet.error.is_some() {
            self.transfers_failed += 1;
        }
        for account in &wallet.accounts {
            self.record_account(account);
        }
        self.wallets.push(wallet);
    }

    /// 成功率（百分比）；没有任何转账时为 0
    pub fn success_rate(&self) -> f64 {
        let attempted = self.transfers_succeeded + self.transfers_failed;
        if attempted == 0 {
            0.0
        } else {
            self.transfers_succeeded as f64 / attempted as f64 * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn swept(lamports: u64, succeeded: bool) -> AccountReport {
        AccountReport {
            label: "Phantom".into(),
            address: None,
            balance: Some(lamports + 1_000_000),
            outcome: AccountOutcome::Swept {
                signature: "sig".into(),
                lamports,
                confirmation: if succeeded {
                    ConfirmationOutcome::Confirmed
                } else {
                    ConfirmationOutcome::Failed
                },
                succeeded,
            },
        }
    }

    #[test]
    fn test_record_wallet_counts() {
        let mut report = SweepReport::default();
        report.record_wallet(WalletReport {
            index: 1,
            accounts: vec![
                swept(499_000_000, true),
                swept(10, false),
                AccountReport::failed(
                    "Account 0".into(),
                    None,
                    SweepErrorCode::InvalidPath,
                    "bad".into(),
                ),
            ],
            ..Default::default()
        });

        assert_eq!(report.wallets_processed, 1);
        assert_eq!(report.transfers_succeeded, 1);
        assert_eq!(report.transfers_failed, 2);
        assert_eq!(report.lamports_moved, 499_000_000);
        assert!((report.success_rate() - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_wallet_error_counts_once() {
        let mut report = SweepReport::default();
        report.record_wallet(WalletReport {
            index: 1,
            error: Some("invalid mnemonic".into()),
            ..Default::default()
        });
        assert_eq!(report.transfers_failed, 1);
        assert_eq!(report.success_rate(), 0.0);
    }

    #[test]
    fn test_empty_report() {
        let report = SweepReport::default();
        assert_eq!(report.success_rate(), 0.0);
        assert_eq!(report.wallets_processed, 0);
    }
}
