//! 报告渲染（纯文本，写到 stdout）

use std::fmt::Write;

use rust_decimal::Decimal;

use crate::{
    domain::{
        amount::{format_sol, format_usd},
        AccountOutcome, AccountReport, SweepReport, WalletReport,
    },
    service::transfer_service::explorer_url,
};

const RULE: &str = "============================================================";

fn balance_text(account: &AccountReport, price: Option<Decimal>) -> String {
    match (account.balance, price) {
        (Some(lamports), Some(price)) => format!(
            "{} SOL (${})",
            format_sol(lamports),
            format_usd(lamports, price)
        ),
        (Some(lamports), None) => format!("{} SOL", format_sol(lamports)),
        (None, _) => "unknown".to_string(),
    }
}

fn account_line(out: &mut String, account: &AccountReport, price: Option<Decimal>) {
    let address = account
        .address
        .map(|a| a.to_string())
        .unwrap_or_else(|| "-".to_string());
    let _ = writeln!(
        out,
        "{:<10} | Address: {} | Balance: {}",
        account.label,
        address,
        balance_text(account, price)
    );

    match &account.outcome {
        AccountOutcome::Checked => {}
        AccountOutcome::Skipped { reason } => {
            let _ = writeln!(out, "   skipped: {}", reason.description());
        }
        AccountOutcome::Swept {
            signature,
            lamports,
            confirmation,
            succeeded,
        } => {
            let mark = if *succeeded { "✅" } else { "❌" };
            let _ = writeln!(
                out,
                "   {} sent {} SOL ({}): {}",
                mark,
                format_sol(*lamports),
                confirmation,
                signature
            );
            let _ = writeln!(out, "   Solscan: {}", explorer_url(signature));
        }
        AccountOutcome::Failed { code, message } => {
            let _ = writeln!(out, "   error [{}]: {}", code.as_str(), message);
        }
    }
}

fn wallet_header(out: &mut String, wallet: &WalletReport, total: usize) {
    let _ = writeln!(out, "\n=== Wallet {}/{}: {} ===", wallet.index, total, wallet.phrase);
    if let Some(recipient) = &wallet.recipient {
        let _ = writeln!(out, "Recipient: {}", recipient);
    }
    if let Some(error) = &wallet.error {
        let _ = writeln!(out, "   error: {}", error);
    }
}

/// 检查模式报告：逐地址余额、每条助记词小计、总计
pub fn render_check_report(report: &SweepReport, price: Option<Decimal>) -> String {
    let mut out = String::new();
    match price {
        Some(price) => {
            let _ = writeln!(out, "SOL price: ${:.2}", price);
        }
        None => {
            let _ = writeln!(out, "SOL price unavailable");
        }
    }

    let total = report.wallets.len();
    for wallet in &report.wallets {
        wallet_header(&mut out, wallet, total);
        for account in &wallet.accounts {
            account_line(&mut out, account, price);
        }
        let subtotal = wallet.observed_lamports();
        match price {
            Some(price) => {
                let _ = writeln!(
                    out,
                    "Wallet total: {} SOL (${})",
                    format_sol(subtotal),
                    format_usd(subtotal, price)
                );
            }
            None => {
                let _ = writeln!(out, "Wallet total: {} SOL", format_sol(subtotal));
            }
        }
    }

    let _ = writeln!(out, "\n{}", RULE);
    match price {
        Some(price) => {
            let _ = writeln!(
                out,
                "Grand total: {} SOL (${})",
                format_sol(report.lamports_observed),
                format_usd(report.lamports_observed, price)
            );
        }
        None => {
            let _ = writeln!(out, "Grand total: {} SOL", format_sol(report.lamports_observed));
        }
    }
    if report.cancelled {
        let _ = writeln!(out, "(cancelled, partial results)");
    }
    let _ = writeln!(out, "{}", RULE);
    out
}

/// 归集模式报告：逐地址结果 + 汇总统计
pub fn render_sweep_report(report: &SweepReport) -> String {
    let mut out = String::new();

    let total = report.wallets.len();
    for wallet in &report.wallets {
        wallet_header(&mut out, wallet, total);
        for account in &wallet.accounts {
            account_line(&mut out, account, None);
        }
    }

    let _ = writeln!(out, "\n{}", RULE);
    let _ = writeln!(out, "📊 SUMMARY");
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "Wallets processed: {}", report.wallets_processed);
    let _ = writeln!(out, "✅ Successful transfers: {}", report.transfers_succeeded);
    let _ = writeln!(out, "❌ Failed transfers: {}", report.transfers_failed);
    let _ = writeln!(out, "💰 Total SOL sent: {}", format_sol(report.lamports_moved));
    let _ = writeln!(out, "📈 Success rate: {:.1}%", report.success_rate());
    if report.cancelled {
        let _ = writeln!(out, "(cancelled, partial results)");
    }
    let _ = writeln!(out, "{}", RULE);
    out
}
