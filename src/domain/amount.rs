//! SOL / lamports 换算
//!
//! 内部一律使用 lamports（u64），配置和报告中的 SOL 数值用 Decimal 精确换算，
//! 避免浮点误差导致多转或少转。

use anyhow::{Context, Result};
use rust_decimal::{prelude::ToPrimitive, Decimal};

/// 1 SOL = 10^9 lamports
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

const SOL_DECIMALS: u32 = 9;

/// lamports → SOL（精确）
pub fn lamports_to_sol(lamports: u64) -> Decimal {
    Decimal::from_i128_with_scale(lamports as i128, SOL_DECIMALS)
}

/// SOL → lamports，超出 9 位小数的部分向下截断
pub fn sol_to_lamports(sol: Decimal) -> Result<u64> {
    if sol.is_sign_negative() {
        anyhow::bail!("Amount must not be negative: {}", sol);
    }
    (sol * Decimal::from(LAMPORTS_PER_SOL))
        .trunc()
        .to_u64()
        .with_context(|| format!("Amount out of range: {} SOL", sol))
}

/// 报告中的 SOL 显示（6 位小数）
pub fn format_sol(lamports: u64) -> String {
    format!("{:.6}", lamports_to_sol(lamports))
}

/// 按报价换算美元价值（2 位小数）
pub fn format_usd(lamports: u64, price: Decimal) -> String {
    format!("{:.2}", lamports_to_sol(lamports) * price)
}
