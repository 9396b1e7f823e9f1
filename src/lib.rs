//! seedsweep - Solana 助记词余额扫描与归集工具
//!
//! 两种派生约定（Phantom 全硬化 SLIP-0010 / 账户型 BIP32）并存，
//! 逐地址查询余额，按需把余额归集到指定收款地址。

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod service;
pub mod utils;

// 重新导出常用类型
pub use error::{SweepError, SweepErrorCode, SweepResult};

pub mod prelude {
    pub use crate::{
        config::Config,
        domain::{Address, DerivationConvention, SeedPhrase, SweepReport},
        error::{SweepError, SweepResult},
        service::{SweepJob, SweepOrchestrator, SweepSettings},
    };
}
