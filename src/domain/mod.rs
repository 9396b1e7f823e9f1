//! Domain 模块
//!
//! 纯逻辑：助记词、派生、地址、交易编码与结果汇总，不涉及网络

pub mod address;
pub mod amount;
pub mod derivation;
pub mod mnemonic;
pub mod report;
pub mod transaction;
pub mod transaction_status;

// 重新导出常用类型
pub use address::Address;
pub use derivation::{
    derive_private_seed, DerivationConvention, DerivationPath, DerivationStrategy,
    DerivedKeypair, StandardDerivation,
};
pub use mnemonic::SeedPhrase;
pub use report::{AccountOutcome, AccountReport, SkipReason, SweepReport, WalletReport};
pub use transaction_status::{ConfirmationOutcome, ConfirmationPolicy};
