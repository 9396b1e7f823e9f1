//! 服务层：余额、价格、转账与编排

pub mod balance_service;
pub mod price_service;
pub mod sweep_orchestrator;
pub mod transfer_service;

pub use balance_service::BalanceOracle;
pub use price_service::{CoinGeckoFeed, PriceFeed, PriceOracle};
pub use sweep_orchestrator::{SweepJob, SweepOrchestrator, SweepSettings};
pub use transfer_service::{explorer_url, TransferEngine, TransferReceipt};
