//! 基础设施层：RPC、限流、取消、日志

pub mod cancel;
pub mod log_redact;
pub mod logging;
pub mod rate_limiter;
pub mod rpc_client;

pub use cancel::CancelFlag;
pub use rate_limiter::{Delay, RateLimiter, TokioDelay};
pub use rpc_client::{SendOptions, SignatureStatus, SolanaRpc, SolanaRpcClient};
