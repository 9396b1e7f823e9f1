//! 统一错误类型
//!
//! 本地、确定性的错误（助记词 / 路径 / 地址）永远不会重试；
//! RPC 错误由调用方决定是否降级（余额查询 → 未知，确认查询 → 乐观成功）。

use thiserror::Error;

/// 错误代码（用于日志与报告中的稳定标识）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepErrorCode {
    InvalidMnemonic,
    InvalidPath,
    InvalidAddress,
    RpcUnavailable,
    Transaction,
}

impl SweepErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SweepErrorCode::InvalidMnemonic => "invalid_mnemonic",
            SweepErrorCode::InvalidPath => "invalid_path",
            SweepErrorCode::InvalidAddress => "invalid_address",
            SweepErrorCode::RpcUnavailable => "rpc_unavailable",
            SweepErrorCode::Transaction => "transaction_error",
        }
    }
}

#[derive(Debug, Error)]
pub enum SweepError {
    /// 空助记词、未知单词、单词数量错误或校验和失败
    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    /// 非数字段、索引 >= 0x80000000、缺少 `m/` 前缀，或 ed25519 下的非硬化段
    #[error("invalid derivation path: {0}")]
    InvalidPath(String),

    /// 非 base58 字符或解码后长度不是 32 字节
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// RPC 节点不可用或返回错误
    #[error("rpc unavailable: {0}")]
    RpcUnavailable(String),

    /// 交易构建失败（例如金额为 0）
    #[error("transaction error: {0}")]
    Transaction(String),
}

impl SweepError {
    pub fn code(&self) -> SweepErrorCode {
        match self {
            SweepError::InvalidMnemonic(_) => SweepErrorCode::InvalidMnemonic,
            SweepError::InvalidPath(_) => SweepErrorCode::InvalidPath,
            SweepError::InvalidAddress(_) => SweepErrorCode::InvalidAddress,
            SweepError::RpcUnavailable(_) => SweepErrorCode::RpcUnavailable,
            SweepError::Transaction(_) => SweepErrorCode::Transaction,
        }
    }

    /// 把 anyhow 形式的 RPC 失败收敛为 `RpcUnavailable`
    pub fn rpc(err: anyhow::Error) -> Self {
        SweepError::RpcUnavailable(format!("{:#}", err))
    }
}

pub type SweepResult<T> = Result<T, SweepError>;
