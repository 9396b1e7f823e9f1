//! 转账确认状态
//!
//! 确认查询本身失败时，交易已经拿到签名（已提交），此时按乐观策略视为成功。
//! 用三态而不是 bool 表示，调用方和测试都能区分“真正确认”与“乐观兜底”。

use std::fmt;

use serde::{Deserialize, Serialize};

/// 一次确认查询的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationOutcome {
    /// 节点返回了确认状态且无执行错误
    Confirmed,
    /// 节点找不到该签名，或交易执行出错
    Failed,
    /// 确认查询本身出错（网络 / 超时），按已提交乐观处理
    UnknownAssumedSuccess,
}

impl ConfirmationOutcome {
    pub fn description(&self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Failed => "failed",
            Self::UnknownAssumedSuccess => "unconfirmed (assumed success)",
        }
    }

    /// 在给定策略下是否计为成功
    pub fn counts_as_success(&self, policy: ConfirmationPolicy) -> bool {
        match (self, policy) {
            (Self::Confirmed, _) => true,
            (Self::Failed, _) => false,
            (Self::UnknownAssumedSuccess, ConfirmationPolicy::Optimistic) => true,
            (Self::UnknownAssumedSuccess, ConfirmationPolicy::Strict) => false,
        }
    }
}

impl fmt::Display for ConfirmationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// 确认查询失败时的处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationPolicy {
    /// 查询失败视为成功（已拿到签名）
    #[default]
    Optimistic,
    /// 查询失败视为失败
    Strict,
}

impl ConfirmationPolicy {
    /// 从字符串解析（环境变量）
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "optimistic" => Some(Self::Optimistic),
            "strict" => Some(Self::Strict),
            _ => None,
        }
    }
}
