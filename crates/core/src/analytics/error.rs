use crate::ledger::error::LedgerError;
use thiserror::Error;

/// # Summary
/// 盈亏分析环节中可能发生的错误。
///
/// # Invariants
/// - 数据不足 (卖出找不到批次) 不是错误，不会出现在此枚举中。
/// - 任何错误只中止本次请求的计算，不影响其他用户。
#[derive(Error, Debug)]
pub enum AnalyticsError {
    /// 流水字段非法，在匹配开始前即被拒绝
    #[error("Invalid trade #{index} ({stock_code}): {reason}")]
    Validation {
        index: usize,
        stock_code: String,
        reason: String,
    },
    /// 持仓快照字段非法
    #[error("Invalid position #{index}: {reason}")]
    InvalidPosition { index: usize, reason: String },
    /// 调用参数非法
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// 台账读取失败
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}
