use thiserror::Error;

/// # Summary
/// 台账读取层错误枚举，处理存储访问失败、记录缺失与脏数据等问题。
///
/// # Invariants
/// - 必须通过 `thiserror` 派生 `Error` trait。
#[derive(Error, Debug)]
pub enum LedgerError {
    /// 底层数据库访问失败
    #[error("Database error: {0}")]
    Database(String),
    /// 文件读取失败
    #[error("Io error: {0}")]
    Io(String),
    /// 数据格式无法解析
    #[error("Parse error: {0}")]
    Parse(String),
    /// 记录存在但字段不合法 (非有限数值、未知交易类型等)
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
    /// 台账数据源不存在 (文件缺失等)
    #[error("Ledger not found: {0}")]
    NotFound(String),
}
