use crate::analytics::entity::MatchPolicy;
use serde::{Deserialize, Serialize};

/// 全局应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub ledger: LedgerConfig,
    pub analytics: AnalyticsConfig,
    pub log: LogConfig,
}

/// 台账数据源类型
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerBackend {
    /// 进程内存，启动时为空，仅用于演示与测试
    Memory,
    /// JSON 快照文件
    #[default]
    Json,
    /// SQLite 数据库 (只读)
    Sqlite,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub backend: LedgerBackend,
    /// JSON 文件或 SQLite 数据库路径
    pub path: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            backend: LedgerBackend::Json,
            path: "data/ledger.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// 排行榜每侧默认条目数
    pub ranking_limit: usize,
    /// 为 true 时使用严格时序的先进先出匹配
    pub strict_ordering: bool,
    /// 只取最近 N 笔流水参与计算 (复现上游截断读取)，缺省为全部
    pub trade_limit: Option<usize>,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            ranking_limit: 5,
            strict_ordering: false,
            trade_limit: None,
        }
    }
}

impl AnalyticsConfig {
    pub fn match_policy(&self) -> MatchPolicy {
        if self.strict_ordering {
            MatchPolicy::StrictFifo
        } else {
            MatchPolicy::Fifo
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` 语法的日志级别，`RUST_LOG` 优先
    pub level: String,
    /// 设置后额外按天滚动写入该目录
    pub file_dir: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_dir: None,
        }
    }
}
