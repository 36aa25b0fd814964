use async_trait::async_trait;
use folio_core::common::UserId;
use folio_core::ledger::entity::{Position, Trade, TradeRecord};
use folio_core::ledger::error::LedgerError;
use folio_core::ledger::port::{PositionSource, TradeLedger};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

/// # Summary
/// JSON 快照文件的顶层结构。
///
/// ```json
/// { "users": { "alice": { "trades": [ ... ], "positions": [ ... ] } } }
/// ```
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    #[serde(default)]
    pub users: HashMap<String, UserLedger>,
}

/// 单个用户的流水与持仓
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UserLedger {
    #[serde(default)]
    pub trades: Vec<TradeRecord>,
    #[serde(default)]
    pub positions: Vec<Position>,
}

/// # Summary
/// 基于 JSON 快照文件的只读台账。
///
/// # Invariants
/// - 每次请求都重新读取文件，不缓存内容，文件被外部更新后立即可见。
/// - 流水在返回前经 `TradeRecord -> Trade` 转换，补齐缺省字段并校验。
pub struct JsonLedgerStore {
    path: PathBuf,
}

impl JsonLedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// # Logic
    /// 1. 异步读取整个文件。
    /// 2. 文件不存在映射为 `LedgerError::NotFound`，其余读取失败为 `Io`。
    /// 3. 反序列化为 `LedgerSnapshot`，格式错误映射为 `LedgerError::Parse`。
    async fn load(&self) -> Result<LedgerSnapshot, LedgerError> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            let detail = format!("{}: {}", self.path.display(), e);
            match e.kind() {
                std::io::ErrorKind::NotFound => LedgerError::NotFound(detail),
                _ => LedgerError::Io(detail),
            }
        })?;
        serde_json::from_slice(&bytes).map_err(|e| LedgerError::Parse(e.to_string()))
    }
}

#[async_trait]
impl TradeLedger for JsonLedgerStore {
    async fn list_trades(&self, user_id: &UserId) -> Result<Vec<Trade>, LedgerError> {
        let mut snapshot = self.load().await?;
        let Some(ledger) = snapshot.users.remove(&user_id.0) else {
            return Ok(Vec::new());
        };
        debug!("{} 读取用户 {} 流水 {} 笔", self.path.display(), user_id, ledger.trades.len());
        ledger.trades.into_iter().map(Trade::try_from).collect()
    }
}

#[async_trait]
impl PositionSource for JsonLedgerStore {
    async fn list_positions(&self, user_id: &UserId) -> Result<Vec<Position>, LedgerError> {
        let mut snapshot = self.load().await?;
        Ok(snapshot
            .users
            .remove(&user_id.0)
            .map(|l| l.positions)
            .unwrap_or_default())
    }
}
