use async_trait::async_trait;
use dashmap::DashMap;
use folio_core::common::UserId;
use folio_core::ledger::entity::{Position, Trade};
use folio_core::ledger::error::LedgerError;
use folio_core::ledger::port::{PositionSource, TradeLedger};

/// # Summary
/// 基于 DashMap 的内存台账实现，同时提供流水与持仓两个端口。
///
/// # Invariants
/// - 流水按追加顺序保存，与真实台账的写入顺序一致。
/// - 未知用户返回空列表而不是错误。
pub struct MemoryLedgerStore {
    // 每个用户的流水，按写入顺序
    trades: DashMap<UserId, Vec<Trade>>,
    // 每个用户的最新持仓快照
    positions: DashMap<UserId, Vec<Position>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self {
            trades: DashMap::new(),
            positions: DashMap::new(),
        }
    }

    /// 追加一批流水
    pub fn append_trades(&self, user_id: &UserId, trades: impl IntoIterator<Item = Trade>) {
        self.trades.entry(user_id.clone()).or_default().extend(trades);
    }

    /// 整体替换某用户的持仓快照
    pub fn set_positions(&self, user_id: &UserId, positions: Vec<Position>) {
        self.positions.insert(user_id.clone(), positions);
    }
}

impl Default for MemoryLedgerStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TradeLedger for MemoryLedgerStore {
    async fn list_trades(&self, user_id: &UserId) -> Result<Vec<Trade>, LedgerError> {
        Ok(self
            .trades
            .get(user_id)
            .map(|v| v.value().clone())
            .unwrap_or_default())
    }
}

#[async_trait]
impl PositionSource for MemoryLedgerStore {
    async fn list_positions(&self, user_id: &UserId) -> Result<Vec<Position>, LedgerError> {
        Ok(self
            .positions
            .get(user_id)
            .map(|v| v.value().clone())
            .unwrap_or_default())
    }
}
