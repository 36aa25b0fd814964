use super::entity::{Position, Trade};
use super::error::LedgerError;
use crate::common::UserId;
use async_trait::async_trait;

/// # Summary
/// 交易台账读取接口 (Port)。
/// 核算引擎只通过此接口获取流水，不关心其来自数据库、文件还是内存。
///
/// # Invariants
/// - 返回的流水不保证任何顺序。
/// - 实现者必须在返回前完成缺省字段补齐 (见 `TradeRecord`)。
#[async_trait]
pub trait TradeLedger: Send + Sync {
    /// # Summary
    /// 读取指定用户的全部历史流水。
    ///
    /// # Arguments
    /// * `user_id`: 用户唯一标识。
    ///
    /// # Returns
    /// 流水列表 (可能为空) 或 `LedgerError`。
    async fn list_trades(&self, user_id: &UserId) -> Result<Vec<Trade>, LedgerError>;
}

/// # Summary
/// 当前持仓快照读取接口 (Port)。
/// 最新价与市值由上游行情缓存填充，以注入依赖的方式提供，便于测试时使用固定数据。
///
/// # Invariants
/// - 返回的 `profit_loss` / `profit_loss_rate` 由上游预先计算，调用方直接信任。
#[async_trait]
pub trait PositionSource: Send + Sync {
    /// # Summary
    /// 读取指定用户的当前持仓。
    ///
    /// # Arguments
    /// * `user_id`: 用户唯一标识。
    ///
    /// # Returns
    /// 持仓列表 (可能为空) 或 `LedgerError`。
    async fn list_positions(&self, user_id: &UserId) -> Result<Vec<Position>, LedgerError>;
}
