use super::entity::{
    CashFlowPoint, Distribution, Overview, Ranking, RealizedReport, StockDetail, TradeWindow,
    TrendGranularity,
};
use super::error::AnalyticsError;
use crate::common::UserId;
use async_trait::async_trait;

/// # Summary
/// 盈亏分析服务抽象接口。
/// 展示层通过此端口按用户获取各类分析视图，每次调用都会重新读取流水与持仓。
///
/// # Invariants
/// - 实现者不得在调用之间保留任何用户状态，相同快照的重复调用结果必须一致。
/// - 此接口必须是异步且线程安全的 (`Send + Sync`)。
#[async_trait]
pub trait AnalyticsPort: Send + Sync {
    /// 投资组合总览
    async fn overview(&self, user_id: &UserId) -> Result<Overview, AnalyticsError>;

    /// 个股盈亏明细，按总盈亏降序
    async fn stock_details(&self, user_id: &UserId) -> Result<Vec<StockDetail>, AnalyticsError>;

    /// 现金流口径的趋势序列，按日期升序
    async fn trend(
        &self,
        user_id: &UserId,
        granularity: TrendGranularity,
    ) -> Result<Vec<CashFlowPoint>, AnalyticsError>;

    /// # Summary
    /// 盈亏排行。
    ///
    /// # Arguments
    /// * `limit`: 每侧条目数，缺省时使用服务配置的默认值。
    async fn ranking(&self, user_id: &UserId, limit: Option<usize>)
    -> Result<Ranking, AnalyticsError>;

    /// 盈亏率分布
    async fn distribution(&self, user_id: &UserId) -> Result<Distribution, AnalyticsError>;

    /// # Summary
    /// 逐标的已实现盈亏及缺批次诊断。
    ///
    /// # Arguments
    /// * `window`: 可选的日期窗口，窗口外的流水不参与匹配。
    async fn realized(
        &self,
        user_id: &UserId,
        window: Option<TradeWindow>,
    ) -> Result<RealizedReport, AnalyticsError>;
}
