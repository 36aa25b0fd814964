use crate::detail::build_stock_details;
use crate::matcher::LotMatcher;
use crate::overview::build_overview;
use crate::ranking::{compute_distribution, compute_ranking};
use crate::trend::compute_trend_by;
use crate::validate::validate_positions;
use async_trait::async_trait;
use folio_core::analytics::entity::{
    CashFlowPoint, Distribution, MatchPolicy, Overview, Ranking, RealizedReport, StockDetail,
    TradeWindow, TrendGranularity,
};
use folio_core::analytics::error::AnalyticsError;
use folio_core::analytics::port::AnalyticsPort;
use folio_core::common::UserId;
use folio_core::config::AnalyticsConfig;
use folio_core::ledger::entity::{Position, Trade};
use folio_core::ledger::port::{PositionSource, TradeLedger};
use std::sync::Arc;
use tracing::{debug, info};

/// # Summary
/// 分析服务的运行参数。
#[derive(Debug, Clone)]
pub struct AnalyticsSettings {
    /// 排行榜每侧默认条目数
    pub ranking_limit: usize,
    /// 批次匹配口径
    pub policy: MatchPolicy,
    /// 只保留台账中最近 N 笔流水
    pub trade_limit: Option<usize>,
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self::from(&AnalyticsConfig::default())
    }
}

impl From<&AnalyticsConfig> for AnalyticsSettings {
    fn from(config: &AnalyticsConfig) -> Self {
        Self {
            ranking_limit: config.ranking_limit,
            policy: config.match_policy(),
            trade_limit: config.trade_limit,
        }
    }
}

/// # Summary
/// `AnalyticsService` 是盈亏分析的应用服务入口，实现 `AnalyticsPort`。
/// 每次请求都通过注入的台账端口重新取数，再交给纯函数计算，自身不缓存任何用户数据。
///
/// # Invariants
/// - 不同用户、同一用户的并发请求互不影响。
/// - 流水与持仓分两次读取，两次读取之间的数据变化不做一致性保证。
pub struct AnalyticsService {
    ledger: Arc<dyn TradeLedger>,
    positions: Arc<dyn PositionSource>,
    settings: AnalyticsSettings,
}

impl AnalyticsService {
    pub fn new(
        ledger: Arc<dyn TradeLedger>,
        positions: Arc<dyn PositionSource>,
        settings: AnalyticsSettings,
    ) -> Self {
        Self {
            ledger,
            positions,
            settings,
        }
    }

    pub fn settings(&self) -> &AnalyticsSettings {
        &self.settings
    }

    fn matcher(&self) -> LotMatcher {
        LotMatcher::new(self.settings.policy)
    }

    /// # Logic
    /// 1. 从台账端口读取全部流水。
    /// 2. 若配置了 `trade_limit`，只保留按台账写入顺序的最后 N 笔。
    ///    截断会让部分卖出找不到批次，从而少计已实现盈亏，这是已知的近似。
    async fn load_trades(&self, user_id: &UserId) -> Result<Vec<Trade>, AnalyticsError> {
        let mut trades = self.ledger.list_trades(user_id).await?;
        if let Some(limit) = self.settings.trade_limit
            && trades.len() > limit
        {
            let dropped = trades.len() - limit;
            trades.drain(..dropped);
            debug!("用户 {} 流水截断: 丢弃最早的 {} 笔", user_id, dropped);
        }
        Ok(trades)
    }

    async fn load_positions(&self, user_id: &UserId) -> Result<Vec<Position>, AnalyticsError> {
        let positions = self.positions.list_positions(user_id).await?;
        validate_positions(&positions)?;
        Ok(positions)
    }
}

#[async_trait]
impl AnalyticsPort for AnalyticsService {
    async fn overview(&self, user_id: &UserId) -> Result<Overview, AnalyticsError> {
        let trades = self.load_trades(user_id).await?;
        let positions = self.load_positions(user_id).await?;
        let report = self.matcher().match_trades(&trades)?;
        let overview = build_overview(&trades, &positions, &report);
        info!(
            "用户 {} 总览: 持仓 {} 个, 流水 {} 笔, 总盈亏 {}",
            user_id,
            positions.len(),
            trades.len(),
            overview.total_profit_loss
        );
        Ok(overview)
    }

    async fn stock_details(&self, user_id: &UserId) -> Result<Vec<StockDetail>, AnalyticsError> {
        let trades = self.load_trades(user_id).await?;
        let positions = self.load_positions(user_id).await?;
        let report = self.matcher().match_trades(&trades)?;
        let rows = build_stock_details(&positions, &report);
        info!("用户 {} 个股明细: {} 行", user_id, rows.len());
        Ok(rows)
    }

    async fn trend(
        &self,
        user_id: &UserId,
        granularity: TrendGranularity,
    ) -> Result<Vec<CashFlowPoint>, AnalyticsError> {
        let trades = self.load_trades(user_id).await?;
        let points = compute_trend_by(&trades, granularity)?;
        info!("用户 {} 趋势 ({:?}): {} 个点", user_id, granularity, points.len());
        Ok(points)
    }

    async fn ranking(
        &self,
        user_id: &UserId,
        limit: Option<usize>,
    ) -> Result<Ranking, AnalyticsError> {
        let limit = limit.unwrap_or(self.settings.ranking_limit);
        let positions = self.load_positions(user_id).await?;
        info!("用户 {} 排行: 每侧 {} 条", user_id, limit);
        Ok(compute_ranking(&positions, limit))
    }

    async fn distribution(&self, user_id: &UserId) -> Result<Distribution, AnalyticsError> {
        let positions = self.load_positions(user_id).await?;
        Ok(compute_distribution(&positions))
    }

    async fn realized(
        &self,
        user_id: &UserId,
        window: Option<TradeWindow>,
    ) -> Result<RealizedReport, AnalyticsError> {
        let mut trades = self.load_trades(user_id).await?;
        if let Some(window) = window {
            if let (Some(start), Some(end)) = (window.start, window.end)
                && start > end
            {
                return Err(AnalyticsError::InvalidArgument(format!(
                    "window start {} is after end {}",
                    start, end
                )));
            }
            trades.retain(|t| window.contains(t.trade_date));
        }
        let report = self.matcher().match_trades(&trades)?;
        info!(
            "用户 {} 已实现盈亏: {} 个标的, 合计 {}, 缺批次卖出 {} 笔",
            user_id,
            report.results.len(),
            report.total(),
            report.unmatched.len()
        );
        Ok(report)
    }
}
