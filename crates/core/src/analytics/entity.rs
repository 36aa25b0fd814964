use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// # Summary
/// 批次匹配策略。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// 买卖两侧各自按日期排序后直接先进先出匹配，不检查批次开仓日是否早于卖出日。
    #[default]
    Fifo,
    /// 先进先出，但开仓日晚于卖出日的批次不参与该笔卖出的匹配。
    StrictFifo,
}

/// # Summary
/// 闭区间日期窗口，用于在匹配前截取流水。
///
/// # Invariants
/// - `start` / `end` 均可缺省，缺省表示该侧不设界。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeWindow {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl TradeWindow {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|s| date >= s) && self.end.is_none_or(|e| date <= e)
    }
}

/// # Summary
/// 一笔找不到足够批次可匹配的卖出 (例如其买入发生在查询窗口之前)。
/// 仅作为数据质量诊断输出，不影响任何盈亏数值。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmatchedSell {
    pub stock_code: String,
    pub trade_date: NaiveDate,
    /// 未能匹配的剩余股数
    pub quantity: i64,
}

/// # Summary
/// 单一标的的已实现盈亏 (先进先出匹配结果)。
///
/// # Invariants
/// - `realized_profit_loss == realized_profit - realized_loss`。
/// - `realized_profit`、`realized_loss` 均非负，分别为各匹配段盈利与亏损的绝对值之和。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealizedResult {
    pub stock_code: String,
    pub stock_name: String,
    pub realized_profit_loss: Decimal,
    pub realized_profit: Decimal,
    pub realized_loss: Decimal,
    /// 已完成匹配的卖出股数
    pub matched_quantity: i64,
    /// 参与匹配的卖出笔数
    pub sell_count: usize,
}

/// # Summary
/// 批次匹配器的完整输出：按代码排序的逐标的结果，以及缺批次卖出的诊断信息。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RealizedReport {
    pub results: BTreeMap<String, RealizedResult>,
    pub unmatched: Vec<UnmatchedSell>,
}

impl RealizedReport {
    pub fn get(&self, stock_code: &str) -> Option<&RealizedResult> {
        self.results.get(stock_code)
    }

    /// 全部标的已实现盈亏之和
    pub fn total(&self) -> Decimal {
        self.results.values().map(|r| r.realized_profit_loss).sum()
    }

    pub fn total_profit(&self) -> Decimal {
        self.results.values().map(|r| r.realized_profit).sum()
    }

    pub fn total_loss(&self) -> Decimal {
        self.results.values().map(|r| r.realized_loss).sum()
    }
}

/// 浮动盈亏汇总
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnrealizedSummary {
    pub profit: Decimal,
    pub loss: Decimal,
    pub total: Decimal,
    /// 浮动盈亏率 (%)，持仓成本为零时为 0
    pub rate: Decimal,
}

/// 已实现盈亏汇总
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealizedSummary {
    pub profit: Decimal,
    pub loss: Decimal,
    pub total: Decimal,
}

/// 持仓盈亏家数统计
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionStats {
    pub total: usize,
    pub profit: usize,
    pub loss: usize,
    pub flat: usize,
    /// 盈利家数占比 (%)，无持仓时为 0
    pub profit_rate: Decimal,
}

/// 流水笔数统计
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeStats {
    pub total: usize,
    /// 建仓 + 加仓
    pub buy: usize,
    /// 清仓 + 减仓
    pub sell: usize,
}

/// # Summary
/// 投资组合总览。
///
/// # Invariants
/// - 所有金额字段均已舍入到两位小数。
/// - `capital_ever_deployed = total_cost + Σ 开仓流水 amount`，表示历史累计投入过的资金，
///   会重复计算仍在持有的部分，不能当作持仓成本使用。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    pub unrealized: UnrealizedSummary,
    pub realized: RealizedSummary,
    /// 当前持仓成本 Σ quantity × cost_price
    pub total_cost: Decimal,
    pub total_market_value: Decimal,
    pub capital_ever_deployed: Decimal,
    /// 已实现 + 浮动
    pub total_profit_loss: Decimal,
    /// 总收益率 (%)，以 `capital_ever_deployed` 为分母
    pub total_return_rate: Decimal,
    pub position_stats: PositionStats,
    pub trade_stats: TradeStats,
    pub distribution: Distribution,
    pub unmatched_sells: Vec<UnmatchedSell>,
}

/// # Summary
/// 个股盈亏明细行。每个当前持有或有过流水的标的各一行。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockDetail {
    pub stock_code: String,
    pub stock_name: String,
    /// 是否仍有持仓
    pub holding: bool,
    pub quantity: Decimal,
    pub cost_price: Decimal,
    pub current_price: Decimal,
    pub market_value: Decimal,
    pub unrealized_profit_loss: Decimal,
    pub realized_profit_loss: Decimal,
    pub total_profit_loss: Decimal,
    pub profit_loss_rate: Decimal,
}

/// 趋势序列的时间粒度
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendGranularity {
    #[default]
    Day,
    /// 以当月 1 日作为桶日期
    Month,
}

/// # Summary
/// 现金流口径的趋势点。
///
/// # Invariants
/// - `cash_flow = sell_amount - buy_amount`，是现金流近似值，不是先进先出的已实现盈亏，
///   两者不可混用。对外序列化时沿用展示层字段名 `daily_profit` / `cumulative_profit`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowPoint {
    pub date: NaiveDate,
    pub buy_amount: Decimal,
    pub sell_amount: Decimal,
    pub buy_count: usize,
    pub sell_count: usize,
    #[serde(rename = "daily_profit")]
    pub cash_flow: Decimal,
    #[serde(rename = "cumulative_profit")]
    pub cumulative_cash_flow: Decimal,
}

/// 排行榜条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub stock_code: String,
    pub stock_name: String,
    pub profit_loss: Decimal,
    pub profit_loss_rate: Decimal,
    pub quantity: Decimal,
    pub cost_price: Decimal,
    pub current_price: Decimal,
}

/// # Summary
/// 盈亏排行。`top_losses` 从亏损最大者开始排列。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    pub top_profits: Vec<RankingEntry>,
    pub top_losses: Vec<RankingEntry>,
}

/// # Summary
/// 盈亏率分布的九个固定区间 (单位 %)，互不重叠。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DistributionBucket {
    /// `< -20`
    LossOver20,
    /// `[-20, -10)`
    Loss10To20,
    /// `[-10, -5)`
    Loss5To10,
    /// `[-5, 0)`
    Loss0To5,
    /// `== 0`
    Flat,
    /// `(0, 5)`
    Profit0To5,
    /// `[5, 10)`
    Profit5To10,
    /// `[10, 20]`，恰好 20 归入此区间
    Profit10To20,
    /// `> 20`
    ProfitOver20,
}

impl DistributionBucket {
    pub const ALL: [DistributionBucket; 9] = [
        DistributionBucket::LossOver20,
        DistributionBucket::Loss10To20,
        DistributionBucket::Loss5To10,
        DistributionBucket::Loss0To5,
        DistributionBucket::Flat,
        DistributionBucket::Profit0To5,
        DistributionBucket::Profit5To10,
        DistributionBucket::Profit10To20,
        DistributionBucket::ProfitOver20,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DistributionBucket::LossOver20 => "loss_over_20",
            DistributionBucket::Loss10To20 => "loss_10_to_20",
            DistributionBucket::Loss5To10 => "loss_5_to_10",
            DistributionBucket::Loss0To5 => "loss_0_to_5",
            DistributionBucket::Flat => "flat",
            DistributionBucket::Profit0To5 => "profit_0_to_5",
            DistributionBucket::Profit5To10 => "profit_5_to_10",
            DistributionBucket::Profit10To20 => "profit_10_to_20",
            DistributionBucket::ProfitOver20 => "profit_over_20",
        }
    }
}

/// # Summary
/// 各盈亏率区间的持仓家数。九个区间始终全部输出 (含零计数)，字段顺序即区间顺序。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    pub loss_over_20: usize,
    pub loss_10_to_20: usize,
    pub loss_5_to_10: usize,
    pub loss_0_to_5: usize,
    pub flat: usize,
    pub profit_0_to_5: usize,
    pub profit_5_to_10: usize,
    pub profit_10_to_20: usize,
    pub profit_over_20: usize,
}

impl Distribution {
    fn slot_mut(&mut self, bucket: DistributionBucket) -> &mut usize {
        match bucket {
            DistributionBucket::LossOver20 => &mut self.loss_over_20,
            DistributionBucket::Loss10To20 => &mut self.loss_10_to_20,
            DistributionBucket::Loss5To10 => &mut self.loss_5_to_10,
            DistributionBucket::Loss0To5 => &mut self.loss_0_to_5,
            DistributionBucket::Flat => &mut self.flat,
            DistributionBucket::Profit0To5 => &mut self.profit_0_to_5,
            DistributionBucket::Profit5To10 => &mut self.profit_5_to_10,
            DistributionBucket::Profit10To20 => &mut self.profit_10_to_20,
            DistributionBucket::ProfitOver20 => &mut self.profit_over_20,
        }
    }

    pub fn increment(&mut self, bucket: DistributionBucket) {
        *self.slot_mut(bucket) += 1;
    }

    pub fn get(&self, bucket: DistributionBucket) -> usize {
        match bucket {
            DistributionBucket::LossOver20 => self.loss_over_20,
            DistributionBucket::Loss10To20 => self.loss_10_to_20,
            DistributionBucket::Loss5To10 => self.loss_5_to_10,
            DistributionBucket::Loss0To5 => self.loss_0_to_5,
            DistributionBucket::Flat => self.flat,
            DistributionBucket::Profit0To5 => self.profit_0_to_5,
            DistributionBucket::Profit5To10 => self.profit_5_to_10,
            DistributionBucket::Profit10To20 => self.profit_10_to_20,
            DistributionBucket::ProfitOver20 => self.profit_over_20,
        }
    }

    /// 按区间顺序输出 `(label, count)`
    pub fn entries(&self) -> Vec<(&'static str, usize)> {
        DistributionBucket::ALL
            .iter()
            .map(|b| (b.label(), self.get(*b)))
            .collect()
    }

    pub fn total(&self) -> usize {
        DistributionBucket::ALL.iter().map(|b| self.get(*b)).sum()
    }
}
