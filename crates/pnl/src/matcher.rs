use crate::validate::validate_trades;
use chrono::NaiveDate;
use folio_core::analytics::entity::{MatchPolicy, RealizedReport, RealizedResult, UnmatchedSell};
use folio_core::analytics::error::AnalyticsError;
use folio_core::ledger::entity::{Side, Trade};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, VecDeque};
use tracing::{debug, warn};

/// # Summary
/// 一笔尚未被完全消耗的买入批次，仅存在于单次计算内。
///
/// # Invariants
/// - `per_share_cost = (amount + fee) / 原始数量`，在建立时固定，部分消耗只减少数量。
struct Lot {
    remaining: i64,
    per_share_cost: Decimal,
    open_date: NaiveDate,
}

impl Lot {
    fn open(trade: &Trade) -> Self {
        Self {
            remaining: trade.quantity,
            per_share_cost: (trade.amount + trade.fee) / Decimal::from(trade.quantity),
            open_date: trade.trade_date,
        }
    }
}

/// 单一标的匹配过程中的累加器
struct Tally {
    profit: Decimal,
    loss: Decimal,
    matched: i64,
}

impl Tally {
    fn new() -> Self {
        Self {
            profit: Decimal::ZERO,
            loss: Decimal::ZERO,
            matched: 0,
        }
    }

    fn record(&mut self, leg_profit: Decimal, quantity: i64) {
        if leg_profit > Decimal::ZERO {
            self.profit += leg_profit;
        } else {
            self.loss -= leg_profit;
        }
        self.matched += quantity;
    }
}

/// # Summary
/// 先进先出批次匹配器，将无序的流水转换为逐标的已实现盈亏。
///
/// # Invariants
/// - 无状态：同一输入的重复调用产生完全相同的结果。
/// - 卖出找不到足够批次时不报错，剩余部分不计盈亏并记入诊断列表。
pub struct LotMatcher {
    policy: MatchPolicy,
}

impl Default for LotMatcher {
    fn default() -> Self {
        Self::new(MatchPolicy::Fifo)
    }
}

impl LotMatcher {
    pub fn new(policy: MatchPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    /// # Summary
    /// 对一个用户的全部流水执行批次匹配。
    ///
    /// # Logic
    /// 1. 校验流水，非法记录直接返回错误。
    /// 2. 按证券代码分组，保留台账内的原始顺序。
    /// 3. 每个标的独立匹配，见 `match_instrument`。
    ///
    /// # Arguments
    /// * `trades`: 可以是全量流水，也可以是截取后的窗口。
    ///
    /// # Returns
    /// 每个出现过流水的标的都有一条结果 (无卖出时已实现盈亏为 0)。
    pub fn match_trades(&self, trades: &[Trade]) -> Result<RealizedReport, AnalyticsError> {
        validate_trades(trades)?;

        let mut groups: BTreeMap<&str, Vec<&Trade>> = BTreeMap::new();
        for trade in trades {
            groups.entry(trade.stock_code.as_str()).or_default().push(trade);
        }

        let mut report = RealizedReport::default();
        for (code, group) in groups {
            let result = self.match_instrument(code, &group, &mut report.unmatched);
            report.results.insert(code.to_string(), result);
        }
        Ok(report)
    }

    /// # Logic
    /// 1. 拆分为开仓集合 (buy/add) 与平仓集合 (sell/reduce)。
    /// 2. 两个集合各自按日期稳定升序排序，互不参照。
    /// 3. 依卖出日期顺序，每笔卖出以 `(amount + fee) / quantity` 为每股所得，
    ///    从队首批次开始逐段消耗，`段盈亏 = (每股所得 - 批次每股成本) × 匹配数量`。
    /// 4. `StrictFifo` 下，开仓日晚于卖出日的批次不可用；由于队列按日期有序，
    ///    遇到第一个此类批次即停止。
    fn match_instrument(
        &self,
        code: &str,
        group: &[&Trade],
        unmatched: &mut Vec<UnmatchedSell>,
    ) -> RealizedResult {
        let (mut buys, mut sells): (Vec<&Trade>, Vec<&Trade>) = group
            .iter()
            .copied()
            .partition(|t| t.trade_type.side() == Side::Open);
        buys.sort_by_key(|t| t.trade_date);
        sells.sort_by_key(|t| t.trade_date);

        let mut lots: VecDeque<Lot> = buys.into_iter().map(Lot::open).collect();
        let mut tally = Tally::new();

        for sell in &sells {
            let sell_per_share = (sell.amount + sell.fee) / Decimal::from(sell.quantity);
            let mut remaining = sell.quantity;

            while remaining > 0 {
                let Some(lot) = lots.front_mut() else {
                    break;
                };
                if self.policy == MatchPolicy::StrictFifo && lot.open_date > sell.trade_date {
                    break;
                }

                let matched = remaining.min(lot.remaining);
                let leg_profit = (sell_per_share - lot.per_share_cost) * Decimal::from(matched);
                tally.record(leg_profit, matched);
                remaining -= matched;
                lot.remaining -= matched;

                if lot.remaining == 0 {
                    lots.pop_front();
                }
            }

            if remaining > 0 {
                warn!(
                    "{} 卖出 {} 股 ({}) 缺少可匹配批次，剩余 {} 股不计入已实现盈亏",
                    code, sell.quantity, sell.trade_date, remaining
                );
                unmatched.push(UnmatchedSell {
                    stock_code: code.to_string(),
                    trade_date: sell.trade_date,
                    quantity: remaining,
                });
            }
        }

        let stock_name = group
            .first()
            .map(|t| t.stock_name.clone())
            .unwrap_or_else(|| code.to_string());
        let realized = tally.profit - tally.loss;
        debug!(
            "{} 匹配完成: 卖出 {} 笔, 匹配 {} 股, 已实现盈亏 {}, 剩余批次 {}",
            code,
            sells.len(),
            tally.matched,
            realized,
            lots.len()
        );

        RealizedResult {
            stock_code: code.to_string(),
            stock_name,
            realized_profit_loss: realized,
            realized_profit: tally.profit,
            realized_loss: tally.loss,
            matched_quantity: tally.matched,
            sell_count: sells.len(),
        }
    }
}

/// 默认口径：买卖队列独立排序，不检查时序
pub fn compute_realized(trades: &[Trade]) -> Result<RealizedReport, AnalyticsError> {
    LotMatcher::new(MatchPolicy::Fifo).match_trades(trades)
}

/// 严格口径：卖出不会消耗在其之后才建立的批次
pub fn compute_realized_strict(trades: &[Trade]) -> Result<RealizedReport, AnalyticsError> {
    LotMatcher::new(MatchPolicy::StrictFifo).match_trades(trades)
}

pub fn compute_realized_with(
    trades: &[Trade],
    policy: MatchPolicy,
) -> Result<RealizedReport, AnalyticsError> {
    LotMatcher::new(policy).match_trades(trades)
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::ledger::entity::TradeType;
    use folio_core::test_utils::{trade, trade_with_fee};
    use rust_decimal_macros::dec;

    #[test]
    fn test_fifo_consumes_oldest_lot_first() {
        let trades = vec![
            trade("AAA", TradeType::Buy, 100, dec!(10), "2024-01-01"),
            trade("AAA", TradeType::Add, 100, dec!(12), "2024-01-05"),
            trade("AAA", TradeType::Sell, 150, dec!(15), "2024-02-01"),
        ];
        let report = compute_realized(&trades).unwrap();
        let aaa = report.get("AAA").unwrap();

        // (15-10)*100 + (15-12)*50
        assert_eq!(aaa.realized_profit_loss, dec!(650));
        assert_eq!(aaa.realized_profit, dec!(650));
        assert_eq!(aaa.realized_loss, dec!(0));
        assert_eq!(aaa.matched_quantity, 150);
        assert!(report.unmatched.is_empty());
    }

    #[test]
    fn test_ledger_order_does_not_matter() {
        let trades = vec![
            trade("AAA", TradeType::Sell, 150, dec!(15), "2024-02-01"),
            trade("AAA", TradeType::Add, 100, dec!(12), "2024-01-05"),
            trade("AAA", TradeType::Buy, 100, dec!(10), "2024-01-01"),
        ];
        let report = compute_realized(&trades).unwrap();
        assert_eq!(report.total(), dec!(650));
    }

    #[test]
    fn test_sell_without_lots_contributes_nothing() {
        let trades = vec![trade("AAA", TradeType::Sell, 50, dec!(15), "2024-02-01")];
        let report = compute_realized(&trades).unwrap();

        assert_eq!(report.get("AAA").unwrap().realized_profit_loss, dec!(0));
        assert_eq!(report.unmatched.len(), 1);
        assert_eq!(report.unmatched[0].quantity, 50);
    }

    #[test]
    fn test_partial_shortage_keeps_matched_part() {
        let trades = vec![
            trade("AAA", TradeType::Buy, 100, dec!(10), "2024-01-01"),
            trade("AAA", TradeType::Sell, 150, dec!(15), "2024-02-01"),
        ];
        let report = compute_realized(&trades).unwrap();
        assert_eq!(report.total(), dec!(500));
        assert_eq!(report.unmatched[0].quantity, 50);
    }

    #[test]
    fn test_fees_enter_lot_cost_and_sell_proceeds() {
        let trades = vec![
            trade_with_fee("AAA", TradeType::Buy, 100, dec!(10), dec!(5), "2024-01-01"),
            trade_with_fee("AAA", TradeType::Sell, 100, dec!(11), dec!(5), "2024-01-02"),
        ];
        let report = compute_realized(&trades).unwrap();
        // 每股成本 10.05, 每股所得 11.05
        assert_eq!(report.total(), dec!(100));
    }

    #[test]
    fn test_partial_consumption_keeps_per_share_cost() {
        let trades = vec![
            trade_with_fee("AAA", TradeType::Buy, 100, dec!(10), dec!(10), "2024-01-01"),
            trade("AAA", TradeType::Reduce, 40, dec!(12), "2024-01-02"),
            trade("AAA", TradeType::Reduce, 60, dec!(9), "2024-01-03"),
        ];
        let report = compute_realized(&trades).unwrap();
        let aaa = report.get("AAA").unwrap();
        // 每股成本 10.1: (12-10.1)*40 = 76, (9-10.1)*60 = -66
        assert_eq!(aaa.realized_profit, dec!(76));
        assert_eq!(aaa.realized_loss, dec!(66));
        assert_eq!(aaa.realized_profit_loss, dec!(10));
        assert_eq!(aaa.sell_count, 2);
    }

    #[test]
    fn test_instruments_are_independent() {
        let trades = vec![
            trade("AAA", TradeType::Buy, 10, dec!(10), "2024-01-01"),
            trade("BBB", TradeType::Buy, 10, dec!(20), "2024-01-01"),
            trade("BBB", TradeType::Sell, 10, dec!(18), "2024-01-02"),
        ];
        let report = compute_realized(&trades).unwrap();
        assert_eq!(report.get("AAA").unwrap().realized_profit_loss, dec!(0));
        assert_eq!(report.get("BBB").unwrap().realized_profit_loss, dec!(-20));
        assert_eq!(report.total_loss(), dec!(20));
    }

    #[test]
    fn test_default_matching_ignores_lot_dates() {
        let trades = vec![
            trade("AAA", TradeType::Sell, 100, dec!(15), "2024-01-15"),
            trade("AAA", TradeType::Buy, 100, dec!(10), "2024-02-01"),
        ];
        assert_eq!(compute_realized(&trades).unwrap().total(), dec!(500));

        let strict = compute_realized_strict(&trades).unwrap();
        assert_eq!(strict.total(), dec!(0));
        assert_eq!(strict.unmatched.len(), 1);
        assert_eq!(strict.unmatched[0].quantity, 100);
    }

    #[test]
    fn test_strict_matching_allows_same_day_lot() {
        let trades = vec![
            trade("AAA", TradeType::Buy, 100, dec!(10), "2024-01-15"),
            trade("AAA", TradeType::Buy, 100, dec!(11), "2024-03-01"),
            trade("AAA", TradeType::Sell, 150, dec!(15), "2024-01-15"),
        ];
        let strict = compute_realized_with(&trades, MatchPolicy::StrictFifo).unwrap();
        assert_eq!(strict.total(), dec!(500));
        assert_eq!(strict.unmatched[0].quantity, 50);
    }

    #[test]
    fn test_invalid_trade_aborts_matching() {
        let trades = vec![trade("AAA", TradeType::Sell, -5, dec!(15), "2024-01-15")];
        assert!(matches!(
            compute_realized(&trades),
            Err(AnalyticsError::Validation { .. })
        ));
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        let trades = vec![
            trade("AAA", TradeType::Buy, 3, dec!(10.33), "2024-01-01"),
            trade("AAA", TradeType::Sell, 2, dec!(11.17), "2024-01-02"),
        ];
        let matcher = LotMatcher::default();
        assert_eq!(
            matcher.match_trades(&trades).unwrap(),
            matcher.match_trades(&trades).unwrap()
        );
    }
}
