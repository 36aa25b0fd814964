use crate::validate::validate_trades;
use chrono::{Datelike, NaiveDate};
use folio_core::analytics::entity::{CashFlowPoint, TrendGranularity};
use folio_core::analytics::error::AnalyticsError;
use folio_core::common::round_money;
use folio_core::ledger::entity::{Side, Trade};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

#[derive(Default)]
struct Bucket {
    buy_amount: Decimal,
    sell_amount: Decimal,
    buy_count: usize,
    sell_count: usize,
}

fn bucket_date(date: NaiveDate, granularity: TrendGranularity) -> NaiveDate {
    match granularity {
        TrendGranularity::Day => date,
        TrendGranularity::Month => date.with_day(1).unwrap_or(date),
    }
}

/// 按日汇总的现金流趋势
pub fn compute_trend(trades: &[Trade]) -> Result<Vec<CashFlowPoint>, AnalyticsError> {
    compute_trend_by(trades, TrendGranularity::Day)
}

/// # Summary
/// 按指定粒度汇总现金流趋势。
///
/// # Logic
/// 1. 按成交日期 (或所在月份) 分桶，开仓流水计入买入金额与笔数，平仓流水计入卖出侧。
/// 2. 每桶 `cash_flow = 卖出金额 - 买入金额`，这只是现金流近似，不做批次匹配。
/// 3. 按日期升序累加得到 `cumulative_cash_flow`。
///
/// # Returns
/// 按日期升序的序列；无流水时为空。
pub fn compute_trend_by(
    trades: &[Trade],
    granularity: TrendGranularity,
) -> Result<Vec<CashFlowPoint>, AnalyticsError> {
    validate_trades(trades)?;

    let mut buckets: BTreeMap<NaiveDate, Bucket> = BTreeMap::new();
    for trade in trades {
        let bucket = buckets
            .entry(bucket_date(trade.trade_date, granularity))
            .or_default();
        match trade.trade_type.side() {
            Side::Open => {
                bucket.buy_amount += trade.amount;
                bucket.buy_count += 1;
            }
            Side::Close => {
                bucket.sell_amount += trade.amount;
                bucket.sell_count += 1;
            }
        }
    }

    let mut cumulative = Decimal::ZERO;
    let points = buckets
        .into_iter()
        .map(|(date, b)| {
            let cash_flow = b.sell_amount - b.buy_amount;
            cumulative += cash_flow;
            CashFlowPoint {
                date,
                buy_amount: round_money(b.buy_amount),
                sell_amount: round_money(b.sell_amount),
                buy_count: b.buy_count,
                sell_count: b.sell_count,
                cash_flow: round_money(cash_flow),
                cumulative_cash_flow: round_money(cumulative),
            }
        })
        .collect();
    Ok(points)
}
