use crate::matcher::LotMatcher;
use crate::ranking::compute_distribution;
use crate::validate::validate_positions;
use folio_core::analytics::entity::{
    Overview, PositionStats, RealizedReport, RealizedSummary, TradeStats, UnrealizedSummary,
};
use folio_core::analytics::error::AnalyticsError;
use folio_core::common::{percentage, round_money};
use folio_core::ledger::entity::{Position, Trade};
use rust_decimal::Decimal;
use std::cmp::Ordering;

/// # Summary
/// 按默认先进先出口径计算投资组合总览。
pub fn compute_overview(trades: &[Trade], positions: &[Position]) -> Result<Overview, AnalyticsError> {
    validate_positions(positions)?;
    let report = LotMatcher::default().match_trades(trades)?;
    Ok(build_overview(trades, positions, &report))
}

/// # Summary
/// 用已有的匹配结果组装总览 (持仓须已通过 `validate_positions`)，供服务层在自选匹配口径时复用。
///
/// # Logic
/// 1. 浮动部分：按持仓盈亏符号拆分盈利与亏损，盈亏率以持仓成本为分母。
/// 2. 已实现部分：直接取匹配结果的汇总。
/// 3. `capital_ever_deployed = 持仓成本 + Σ 开仓流水 amount`，总收益率以其为分母。
/// 4. 所有比率在分母为零时取 0；金额在最后一步统一舍入。
pub fn build_overview(trades: &[Trade], positions: &[Position], report: &RealizedReport) -> Overview {
    let mut unrealized_profit = Decimal::ZERO;
    let mut unrealized_loss = Decimal::ZERO;
    let mut total_cost = Decimal::ZERO;
    let mut total_market_value = Decimal::ZERO;
    let mut stats = PositionStats {
        total: positions.len(),
        profit: 0,
        loss: 0,
        flat: 0,
        profit_rate: Decimal::ZERO,
    };

    for p in positions {
        total_cost += p.cost();
        total_market_value += p.market_value;
        match p.profit_loss.cmp(&Decimal::ZERO) {
            Ordering::Greater => {
                unrealized_profit += p.profit_loss;
                stats.profit += 1;
            }
            Ordering::Less => {
                unrealized_loss -= p.profit_loss;
                stats.loss += 1;
            }
            Ordering::Equal => stats.flat += 1,
        }
    }
    stats.profit_rate = round_money(percentage(
        Decimal::from(stats.profit),
        Decimal::from(stats.total),
    ));

    let unrealized_total = unrealized_profit - unrealized_loss;
    let realized_total = report.total();

    let opened_amount: Decimal = trades
        .iter()
        .filter(|t| t.trade_type.is_open())
        .map(|t| t.amount)
        .sum();
    let capital_ever_deployed = total_cost + opened_amount;
    let total_profit_loss = realized_total + unrealized_total;

    let buy_count = trades.iter().filter(|t| t.trade_type.is_open()).count();
    let trade_stats = TradeStats {
        total: trades.len(),
        buy: buy_count,
        sell: trades.len() - buy_count,
    };

    Overview {
        unrealized: UnrealizedSummary {
            profit: round_money(unrealized_profit),
            loss: round_money(unrealized_loss),
            total: round_money(unrealized_total),
            rate: round_money(percentage(unrealized_total, total_cost)),
        },
        realized: RealizedSummary {
            profit: round_money(report.total_profit()),
            loss: round_money(report.total_loss()),
            total: round_money(realized_total),
        },
        total_cost: round_money(total_cost),
        total_market_value: round_money(total_market_value),
        capital_ever_deployed: round_money(capital_ever_deployed),
        total_profit_loss: round_money(total_profit_loss),
        total_return_rate: round_money(percentage(total_profit_loss, capital_ever_deployed)),
        position_stats: stats,
        trade_stats,
        distribution: compute_distribution(positions),
        unmatched_sells: report.unmatched.clone(),
    }
}
