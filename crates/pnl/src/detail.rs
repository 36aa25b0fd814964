use crate::matcher::LotMatcher;
use crate::validate::validate_positions;
use folio_core::analytics::entity::{RealizedReport, StockDetail};
use folio_core::analytics::error::AnalyticsError;
use folio_core::common::{percentage, round_money};
use folio_core::ledger::entity::{Position, Trade};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// 按默认先进先出口径生成个股明细
pub fn compute_stock_details(
    trades: &[Trade],
    positions: &[Position],
) -> Result<Vec<StockDetail>, AnalyticsError> {
    validate_positions(positions)?;
    let report = LotMatcher::default().match_trades(trades)?;
    Ok(build_stock_details(positions, &report))
}

/// # Summary
/// 合并持仓快照与已实现盈亏，生成每个标的一行的明细。
///
/// # Logic
/// 1. 以持仓为种子行，带入浮动盈亏与快照字段。同一代码的多条持仓合并为一行，
///    成本价、最新价与盈亏率按合并后的总成本、总市值重新计算。
/// 2. 遍历匹配结果：已有行则并入已实现盈亏；已清仓的标的新建一行 (数量与价格为 0)。
/// 3. `total_profit_loss = 浮动 + 已实现`，按全精度降序排序后再统一舍入。
pub fn build_stock_details(positions: &[Position], report: &RealizedReport) -> Vec<StockDetail> {
    let mut rows: Vec<StockDetail> = Vec::with_capacity(positions.len() + report.results.len());
    let mut index: HashMap<String, usize> = HashMap::new();
    // 与 rows 下标对齐的持仓成本，仅覆盖持仓行
    let mut costs: Vec<Decimal> = Vec::with_capacity(positions.len());

    for p in positions {
        if let Some(&i) = index.get(&p.stock_code) {
            costs[i] += p.cost();
            let row = &mut rows[i];
            row.quantity += p.quantity;
            row.market_value += p.market_value;
            row.unrealized_profit_loss += p.profit_loss;
            row.total_profit_loss += p.profit_loss;
            if !row.quantity.is_zero() {
                row.cost_price = costs[i] / row.quantity;
                row.current_price = row.market_value / row.quantity;
            }
            row.profit_loss_rate = percentage(row.unrealized_profit_loss, costs[i]);
            continue;
        }
        index.insert(p.stock_code.clone(), rows.len());
        costs.push(p.cost());
        rows.push(StockDetail {
            stock_code: p.stock_code.clone(),
            stock_name: p.stock_name.clone(),
            holding: true,
            quantity: p.quantity,
            cost_price: p.cost_price,
            current_price: p.current_price,
            market_value: p.market_value,
            unrealized_profit_loss: p.profit_loss,
            realized_profit_loss: Decimal::ZERO,
            total_profit_loss: p.profit_loss,
            profit_loss_rate: p.profit_loss_rate,
        });
    }

    for (code, realized) in &report.results {
        match index.get(code) {
            Some(&i) => {
                let row = &mut rows[i];
                row.realized_profit_loss = realized.realized_profit_loss;
                row.total_profit_loss = row.unrealized_profit_loss + realized.realized_profit_loss;
            }
            None => {
                index.insert(code.clone(), rows.len());
                rows.push(StockDetail {
                    stock_code: code.clone(),
                    stock_name: realized.stock_name.clone(),
                    holding: false,
                    quantity: Decimal::ZERO,
                    cost_price: Decimal::ZERO,
                    current_price: Decimal::ZERO,
                    market_value: Decimal::ZERO,
                    unrealized_profit_loss: Decimal::ZERO,
                    realized_profit_loss: realized.realized_profit_loss,
                    total_profit_loss: realized.realized_profit_loss,
                    profit_loss_rate: Decimal::ZERO,
                });
            }
        }
    }

    rows.sort_by(|a, b| b.total_profit_loss.cmp(&a.total_profit_loss));
    rows.into_iter().map(round_row).collect()
}

fn round_row(row: StockDetail) -> StockDetail {
    StockDetail {
        cost_price: round_money(row.cost_price),
        current_price: round_money(row.current_price),
        market_value: round_money(row.market_value),
        unrealized_profit_loss: round_money(row.unrealized_profit_loss),
        realized_profit_loss: round_money(row.realized_profit_loss),
        total_profit_loss: round_money(row.total_profit_loss),
        profit_loss_rate: round_money(row.profit_loss_rate),
        ..row
    }
}
