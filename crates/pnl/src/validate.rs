use folio_core::analytics::error::AnalyticsError;
use folio_core::common::MAX_MONEY;
use folio_core::ledger::entity::{Position, Trade};

/// # Summary
/// 在匹配前校验整批流水，遇到第一条非法记录即中止。
///
/// # Logic
/// 逐条调用 `Trade::violation`，数量非正、价格/金额/费用为负或超出上限、代码为空均被拒绝，
/// 不做任何静默修正。
///
/// # Returns
/// 全部合法返回 Ok，否则返回携带下标与代码的 `AnalyticsError::Validation`。
pub fn validate_trades(trades: &[Trade]) -> Result<(), AnalyticsError> {
    for (index, trade) in trades.iter().enumerate() {
        if let Some(reason) = trade.violation() {
            return Err(AnalyticsError::Validation {
                index,
                stock_code: trade.stock_code.clone(),
                reason: reason.to_string(),
            });
        }
    }
    Ok(())
}

/// # Summary
/// 校验持仓快照。除代码非空外，快照的盈亏口径直接信任，只限制数值量级。
///
/// # Logic
/// 1. 证券代码不能为空。
/// 2. 持仓成本 `quantity × cost_price`、市值与浮动盈亏的绝对值不能超过 `MAX_MONEY`，
///    保证汇总时不会溢出。
pub fn validate_positions(positions: &[Position]) -> Result<(), AnalyticsError> {
    for (index, p) in positions.iter().enumerate() {
        if let Some(reason) = position_violation(p) {
            return Err(AnalyticsError::InvalidPosition {
                index,
                reason: reason.to_string(),
            });
        }
    }
    Ok(())
}

fn position_violation(p: &Position) -> Option<&'static str> {
    if p.stock_code.trim().is_empty() {
        return Some("stock code is empty");
    }
    let cost_in_range = p
        .quantity
        .checked_mul(p.cost_price)
        .is_some_and(|cost| cost.abs() <= MAX_MONEY);
    if !cost_in_range || p.market_value.abs() > MAX_MONEY || p.profit_loss.abs() > MAX_MONEY {
        return Some("position values exceed the supported limit");
    }
    None
}
