//! 测试用固定数据构造器。仅在 `test-utils` feature 下对外可见。

use crate::ledger::entity::{Position, Trade, TradeType};
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// 解析 `YYYY-MM-DD`，格式错误时退回 1970-01-01
pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap_or_default()
}

/// # Summary
/// 构造一条流水，`amount = price × quantity`，无手续费。
pub fn trade(code: &str, trade_type: TradeType, quantity: i64, price: Decimal, day: &str) -> Trade {
    Trade {
        stock_code: code.to_string(),
        stock_name: format!("{} Corp", code),
        trade_type,
        price,
        quantity,
        amount: price * Decimal::from(quantity),
        fee: Decimal::ZERO,
        trade_date: date(day),
    }
}

/// 在 `trade` 基础上附加手续费
pub fn trade_with_fee(
    code: &str,
    trade_type: TradeType,
    quantity: i64,
    price: Decimal,
    fee: Decimal,
    day: &str,
) -> Trade {
    Trade {
        fee,
        ..trade(code, trade_type, quantity, price, day)
    }
}

/// # Summary
/// 构造一条持仓快照，市值、浮动盈亏与盈亏率按上游口径一致地推导。
pub fn position(code: &str, quantity: Decimal, cost_price: Decimal, current_price: Decimal) -> Position {
    let market_value = quantity * current_price;
    let cost = quantity * cost_price;
    let profit_loss = market_value - cost;
    let profit_loss_rate = if cost.is_zero() {
        Decimal::ZERO
    } else {
        profit_loss / cost * Decimal::ONE_HUNDRED
    };
    Position {
        stock_code: code.to_string(),
        stock_name: format!("{} Corp", code),
        quantity,
        cost_price,
        current_price,
        market_value,
        profit_loss,
        profit_loss_rate,
    }
}

/// 直接指定浮动盈亏与盈亏率的持仓，用于排行与分布测试
pub fn position_with_pnl(code: &str, profit_loss: Decimal, profit_loss_rate: Decimal) -> Position {
    let market_value = Decimal::ONE_THOUSAND + profit_loss;
    Position {
        stock_code: code.to_string(),
        stock_name: format!("{} Corp", code),
        quantity: Decimal::ONE_HUNDRED,
        cost_price: Decimal::TEN,
        current_price: market_value / Decimal::ONE_HUNDRED,
        market_value,
        profit_loss,
        profit_loss_rate,
    }
}
