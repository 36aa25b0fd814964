use super::error::LedgerError;
use crate::common::{MAX_MONEY, MAX_QUANTITY, decimal_from_f64, describe_unrepresentable};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// # Summary
/// 交易流水的类型。
///
/// # Invariants
/// - `Buy` 与 `Add` 在核算上完全等价，均为开仓 (建立批次)。
/// - `Sell` 与 `Reduce` 在核算上完全等价，均为平仓 (消耗批次)。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeType {
    /// 建仓
    Buy,
    /// 加仓
    Add,
    /// 清仓
    Sell,
    /// 减仓
    Reduce,
}

/// # Summary
/// 交易流水在批次核算中的方向。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// 开仓，产生新的批次
    Open,
    /// 平仓，按先进先出消耗批次
    Close,
}

impl TradeType {
    pub fn side(&self) -> Side {
        match self {
            TradeType::Buy | TradeType::Add => Side::Open,
            TradeType::Sell | TradeType::Reduce => Side::Close,
        }
    }

    pub fn is_open(&self) -> bool {
        self.side() == Side::Open
    }
}

impl FromStr for TradeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "buy" => Ok(TradeType::Buy),
            "add" => Ok(TradeType::Add),
            "sell" => Ok(TradeType::Sell),
            "reduce" => Ok(TradeType::Reduce),
            _ => Err(format!("Unknown TradeType: {}", s)),
        }
    }
}

impl fmt::Display for TradeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeType::Buy => write!(f, "buy"),
            TradeType::Add => write!(f, "add"),
            TradeType::Sell => write!(f, "sell"),
            TradeType::Reduce => write!(f, "reduce"),
        }
    }
}

/// # Summary
/// 交易台账中的一条成交记录。一经记录即不可变，本系统只读。
///
/// # Invariants
/// - `quantity` 为正整数。
/// - `price`、`amount`、`fee` 均非负；`amount` 为成交总额 (不含费用)。
/// - `trade_date` 只精确到自然日，同日内不保证先后顺序。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// 证券代码
    pub stock_code: String,
    /// 证券名称
    pub stock_name: String,
    /// 交易类型
    pub trade_type: TradeType,
    /// 成交单价
    pub price: Decimal,
    /// 成交数量 (股)
    pub quantity: i64,
    /// 成交总额
    pub amount: Decimal,
    /// 手续费
    #[serde(default)]
    pub fee: Decimal,
    /// 成交日期
    pub trade_date: NaiveDate,
}

impl Trade {
    /// # Summary
    /// 检查单条流水是否满足核算前置条件。
    ///
    /// # Logic
    /// 除符号与非空检查外，数量与各金额字段还受 `MAX_QUANTITY` / `MAX_MONEY` 约束，
    /// 使后续所有累加都停留在 `Decimal` 的表示范围内。
    ///
    /// # Returns
    /// 合法返回 `None`，否则返回违反的规则描述。
    pub fn violation(&self) -> Option<&'static str> {
        if self.stock_code.trim().is_empty() {
            return Some("stock code is empty");
        }
        if self.quantity <= 0 {
            return Some("quantity must be positive");
        }
        if self.price < Decimal::ZERO {
            return Some("price must not be negative");
        }
        if self.amount < Decimal::ZERO {
            return Some("amount must not be negative");
        }
        if self.fee < Decimal::ZERO {
            return Some("fee must not be negative");
        }
        if self.quantity > MAX_QUANTITY {
            return Some("quantity exceeds the supported limit");
        }
        if self.price > MAX_MONEY || self.amount > MAX_MONEY || self.fee > MAX_MONEY {
            return Some("price, amount or fee exceeds the supported limit");
        }
        None
    }
}

/// # Summary
/// 外部台账读出的宽松流水形态 (字段可缺省、数值为浮点)。
/// 在进入核算前通过 `TryFrom` 统一补齐默认值并校验，算法内部不再处理空值。
///
/// # Logic
/// - `fee` 缺省为 0。
/// - `amount` 缺省为 `price × quantity`。
/// - `stock_name` 缺省为 `stock_code`。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    pub stock_code: String,
    #[serde(default)]
    pub stock_name: Option<String>,
    pub trade_type: String,
    pub price: f64,
    pub quantity: i64,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub fee: Option<f64>,
    pub trade_date: NaiveDate,
}

fn finite_decimal(field: &str, code: &str, value: f64) -> Result<Decimal, LedgerError> {
    decimal_from_f64(value).ok_or_else(|| {
        LedgerError::InvalidRecord(format!(
            "{}: {} {} ({})",
            code,
            field,
            describe_unrepresentable(value),
            value
        ))
    })
}

impl TryFrom<TradeRecord> for Trade {
    type Error = LedgerError;

    fn try_from(record: TradeRecord) -> Result<Self, Self::Error> {
        let code = record.stock_code.trim().to_string();
        let trade_type = record
            .trade_type
            .parse::<TradeType>()
            .map_err(|e| LedgerError::InvalidRecord(format!("{}: {}", code, e)))?;
        let price = finite_decimal("price", &code, record.price)?;
        let amount = match record.amount {
            Some(v) => finite_decimal("amount", &code, v)?,
            None => price.checked_mul(Decimal::from(record.quantity)).ok_or_else(|| {
                LedgerError::InvalidRecord(format!("{}: price × quantity overflows", code))
            })?,
        };
        let fee = match record.fee {
            Some(v) => finite_decimal("fee", &code, v)?,
            None => Decimal::ZERO,
        };
        let stock_name = record
            .stock_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| code.clone());

        let trade = Trade {
            stock_code: code,
            stock_name,
            trade_type,
            price,
            quantity: record.quantity,
            amount,
            fee,
            trade_date: record.trade_date,
        };
        if let Some(reason) = trade.violation() {
            return Err(LedgerError::InvalidRecord(format!(
                "{}: {}",
                trade.stock_code, reason
            )));
        }
        Ok(trade)
    }
}

/// # Summary
/// 某一标的的当前持仓快照，由上游存储层计算并提供。
///
/// # Invariants
/// - `profit_loss == market_value - quantity × cost_price`，本系统直接信任，不再重算。
/// - `profit_loss_rate` 为百分比数值 (20 表示 20%)。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub stock_code: String,
    pub stock_name: String,
    /// 持有数量
    pub quantity: Decimal,
    /// 持仓成本价
    pub cost_price: Decimal,
    /// 最新价
    pub current_price: Decimal,
    /// 最新市值
    pub market_value: Decimal,
    /// 浮动盈亏
    pub profit_loss: Decimal,
    /// 浮动盈亏率 (%)
    pub profit_loss_rate: Decimal,
}

impl Position {
    /// 持仓成本 `quantity × cost_price`
    pub fn cost(&self) -> Decimal {
        self.quantity * self.cost_price
    }
}
