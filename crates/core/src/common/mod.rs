use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// # Summary
/// 用户唯一标识。每个用户只对应一个单币种投资组合。
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        UserId(s.to_string())
    }
}

/// 对外展示的金额小数位数
pub const MONEY_SCALE: u32 = 2;

/// # Summary
/// 将金额舍入到展示精度。
///
/// # Logic
/// 1. 按四舍五入 (远离零) 保留两位小数。
/// 2. 重设 scale，保证输出恰好两位小数 (例如 `200` 输出为 `200.00`)。
///
/// # Arguments
/// * `value`: 全精度的内部计算结果。
///
/// # Returns
/// 恰好两位小数的金额。
pub fn round_money(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_SCALE);
    rounded
}

/// # Summary
/// 单笔流水的金额、单价、费用以及单条持仓各金额字段的绝对值上限 (1e15)。
///
/// # Invariants
/// - 任意条记录在此范围内累加，结果都远小于 `Decimal::MAX` (约 7.9e28)。
pub const MAX_MONEY: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// 单笔流水数量上限，保证逐标的累计匹配股数不会溢出 `i64`
pub const MAX_QUANTITY: i64 = 1_000_000_000_000;

/// # Summary
/// 计算百分比 `numerator / denominator × 100`。
///
/// # Invariants
/// - 分母为零时返回 0，绝不产生除零错误。
/// - 分母极小导致结果超出 `Decimal` 范围时同样返回 0，不会 panic。
pub fn percentage(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        return Decimal::ZERO;
    }
    numerator
        .checked_div(denominator)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(Decimal::ZERO)
}

/// # Summary
/// 将外部浮点数值转换为十进制金额。
///
/// # Logic
/// 经由最短十进制字符串转换，避免二进制浮点的尾差 (例如 `0.1` 得到精确的 `0.1`)。
///
/// # Returns
/// 非有限值 (NaN / Infinity) 或超出 `Decimal` 表示范围的值 (如 `1e30`) 返回 `None`，
/// 由调用方区分两种情况并决定报错方式，见 `describe_unrepresentable`。
pub fn decimal_from_f64(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    value
        .to_string()
        .parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::from_f64_retain(value))
}

/// 说明一个浮点值为何无法转换为 `Decimal`
pub fn describe_unrepresentable(value: f64) -> &'static str {
    if value.is_finite() {
        "is out of the supported numeric range"
    } else {
        "is not a finite number"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_money_fixes_scale() {
        assert_eq!(round_money(dec!(200)).to_string(), "200.00");
        assert_eq!(round_money(dec!(1.005)).to_string(), "1.01");
        assert_eq!(round_money(dec!(-1.005)).to_string(), "-1.01");
        assert_eq!(round_money(dec!(33.333333)).to_string(), "33.33");
    }

    #[test]
    fn test_percentage_zero_guard() {
        assert_eq!(percentage(dec!(200), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(percentage(dec!(200), dec!(1000)), dec!(20));
    }

    #[test]
    fn test_decimal_from_f64() {
        assert_eq!(decimal_from_f64(0.1), Some(dec!(0.1)));
        assert_eq!(decimal_from_f64(12.5), Some(dec!(12.5)));
        assert_eq!(decimal_from_f64(f64::NAN), None);
        assert_eq!(decimal_from_f64(f64::INFINITY), None);
        assert_eq!(decimal_from_f64(1e30), None);
    }

    #[test]
    fn test_unrepresentable_reasons_differ() {
        assert_eq!(describe_unrepresentable(f64::NAN), "is not a finite number");
        assert_eq!(describe_unrepresentable(1e30), "is out of the supported numeric range");
    }

    #[test]
    fn test_limits() {
        assert_eq!(MAX_MONEY, dec!(1000000000000000));
        assert_eq!(percentage(MAX_MONEY, dec!(0.0000000000000000000000000001)), Decimal::ZERO);
    }
}
