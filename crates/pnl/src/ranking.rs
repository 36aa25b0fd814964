use folio_core::analytics::entity::{Distribution, DistributionBucket, Ranking, RankingEntry};
use folio_core::common::round_money;
use folio_core::ledger::entity::Position;
use rust_decimal::Decimal;

fn entry(p: &Position) -> RankingEntry {
    RankingEntry {
        stock_code: p.stock_code.clone(),
        stock_name: p.stock_name.clone(),
        profit_loss: round_money(p.profit_loss),
        profit_loss_rate: round_money(p.profit_loss_rate),
        quantity: p.quantity,
        cost_price: round_money(p.cost_price),
        current_price: round_money(p.current_price),
    }
}

/// # Summary
/// 按浮动盈亏生成盈利榜与亏损榜。
///
/// # Logic
/// 1. 按 `profit_loss` 稳定降序排列。
/// 2. 盈利榜取头部 `limit` 条；亏损榜取尾部 `limit` 条并反转，使亏损最大者排在最前。
///
/// # Arguments
/// * `limit`: 每侧条目数，持仓不足时取全部。
pub fn compute_ranking(positions: &[Position], limit: usize) -> Ranking {
    let mut sorted: Vec<&Position> = positions.iter().collect();
    sorted.sort_by(|a, b| b.profit_loss.cmp(&a.profit_loss));

    let take = limit.min(sorted.len());
    let top_profits = sorted.iter().take(take).map(|p| entry(p)).collect();
    let top_losses = sorted.iter().rev().take(take).map(|p| entry(p)).collect();

    Ranking {
        top_profits,
        top_losses,
    }
}

/// # Summary
/// 将盈亏率 (%) 归入九个固定区间之一。
///
/// # Invariants
/// - 恰好为 0 的只归入 `Flat`，不计入任何盈利或亏损区间。
/// - 亏损侧各区间包含其绝对值上界 (例如 -20 属于 `Loss10To20`)；
///   盈利侧 20 属于 `Profit10To20`，其余区间下界闭合。
pub fn classify_rate(rate: Decimal) -> DistributionBucket {
    let twenty = Decimal::from(20);
    let ten = Decimal::TEN;
    let five = Decimal::from(5);

    if rate.is_zero() {
        return DistributionBucket::Flat;
    }
    if rate < Decimal::ZERO {
        return if rate < -twenty {
            DistributionBucket::LossOver20
        } else if rate < -ten {
            DistributionBucket::Loss10To20
        } else if rate < -five {
            DistributionBucket::Loss5To10
        } else {
            DistributionBucket::Loss0To5
        };
    }
    if rate < five {
        DistributionBucket::Profit0To5
    } else if rate < ten {
        DistributionBucket::Profit5To10
    } else if rate <= twenty {
        DistributionBucket::Profit10To20
    } else {
        DistributionBucket::ProfitOver20
    }
}

/// # Summary
/// 统计各盈亏率区间的持仓家数，九个区间计数之和恒等于持仓数。
pub fn compute_distribution(positions: &[Position]) -> Distribution {
    let mut dist = Distribution::default();
    for p in positions {
        dist.increment(classify_rate(p.profit_loss_rate));
    }
    dist
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::test_utils::position_with_pnl;
    use rust_decimal_macros::dec;

    fn book() -> Vec<Position> {
        vec![
            position_with_pnl("A", dec!(50), dec!(5)),
            position_with_pnl("B", dec!(-300), dec!(-30)),
            position_with_pnl("C", dec!(120), dec!(12)),
            position_with_pnl("D", dec!(-10), dec!(-1)),
            position_with_pnl("E", dec!(0), dec!(0)),
            position_with_pnl("F", dec!(250), dec!(25)),
        ]
    }

    fn codes(entries: &[RankingEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.stock_code.as_str()).collect()
    }

    #[test]
    fn test_ranking_top_and_bottom() {
        let ranking = compute_ranking(&book(), 2);
        assert_eq!(codes(&ranking.top_profits), vec!["F", "C"]);
        assert_eq!(codes(&ranking.top_losses), vec!["B", "D"]);
    }

    #[test]
    fn test_top_losses_match_ascending_sort() {
        let positions = book();
        let ranking = compute_ranking(&positions, 3);

        let mut ascending = positions.clone();
        ascending.sort_by(|a, b| a.profit_loss.cmp(&b.profit_loss));
        let expected: Vec<&str> = ascending.iter().take(3).map(|p| p.stock_code.as_str()).collect();
        assert_eq!(codes(&ranking.top_losses), expected);
    }

    #[test]
    fn test_ranking_limit_larger_than_book() {
        let ranking = compute_ranking(&book(), 50);
        assert_eq!(ranking.top_profits.len(), 6);
        assert_eq!(ranking.top_losses.len(), 6);
        assert!(compute_ranking(&[], 5).top_profits.is_empty());
    }

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(classify_rate(dec!(-20.01)), DistributionBucket::LossOver20);
        assert_eq!(classify_rate(dec!(-20)), DistributionBucket::Loss10To20);
        assert_eq!(classify_rate(dec!(-10)), DistributionBucket::Loss5To10);
        assert_eq!(classify_rate(dec!(-5)), DistributionBucket::Loss0To5);
        assert_eq!(classify_rate(dec!(-0.01)), DistributionBucket::Loss0To5);
        assert_eq!(classify_rate(dec!(0.00)), DistributionBucket::Flat);
        assert_eq!(classify_rate(dec!(0.01)), DistributionBucket::Profit0To5);
        assert_eq!(classify_rate(dec!(5)), DistributionBucket::Profit5To10);
        assert_eq!(classify_rate(dec!(10)), DistributionBucket::Profit10To20);
        assert_eq!(classify_rate(dec!(20)), DistributionBucket::Profit10To20);
        assert_eq!(classify_rate(dec!(20.01)), DistributionBucket::ProfitOver20);
    }

    #[test]
    fn test_distribution_counts_sum_to_positions() {
        let positions = book();
        let dist = compute_distribution(&positions);
        assert_eq!(dist.total(), positions.len());
        assert_eq!(dist.flat, 1);
        assert_eq!(dist.loss_over_20, 1);
        assert_eq!(dist.loss_0_to_5, 1);
        assert_eq!(dist.profit_5_to_10, 1);
        assert_eq!(dist.profit_10_to_20, 1);
        assert_eq!(dist.profit_over_20, 1);
    }
}
