use folio_core::analytics::entity::{MatchPolicy, TradeWindow, TrendGranularity};
use folio_core::analytics::error::AnalyticsError;
use folio_core::analytics::port::AnalyticsPort;
use folio_core::common::UserId;
use folio_core::ledger::entity::{Trade, TradeType};
use folio_core::test_utils::{date, position, position_with_pnl, trade};
use folio_pnl::{AnalyticsService, AnalyticsSettings};
use folio_store::memory::MemoryLedgerStore;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

fn service_with(store: Arc<MemoryLedgerStore>, settings: AnalyticsSettings) -> AnalyticsService {
    AnalyticsService::new(store.clone(), store, settings)
}

fn seeded(user: &UserId, trades: Vec<Trade>) -> Arc<MemoryLedgerStore> {
    let store = Arc::new(MemoryLedgerStore::new());
    store.append_trades(user, trades);
    store
}

#[tokio::test]
async fn test_overview_single_profitable_holding() -> anyhow::Result<()> {
    let user = UserId::from("alice");
    let store = seeded(&user, vec![trade("AAA", TradeType::Buy, 100, dec!(10), "2024-01-02")]);
    store.set_positions(&user, vec![position("AAA", dec!(100), dec!(10), dec!(12))]);
    let service = service_with(store, AnalyticsSettings::default());

    let overview = service.overview(&user).await?;
    assert_eq!(overview.unrealized.total, dec!(200));
    assert_eq!(overview.unrealized.rate, dec!(20));
    assert_eq!(overview.realized.total, Decimal::ZERO);
    assert_eq!(overview.total_profit_loss, dec!(200));
    assert_eq!(overview.position_stats.profit, 1);
    assert_eq!(overview.position_stats.profit_rate, dec!(100));
    assert_eq!(overview.trade_stats.buy, 1);
    assert_eq!(overview.distribution.profit_10_to_20, 1);
    assert_eq!(overview.distribution.total(), 1);
    assert!(overview.unmatched_sells.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_unknown_user_yields_empty_views() -> anyhow::Result<()> {
    let service = service_with(Arc::new(MemoryLedgerStore::new()), AnalyticsSettings::default());
    let nobody = UserId::from("nobody");

    let overview = service.overview(&nobody).await?;
    assert_eq!(overview.total_profit_loss, Decimal::ZERO);
    assert_eq!(overview.total_return_rate, Decimal::ZERO);
    assert_eq!(overview.position_stats.total, 0);
    assert!(service.stock_details(&nobody).await?.is_empty());
    assert!(service.trend(&nobody, TrendGranularity::Day).await?.is_empty());
    let ranking = service.ranking(&nobody, None).await?;
    assert!(ranking.top_profits.is_empty() && ranking.top_losses.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_trade_limit_keeps_latest_trades() -> anyhow::Result<()> {
    let user = UserId::from("alice");
    let trades = vec![
        trade("AAA", TradeType::Buy, 100, dec!(10), "2024-01-01"),
        trade("AAA", TradeType::Sell, 100, dec!(12), "2024-01-02"),
    ];

    let full = service_with(seeded(&user, trades.clone()), AnalyticsSettings::default());
    assert_eq!(full.realized(&user, None).await?.total(), dec!(200));

    let truncated = service_with(
        seeded(&user, trades),
        AnalyticsSettings {
            trade_limit: Some(1),
            ..AnalyticsSettings::default()
        },
    );
    let report = truncated.realized(&user, None).await?;
    // 买入被截掉后卖出找不到批次，已实现盈亏少计
    assert_eq!(report.total(), Decimal::ZERO);
    assert_eq!(report.unmatched.len(), 1);
    assert_eq!(report.unmatched[0].quantity, 100);
    Ok(())
}

#[tokio::test]
async fn test_strict_policy_ignores_later_lots() -> anyhow::Result<()> {
    let user = UserId::from("alice");
    let trades = vec![
        trade("AAA", TradeType::Sell, 100, dec!(12), "2024-01-01"),
        trade("AAA", TradeType::Buy, 100, dec!(10), "2024-01-05"),
    ];

    let lenient = service_with(seeded(&user, trades.clone()), AnalyticsSettings::default());
    assert_eq!(lenient.settings().policy, MatchPolicy::Fifo);
    assert_eq!(lenient.realized(&user, None).await?.total(), dec!(200));

    let strict = service_with(
        seeded(&user, trades),
        AnalyticsSettings {
            policy: MatchPolicy::StrictFifo,
            ..AnalyticsSettings::default()
        },
    );
    let report = strict.realized(&user, None).await?;
    assert_eq!(report.total(), Decimal::ZERO);
    assert_eq!(report.unmatched.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_realized_window_filters_trades() -> anyhow::Result<()> {
    let user = UserId::from("alice");
    let service = service_with(
        seeded(
            &user,
            vec![
                trade("AAA", TradeType::Buy, 100, dec!(10), "2024-01-01"),
                trade("AAA", TradeType::Sell, 50, dec!(12), "2024-02-01"),
                trade("BBB", TradeType::Buy, 10, dec!(5), "2024-03-01"),
                trade("BBB", TradeType::Reduce, 10, dec!(6), "2024-03-05"),
            ],
        ),
        AnalyticsSettings::default(),
    );

    let all = service.realized(&user, None).await?;
    assert_eq!(all.total(), dec!(110));

    let march = service
        .realized(&user, Some(TradeWindow::new(Some(date("2024-03-01")), None)))
        .await?;
    assert_eq!(march.results.len(), 1);
    assert_eq!(march.get("BBB").map(|r| r.realized_profit_loss), Some(dec!(10)));

    let inverted = service
        .realized(
            &user,
            Some(TradeWindow::new(Some(date("2024-03-01")), Some(date("2024-01-01")))),
        )
        .await;
    assert!(matches!(inverted, Err(AnalyticsError::InvalidArgument(_))));
    Ok(())
}

#[tokio::test]
async fn test_ranking_uses_configured_default_limit() -> anyhow::Result<()> {
    let user = UserId::from("alice");
    let store = Arc::new(MemoryLedgerStore::new());
    store.set_positions(
        &user,
        vec![
            position_with_pnl("AAA", dec!(300), dec!(30)),
            position_with_pnl("BBB", dec!(-100), dec!(-10)),
            position_with_pnl("CCC", dec!(50), dec!(5)),
        ],
    );
    let service = service_with(
        store,
        AnalyticsSettings {
            ranking_limit: 2,
            ..AnalyticsSettings::default()
        },
    );

    let ranking = service.ranking(&user, None).await?;
    assert_eq!(ranking.top_profits.len(), 2);
    assert_eq!(ranking.top_profits[0].stock_code, "AAA");
    assert_eq!(ranking.top_losses[0].stock_code, "BBB");

    let wider = service.ranking(&user, Some(10)).await?;
    assert_eq!(wider.top_profits.len(), 3);

    let distribution = service.distribution(&user).await?;
    assert_eq!(distribution.profit_over_20, 1);
    assert_eq!(distribution.loss_5_to_10, 1);
    assert_eq!(distribution.profit_5_to_10, 1);
    Ok(())
}

#[tokio::test]
async fn test_monthly_trend() -> anyhow::Result<()> {
    let user = UserId::from("alice");
    let service = service_with(
        seeded(
            &user,
            vec![
                trade("AAA", TradeType::Buy, 100, dec!(10), "2024-01-03"),
                trade("AAA", TradeType::Sell, 50, dec!(12), "2024-01-20"),
                trade("BBB", TradeType::Buy, 10, dec!(5), "2024-02-02"),
            ],
        ),
        AnalyticsSettings::default(),
    );

    let points = service.trend(&user, TrendGranularity::Month).await?;
    assert_eq!(points.len(), 2);
    assert_eq!(points[0].date, date("2024-01-01"));
    assert_eq!(points[0].cash_flow, dec!(-400));
    assert_eq!(points[1].date, date("2024-02-01"));
    assert_eq!(points[1].cumulative_cash_flow, dec!(-450));
    Ok(())
}

#[tokio::test]
async fn test_invalid_trade_surfaces_validation_error() {
    let user = UserId::from("alice");
    let service = service_with(
        seeded(
            &user,
            vec![
                trade("AAA", TradeType::Buy, 100, dec!(10), "2024-01-01"),
                trade("AAA", TradeType::Sell, 0, dec!(12), "2024-01-02"),
            ],
        ),
        AnalyticsSettings::default(),
    );

    let res = service.overview(&user).await;
    assert!(matches!(res, Err(AnalyticsError::Validation { index: 1, .. })));
}
