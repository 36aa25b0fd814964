//! `folio` 命令行：读取台账，输出持仓盈亏分析结果 (JSON)。
//!
//! ```bash
//! folio --config folio.toml overview --user alice
//! folio ranking --user alice --limit 10
//! folio realized --user alice --from 2024-01-01 --to 2024-06-30 --strict
//! ```

mod settings;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use folio_core::analytics::entity::{MatchPolicy, TradeWindow, TrendGranularity};
use folio_core::analytics::port::AnalyticsPort;
use folio_core::common::UserId;
use folio_core::config::{AppConfig, LedgerBackend};
use folio_core::ledger::port::{PositionSource, TradeLedger};
use folio_pnl::{AnalyticsService, AnalyticsSettings};
use folio_store::json::JsonLedgerStore;
use folio_store::memory::MemoryLedgerStore;
use folio_store::sqlite::SqliteLedgerStore;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Position accounting & P&L analytics", long_about = None)]
#[command(version)]
struct Cli {
    /// 配置文件路径，缺省读取当前目录下的 folio.toml (可选)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// 用户标识
    #[arg(short, long, global = true)]
    user: Option<String>,

    /// 使用严格时序的先进先出匹配，覆盖配置
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 账户总览
    Overview,
    /// 个股明细
    Details,
    /// 现金流趋势
    Trend {
        /// 按月汇总 (缺省按日)
        #[arg(long)]
        monthly: bool,
    },
    /// 盈亏排行
    Ranking {
        /// 每侧条目数，缺省取配置值
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// 盈亏率分布
    Distribution,
    /// 已实现盈亏 (可按成交日期区间过滤)
    Realized {
        /// 起始日期 (YYYY-MM-DD，含)
        #[arg(short, long)]
        from: Option<NaiveDate>,
        /// 结束日期 (YYYY-MM-DD，含)
        #[arg(short, long)]
        to: Option<NaiveDate>,
    },
}

/// # Summary
/// 按配置构造台账适配器，同一实例同时提供流水与持仓两个端口。
async fn build_store(
    config: &AppConfig,
) -> anyhow::Result<(Arc<dyn TradeLedger>, Arc<dyn PositionSource>)> {
    let path = &config.ledger.path;
    let ports: (Arc<dyn TradeLedger>, Arc<dyn PositionSource>) = match config.ledger.backend {
        LedgerBackend::Memory => {
            warn!("使用内存台账后端: 进程内没有任何流水与持仓，所有结果均为空");
            let store = Arc::new(MemoryLedgerStore::new());
            (store.clone(), store)
        }
        LedgerBackend::Json => {
            let store = Arc::new(JsonLedgerStore::new(path));
            (store.clone(), store)
        }
        LedgerBackend::Sqlite => {
            let store = Arc::new(
                SqliteLedgerStore::connect(path)
                    .await
                    .with_context(|| format!("opening ledger database {}", path))?,
            );
            (store.clone(), store)
        }
    };
    Ok(ports)
}

async fn run(service: &AnalyticsService, user: &UserId, command: Commands) -> anyhow::Result<Value> {
    let value = match command {
        Commands::Overview => serde_json::to_value(service.overview(user).await?)?,
        Commands::Details => serde_json::to_value(service.stock_details(user).await?)?,
        Commands::Trend { monthly } => {
            let granularity = if monthly {
                TrendGranularity::Month
            } else {
                TrendGranularity::Day
            };
            serde_json::to_value(service.trend(user, granularity).await?)?
        }
        Commands::Ranking { limit } => serde_json::to_value(service.ranking(user, limit).await?)?,
        Commands::Distribution => serde_json::to_value(service.distribution(user).await?)?,
        Commands::Realized { from, to } => {
            let window = (from.is_some() || to.is_some()).then(|| TradeWindow::new(from, to));
            serde_json::to_value(service.realized(user, window).await?)?
        }
    };
    Ok(value)
}

/// # Summary
/// 应用启动入口，纯粹的 DI 容器。
///
/// # Logic
/// 1. 解析命令行并分层加载配置。
/// 2. 初始化全局日志。
/// 3. 按配置实例化台账适配器并注入 `AnalyticsService`。
/// 4. 执行子命令，将结果以 JSON 打印到 stdout。
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = settings::load_config(cli.config.as_deref()).context("loading configuration")?;
    let _guard = settings::init_tracing(&config.log)?;

    let user = UserId(cli.user.context("--user is required")?);
    let mut analytics = AnalyticsSettings::from(&config.analytics);
    if cli.strict {
        analytics.policy = MatchPolicy::StrictFifo;
    }
    info!(
        "台账后端 {:?} ({}), 匹配口径 {:?}",
        config.ledger.backend, config.ledger.path, analytics.policy
    );

    let (ledger, positions) = build_store(&config).await?;
    let service = AnalyticsService::new(ledger, positions, analytics);

    let output = run(&service, &user, cli.command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
