//! # folio-pnl
//!
//! 持仓核算与盈亏引擎。
//!
//! - [`matcher`]: 先进先出批次匹配，产出逐标的已实现盈亏
//! - [`overview`] / [`detail`] / [`trend`] / [`ranking`]: 基于匹配结果与持仓快照的各类视图
//! - [`service`]: 通过台账端口取数并组装视图的应用服务
//!
//! 除 [`service`] 外均为纯同步函数，不持有跨调用状态。

pub mod detail;
pub mod matcher;
pub mod overview;
pub mod ranking;
pub mod service;
pub mod trend;
pub mod validate;

pub use detail::compute_stock_details;
pub use matcher::{compute_realized, compute_realized_strict, compute_realized_with, LotMatcher};
pub use overview::compute_overview;
pub use ranking::{classify_rate, compute_distribution, compute_ranking};
pub use service::{AnalyticsService, AnalyticsSettings};
pub use trend::{compute_trend, compute_trend_by};
pub use validate::{validate_positions, validate_trades};
