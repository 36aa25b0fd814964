//! # folio-core
//!
//! 持仓核算与盈亏分析系统的领域核心层。
//! 只包含实体、端口 (Trait) 与错误定义，不包含任何具体实现。

pub mod common;
pub mod config;

pub mod ledger {
    pub mod entity;
    pub mod error;
    pub mod port;
}

pub mod analytics {
    pub mod entity;
    pub mod error;
    pub mod port;
}

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
