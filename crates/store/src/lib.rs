//! # folio-store
//!
//! `TradeLedger` / `PositionSource` 端口的只读适配器：
//! - [`memory`]: 进程内存，演示与测试用
//! - [`json`]: JSON 快照文件，每次请求重新读取
//! - [`sqlite`]: SQLite 数据库，以只读方式连接

pub mod json;
pub mod memory;
pub mod sqlite;
