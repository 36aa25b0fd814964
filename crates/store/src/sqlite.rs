use async_trait::async_trait;
use chrono::NaiveDate;
use folio_core::common::{UserId, decimal_from_f64, describe_unrepresentable};
use folio_core::ledger::entity::{Position, Trade, TradeRecord};
use folio_core::ledger::error::LedgerError;
use folio_core::ledger::port::{PositionSource, TradeLedger};
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::path::Path;
use tracing::{debug, info};

/// # Summary
/// 台账数据库的表结构。本适配器只读，建表由写入方负责；此处公开仅供初始化与测试使用。
pub const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS trades (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id TEXT NOT NULL,
        stock_code TEXT NOT NULL,
        stock_name TEXT,
        trade_type TEXT NOT NULL,
        price REAL NOT NULL,
        quantity INTEGER NOT NULL,
        amount REAL,
        fee REAL,
        trade_date TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS positions (
        user_id TEXT NOT NULL,
        stock_code TEXT NOT NULL,
        stock_name TEXT NOT NULL,
        quantity REAL NOT NULL,
        cost_price REAL NOT NULL,
        current_price REAL NOT NULL,
        market_value REAL NOT NULL,
        profit_loss REAL NOT NULL,
        profit_loss_rate REAL NOT NULL,
        PRIMARY KEY (user_id, stock_code)
    );
"#;

/// # Summary
/// `TradeLedger` 与 `PositionSource` 的 SQLite 只读实现。
///
/// # Invariants
/// * 连接以只读模式打开，绝不写入台账。
/// * 流水按自增主键 (即写入顺序) 返回。
pub struct SqliteLedgerStore {
    pool: SqlitePool,
}

fn db_err(e: sqlx::Error) -> LedgerError {
    LedgerError::Database(e.to_string())
}

fn real(row: &SqliteRow, column: &str) -> Result<Decimal, LedgerError> {
    let value: f64 = row.try_get(column).map_err(db_err)?;
    decimal_from_f64(value).ok_or_else(|| {
        LedgerError::InvalidRecord(format!(
            "{} {} ({})",
            column,
            describe_unrepresentable(value),
            value
        ))
    })
}

impl SqliteLedgerStore {
    /// 以只读方式连接已存在的台账数据库。
    ///
    /// # Logic
    /// 1. 数据库文件必须已存在，不自动创建。
    /// 2. 建立连接池。
    ///
    /// # Returns
    /// * `Result<Self, LedgerError>` - 存储实例或数据库错误。
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let path = path.as_ref();
        let options = SqliteConnectOptions::new()
            .filename(path)
            .read_only(true)
            .create_if_missing(false);

        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(db_err)?;
        info!("台账数据库已连接 (只读): {}", path.display());
        Ok(Self { pool })
    }

    /// 使用外部已建立的连接池
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn trade_from_row(row: &SqliteRow) -> Result<Trade, LedgerError> {
        let trade_date: String = row.try_get("trade_date").map_err(db_err)?;
        let trade_date = NaiveDate::parse_from_str(trade_date.trim(), "%Y-%m-%d")
            .map_err(|e| LedgerError::Parse(format!("trade_date {}: {}", trade_date, e)))?;

        let record = TradeRecord {
            stock_code: row.try_get("stock_code").map_err(db_err)?,
            stock_name: row.try_get("stock_name").map_err(db_err)?,
            trade_type: row.try_get("trade_type").map_err(db_err)?,
            price: row.try_get("price").map_err(db_err)?,
            quantity: row.try_get("quantity").map_err(db_err)?,
            amount: row.try_get("amount").map_err(db_err)?,
            fee: row.try_get("fee").map_err(db_err)?,
            trade_date,
        };
        Trade::try_from(record)
    }

    fn position_from_row(row: &SqliteRow) -> Result<Position, LedgerError> {
        Ok(Position {
            stock_code: row.try_get("stock_code").map_err(db_err)?,
            stock_name: row.try_get("stock_name").map_err(db_err)?,
            quantity: real(row, "quantity")?,
            cost_price: real(row, "cost_price")?,
            current_price: real(row, "current_price")?,
            market_value: real(row, "market_value")?,
            profit_loss: real(row, "profit_loss")?,
            profit_loss_rate: real(row, "profit_loss_rate")?,
        })
    }
}

#[async_trait]
impl TradeLedger for SqliteLedgerStore {
    async fn list_trades(&self, user_id: &UserId) -> Result<Vec<Trade>, LedgerError> {
        let rows = sqlx::query(
            "SELECT stock_code, stock_name, trade_type, price, quantity, amount, fee, trade_date \
             FROM trades WHERE user_id = ? ORDER BY id",
        )
        .bind(user_id.0.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        debug!("用户 {} 读取流水 {} 笔", user_id, rows.len());
        rows.iter().map(Self::trade_from_row).collect()
    }
}

#[async_trait]
impl PositionSource for SqliteLedgerStore {
    async fn list_positions(&self, user_id: &UserId) -> Result<Vec<Position>, LedgerError> {
        let rows = sqlx::query(
            "SELECT stock_code, stock_name, quantity, cost_price, current_price, market_value, \
             profit_loss, profit_loss_rate FROM positions WHERE user_id = ? ORDER BY stock_code",
        )
        .bind(user_id.0.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(Self::position_from_row).collect()
    }
}
