//! SQL targets for the bulk load.
//!
//! A [`Warehouse`] is the process-scoped database handle for a run: opened
//! once at startup, used for the table write and index DDL, and closed before
//! exit on every path.

mod mysql;
mod sqlite;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{Backend, DatabaseTarget};
use crate::loader::WriteMode;
use crate::table::{ColumnType, PriceTable, PRICE_SCHEMA};

pub use self::mysql::MySqlWarehouse;
pub use self::sqlite::SqliteWarehouse;

/// Fixed name of the target table.
pub const PRICE_TABLE: &str = "historical_stock_data";

/// Rows per multi-row INSERT statement.
pub(crate) const INSERT_BATCH_SIZE: usize = 500;

#[derive(Error, Debug)]
pub enum WarehouseError {
    #[error("mysql error: {0}")]
    MySql(#[from] sqlx::Error),
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("warehouse is closed")]
    Closed,
    #[error("connection lock poisoned")]
    Poisoned,
    #[error("invalid database target: {0}")]
    InvalidTarget(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    MySql,
    Sqlite,
}

impl Dialect {
    pub fn quote(self, ident: &str) -> String {
        match self {
            Self::MySql => format!("`{}`", ident),
            Self::Sqlite => format!("\"{}\"", ident),
        }
    }

    pub fn column_type(self, ty: ColumnType) -> &'static str {
        match (self, ty) {
            (_, ColumnType::Text) => "TEXT",
            (Self::MySql, ColumnType::Float) => "FLOAT",
            (Self::MySql, ColumnType::Int) => "INT",
            (Self::Sqlite, ColumnType::Float) => "REAL",
            (Self::Sqlite, ColumnType::Int) => "INTEGER",
        }
    }

    /// Whether index columns may carry a key prefix length (`Company(30)`).
    pub fn supports_prefix_index(self) -> bool {
        matches!(self, Self::MySql)
    }

    pub fn create_table_sql(self, table: &str) -> String {
        let columns: Vec<String> = PRICE_SCHEMA
            .iter()
            .map(|c| {
                let null = if c.nullable { "NULL" } else { "NOT NULL" };
                format!("{} {} {}", self.quote(c.name), self.column_type(c.ty), null)
            })
            .collect();
        format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            self.quote(table),
            columns.join(", ")
        )
    }

    pub fn drop_table_sql(self, table: &str) -> String {
        format!("DROP TABLE IF EXISTS {}", self.quote(table))
    }

    /// `INSERT INTO t (cols) ` with a trailing space, ready for a VALUES list.
    pub fn insert_prefix(self, table: &str) -> String {
        let columns: Vec<String> = PRICE_SCHEMA.iter().map(|c| self.quote(c.name)).collect();
        format!(
            "INSERT INTO {} ({}) ",
            self.quote(table),
            columns.join(", ")
        )
    }
}

/// Database handle used by the bulk loader.
#[async_trait]
pub trait Warehouse: Send + Sync {
    fn dialect(&self) -> Dialect;

    /// Human-readable location with no credentials, for logs.
    fn describe(&self) -> String;

    /// Write `data` to `table`, inserting every row in one transaction.
    ///
    /// `Append` creates the table if it is missing and adds rows. `Overwrite`
    /// drops and recreates the table first. A failed insert leaves none of
    /// `data` in the table. Returns the number of rows written.
    async fn write_table(
        &self,
        table: &str,
        data: &PriceTable,
        mode: WriteMode,
    ) -> Result<u64, WarehouseError>;

    /// Run `statements` in order on a fresh short-lived connection inside one
    /// transaction, committing after the last. The connection is closed
    /// whether or not a statement fails.
    async fn run_ddl(&self, statements: &[String]) -> Result<(), WarehouseError>;

    /// Release pooled connections. Idempotent.
    async fn close(&self);
}

/// Open the warehouse described by the `database` config section.
///
/// MySQL pools connect lazily, so an unreachable server surfaces at write
/// time rather than here.
pub fn open(target: &DatabaseTarget) -> Result<Box<dyn Warehouse>, WarehouseError> {
    let warehouse: Box<dyn Warehouse> = match target.backend {
        Backend::Mysql => Box::new(MySqlWarehouse::connect_lazy(target)?),
        Backend::Sqlite => {
            let path = target.path.as_ref().ok_or_else(|| {
                WarehouseError::InvalidTarget("sqlite backend requires database.path".to_string())
            })?;
            Box::new(SqliteWarehouse::open(path)?)
        }
    };
    tracing::info!("Using warehouse {}", warehouse.describe());
    Ok(warehouse)
}
