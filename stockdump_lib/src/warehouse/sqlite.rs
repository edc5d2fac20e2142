//! SQLite target for local runs.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use rusqlite::{params, Connection};

use super::{Dialect, Warehouse, WarehouseError};
use crate::loader::WriteMode;
use crate::table::PriceTable;

pub struct SqliteWarehouse {
    path: PathBuf,
    conn: Mutex<Option<Connection>>,
}

impl SqliteWarehouse {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, WarehouseError> {
        let path = path.as_ref().to_path_buf();
        let conn = open_connection(&path)?;
        Ok(Self {
            path,
            conn: Mutex::new(Some(conn)),
        })
    }

    fn write_blocking(
        &self,
        table: &str,
        data: &PriceTable,
        mode: WriteMode,
    ) -> Result<u64, WarehouseError> {
        let dialect = self.dialect();
        let mut guard = self.conn.lock().map_err(|_| WarehouseError::Poisoned)?;
        let conn = guard.as_mut().ok_or(WarehouseError::Closed)?;

        let tx = conn.transaction()?;
        if mode == WriteMode::Overwrite {
            tx.execute(&dialect.drop_table_sql(table), [])?;
        }
        tx.execute(&dialect.create_table_sql(table), [])?;

        let mut written = 0u64;
        {
            let sql = format!("{}VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)", dialect.insert_prefix(table));
            let mut stmt = tx.prepare(&sql)?;
            for row in data.rows() {
                written += stmt.execute(params![
                    row.date,
                    row.company,
                    row.open,
                    row.close,
                    row.high,
                    row.low,
                    row.volume,
                ])? as u64;
            }
        }
        tx.commit()?;
        Ok(written)
    }
}

fn open_connection(path: &Path) -> Result<Connection, WarehouseError> {
    let conn = Connection::open(path)?;
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;",
    )?;
    Ok(conn)
}

fn apply_ddl(conn: &mut Connection, statements: &[String]) -> Result<(), WarehouseError> {
    let tx = conn.transaction()?;
    for statement in statements {
        tracing::debug!("{}", statement);
        tx.execute(statement, [])?;
    }
    tx.commit()?;
    Ok(())
}

#[async_trait]
impl Warehouse for SqliteWarehouse {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn describe(&self) -> String {
        format!("sqlite://{}", self.path.display())
    }

    async fn write_table(
        &self,
        table: &str,
        data: &PriceTable,
        mode: WriteMode,
    ) -> Result<u64, WarehouseError> {
        self.write_blocking(table, data, mode)
    }

    async fn run_ddl(&self, statements: &[String]) -> Result<(), WarehouseError> {
        let mut conn = open_connection(&self.path)?;
        let result = apply_ddl(&mut conn, statements);
        if let Err((_, e)) = conn.close() {
            tracing::warn!("Failed to close DDL connection: {}", e);
        }
        result
    }

    async fn close(&self) {
        let conn = match self.conn.lock() {
            Ok(mut guard) => guard.take(),
            Err(_) => return,
        };
        if let Some(conn) = conn {
            if let Err((_, e)) = conn.close() {
                tracing::warn!("Failed to close sqlite connection: {}", e);
            }
        }
    }
}
