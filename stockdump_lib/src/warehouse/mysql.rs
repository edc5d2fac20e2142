//! MySQL-compatible target over sqlx.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlPool, MySqlPoolOptions};
use sqlx::{Connection, MySql, QueryBuilder};

use super::{Dialect, Warehouse, WarehouseError, INSERT_BATCH_SIZE};
use crate::config::DatabaseTarget;
use crate::loader::WriteMode;
use crate::table::{PriceRow, PriceTable};

/// Statement layout for one table write.
///
/// MySQL commits DROP and CREATE implicitly, ending any open transaction, so
/// `table_ddl` runs on its own before the transaction that holds every batch.
#[derive(Debug)]
struct WritePlan<'a> {
    table_ddl: Vec<String>,
    insert_prefix: String,
    batches: Vec<&'a [PriceRow]>,
}

impl<'a> WritePlan<'a> {
    fn new(dialect: Dialect, table: &str, data: &'a PriceTable, mode: WriteMode) -> Self {
        let mut table_ddl = Vec::with_capacity(2);
        if mode == WriteMode::Overwrite {
            table_ddl.push(dialect.drop_table_sql(table));
        }
        table_ddl.push(dialect.create_table_sql(table));
        Self {
            table_ddl,
            insert_prefix: dialect.insert_prefix(table),
            batches: data.rows().chunks(INSERT_BATCH_SIZE).collect(),
        }
    }
}

pub struct MySqlWarehouse {
    pool: MySqlPool,
    options: MySqlConnectOptions,
    url: String,
}

impl MySqlWarehouse {
    /// Build the pool without connecting.
    pub fn connect_lazy(target: &DatabaseTarget) -> Result<Self, WarehouseError> {
        let url = target.url();
        let options = MySqlConnectOptions::from_str(&url)
            .map_err(|e| WarehouseError::InvalidTarget(format!("{}: {}", url, e)))?
            .username(&target.user)
            .password(target.password.as_deref().unwrap_or_default());
        let pool = MySqlPoolOptions::new()
            .max_connections(2)
            .connect_lazy_with(options.clone());
        Ok(Self { pool, options, url })
    }
}

#[async_trait]
impl Warehouse for MySqlWarehouse {
    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    fn describe(&self) -> String {
        self.url.clone()
    }

    async fn write_table(
        &self,
        table: &str,
        data: &PriceTable,
        mode: WriteMode,
    ) -> Result<u64, WarehouseError> {
        let plan = WritePlan::new(self.dialect(), table, data, mode);

        for statement in &plan.table_ddl {
            sqlx::query(statement).execute(&self.pool).await?;
        }

        let mut tx = self.pool.begin().await?;
        let mut written = 0u64;
        for chunk in &plan.batches {
            let mut query_builder: QueryBuilder<MySql> = QueryBuilder::new(&plan.insert_prefix);
            query_builder.push_values(chunk.iter(), |mut b, row| {
                b.push_bind(row.date.clone())
                    .push_bind(row.company.clone())
                    .push_bind(row.open)
                    .push_bind(row.close)
                    .push_bind(row.high)
                    .push_bind(row.low)
                    .push_bind(row.volume);
            });
            written += query_builder.build().execute(&mut *tx).await?.rows_affected();
        }
        tx.commit().await?;
        Ok(written)
    }

    async fn run_ddl(&self, statements: &[String]) -> Result<(), WarehouseError> {
        let mut conn = MySqlConnection::connect_with(&self.options).await?;
        let result = run_in_transaction(&mut conn, statements).await;
        if let Err(e) = conn.close().await {
            tracing::warn!("Failed to close DDL connection: {}", e);
        }
        result
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

async fn run_in_transaction(
    conn: &mut MySqlConnection,
    statements: &[String],
) -> Result<(), WarehouseError> {
    let mut tx = conn.begin().await?;
    for statement in statements {
        tracing::debug!("{}", statement);
        sqlx::query(statement).execute(&mut *tx).await?;
    }
    tx.commit().await?;
    Ok(())
}
