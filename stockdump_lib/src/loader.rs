//! Bulk load of a [`PriceTable`] plus index maintenance on full reloads.

use serde::Serialize;
use thiserror::Error;

use crate::table::PriceTable;
use crate::warehouse::{Dialect, Warehouse, WarehouseError, PRICE_TABLE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    /// Add rows, leaving existing rows and indexes alone.
    Append,
    /// Replace the table, then rebuild its indexes.
    Overwrite,
}

/// A secondary index on the price table. Each column carries the key prefix
/// length used where the dialect needs one for TEXT columns.
#[derive(Debug, Clone, Copy)]
pub struct IndexDef {
    pub name: &'static str,
    pub columns: &'static [(&'static str, u32)],
}

/// Indexes created after an overwrite, in creation order.
pub const PRICE_INDEXES: [IndexDef; 3] = [
    IndexDef {
        name: "idx_company_date",
        columns: &[("Company", 30), ("Date", 10)],
    },
    IndexDef {
        name: "idx_date",
        columns: &[("Date", 10)],
    },
    IndexDef {
        name: "idx_company",
        columns: &[("Company", 30)],
    },
];

impl IndexDef {
    pub fn create_sql(&self, dialect: Dialect, table: &str) -> String {
        let columns: Vec<String> = self
            .columns
            .iter()
            .map(|(name, prefix)| {
                if dialect.supports_prefix_index() {
                    format!("{}({})", name, prefix)
                } else {
                    name.to_string()
                }
            })
            .collect();
        format!(
            "CREATE INDEX {} ON {} ({})",
            self.name,
            table,
            columns.join(", ")
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoadOutcome {
    Written { rows: u64, indexes_created: usize },
    WriteFailed { reason: String },
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to create indexes on {table}: {source}")]
    Index {
        table: String,
        #[source]
        source: WarehouseError,
    },
}

pub struct BulkLoader<'a> {
    warehouse: &'a dyn Warehouse,
    table: &'static str,
}

impl<'a> BulkLoader<'a> {
    pub fn new(warehouse: &'a dyn Warehouse) -> Self {
        Self {
            warehouse,
            table: PRICE_TABLE,
        }
    }

    /// The DDL an overwrite issues after the write, in order.
    pub fn index_statements(&self) -> Vec<String> {
        let dialect = self.warehouse.dialect();
        PRICE_INDEXES
            .iter()
            .map(|index| index.create_sql(dialect, self.table))
            .collect()
    }

    /// Write `data` under `mode`.
    ///
    /// A failed write is logged and reported as [`LoadOutcome::WriteFailed`];
    /// it is never retried and never skips to index creation. A failed index
    /// statement after a successful overwrite is returned as an error.
    pub async fn load(&self, data: &PriceTable, mode: WriteMode) -> Result<LoadOutcome, LoadError> {
        tracing::info!(
            "Writing {} rows to {} ({:?})",
            data.len(),
            self.table,
            mode
        );

        let rows = match self.warehouse.write_table(self.table, data, mode).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::error!("Error writing to database: {}", e);
                return Ok(LoadOutcome::WriteFailed {
                    reason: e.to_string(),
                });
            }
        };

        let mut indexes_created = 0;
        if mode == WriteMode::Overwrite {
            let statements = self.index_statements();
            self.warehouse
                .run_ddl(&statements)
                .await
                .map_err(|source| LoadError::Index {
                    table: self.table.to_string(),
                    source,
                })?;
            indexes_created = statements.len();
            tracing::info!("Created {} indexes on {}", indexes_created, self.table);
        }

        Ok(LoadOutcome::Written {
            rows,
            indexes_created,
        })
    }
}
