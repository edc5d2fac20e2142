//! Test doubles shared by the unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::fetch::{FetchError, FetchOutcome, PriceSource};
use crate::loader::WriteMode;
use crate::record::PriceRecord;
use crate::table::PriceTable;
use crate::warehouse::{Dialect, Warehouse, WarehouseError};
use crate::window::{parse_date, DateWindow};

pub(crate) fn record(symbol: &str, date: &str) -> PriceRecord {
    PriceRecord {
        date: parse_date(date).unwrap(),
        symbol: symbol.to_string(),
        open: 1.0,
        close: 2.0,
        high: 3.0,
        low: 0.5,
        volume: 100,
    }
}

enum Script {
    Rows(Vec<PriceRecord>),
    Notice(String),
}

/// Answers fetches from a per-symbol script; unscripted symbols return no rows.
pub(crate) struct ScriptedSource {
    scripts: HashMap<String, Script>,
    calls: Mutex<Vec<(String, Instant)>>,
}

impl ScriptedSource {
    pub(crate) fn new() -> Self {
        Self {
            scripts: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_rows(mut self, symbol: &str, rows: Vec<PriceRecord>) -> Self {
        self.scripts.insert(symbol.to_string(), Script::Rows(rows));
        self
    }

    pub(crate) fn with_notice(mut self, symbol: &str, notice: &str) -> Self {
        self.scripts
            .insert(symbol.to_string(), Script::Notice(notice.to_string()));
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(s, _)| s.clone())
            .collect()
    }

    pub(crate) fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(_, t)| *t).collect()
    }
}

#[async_trait]
impl PriceSource for ScriptedSource {
    async fn fetch(&self, symbol: &str, _window: &DateWindow) -> FetchOutcome {
        self.calls
            .lock()
            .unwrap()
            .push((symbol.to_string(), Instant::now()));
        match self.scripts.get(symbol) {
            Some(Script::Rows(rows)) => FetchOutcome::Fetched(rows.clone()),
            Some(Script::Notice(msg)) => FetchOutcome::Failed(FetchError::ApiNotice(msg.clone())),
            None => FetchOutcome::Fetched(Vec::new()),
        }
    }
}

/// Records writes and DDL instead of touching a database.
pub(crate) struct RecordingWarehouse {
    dialect: Dialect,
    writes: Mutex<Vec<(String, WriteMode, usize)>>,
    ddl: Mutex<Vec<Vec<String>>>,
    fail_writes: bool,
    fail_ddl: bool,
    closed: AtomicBool,
}

impl RecordingWarehouse {
    pub(crate) fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            writes: Mutex::new(Vec::new()),
            ddl: Mutex::new(Vec::new()),
            fail_writes: false,
            fail_ddl: false,
            closed: AtomicBool::new(false),
        }
    }

    pub(crate) fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub(crate) fn failing_ddl(mut self) -> Self {
        self.fail_ddl = true;
        self
    }

    pub(crate) fn writes(&self) -> Vec<(String, WriteMode, usize)> {
        self.writes.lock().unwrap().clone()
    }

    pub(crate) fn ddl_batches(&self) -> Vec<Vec<String>> {
        self.ddl.lock().unwrap().clone()
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Warehouse for RecordingWarehouse {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn describe(&self) -> String {
        "recording".to_string()
    }

    async fn write_table(
        &self,
        table: &str,
        data: &PriceTable,
        mode: WriteMode,
    ) -> Result<u64, WarehouseError> {
        if self.fail_writes {
            return Err(WarehouseError::MySql(sqlx::Error::Protocol(
                "table is locked".to_string(),
            )));
        }
        self.writes
            .lock()
            .unwrap()
            .push((table.to_string(), mode, data.len()));
        Ok(data.len() as u64)
    }

    async fn run_ddl(&self, statements: &[String]) -> Result<(), WarehouseError> {
        if self.fail_ddl {
            return Err(WarehouseError::MySql(sqlx::Error::Protocol(
                "duplicate key name".to_string(),
            )));
        }
        self.ddl.lock().unwrap().push(statements.to_vec());
        Ok(())
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// Lets a test keep inspecting a warehouse after handing a box to the pipeline.
pub(crate) struct SharedWarehouse(pub(crate) std::sync::Arc<RecordingWarehouse>);

#[async_trait]
impl Warehouse for SharedWarehouse {
    fn dialect(&self) -> Dialect {
        self.0.dialect()
    }

    fn describe(&self) -> String {
        self.0.describe()
    }

    async fn write_table(
        &self,
        table: &str,
        data: &PriceTable,
        mode: WriteMode,
    ) -> Result<u64, WarehouseError> {
        self.0.write_table(table, data, mode).await
    }

    async fn run_ddl(&self, statements: &[String]) -> Result<(), WarehouseError> {
        self.0.run_ddl(statements).await
    }

    async fn close(&self) {
        self.0.close().await
    }
}
