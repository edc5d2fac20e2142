//! In-memory, schema-typed table ready for a bulk load.

use crate::record::PriceRecord;
use crate::window::DATE_FORMAT;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    /// Single-precision float.
    Float,
    /// 32-bit signed integer.
    Int,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub ty: ColumnType,
    pub nullable: bool,
}

const fn column(name: &'static str, ty: ColumnType) -> Column {
    Column {
        name,
        ty,
        nullable: true,
    }
}

/// Column layout of `historical_stock_data`.
pub const PRICE_SCHEMA: [Column; 7] = [
    column("Date", ColumnType::Text),
    column("Company", ColumnType::Text),
    column("Open", ColumnType::Float),
    column("Close", ColumnType::Float),
    column("High", ColumnType::Float),
    column("Low", ColumnType::Float),
    column("Volume", ColumnType::Int),
];

/// One row in [`PRICE_SCHEMA`] order.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRow {
    pub date: Option<String>,
    pub company: Option<String>,
    pub open: Option<f32>,
    pub close: Option<f32>,
    pub high: Option<f32>,
    pub low: Option<f32>,
    pub volume: Option<i32>,
}

impl PriceRow {
    fn from_record(record: &PriceRecord) -> Self {
        let volume = match i32::try_from(record.volume) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(
                    "{} {}: volume {} exceeds the Volume column range, storing NULL",
                    record.symbol,
                    record.date,
                    record.volume
                );
                None
            }
        };
        Self {
            date: Some(record.date.format(DATE_FORMAT).to_string()),
            company: Some(record.symbol.clone()),
            open: Some(record.open as f32),
            close: Some(record.close as f32),
            high: Some(record.high as f32),
            low: Some(record.low as f32),
            volume,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceTable {
    rows: Vec<PriceRow>,
}

impl PriceTable {
    /// Narrow records into the table schema. No filtering, order kept.
    pub fn from_records(records: &[PriceRecord]) -> Self {
        Self {
            rows: records.iter().map(PriceRow::from_record).collect(),
        }
    }

    pub fn schema() -> &'static [Column] {
        &PRICE_SCHEMA
    }

    pub fn rows(&self) -> &[PriceRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
