use serde::Serialize;
use stockdump_lib::{LoadOutcome, RunReport, SymbolReport};
use tabled::{Table, Tabled};

#[derive(Clone, Debug)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Tabled, Serialize)]
struct SymbolRow {
    #[tabled(rename = "Symbol")]
    #[serde(rename = "Symbol")]
    symbol: String,
    #[tabled(rename = "Rows")]
    #[serde(rename = "Rows")]
    rows: usize,
    #[tabled(rename = "Status")]
    #[serde(rename = "Status")]
    status: String,
}

fn build_symbol_rows(reports: &[SymbolReport]) -> Vec<SymbolRow> {
    reports
        .iter()
        .map(|r| SymbolRow {
            symbol: r.symbol.clone(),
            rows: r.rows,
            status: match &r.error {
                Some(e) => format!("failed: {}", e),
                None => "ok".to_string(),
            },
        })
        .collect()
}

fn summary_line(report: &RunReport) -> String {
    let load = match &report.load {
        Some(LoadOutcome::Written {
            rows,
            indexes_created,
        }) => format!("wrote {} rows, {} indexes", rows, indexes_created),
        Some(LoadOutcome::WriteFailed { reason }) => format!("write failed: {}", reason),
        None => "nothing to load".to_string(),
    };
    format!(
        "{:?} {} ({:?}): {} rows collected, {}/{} requests ok, {}",
        report.job,
        report.window,
        report.mode,
        report.rows_collected,
        report.requests.requests_succeeded,
        report.requests.requests_made,
        load
    )
}

pub fn print_report(report: &RunReport, format: &OutputFormat) {
    match format {
        OutputFormat::Table => {
            let table = Table::new(build_symbol_rows(&report.symbols)).to_string();
            println!("{}", table);
            println!("{}", summary_line(report));
        }
        OutputFormat::Json => print_json(report),
    }
}

pub fn print_json<T: Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize output: {}", e),
    }
}
