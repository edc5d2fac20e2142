//! Response types for the daily time-series endpoint.

use serde::Deserialize;
use serde_json::{Map, Value};

/// Body of a `TIME_SERIES_DAILY` response.
///
/// A successful response carries `Meta Data` and the time series. Throttled or
/// rejected requests still answer HTTP 200 but replace both with a single
/// `Note`, `Information` or `Error Message` string, so every field is optional.
///
/// The series stays a raw JSON object: entries are keyed by `YYYY-MM-DD` and
/// hold string-encoded numbers under `1. open` .. `5. volume`. Document order
/// is preserved (serde_json `preserve_order`).
#[derive(Debug, Clone, Deserialize)]
pub struct DailySeriesResponse {
    #[serde(rename = "Meta Data", default)]
    pub meta_data: Option<MetaData>,
    #[serde(rename = "Time Series (Daily)", default)]
    pub time_series: Option<Map<String, Value>>,
    #[serde(rename = "Note", default)]
    pub note: Option<String>,
    #[serde(rename = "Information", default)]
    pub information: Option<String>,
    #[serde(rename = "Error Message", default)]
    pub error_message: Option<String>,
}

impl DailySeriesResponse {
    /// The explanatory message the API sends instead of data, if any.
    pub fn notice(&self) -> Option<&str> {
        self.note
            .as_deref()
            .or(self.information.as_deref())
            .or(self.error_message.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetaData {
    #[serde(rename = "2. Symbol", default)]
    pub symbol: Option<String>,
    #[serde(rename = "3. Last Refreshed", default)]
    pub last_refreshed: Option<String>,
    #[serde(rename = "4. Output Size", default)]
    pub output_size: Option<String>,
    #[serde(rename = "5. Time Zone", default)]
    pub time_zone: Option<String>,
}
