use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Rows of the first sheet of an uploaded workbook, keyed by header cell.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadRequest {
    #[serde(default)]
    pub rows: Vec<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub table: String,
    pub inserted: u64,
    pub years: Vec<String>,
    /// Years whose existing rows could not be cleared before the insert.
    pub delete_failures: Vec<String>,
}
