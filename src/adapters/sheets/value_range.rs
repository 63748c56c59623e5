use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of the `spreadsheets.values` endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub major_dimension: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<Vec<Value>>>,
}

impl ValueRange {
    /// One row laid out left to right.
    pub fn from_single_row<T: AsRef<str>>(cells: &[T]) -> Self {
        Self {
            range: None,
            major_dimension: Some("ROWS".to_string()),
            values: Some(vec![cells
                .iter()
                .map(|cell| Value::String(cell.as_ref().to_owned()))
                .collect()]),
        }
    }

    /// Rows as text; an absent `values` (empty range) yields no rows.
    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.values
            .unwrap_or_default()
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect()
    }
}

/// Cell value as displayed text. Strings are taken verbatim, not JSON-quoted.
pub fn cell_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
