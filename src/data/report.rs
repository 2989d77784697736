use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Column title the exchange uses for the trading date.
pub static DATE_FIELD_NAME: &str = "日期";

/// Tabular body of an exchange report: declared columns plus rows of cells,
/// merged across every fetched month.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportPayload {
    pub fields: Vec<String>,
    pub data: Vec<Vec<String>>,
}

impl ReportPayload {
    /// Read `fields` and `data` out of a report body. Missing keys give an empty
    /// payload; non-string cells are kept as their JSON text.
    pub fn from_json(json: &Value) -> Self {
        let fields: Vec<String> = json["fields"]
            .as_array()
            .map(|fields| fields.iter().map(cell_to_string).collect())
            .unwrap_or_default();

        let data: Vec<Vec<String>> = json["data"]
            .as_array()
            .map(|rows| {
                rows.iter()
                    .filter_map(|row| row.as_array())
                    .map(|cells| cells.iter().map(cell_to_string).collect())
                    .collect()
            })
            .unwrap_or_default();

        Self { fields, data }
    }

    pub fn date_index(&self) -> Option<usize> {
        self.fields.iter().position(|f| f.trim() == DATE_FIELD_NAME)
    }

    /// Append the rows of a later month; the schema of `self` is kept.
    pub fn merge(&mut self, other: ReportPayload) {
        if self.fields.is_empty() {
            self.fields = other.fields;
        }
        self.data.extend(other.data);
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

fn cell_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.to_string(),
        Value::Null => "".to_string(),
        v => v.to_string(),
    }
}
