use crate::errors::StoreError;
use crate::models::{
    CAFE_NAME_COLUMN, COLUMNS, Quantity, QUANTITY_COLUMN, REQUESTED_AT_COLUMN, Record, RecordSet,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The sheet as a grid of header names and rows of JSON cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<Value>>,
}

impl Default for Table {
    fn default() -> Self {
        Self::empty()
    }
}

impl Table {
    /// A table with the canonical headers and no rows.
    pub fn empty() -> Self {
        Self {
            columns: COLUMNS.iter().map(|column| column.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn from_records(records: &RecordSet) -> Self {
        let rows = records
            .iter()
            .map(|record| {
                vec![
                    Value::String(record.cafe_name.clone()),
                    quantity_cell(&record.quantity_kg),
                    Value::String(record.requested_at.clone()),
                ]
            })
            .collect();
        Self {
            rows,
            ..Self::empty()
        }
    }

    /// Maps rows to records by header name; column order is free.
    pub fn to_records(&self) -> Result<RecordSet, StoreError> {
        if self.columns.is_empty() && self.rows.is_empty() {
            return Ok(RecordSet::default());
        }

        let name_at = self.position(CAFE_NAME_COLUMN)?;
        let quantity_at = self.position(QUANTITY_COLUMN)?;
        let requested_at = self.position(REQUESTED_AT_COLUMN)?;

        let records = self
            .rows
            .iter()
            .map(|row| Record {
                cafe_name: text_cell(row.get(name_at)),
                quantity_kg: quantity_from_cell(row.get(quantity_at)),
                requested_at: text_cell(row.get(requested_at)),
            })
            .collect();
        Ok(RecordSet::new(records))
    }

    fn position(&self, header: &str) -> Result<usize, StoreError> {
        self.columns
            .iter()
            .position(|column| column.trim() == header)
            .ok_or_else(|| StoreError::Malformed(format!("missing column '{header}'")))
    }
}

fn quantity_cell(quantity: &Quantity) -> Value {
    match quantity {
        Quantity::Number(number) => Value::Number(number.clone()),
        Quantity::Text(text) => Value::String(text.clone()),
        Quantity::Missing => Value::Null,
    }
}

fn quantity_from_cell(cell: Option<&Value>) -> Quantity {
    match cell {
        Some(Value::Number(number)) => Quantity::Number(number.clone()),
        Some(Value::String(text)) if text.is_empty() => Quantity::Missing,
        Some(Value::String(text)) => Quantity::Text(text.clone()),
        Some(Value::Null) | None => Quantity::Missing,
        Some(other) => Quantity::Text(other.to_string()),
    }
}

fn text_cell(cell: Option<&Value>) -> String {
    match cell {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
