use serde::{Deserialize, Serialize};

/// Header names of the backing sheet, in canonical order.
pub const CAFE_NAME_COLUMN: &str = "카페이름";
pub const QUANTITY_COLUMN: &str = "수거량";
pub const REQUESTED_AT_COLUMN: &str = "요청날짜";
pub const COLUMNS: [&str; 3] = [CAFE_NAME_COLUMN, QUANTITY_COLUMN, REQUESTED_AT_COLUMN];

/// Collection target shown on the dashboard.
pub const GOAL_KG: f64 = 1000.0;

/// A quantity cell exactly as the store holds it.
///
/// Sheets hand back numbers as text often enough that the raw cell is kept
/// and only coerced when aggregating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Quantity {
    Number(serde_json::Number),
    Text(String),
    #[default]
    Missing,
}

impl Quantity {
    pub fn whole(kg: i64) -> Self {
        Self::Number(serde_json::Number::from(kg))
    }

    /// Kilograms for aggregation: anything negative, non-finite or
    /// non-numeric counts as zero.
    pub fn kg(&self) -> f64 {
        let value = match self {
            Self::Number(number) => number.as_f64().unwrap_or(0.0),
            Self::Text(text) => text.trim().parse::<f64>().unwrap_or(0.0),
            Self::Missing => 0.0,
        };
        if value.is_finite() && value > 0.0 {
            value
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub cafe_name: String,
    #[serde(default)]
    pub quantity_kg: Quantity,
    #[serde(default)]
    pub requested_at: String,
}

/// Ordered pickup records; append order is insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct RecordSet {
    records: Vec<Record>,
}

impl RecordSet {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn last(&self) -> Option<&Record> {
        self.records.last()
    }

    pub fn as_slice(&self) -> &[Record] {
        &self.records
    }

    pub(crate) fn push(&mut self, record: Record) {
        self.records.push(record);
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metrics {
    pub request_count: usize,
    pub total_kg: f64,
    pub distinct_cafes: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: chrono::NaiveDate,
    pub total_kg: f64,
}

/// Where the records behind a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Loaded,
    Empty,
    Unavailable,
}

#[derive(Debug, Deserialize)]
pub struct SubmitForm {
    #[serde(default)]
    pub cafe_name: String,
    #[serde(default)]
    pub quantity_kg: String,
}

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub cafe_name: String,
    pub quantity_kg: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub record: Record,
    pub request_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct AdminLoginForm {
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AdminRecordsResponse {
    pub records: RecordSet,
    pub revision: Option<String>,
    pub source: DataSource,
}

#[derive(Debug, Deserialize)]
pub struct SaveRecordsRequest {
    pub records: RecordSet,
    #[serde(default)]
    pub revision: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SaveRecordsResponse {
    pub saved: usize,
    pub revision: Option<String>,
}
