//! One request cycle: load the sheet, aggregate, and optionally mutate and
//! persist it.

use crate::errors::AppError;
use crate::intake;
use crate::loader::{LoadOutcome, load};
use crate::models::{DataSource, GOAL_KG, Metrics, Record, RecordSet, TrendPoint};
use crate::stats::{progress_ratio, summarize, trend};
use crate::storage::{Revision, Table, TableStore};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    #[serde(flatten)]
    pub metrics: Metrics,
    pub trend: Vec<TrendPoint>,
    pub goal_kg: f64,
    pub progress_ratio: f64,
    pub source: DataSource,
}

impl Dashboard {
    pub fn from_records(records: &RecordSet, source: DataSource) -> Self {
        let metrics = summarize(records);
        Self {
            progress_ratio: progress_ratio(metrics.total_kg, GOAL_KG),
            trend: trend(records),
            goal_kg: GOAL_KG,
            metrics,
            source,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Submitted {
    pub record: Record,
    pub request_count: usize,
    pub dashboard: Dashboard,
    /// What the read before the write saw. `Unavailable` means the sheet was
    /// replaced by a table holding only this request.
    pub loaded_from: DataSource,
}

#[derive(Debug, Clone)]
pub struct AdminTable {
    pub records: RecordSet,
    pub revision: Option<Revision>,
    pub source: DataSource,
}

pub async fn load_dashboard(store: &dyn TableStore) -> Dashboard {
    let outcome = load(store).await;
    Dashboard::from_records(&outcome.records(), outcome.source())
}

/// Validates and appends one request, then writes the whole sheet back
/// conditioned on the revision that was read.
pub async fn submit_request(
    store: &dyn TableStore,
    cafe_name: &str,
    quantity_kg: i64,
) -> Result<Submitted, AppError> {
    let outcome = load(store).await;
    if let LoadOutcome::Unavailable(err) = &outcome {
        warn!(error = %err, "submitting against an unreadable store; the write will replace it");
    }
    let loaded_from = outcome.source();
    let (records, revision) = outcome.into_parts();

    let updated = match intake::submit(&records, cafe_name, quantity_kg) {
        Ok(updated) => updated,
        Err(err) => {
            info!(error = %err, "submission rejected");
            return Err(err.into());
        }
    };

    store
        .write(&Table::from_records(&updated), revision.as_ref())
        .await?;

    let Some(record) = updated.last().cloned() else {
        return Err(AppError::bad_request("submission produced no record"));
    };
    info!(
        cafe = %record.cafe_name,
        quantity_kg,
        total = updated.len(),
        "pickup request saved"
    );

    Ok(Submitted {
        request_count: updated.len(),
        dashboard: Dashboard::from_records(&updated, DataSource::Loaded),
        record,
        loaded_from,
    })
}

pub async fn admin_records(store: &dyn TableStore) -> AdminTable {
    let outcome = load(store).await;
    let source = outcome.source();
    let (records, revision) = outcome.into_parts();
    AdminTable {
        records,
        revision,
        source,
    }
}

#[derive(Debug, Clone)]
pub struct Saved {
    pub rows: usize,
    pub revision: Option<Revision>,
}

/// Replaces the whole sheet with the admin grid's rows.
pub async fn save_records(
    store: &dyn TableStore,
    records: RecordSet,
    expected: Option<&Revision>,
) -> Result<Saved, AppError> {
    let records = intake::replace_all(records);
    let revision = store.write(&Table::from_records(&records), expected).await?;
    info!(rows = records.len(), "records replaced from admin grid");
    Ok(Saved {
        rows: records.len(),
        revision,
    })
}
