use crate::errors::StoreError;
use crate::models::{DataSource, RecordSet};
use crate::storage::{Revision, TableStore};
use tracing::{debug, info, warn};

/// Result of one attempt to read the sheet.
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded {
        records: RecordSet,
        revision: Option<Revision>,
    },
    Empty {
        revision: Option<Revision>,
    },
    Unavailable(StoreError),
}

impl LoadOutcome {
    pub fn source(&self) -> DataSource {
        match self {
            Self::Loaded { .. } => DataSource::Loaded,
            Self::Empty { .. } => DataSource::Empty,
            Self::Unavailable(_) => DataSource::Unavailable,
        }
    }

    pub fn records(&self) -> RecordSet {
        match self {
            Self::Loaded { records, .. } => records.clone(),
            Self::Empty { .. } | Self::Unavailable(_) => RecordSet::default(),
        }
    }

    /// Records plus the revision a follow-up write should be conditioned on.
    /// An unavailable store yields no revision.
    pub fn into_parts(self) -> (RecordSet, Option<Revision>) {
        match self {
            Self::Loaded { records, revision } => (records, revision),
            Self::Empty { revision } => (RecordSet::default(), revision),
            Self::Unavailable(_) => (RecordSet::default(), None),
        }
    }
}

/// Single read, no retry. Never fails: anything that goes wrong becomes
/// [`LoadOutcome::Unavailable`].
pub async fn load(store: &dyn TableStore) -> LoadOutcome {
    let fetched = match store.read().await {
        Ok(fetched) => fetched,
        Err(err) => {
            warn!(backend = store.backend_tag(), error = %err, "store unreachable, using empty records");
            return LoadOutcome::Unavailable(err);
        }
    };

    match fetched.table.to_records() {
        Ok(records) if records.is_empty() => {
            info!(backend = store.backend_tag(), "store has no records yet");
            LoadOutcome::Empty {
                revision: fetched.revision,
            }
        }
        Ok(records) => {
            debug!(backend = store.backend_tag(), count = records.len(), "records loaded");
            LoadOutcome::Loaded {
                records,
                revision: fetched.revision,
            }
        }
        Err(err) => {
            warn!(backend = store.backend_tag(), error = %err, "malformed table, using empty records");
            LoadOutcome::Unavailable(err)
        }
    }
}
