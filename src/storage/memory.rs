use super::{Fetched, Revision, Table, TableStore};
use crate::errors::StoreError;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::Mutex;

/// An in-process sheet. Reads and writes can be switched to fail.
pub struct MemoryStore {
    state: Mutex<(Table, u64)>,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
    pub write_calls: AtomicU64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::with_table(Table::empty())
    }
}

impl MemoryStore {
    pub fn with_table(table: Table) -> Self {
        Self {
            state: Mutex::new((table, 0)),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            write_calls: AtomicU64::new(0),
        }
    }

    pub async fn table(&self) -> Table {
        self.state.lock().await.0.clone()
    }

    pub fn writes(&self) -> u64 {
        self.write_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl TableStore for MemoryStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn read(&self) -> Result<Fetched, StoreError> {
        if self.fail_reads.load(Ordering::Relaxed) {
            return Err(StoreError::Unreachable("memory store offline".to_string()));
        }
        let state = self.state.lock().await;
        Ok(Fetched {
            table: state.0.clone(),
            revision: Some(Revision::new(state.1.to_string())),
        })
    }

    async fn write(
        &self,
        table: &Table,
        expected: Option<&Revision>,
    ) -> Result<Option<Revision>, StoreError> {
        self.write_calls.fetch_add(1, Ordering::Relaxed);
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(StoreError::Rejected("memory store is read-only".to_string()));
        }

        let mut state = self.state.lock().await;
        let current = state.1.to_string();
        if let Some(expected) = expected {
            if expected.as_str() != current {
                return Err(StoreError::Conflict {
                    expected: expected.to_string(),
                    found: current,
                });
            }
        }
        state.0 = table.clone();
        state.1 = state.1.saturating_add(1);
        Ok(Some(Revision::new(state.1.to_string())))
    }
}
