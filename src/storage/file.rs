use super::{Fetched, Revision, Table, TableStore};
use crate::errors::StoreError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Debug, Serialize, Deserialize)]
struct StoredTable {
    #[serde(default)]
    revision: u64,
    #[serde(flatten)]
    table: Table,
}

/// A sheet kept as a JSON file on local disk.
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    async fn read_stored(&self) -> Result<Option<StoredTable>, StoreError> {
        match fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StoreError::Unreachable(format!(
                "failed to read {}: {err}",
                self.path.display()
            ))),
        }
    }
}

#[async_trait]
impl TableStore for FileStore {
    fn backend_tag(&self) -> &'static str {
        "file"
    }

    async fn read(&self) -> Result<Fetched, StoreError> {
        let _guard = self.lock.lock().await;
        match self.read_stored().await? {
            Some(stored) => Ok(Fetched {
                table: stored.table,
                revision: Some(Revision::new(stored.revision.to_string())),
            }),
            None => Ok(Fetched {
                table: Table::empty(),
                revision: Some(Revision::absent()),
            }),
        }
    }

    async fn write(
        &self,
        table: &Table,
        expected: Option<&Revision>,
    ) -> Result<Option<Revision>, StoreError> {
        let _guard = self.lock.lock().await;
        // A missing file is at revision 0, the same as `Revision::absent()`.
        let current = self
            .read_stored()
            .await?
            .map_or(0, |stored| stored.revision);

        if let Some(expected) = expected {
            let found = current.to_string();
            if found != expected.as_str() {
                return Err(StoreError::Conflict {
                    expected: expected.to_string(),
                    found,
                });
            }
        }

        let revision = current.saturating_add(1);
        let payload = serde_json::to_vec_pretty(&StoredTable {
            revision,
            table: table.clone(),
        })?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, payload).await?;
        fs::rename(&staging, &self.path).await?;

        debug!(path = %self.path.display(), revision, rows = table.rows.len(), "table written");
        Ok(Some(Revision::new(revision.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn unique_path(tag: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!(
            "coffee_intake_{tag}_{}_{}/records.json",
            std::process::id(),
            nanos
        ));
        path
    }

    fn one_row() -> Table {
        Table {
            rows: vec![vec![json!("Cafe A"), json!(3), json!("2026-03-01 10:00")]],
            ..Table::empty()
        }
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty_sheet() {
        let store = FileStore::new(unique_path("missing"));
        let fetched = store.read().await.unwrap();
        assert_eq!(fetched.table, Table::empty());
        assert_eq!(fetched.revision, Some(Revision::absent()));
    }

    #[tokio::test]
    async fn second_writer_on_a_new_file_conflicts() {
        let path = unique_path("race");
        let first = FileStore::new(path.clone());
        let second = FileStore::new(path);

        let seen_by_first = first.read().await.unwrap().revision;
        let seen_by_second = second.read().await.unwrap().revision;
        assert_eq!(seen_by_first, seen_by_second);

        first.write(&one_row(), seen_by_first.as_ref()).await.unwrap();
        let err = second
            .write(&Table::empty(), seen_by_second.as_ref())
            .await
            .unwrap_err();
        match err {
            StoreError::Conflict { expected, found } => {
                assert_eq!(expected, "0");
                assert_eq!(found, "1");
            }
            other => panic!("expected conflict, got {other:?}"),
        }
        assert_eq!(second.read().await.unwrap().table, one_row());
    }

    #[tokio::test]
    async fn write_then_read_bumps_revision() {
        let store = FileStore::new(unique_path("roundtrip"));

        let first = store.write(&one_row(), None).await.unwrap();
        assert_eq!(first, Some(Revision::new("1")));

        let fetched = store.read().await.unwrap();
        assert_eq!(fetched.table, one_row());
        assert_eq!(fetched.revision, first);

        let second = store
            .write(&Table::empty(), fetched.revision.as_ref())
            .await
            .unwrap();
        assert_eq!(second, Some(Revision::new("2")));
    }

    #[tokio::test]
    async fn stale_revision_is_rejected() {
        let store = FileStore::new(unique_path("stale"));
        store.write(&one_row(), None).await.unwrap();
        store.write(&one_row(), None).await.unwrap();

        let err = store
            .write(&Table::empty(), Some(&Revision::new("1")))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
        assert_eq!(store.read().await.unwrap().table, one_row());
    }

    #[tokio::test]
    async fn corrupt_file_surfaces_as_error() {
        let path = unique_path("corrupt");
        fs::create_dir_all(path.parent().unwrap()).await.unwrap();
        fs::write(&path, b"not json").await.unwrap();

        let store = FileStore::new(path);
        assert!(matches!(store.read().await, Err(StoreError::Json(_))));
    }
}
