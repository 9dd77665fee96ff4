//! The external table store boundary.
//!
//! The service keeps no durable state of its own: every cycle reads the
//! whole sheet through a [`TableStore`] and writes the whole sheet back.

mod file;
mod memory;
mod sheet;
mod table;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use sheet::SheetStore;
pub use table::Table;

use crate::errors::StoreError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque version token handed out by a store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Revision(String);

impl Revision {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The revision of a sheet that does not exist yet. A write conditioned
    /// on it only lands while the sheet is still missing.
    pub fn absent() -> Self {
        Self(ABSENT.to_string())
    }

    pub fn is_absent(&self) -> bool {
        self.0 == ABSENT
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

const ABSENT: &str = "0";

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fetched {
    pub table: Table,
    pub revision: Option<Revision>,
}

#[async_trait]
pub trait TableStore: Send + Sync {
    fn backend_tag(&self) -> &'static str;

    async fn read(&self) -> Result<Fetched, StoreError>;

    /// Overwrites the whole table.
    ///
    /// With `expected` set the write only lands if the store is still at that
    /// revision, otherwise it fails with [`StoreError::Conflict`].
    async fn write(
        &self,
        table: &Table,
        expected: Option<&Revision>,
    ) -> Result<Option<Revision>, StoreError>;
}
