//! Bulk CSV import of the movie catalog.
//!
//! Rows are parsed and validated on the blocking pool, lookup names are resolved
//! against a per-import snapshot of the store, and the whole batch is committed in
//! a single transaction.

pub mod assembler;
pub mod committer;
pub mod error;
pub mod parser;
pub mod resolver;
pub mod validator;

use std::{sync::Arc, time::Duration};

use sea_orm::DatabaseConnection;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

pub use self::error::{ImportError, ImportErrorKind};
use self::{
    error::RowError,
    parser::{RawRecord, RecordReader},
    resolver::EntityResolver,
};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ImportSummary {
    /// Movies written by this import.
    pub count: u64,
    /// Rows dropped because a cell could not be parsed.
    pub skipped_rows: usize,
}

#[derive(Clone)]
pub struct Importer {
    db: DatabaseConnection,
    timeout: Duration,
    // Imports run one at a time so two batches never stage the same name.
    lock: Arc<Mutex<()>>,
}

impl Importer {
    pub fn new(db: DatabaseConnection, timeout: Duration) -> Self {
        Self { db, timeout, lock: Arc::new(Mutex::new(())) }
    }

    pub async fn import_csv<B>(&self, data: B) -> Result<ImportSummary, ImportError>
    where
        B: AsRef<[u8]> + Send + 'static,
    {
        if data.as_ref().is_empty() {
            return Err(ImportError::EmptyFile);
        }

        let _guard = self.lock.lock().await;

        let parsed =
            tokio::task::spawn_blocking(move || parse_and_validate(data.as_ref())).await??;
        if parsed.valid.is_empty() {
            return Err(ImportError::NoValidRecords);
        }

        let mut resolver = EntityResolver::load(&self.db).await?;
        let resolved: Vec<_> =
            parsed.valid.into_iter().map(|record| resolver.resolve_record(record)).collect();
        let staged = resolver.into_staged();
        debug!(movies = resolved.len(), new_entities = staged.len(), "resolved lookup names");

        let batch = assembler::assemble(resolved);

        let commit = committer::commit(&self.db, &staged, &batch);
        let count = tokio::time::timeout(self.timeout, commit)
            .await
            .map_err(|_| ImportError::Timeout(self.timeout))??;

        Ok(ImportSummary { count, skipped_rows: parsed.skipped })
    }
}

struct Parsed {
    valid: Vec<RawRecord>,
    skipped: usize,
}

fn parse_and_validate(data: &[u8]) -> Result<Parsed, ImportError> {
    let mut records = Vec::new();
    let mut skipped = 0;

    for row in RecordReader::new(data)? {
        match row {
            Ok(record) => records.push(record),
            Err(RowError::Malformed { line, message }) => {
                warn!(line, %message, "skipping malformed csv row");
                skipped += 1;
            },
            Err(RowError::Read(err)) => return Err(ImportError::Read(err)),
        }
    }

    let parsed = records.len();
    let valid = validator::retain_valid(records);
    debug!(parsed, valid = valid.len(), skipped, "validated csv rows");

    Ok(Parsed { valid, skipped })
}
