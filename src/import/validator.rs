use rayon::prelude::*;
use tracing::debug;

use super::parser::RawRecord;

/// A record is importable once it carries a name with visible characters.
pub fn is_valid(record: &RawRecord) -> bool {
    record.name.as_deref().is_some_and(|name| !name.trim().is_empty())
}

/// Keeps the valid records, preserving input order. Records are checked in parallel.
pub fn retain_valid(records: Vec<RawRecord>) -> Vec<RawRecord> {
    records
        .into_par_iter()
        .filter(|record| {
            let valid = is_valid(record);
            if !valid {
                debug!(line = record.line, "dropping row without a name");
            }
            valid
        })
        .collect()
}
