use std::time::Duration;

use serde::Serialize;

/// Coarse classification surfaced to callers of an import.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportErrorKind {
    Input,
    Parse,
    Validation,
    Persistence,
    /// The import itself broke, e.g. the parse worker panicked.
    Internal,
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("No file uploaded.")]
    NoFile,

    #[error("Uploaded file is empty.")]
    EmptyFile,

    #[error("CSV header is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<&'static str>),

    #[error("failed to read CSV: {0}")]
    Read(#[from] csv::Error),

    #[error("No valid records found.")]
    NoValidRecords,

    #[error("failed to commit import: {0}")]
    Persistence(#[from] sea_orm::DbErr),

    #[error("import commit timed out after {0:?}")]
    Timeout(Duration),

    #[error("import worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl ImportError {
    pub fn kind(&self) -> ImportErrorKind {
        match self {
            ImportError::NoFile | ImportError::EmptyFile => ImportErrorKind::Input,
            ImportError::MissingColumns(_) | ImportError::Read(_) => ImportErrorKind::Parse,
            ImportError::NoValidRecords => ImportErrorKind::Validation,
            ImportError::Persistence(_) | ImportError::Timeout(_) => ImportErrorKind::Persistence,
            ImportError::Worker(_) => ImportErrorKind::Internal,
        }
    }
}

/// Failure to turn one CSV row into a record.
#[derive(Debug, thiserror::Error)]
pub enum RowError {
    /// The row is dropped and the import continues.
    #[error("line {line}: {message}")]
    Malformed { line: u64, message: String },

    /// The underlying stream failed; nothing after this point can be read.
    #[error(transparent)]
    Read(csv::Error),
}

impl RowError {
    pub fn malformed(line: u64, message: impl Into<String>) -> Self {
        RowError::Malformed { line, message: message.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_every_failure_path() {
        assert_eq!(ImportError::NoFile.kind(), ImportErrorKind::Input);
        assert_eq!(ImportError::EmptyFile.kind(), ImportErrorKind::Input);
        assert_eq!(ImportError::MissingColumns(vec!["Name"]).kind(), ImportErrorKind::Parse);
        assert_eq!(ImportError::NoValidRecords.kind(), ImportErrorKind::Validation);
        assert_eq!(
            ImportError::Timeout(Duration::from_secs(1)).kind(),
            ImportErrorKind::Persistence
        );
        assert_eq!(
            ImportError::Persistence(sea_orm::DbErr::Custom("boom".into())).kind(),
            ImportErrorKind::Persistence
        );
    }

    #[tokio::test]
    async fn worker_panic_is_internal() {
        let join =
            tokio::task::spawn_blocking::<_, ()>(|| panic!("parser blew up")).await.unwrap_err();
        let err = ImportError::from(join);
        assert_eq!(err.kind(), ImportErrorKind::Internal);
    }

    #[test]
    fn kinds_serialize_snake_case() {
        assert_eq!(serde_json::to_value(ImportErrorKind::Validation).unwrap(), "validation");
        assert_eq!(serde_json::to_value(ImportErrorKind::Internal).unwrap(), "internal");
    }

    #[test]
    fn missing_columns_message_lists_names() {
        let err = ImportError::MissingColumns(vec!["Name", "Votes"]);
        assert_eq!(err.to_string(), "CSV header is missing required columns: Name, Votes");
    }
}
