use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::import::{ImportError, ImportErrorKind};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Import(#[from] ImportError),

    #[error("invalid upload: {0}")]
    Multipart(#[from] MultipartError),

    #[error(transparent)]
    Db(#[from] sea_orm::DbErr),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    fn status_and_kind(&self) -> (StatusCode, ImportErrorKind) {
        match self {
            AppError::Import(err) => {
                let kind = err.kind();
                let status = match kind {
                    ImportErrorKind::Input
                    | ImportErrorKind::Parse
                    | ImportErrorKind::Validation => StatusCode::BAD_REQUEST,
                    ImportErrorKind::Persistence | ImportErrorKind::Internal => {
                        StatusCode::INTERNAL_SERVER_ERROR
                    },
                };
                (status, kind)
            },
            AppError::Multipart(err) => (err.status(), ImportErrorKind::Input),
            AppError::Db(_) => (StatusCode::INTERNAL_SERVER_ERROR, ImportErrorKind::Persistence),
            AppError::Other(_) => (StatusCode::INTERNAL_SERVER_ERROR, ImportErrorKind::Internal),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind) = self.status_and_kind();
        let message = if status.is_server_error() {
            tracing::error!(error = %self, ?kind, "request failed");
            "The request could not be completed.".to_string()
        } else {
            self.to_string()
        };
        (status, Json(json!({ "error": kind, "message": message }))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_keep_their_message() {
        let err = AppError::from(ImportError::NoValidRecords);
        assert_eq!(err.status_and_kind(), (StatusCode::BAD_REQUEST, ImportErrorKind::Validation));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn persistence_failures_are_server_errors() {
        let err = AppError::from(ImportError::Persistence(sea_orm::DbErr::Custom("fk".into())));
        assert_eq!(
            err.status_and_kind(),
            (StatusCode::INTERNAL_SERVER_ERROR, ImportErrorKind::Persistence)
        );

        let err = AppError::from(anyhow::anyhow!("boom"));
        assert_eq!(
            err.status_and_kind(),
            (StatusCode::INTERNAL_SERVER_ERROR, ImportErrorKind::Internal)
        );
    }

    #[tokio::test]
    async fn worker_failures_are_internal_not_persistence() {
        let join = tokio::task::spawn_blocking::<_, ()>(|| panic!("boom")).await.unwrap_err();
        let err = AppError::from(ImportError::from(join));
        assert_eq!(
            err.status_and_kind(),
            (StatusCode::INTERNAL_SERVER_ERROR, ImportErrorKind::Internal)
        );
    }
}
