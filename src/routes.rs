use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, Query, State},
    http::StatusCode,
};
use tracing::debug;

use crate::{
    AppState,
    error::AppResult,
    import::{ImportError, ImportSummary},
    models::{MovieView, SearchQuery},
};

pub async fn list_movies(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<MovieView>>> {
    Ok(Json(state.catalog.list_movies().await?))
}

pub async fn search_movies(
    State(state): State<Arc<AppState>>,
    Query(q): Query<SearchQuery>,
) -> AppResult<Json<Vec<MovieView>>> {
    Ok(Json(state.catalog.search_movies(&q.query).await?))
}

pub async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> AppResult<Json<ImportSummary>> {
    let mut file = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            file = Some(field.bytes().await?);
            break;
        }
    }

    let data = file.ok_or(ImportError::NoFile)?;
    debug!(bytes = data.len(), "received csv upload");

    Ok(Json(state.importer.import_csv(data).await?))
}

pub async fn delete_all(State(state): State<Arc<AppState>>) -> AppResult<StatusCode> {
    state.catalog.delete_all_movies().await?;
    Ok(StatusCode::NO_CONTENT)
}
