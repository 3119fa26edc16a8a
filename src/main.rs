mod catalog;
mod config;
mod db;
mod entities;
mod error;
mod import;
mod models;
mod routes;

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{catalog::Catalog, config::Config, import::Importer};

pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Catalog,
    pub importer: Importer,
}

fn app(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_upload_bytes;
    Router::new()
        .route("/api/movies", get(routes::list_movies).delete(routes::delete_all))
        .route("/api/movies/search", get(routes::search_movies))
        .route("/api/movies/upload", post(routes::upload))
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,movie_catalog=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = Arc::new(Config::from_env()?);

    let db = db::connect_and_migrate(&config.database_url).await?;

    let state = Arc::new(AppState {
        config: config.clone(),
        catalog: Catalog::new(db.clone()),
        importer: Importer::new(db, config.import_timeout),
    });

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "listening");
    axum::serve(listener, app(state)).await?;

    Ok(())
}
