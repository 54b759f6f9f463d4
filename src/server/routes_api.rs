use crate::library::list_directory;
use crate::server::{AppContext, AppError};
use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use mediashelf_common::{DirectoryEntry, Error, RootDirectory, SortKey};
use serde::{Deserialize, Serialize};

pub fn api_routes() -> Router<AppContext> {
    Router::new()
        .route("/health", get(health))
        .route("/roots", get(list_roots))
        .route("/list/:root_index", get(list))
        .route("/thumb/:root_index", get(thumbnail))
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[derive(Serialize)]
struct RootsResponse {
    roots: Vec<RootDirectory>,
}

async fn list_roots(State(ctx): State<AppContext>) -> Json<RootsResponse> {
    Json(RootsResponse {
        roots: ctx.resolver.roots(),
    })
}

#[derive(Deserialize)]
struct ListQuery {
    /// Directory relative to the root.
    #[serde(default)]
    p: String,
    /// Case-insensitive name filter.
    q: Option<String>,
    /// `name`, `date`, or `size`.
    sort: Option<String>,
}

#[derive(Serialize)]
struct ListResponse {
    items: Vec<DirectoryEntry>,
}

async fn list(
    State(ctx): State<AppContext>,
    Path(root_index): Path<usize>,
    Query(params): Query<ListQuery>,
) -> Result<Json<ListResponse>, AppError> {
    let resolver = ctx.resolver.clone();
    let sort = SortKey::from_query(params.sort.as_deref());

    let items = tokio::task::spawn_blocking(move || {
        let dir = resolver.resolve(root_index, &params.p)?;
        list_directory(&dir, params.q.as_deref(), sort)
    })
    .await
    .map_err(|e| Error::internal(format!("listing task failed: {e}")))??;

    Ok(Json(ListResponse { items }))
}

#[derive(Deserialize)]
struct ThumbQuery {
    /// File relative to the root.
    p: String,
}

async fn thumbnail(
    State(ctx): State<AppContext>,
    Path(root_index): Path<usize>,
    Query(params): Query<ThumbQuery>,
) -> Result<impl IntoResponse, AppError> {
    let bytes = ctx.thumbnails.get_thumbnail(root_index, &params.p).await?;
    Ok(([(header::CONTENT_TYPE, "image/jpeg")], bytes))
}
