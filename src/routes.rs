use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    AppState,
    error::{AppError, AppResult},
    models::{
        LinkCreditRequest, LinkReport, MovieListItem, MovieView, Role, StageRequest, SyncCategory,
        SyncReport, SyncRequest,
    },
    tmdb::{Catalog, MovieSummary},
};

pub fn router<C: Catalog + 'static>(state: Arc<AppState<C>>) -> Router {
    Router::new()
        .route("/sync", post(sync::<C>))
        .route("/movies", get(search::<C>))
        .route("/movies/{external_id}", get(movie::<C>))
        .route("/movies/{external_id}/cast", post(update_cast::<C>))
        .route("/movies/{external_id}/details", post(update_details::<C>))
        .route("/movies/{external_id}/refresh", post(refresh::<C>))
        .route("/movies/{external_id}/stage", post(set_stage::<C>))
        .route("/movies/{external_id}/credits", post(link_credit::<C>))
        .route("/movies/{external_id}/credits/{role}/{partner_id}", delete(unlink_credit::<C>))
        .route("/stages", get(stages::<C>))
        .route("/discover", get(discover::<C>))
        .with_state(state)
        .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

fn parse_role(code: &str) -> AppResult<Role> {
    Role::from_code(code).ok_or_else(|| AppError::BadRequest(format!("unknown role {code:?}")))
}

pub async fn sync<C: Catalog>(
    State(state): State<Arc<AppState<C>>>,
    Json(req): Json<SyncRequest>,
) -> AppResult<Json<SyncReport>> {
    let category = SyncCategory::from_code(req.category.trim()).ok_or_else(|| {
        AppError::BadRequest(format!("unsupported category {:?}", req.category))
    })?;
    Ok(Json(state.syncer.sync(category).await?))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    title: String,
}

pub async fn search<C: Catalog>(
    State(state): State<Arc<AppState<C>>>,
    Query(q): Query<SearchQuery>,
) -> AppResult<Json<Vec<MovieListItem>>> {
    Ok(Json(state.syncer.store().search_titles(q.title.trim()).await?))
}

pub async fn movie<C: Catalog>(
    State(state): State<Arc<AppState<C>>>,
    Path(external_id): Path<i64>,
) -> AppResult<Json<MovieView>> {
    Ok(Json(state.syncer.store().movie_view(external_id).await?))
}

pub async fn update_cast<C: Catalog>(
    State(state): State<Arc<AppState<C>>>,
    Path(external_id): Path<i64>,
) -> AppResult<Json<LinkReport>> {
    Ok(Json(state.syncer.update_cast(external_id).await?))
}

pub async fn update_details<C: Catalog>(
    State(state): State<Arc<AppState<C>>>,
    Path(external_id): Path<i64>,
) -> AppResult<Json<LinkReport>> {
    Ok(Json(state.syncer.update_details(external_id).await?))
}

pub async fn refresh<C: Catalog>(
    State(state): State<Arc<AppState<C>>>,
    Path(external_id): Path<i64>,
) -> AppResult<Json<LinkReport>> {
    Ok(Json(state.syncer.refresh(external_id).await?))
}

pub async fn set_stage<C: Catalog>(
    State(state): State<Arc<AppState<C>>>,
    Path(external_id): Path<i64>,
    Json(req): Json<StageRequest>,
) -> AppResult<StatusCode> {
    state.syncer.set_stage(external_id, req.stage.trim()).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn link_credit<C: Catalog>(
    State(state): State<Arc<AppState<C>>>,
    Path(external_id): Path<i64>,
    Json(req): Json<LinkCreditRequest>,
) -> AppResult<Json<Value>> {
    let role = parse_role(&req.role)?;
    let partner_id = state.syncer.link_credit(external_id, role, &req.name).await?;
    Ok(Json(json!({ "partner_id": partner_id, "role": role })))
}

pub async fn unlink_credit<C: Catalog>(
    State(state): State<Arc<AppState<C>>>,
    Path((external_id, role, partner_id)): Path<(i64, String, i32)>,
) -> AppResult<StatusCode> {
    let role = parse_role(&role)?;
    state.syncer.unlink_credit(external_id, role, partner_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn stages<C: Catalog>(State(state): State<Arc<AppState<C>>>) -> AppResult<Json<Value>> {
    let stages = state.syncer.store().list_stages().await?;
    let names: Vec<String> = stages.into_iter().map(|s| s.name).collect();
    Ok(Json(json!(names)))
}

#[derive(Debug, Deserialize)]
pub struct DiscoverQuery {
    #[serde(default)]
    query: String,
}

pub async fn discover<C: Catalog>(
    State(state): State<Arc<AppState<C>>>,
    Query(q): Query<DiscoverQuery>,
) -> AppResult<Json<Vec<MovieSummary>>> {
    Ok(Json(state.syncer.discover(&q.query).await?))
}
