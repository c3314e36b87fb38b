use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::info;

use domain_radar_core::types::{NewPlatform, Platform, PlatformUpdate};
use domain_radar_storage::PlatformError;

use crate::problem::ProblemResponse;
use crate::router::AppState;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Platform>>, ProblemResponse> {
    let platforms = state
        .storage()
        .platforms()
        .list_all()
        .await
        .map_err(|err| ProblemResponse::internal("failed to load platforms", err))?;
    Ok(Json(platforms))
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<NewPlatform>, JsonRejection>,
) -> Result<Json<Platform>, ProblemResponse> {
    let Json(input) = payload?;
    let platform = Platform::from_new(input, state.now());

    state
        .storage()
        .platforms()
        .insert(&platform)
        .await
        .map_err(|err| ProblemResponse::internal("failed to store platform", err))?;

    info!(stage = "http", id = %platform.id, name = %platform.name, "platform created");
    Ok(Json(platform))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<PlatformUpdate>, JsonRejection>,
) -> Result<Json<Platform>, ProblemResponse> {
    let Json(update) = payload?;

    let platform = state
        .storage()
        .platforms()
        .update(&id, &update)
        .await
        .map_err(|err| platform_problem(err, "failed to update platform"))?;

    info!(stage = "http", %id, "platform updated");
    Ok(Json(platform))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ProblemResponse> {
    state
        .storage()
        .platforms()
        .delete(&id)
        .await
        .map_err(|err| platform_problem(err, "failed to delete platform"))?;

    info!(stage = "http", %id, "platform deleted");
    Ok(Json(json!({ "message": "Platform deleted successfully" })))
}

fn platform_problem(err: PlatformError, context: &'static str) -> ProblemResponse {
    match err {
        PlatformError::NotFound => ProblemResponse::new(
            StatusCode::NOT_FOUND,
            "platform_not_found",
            "Platform not found",
        ),
        other => ProblemResponse::internal(context, other),
    }
}
