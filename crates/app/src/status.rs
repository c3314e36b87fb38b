use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use domain_radar_core::types::{NewStatusCheck, StatusCheck};
use domain_radar_storage::STATUS_LIST_LIMIT;

use crate::problem::ProblemResponse;
use crate::router::AppState;

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<NewStatusCheck>, JsonRejection>,
) -> Result<Json<StatusCheck>, ProblemResponse> {
    let Json(input) = payload?;
    let record = StatusCheck::new(input.client_name, state.now());

    state
        .storage()
        .status_checks()
        .insert(&record)
        .await
        .map_err(|err| ProblemResponse::internal("failed to store status check", err))?;
    Ok(Json(record))
}

pub async fn list(
    State(state): State<AppState>,
) -> Result<Json<Vec<StatusCheck>>, ProblemResponse> {
    let records = state
        .storage()
        .status_checks()
        .list(STATUS_LIST_LIMIT)
        .await
        .map_err(|err| ProblemResponse::internal("failed to load status checks", err))?;
    Ok(Json(records))
}
