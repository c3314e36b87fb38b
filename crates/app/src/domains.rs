use axum::{extract::rejection::JsonRejection, extract::State, Json};
use metrics::counter;
use tracing::info;

use domain_radar_core::types::{DomainCheck, DomainCheckRequest};
use domain_radar_storage::HISTORY_LIMIT;

use crate::problem::ProblemResponse;
use crate::router::AppState;

/// Runs the availability heuristic and records the outcome.
///
/// The stored `domain` is the caller's raw input, not the normalized host.
pub async fn check_domain(
    State(state): State<AppState>,
    payload: Result<Json<DomainCheckRequest>, JsonRejection>,
) -> Result<Json<DomainCheck>, ProblemResponse> {
    let Json(request) = payload?;

    let available = state.checker().check(&request.domain).await;
    let label = if available { "true" } else { "false" };
    counter!("domain_checks_total", "available" => label).increment(1);

    let check = DomainCheck {
        domain: request.domain,
        available,
        checked_at: state.now(),
    };
    state
        .storage()
        .domain_checks()
        .insert(&check)
        .await
        .map_err(|err| ProblemResponse::internal("failed to store domain check", err))?;

    info!(stage = "http", domain = %check.domain, available, "domain check recorded");
    Ok(Json(check))
}

pub async fn history(
    State(state): State<AppState>,
) -> Result<Json<Vec<DomainCheck>>, ProblemResponse> {
    let checks = state
        .storage()
        .domain_checks()
        .list_recent(HISTORY_LIMIT)
        .await
        .map_err(|err| ProblemResponse::internal("failed to load domain history", err))?;
    Ok(Json(checks))
}
