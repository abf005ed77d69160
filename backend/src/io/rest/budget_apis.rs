//! # REST API for Budgets
//!
//! Every budget response carries the derived spending status; stats and
//! alerts are read-only views over the same derivation.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::info;

use shared::{ApiResponse, CreateBudgetRequest, UpdateBudgetRequest};

use crate::error::AppError;
use crate::io::rest::auth::AuthUser;
use crate::io::rest::mappers;
use crate::AppState;

/// List the caller's budgets with their current status
pub async fn list_budgets(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    info!("GET /api/v1/budgets - user: {}", auth.id());

    let budgets = state.budgets.list(auth.id()).await?;
    let count = budgets.len();
    let dtos: Vec<_> = budgets
        .into_iter()
        .map(|(budget, status)| mappers::budget_status_dto(budget, status))
        .collect();
    Ok(Json(ApiResponse::with_count(dtos, count)))
}

pub async fn get_budget(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    info!("GET /api/v1/budgets/{id} - user: {}", auth.id());

    let (budget, status) = state.budgets.get(auth.id(), &id).await?;
    Ok(Json(ApiResponse::new(mappers::budget_status_dto(
        budget, status,
    ))))
}

pub async fn create_budget(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<CreateBudgetRequest>,
) -> Result<impl IntoResponse, AppError> {
    info!("POST /api/v1/budgets - user: {}", auth.id());

    let (budget, status) = state.budgets.create(auth.id(), request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(mappers::budget_status_dto(budget, status))),
    ))
}

pub async fn update_budget(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateBudgetRequest>,
) -> Result<impl IntoResponse, AppError> {
    info!("PUT /api/v1/budgets/{id} - user: {}", auth.id());

    let (budget, status) = state.budgets.update(auth.id(), &id, request).await?;
    Ok(Json(ApiResponse::new(mappers::budget_status_dto(
        budget, status,
    ))))
}

pub async fn delete_budget(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    info!("DELETE /api/v1/budgets/{id} - user: {}", auth.id());

    state.budgets.delete(auth.id(), &id).await?;
    Ok(Json(ApiResponse::new(serde_json::json!({}))))
}

/// Per-budget spending trend and remaining daily spend figures
pub async fn budget_stats(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    info!("GET /api/v1/budgets/stats - user: {}", auth.id());

    let stats = state.budgets.stats(auth.id()).await?;
    let count = stats.len();
    let dtos: Vec<_> = stats.into_iter().map(mappers::budget_stats_dto).collect();
    Ok(Json(ApiResponse::with_count(dtos, count)))
}

/// Usage and pace alerts for active budgets
pub async fn budget_alerts(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    info!("GET /api/v1/budgets/alerts - user: {}", auth.id());

    let alerts = state.budgets.alerts(auth.id()).await?;
    let count = alerts.len();
    let dtos: Vec<_> = alerts.into_iter().map(mappers::budget_alert_dto).collect();
    Ok(Json(ApiResponse::with_count(dtos, count)))
}
