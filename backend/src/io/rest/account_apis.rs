//! # REST API for Accounts

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::info;

use shared::{ApiResponse, CreateAccountRequest, UpdateAccountRequest};

use crate::error::AppError;
use crate::io::rest::auth::AuthUser;
use crate::io::rest::mappers;
use crate::AppState;

/// List the caller's accounts
pub async fn list_accounts(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    info!("GET /api/v1/accounts - user: {}", auth.id());

    let accounts = state.accounts.list(auth.id()).await?;
    let count = accounts.len();
    let dtos: Vec<_> = accounts.into_iter().map(mappers::account_dto).collect();
    Ok(Json(ApiResponse::with_count(dtos, count)))
}

pub async fn get_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    info!("GET /api/v1/accounts/{id} - user: {}", auth.id());

    let account = state.accounts.get(auth.id(), &id).await?;
    Ok(Json(ApiResponse::new(mappers::account_dto(account))))
}

pub async fn create_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<CreateAccountRequest>,
) -> Result<impl IntoResponse, AppError> {
    info!("POST /api/v1/accounts - user: {}", auth.id());

    let account = state.accounts.create(auth.id(), request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(mappers::account_dto(account))),
    ))
}

pub async fn update_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateAccountRequest>,
) -> Result<impl IntoResponse, AppError> {
    info!("PUT /api/v1/accounts/{id} - user: {}", auth.id());

    let account = state.accounts.update(auth.id(), &id, request).await?;
    Ok(Json(ApiResponse::new(mappers::account_dto(account))))
}

pub async fn delete_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    info!("DELETE /api/v1/accounts/{id} - user: {}", auth.id());

    state.accounts.delete(auth.id(), &id).await?;
    Ok(Json(ApiResponse::new(serde_json::json!({}))))
}
