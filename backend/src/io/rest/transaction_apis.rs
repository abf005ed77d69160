//! # REST API for Transactions
//!
//! Listing with filters and pagination, the CRUD endpoints whose balance
//! side effects live in the domain layer, and receipt attachment.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tracing::info;

use shared::{
    ApiResponse, AttachReceiptRequest, CreateTransactionRequest, PageInfo,
    UpdateTransactionRequest,
};

use crate::domain::services::TransactionListParams;
use crate::error::AppError;
use crate::io::rest::auth::AuthUser;
use crate::io::rest::mappers;
use crate::AppState;

// Query parameters for transaction listing
#[derive(Debug, Deserialize)]
pub struct TransactionListQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<shared::TransactionKind>,
    pub category: Option<String>,
    pub account: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// List transactions with optional filtering and pagination
pub async fn list_transactions(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<TransactionListQuery>,
) -> Result<impl IntoResponse, AppError> {
    info!("GET /api/v1/transactions - user: {} query: {query:?}", auth.id());

    let page = state
        .transactions
        .list(
            auth.id(),
            TransactionListParams {
                start_date: query.start_date,
                end_date: query.end_date,
                kind: query.kind,
                category: query.category,
                account: query.account,
                page: query.page,
                limit: query.limit,
            },
        )
        .await?;

    let pagination = PageInfo {
        page: page.page,
        limit: page.limit,
        total: page.total,
        pages: page.total.div_ceil(page.limit as u64),
    };
    let dtos = mappers::transaction_dtos(page.items, &page.accounts);
    let count = dtos.len();
    Ok(Json(ApiResponse::with_pagination(dtos, count, pagination)))
}

pub async fn get_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    info!("GET /api/v1/transactions/{id} - user: {}", auth.id());

    let (transaction, account) = state.transactions.get(auth.id(), &id).await?;
    Ok(Json(ApiResponse::new(mappers::transaction_dto(
        transaction,
        &account,
    ))))
}

pub async fn create_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<CreateTransactionRequest>,
) -> Result<impl IntoResponse, AppError> {
    info!("POST /api/v1/transactions - user: {}", auth.id());

    let (transaction, account) = state.transactions.create(auth.id(), request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(mappers::transaction_dto(
            transaction,
            &account,
        ))),
    ))
}

pub async fn update_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateTransactionRequest>,
) -> Result<impl IntoResponse, AppError> {
    info!("PUT /api/v1/transactions/{id} - user: {}", auth.id());

    let (transaction, account) = state.transactions.update(auth.id(), &id, request).await?;
    Ok(Json(ApiResponse::new(mappers::transaction_dto(
        transaction,
        &account,
    ))))
}

pub async fn delete_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    info!("DELETE /api/v1/transactions/{id} - user: {}", auth.id());

    state.transactions.delete(auth.id(), &id).await?;
    Ok(Json(ApiResponse::new(serde_json::json!({}))))
}

/// Record a receipt URL against a transaction
pub async fn attach_receipt(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(request): Json<AttachReceiptRequest>,
) -> Result<impl IntoResponse, AppError> {
    info!("POST /api/v1/transactions/{id}/receipt - user: {}", auth.id());

    let (transaction, account) = state
        .transactions
        .attach_receipt(auth.id(), &id, &request.receipt_url)
        .await?;
    Ok(Json(ApiResponse::new(mappers::transaction_dto(
        transaction,
        &account,
    ))))
}
