//! # REST API for Categories

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tracing::info;

use shared::{ApiResponse, CreateCategoryRequest, UpdateCategoryRequest};

use crate::error::AppError;
use crate::io::rest::auth::AuthUser;
use crate::io::rest::mappers;
use crate::AppState;

// Query parameters for category listing
#[derive(Debug, Deserialize)]
pub struct CategoryListQuery {
    #[serde(rename = "type")]
    pub kind: Option<shared::CategoryKind>,
}

/// List visible categories with their recent usage
pub async fn list_categories(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<CategoryListQuery>,
) -> Result<impl IntoResponse, AppError> {
    info!("GET /api/v1/categories - user: {} query: {query:?}", auth.id());

    let categories = state
        .categories
        .list(auth.id(), query.kind.map(Into::into))
        .await?;
    let dtos = mappers::category_list_dtos(categories);
    let count = dtos.len();
    Ok(Json(ApiResponse::with_count(dtos, count)))
}

/// One category with its monthly history and recent transactions
pub async fn get_category(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    info!("GET /api/v1/categories/{id} - user: {}", auth.id());

    let detail = state.categories.detail(auth.id(), &id).await?;
    Ok(Json(ApiResponse::new(mappers::category_detail_dto(detail))))
}

pub async fn create_category(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    info!("POST /api/v1/categories - user: {}", auth.id());

    let category = state.categories.create(auth.id(), request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(mappers::category_dto(category, None))),
    ))
}

pub async fn update_category(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateCategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    info!("PUT /api/v1/categories/{id} - user: {}", auth.id());

    let category = state.categories.update(auth.id(), &id, request).await?;
    Ok(Json(ApiResponse::new(mappers::category_dto(category, None))))
}

pub async fn delete_category(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    info!("DELETE /api/v1/categories/{id} - user: {}", auth.id());

    state.categories.delete(auth.id(), &id).await?;
    Ok(Json(ApiResponse::new(serde_json::json!({}))))
}
