//! # REST API for Authentication
//!
//! Registration, login and the current-user endpoints.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tracing::info;

use shared::{
    ApiResponse, LoginRequest, RegisterRequest, TokenResponse, UpdateDetailsRequest,
    UpdatePasswordRequest,
};

use crate::error::AppError;
use crate::io::rest::auth::AuthUser;
use crate::io::rest::mappers;
use crate::AppState;

/// Register a new user and return a signed token
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    info!("POST /api/v1/auth/register - email: {}", request.email);

    let (_, token) = state.auth.register(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(TokenResponse {
            success: true,
            token,
        }),
    ))
}

/// Verify credentials and return a fresh token
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    info!("POST /api/v1/auth/login - email: {}", request.email);

    let (_, token) = state.auth.login(request).await?;
    Ok(Json(TokenResponse {
        success: true,
        token,
    }))
}

/// The currently authenticated user
pub async fn me(auth: AuthUser) -> Result<impl IntoResponse, AppError> {
    info!("GET /api/v1/auth/me - user: {}", auth.id());
    Ok(Json(ApiResponse::new(mappers::user_dto(auth.user))))
}

/// Update the current user's name and/or email
pub async fn update_details(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<UpdateDetailsRequest>,
) -> Result<impl IntoResponse, AppError> {
    info!("PUT /api/v1/auth/updatedetails - user: {}", auth.id());

    let user = state.auth.update_details(auth.id(), request).await?;
    Ok(Json(ApiResponse::new(mappers::user_dto(user))))
}

/// Change the password, returning a fresh token
pub async fn update_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<UpdatePasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    info!("PUT /api/v1/auth/updatepassword - user: {}", auth.id());

    let token = state.auth.update_password(auth.id(), request).await?;
    Ok(Json(TokenResponse {
        success: true,
        token,
    }))
}
