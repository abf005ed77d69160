//! Bearer-token authentication extractor.
//!
//! Handlers that take an [`AuthUser`] argument only run for requests with
//! a valid `Authorization: Bearer <jwt>` header naming a user that still
//! exists; everything else is rejected with a 401 before the handler body.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::domain::models::User;
use crate::domain::services::auth_service::decode_token;
use crate::error::AppError;
use crate::AppState;

/// The authenticated caller, resolved from the bearer token
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
}

impl AuthUser {
    pub fn id(&self) -> &str {
        &self.user.id
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| {
                AppError::Unauthorized("Not authorized to access this route".to_string())
            })?;

        let claims = decode_token(&state.config.jwt_secret, token)?;
        // The token may outlive the account it was issued for; storage
        // failures are not an authorization problem and pass through
        let user = state.auth.me(&claims.sub).await.map_err(|e| match e {
            AppError::NotFound(_) => {
                AppError::Unauthorized("No user found with this id".to_string())
            }
            other => other,
        })?;
        Ok(AuthUser { user })
    }
}
