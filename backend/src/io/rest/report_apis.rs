//! # REST API for Reports

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tracing::info;

use shared::ApiResponse;

use crate::error::AppError;
use crate::io::rest::auth::AuthUser;
use crate::AppState;

// Query parameters for the summary report
#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Income/expense summary with category and monthly breakdowns
pub async fn summary(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<SummaryQuery>,
) -> Result<impl IntoResponse, AppError> {
    info!("GET /api/v1/reports/summary - user: {} query: {query:?}", auth.id());

    let summary = state
        .reports
        .summary(
            auth.id(),
            query.start_date.as_deref(),
            query.end_date.as_deref(),
        )
        .await?;
    Ok(Json(ApiResponse::new(summary)))
}
