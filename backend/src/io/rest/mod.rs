//! # REST API Interface Layer
//!
//! HTTP endpoints for the wallet tracker, mounted under `/api/v1`. This
//! layer handles:
//! - Bearer-token authentication via the [`auth::AuthUser`] extractor
//! - JSON request/response serialization in the shared envelope
//! - Error translation from domain failures to HTTP status codes
//! - CORS configuration for the web client
//!
//! Business rules live in the domain services; handlers here only decode,
//! delegate and encode.

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::AppState;

pub mod account_apis;
pub mod auth;
pub mod auth_apis;
pub mod budget_apis;
pub mod category_apis;
pub mod mappers;
pub mod report_apis;
pub mod transaction_apis;

pub fn create_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(auth_apis::register))
        .route("/login", post(auth_apis::login))
        .route("/me", get(auth_apis::me))
        .route("/updatedetails", put(auth_apis::update_details))
        .route("/updatepassword", put(auth_apis::update_password));

    let account_routes = Router::new()
        .route(
            "/",
            get(account_apis::list_accounts).post(account_apis::create_account),
        )
        .route(
            "/:id",
            get(account_apis::get_account)
                .put(account_apis::update_account)
                .delete(account_apis::delete_account),
        );

    let transaction_routes = Router::new()
        .route(
            "/",
            get(transaction_apis::list_transactions).post(transaction_apis::create_transaction),
        )
        .route(
            "/:id",
            get(transaction_apis::get_transaction)
                .put(transaction_apis::update_transaction)
                .delete(transaction_apis::delete_transaction),
        )
        .route("/:id/receipt", post(transaction_apis::attach_receipt));

    let budget_routes = Router::new()
        .route(
            "/",
            get(budget_apis::list_budgets).post(budget_apis::create_budget),
        )
        .route("/stats", get(budget_apis::budget_stats))
        .route("/alerts", get(budget_apis::budget_alerts))
        .route(
            "/:id",
            get(budget_apis::get_budget)
                .put(budget_apis::update_budget)
                .delete(budget_apis::delete_budget),
        );

    let category_routes = Router::new()
        .route(
            "/",
            get(category_apis::list_categories).post(category_apis::create_category),
        )
        .route(
            "/:id",
            get(category_apis::get_category)
                .put(category_apis::update_category)
                .delete(category_apis::delete_category),
        );

    let report_routes = Router::new().route("/summary", get(report_apis::summary));

    let cors = cors_layer(&state.config.client_origin);

    Router::new()
        .nest("/api/v1/auth", auth_routes)
        .nest("/api/v1/accounts", account_routes)
        .nest("/api/v1/transactions", transaction_routes)
        .nest("/api/v1/budgets", budget_routes)
        .nest("/api/v1/categories", category_routes)
        .nest("/api/v1/reports", report_routes)
        .layer(cors)
        .with_state(state)
}

fn cors_layer(client_origin: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);
    match client_origin.parse::<HeaderValue>() {
        Ok(origin) => cors.allow_origin(origin),
        Err(_) => cors.allow_origin(Any),
    }
}
