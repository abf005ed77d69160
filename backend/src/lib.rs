//! # Wallet Tracker Backend
//!
//! REST backend for the personal finance tracker: accounts, transactions
//! with balance side effects, budgets with derived spending status,
//! categories and reports, all scoped to an authenticated user.
//!
//! Layers, top to bottom:
//! - `io::rest` - axum handlers, auth extractor, DTO mapping
//! - `domain` - entities, validation and the service per resource
//! - `storage` - SQLite pool, schema and repositories

pub mod config;
pub mod domain;
pub mod error;
pub mod io;
pub mod storage;

pub use config::Config;
pub use io::rest::create_router;

use domain::{
    AccountService, AuthService, BudgetService, CategoryService, ReportService,
    TransactionService,
};
use storage::{DbConnection, UserRepository};

/// Shared application state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub auth: AuthService,
    pub accounts: AccountService,
    pub transactions: TransactionService,
    pub budgets: BudgetService,
    pub categories: CategoryService,
    pub reports: ReportService,
}

/// Connect to the database, run schema setup and wire up the services
pub async fn initialize_backend(config: Config) -> anyhow::Result<AppState> {
    let db = DbConnection::init(&config.database_url).await?;
    let auth = AuthService::new(
        UserRepository::new(db.clone()),
        config.jwt_secret.clone(),
        config.jwt_expire_days,
    );
    Ok(AppState {
        auth,
        accounts: AccountService::new(db.clone()),
        transactions: TransactionService::new(db.clone()),
        budgets: BudgetService::new(db.clone()),
        categories: CategoryService::new(db.clone()),
        reports: ReportService::new(db),
        config,
    })
}
