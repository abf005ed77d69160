//! # Storage Layer
//!
//! SQLite persistence: the shared `DbConnection` (pool + schema setup) and
//! one repository per entity. Repositories hold plain SQL; multi-statement
//! writes that must stay consistent (transaction rows plus account balance)
//! accept a `&mut SqliteConnection` so the service can run them inside one
//! database transaction.

pub mod connection;
pub mod repositories;

#[cfg(test)]
pub(crate) mod test_support;

pub use connection::DbConnection;
pub use repositories::{
    AccountRepository, BudgetRepository, CategoryRepository, TransactionFilter,
    TransactionRepository, UserRepository,
};
