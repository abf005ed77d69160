//! # Domain Layer
//!
//! Business rules for the wallet tracker: entities, date normalization and
//! one service per resource. Services own all validation and ownership
//! checks and are the only callers of the storage repositories; the REST
//! layer above them just decodes requests and encodes responses.

pub mod dates;
pub mod models;
pub mod services;

pub use services::{
    AccountService, AuthService, BudgetService, CategoryService, ReportService,
    TransactionService,
};
