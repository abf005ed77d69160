//! Domain entities, independent of both the wire DTOs and the storage rows.

pub mod account;
pub mod budget;
pub mod category;
pub mod transaction;
pub mod user;

pub use account::{Account, AccountKind};
pub use budget::{Budget, BudgetPeriod};
pub use category::{Category, CategoryKind};
pub use transaction::{Transaction, TransactionKind};
pub use user::{User, UserRole};
