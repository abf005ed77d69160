pub mod account_repository;
pub mod budget_repository;
pub mod category_repository;
pub mod transaction_repository;
pub mod user_repository;

pub use account_repository::AccountRepository;
pub use budget_repository::BudgetRepository;
pub use category_repository::CategoryRepository;
pub use transaction_repository::{TransactionFilter, TransactionRepository};
pub use user_repository::UserRepository;
