pub mod account_service;
pub mod auth_service;
pub mod budget_service;
pub mod category_service;
pub mod report_service;
pub mod transaction_service;

pub use account_service::AccountService;
pub use auth_service::{AuthService, Claims};
pub use budget_service::{BudgetAlert, BudgetService, BudgetStats, BudgetStatus};
pub use category_service::{CategoryDetail, CategoryService, UsageTotals};
pub use report_service::ReportService;
pub use transaction_service::{TransactionListParams, TransactionPage, TransactionService};
