//! Shared wire types for the wallet tracker API.
//!
//! Request and response DTOs exchanged between the REST backend and its
//! clients, plus the response envelope every endpoint uses. Everything in
//! this crate is plain serde data; business rules live in the backend's
//! domain layer.

use serde::{Deserialize, Serialize};

/// Standard success envelope: `{ success, data, count?, pagination? }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PageInfo>,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            count: None,
            pagination: None,
            data,
        }
    }

    pub fn with_count(data: T, count: usize) -> Self {
        Self {
            success: true,
            count: Some(count),
            pagination: None,
            data,
        }
    }

    pub fn with_pagination(data: T, count: usize, pagination: PageInfo) -> Self {
        Self {
            success: true,
            count: Some(count),
            pagination: Some(pagination),
            data,
        }
    }
}

/// Error envelope: `{ success: false, error }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    pub success: bool,
    pub error: String,
}

/// Page-based pagination metadata for list endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageInfo {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u64,
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Returned by register, login and password updates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub success: bool,
    pub token: String,
}

/// Current user, without the password hash
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDto {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateDetailsRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdatePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Checking,
    Savings,
    Credit,
    Investment,
    Cash,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountDto {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AccountKind,
    pub balance: f64,
    pub currency: String,
    pub created_at: String,
}

/// Abbreviated account details embedded in transaction responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountRef {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AccountKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateAccountRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AccountKind,
    pub balance: Option<f64>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateAccountRequest {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<AccountKind>,
    pub balance: Option<f64>,
    pub currency: Option<String>,
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
    Transfer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionDto {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: f64,
    pub category: String,
    pub description: Option<String>,
    /// RFC 3339 timestamp
    pub date: String,
    pub account: AccountRef,
    pub receipt_url: Option<String>,
    pub tags: Vec<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTransactionRequest {
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: f64,
    pub category: String,
    pub description: Option<String>,
    /// Optional date override; defaults to now
    pub date: Option<String>,
    /// Id of the account the transaction applies to
    pub account: String,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateTransactionRequest {
    #[serde(rename = "type")]
    pub kind: Option<TransactionKind>,
    pub amount: Option<f64>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub account: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachReceiptRequest {
    pub receipt_url: String,
}

// ---------------------------------------------------------------------------
// Budgets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetDto {
    pub id: String,
    pub category: String,
    pub limit: f64,
    pub period: BudgetPeriod,
    pub start_date: String,
    pub end_date: String,
    pub is_active: bool,
    pub notifications: bool,
    pub created_at: String,
}

/// Budget plus the spending status derived on every read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetStatusDto {
    #[serde(flatten)]
    pub budget: BudgetDto,
    pub spent: f64,
    pub remaining: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateBudgetRequest {
    pub category: String,
    pub limit: f64,
    pub period: BudgetPeriod,
    pub start_date: String,
    pub end_date: String,
    pub notifications: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateBudgetRequest {
    pub category: Option<String>,
    pub limit: Option<f64>,
    pub period: Option<BudgetPeriod>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub is_active: Option<bool>,
    pub notifications: Option<bool>,
}

/// One day of spending within a budget window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySpending {
    pub date: String,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetStatsDto {
    #[serde(flatten)]
    pub status: BudgetStatusDto,
    pub daily_spending: Vec<DailySpending>,
    pub days_remaining: i64,
    pub daily_budget: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetAlertDto {
    pub budget_id: String,
    pub category: String,
    pub spent: f64,
    pub limit: f64,
    pub percentage: f64,
    pub alerts: Vec<String>,
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    Income,
    Expense,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDto {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: CategoryKind,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub parent: Option<CategoryRef>,
    pub is_custom: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: String,
    pub name: String,
}

/// Last-30-days usage aggregate attached to category listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryUsage {
    pub total_amount: f64,
    pub count: u64,
    pub avg_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryWithUsage {
    #[serde(flatten)]
    pub category: CategoryDto,
    pub stats: CategoryUsage,
}

/// Per-month usage aggregate for a single category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyUsage {
    /// "YYYY-MM"
    pub month: String,
    pub total_amount: f64,
    pub count: u64,
    pub avg_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDetailDto {
    #[serde(flatten)]
    pub category: CategoryDto,
    pub monthly_stats: Vec<MonthlyUsage>,
    pub recent_transactions: Vec<TransactionDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: CategoryKind,
    pub icon: Option<String>,
    pub color: Option<String>,
    /// Id of the parent category, if this is a subcategory
    pub parent: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub parent: Option<String>,
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
    pub count: u64,
}

/// Income/expense totals bucketed by calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTotal {
    /// "YYYY-MM"
    pub month: String,
    pub income: f64,
    pub expenses: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_income: f64,
    pub total_expenses: f64,
    pub net: f64,
    /// (income - expenses) / income, 0 when there is no income
    pub savings_rate: f64,
    pub by_category: Vec<CategoryTotal>,
    pub monthly: Vec<MonthlyTotal>,
}
