use anyhow::{anyhow, Result};

/// A spending limit for one category over a date window. `spent` is never
/// stored; it is recomputed on every read from the matching expense
/// transactions.
#[derive(Debug, Clone, PartialEq)]
pub struct Budget {
    pub id: String,
    pub user_id: String,
    pub category: String,
    pub limit_amount: f64,
    pub period: BudgetPeriod,
    /// RFC 3339 UTC, inclusive window bounds
    pub start_date: String,
    pub end_date: String,
    pub is_active: bool,
    pub notifications: bool,
    pub created_at: String,
}

/// Cadence label for the budget window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetPeriod {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl From<shared::BudgetPeriod> for BudgetPeriod {
    fn from(period: shared::BudgetPeriod) -> Self {
        match period {
            shared::BudgetPeriod::Daily => BudgetPeriod::Daily,
            shared::BudgetPeriod::Weekly => BudgetPeriod::Weekly,
            shared::BudgetPeriod::Monthly => BudgetPeriod::Monthly,
            shared::BudgetPeriod::Yearly => BudgetPeriod::Yearly,
        }
    }
}

impl From<BudgetPeriod> for shared::BudgetPeriod {
    fn from(period: BudgetPeriod) -> Self {
        match period {
            BudgetPeriod::Daily => shared::BudgetPeriod::Daily,
            BudgetPeriod::Weekly => shared::BudgetPeriod::Weekly,
            BudgetPeriod::Monthly => shared::BudgetPeriod::Monthly,
            BudgetPeriod::Yearly => shared::BudgetPeriod::Yearly,
        }
    }
}

impl BudgetPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetPeriod::Daily => "daily",
            BudgetPeriod::Weekly => "weekly",
            BudgetPeriod::Monthly => "monthly",
            BudgetPeriod::Yearly => "yearly",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "daily" => Ok(BudgetPeriod::Daily),
            "weekly" => Ok(BudgetPeriod::Weekly),
            "monthly" => Ok(BudgetPeriod::Monthly),
            "yearly" => Ok(BudgetPeriod::Yearly),
            other => Err(anyhow!("unknown budget period: {other}")),
        }
    }
}
