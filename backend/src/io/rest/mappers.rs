//! Domain-to-wire conversions for the REST responses.

use std::collections::HashMap;

use shared::{
    AccountDto, AccountRef, BudgetAlertDto, BudgetDto, BudgetStatsDto, BudgetStatusDto,
    CategoryDetailDto, CategoryDto, CategoryRef, CategoryUsage, CategoryWithUsage, DailySpending,
    MonthlyUsage, TransactionDto, UserDto,
};

use crate::domain::models::{Account, Budget, Category, Transaction, User};
use crate::domain::services::{
    budget_service::{BudgetAlert, BudgetStats, BudgetStatus},
    category_service::CategoryDetail,
    UsageTotals,
};

pub fn user_dto(user: User) -> UserDto {
    UserDto {
        id: user.id,
        name: user.name,
        email: user.email,
        role: user.role.as_str().to_string(),
        created_at: user.created_at,
    }
}

pub fn account_dto(account: Account) -> AccountDto {
    AccountDto {
        id: account.id,
        name: account.name,
        kind: account.kind.into(),
        balance: account.balance,
        currency: account.currency,
        created_at: account.created_at,
    }
}

pub fn account_ref(account: &Account) -> AccountRef {
    AccountRef {
        id: account.id.clone(),
        name: account.name.clone(),
        kind: account.kind.into(),
    }
}

pub fn transaction_dto(transaction: Transaction, account: &Account) -> TransactionDto {
    TransactionDto {
        id: transaction.id,
        kind: transaction.kind.into(),
        amount: transaction.amount,
        category: transaction.category,
        description: transaction.description,
        date: transaction.date,
        account: account_ref(account),
        receipt_url: transaction.receipt_url,
        tags: transaction.tags,
        created_at: transaction.created_at,
    }
}

/// Map a batch of transactions, resolving each account from the map.
/// Transactions whose account is gone are dropped rather than invented.
pub fn transaction_dtos(
    transactions: Vec<Transaction>,
    accounts: &HashMap<String, Account>,
) -> Vec<TransactionDto> {
    transactions
        .into_iter()
        .filter_map(|t| {
            let account = accounts.get(&t.account_id)?;
            Some(transaction_dto(t, account))
        })
        .collect()
}

pub fn budget_dto(budget: Budget) -> BudgetDto {
    BudgetDto {
        id: budget.id,
        category: budget.category,
        limit: budget.limit_amount,
        period: budget.period.into(),
        start_date: budget.start_date,
        end_date: budget.end_date,
        is_active: budget.is_active,
        notifications: budget.notifications,
        created_at: budget.created_at,
    }
}

pub fn budget_status_dto(budget: Budget, status: BudgetStatus) -> BudgetStatusDto {
    BudgetStatusDto {
        budget: budget_dto(budget),
        spent: status.spent,
        remaining: status.remaining,
        percentage: status.percentage,
    }
}

pub fn budget_stats_dto(stats: BudgetStats) -> BudgetStatsDto {
    BudgetStatsDto {
        status: budget_status_dto(stats.budget, stats.status),
        daily_spending: stats
            .daily_spending
            .into_iter()
            .map(|(date, total)| DailySpending { date, total })
            .collect(),
        days_remaining: stats.days_remaining,
        daily_budget: stats.daily_budget,
    }
}

pub fn budget_alert_dto(alert: BudgetAlert) -> BudgetAlertDto {
    BudgetAlertDto {
        budget_id: alert.budget.id,
        category: alert.budget.category,
        spent: alert.status.spent,
        limit: alert.budget.limit_amount,
        percentage: alert.status.percentage,
        alerts: alert.alerts,
    }
}

pub fn category_dto(category: Category, parent: Option<CategoryRef>) -> CategoryDto {
    CategoryDto {
        id: category.id,
        name: category.name,
        kind: category.kind.into(),
        icon: category.icon,
        color: category.color,
        parent,
        is_custom: category.is_custom,
        created_at: category.created_at,
    }
}

/// Map a category listing, resolving parent references from within the
/// same visible set
pub fn category_list_dtos(items: Vec<(Category, UsageTotals)>) -> Vec<CategoryWithUsage> {
    let names: HashMap<String, String> = items
        .iter()
        .map(|(c, _)| (c.id.clone(), c.name.clone()))
        .collect();
    items
        .into_iter()
        .map(|(category, usage)| {
            let parent = category.parent_id.as_ref().and_then(|id| {
                names.get(id).map(|name| CategoryRef {
                    id: id.clone(),
                    name: name.clone(),
                })
            });
            CategoryWithUsage {
                category: category_dto(category, parent),
                stats: CategoryUsage {
                    total_amount: usage.total,
                    count: usage.count,
                    avg_amount: usage.average,
                },
            }
        })
        .collect()
}

pub fn category_detail_dto(detail: CategoryDetail) -> CategoryDetailDto {
    let parent = detail.parent.map(|p| CategoryRef {
        id: p.id,
        name: p.name,
    });
    CategoryDetailDto {
        category: category_dto(detail.category, parent),
        monthly_stats: detail
            .monthly
            .into_iter()
            .map(|(month, total, count, average)| MonthlyUsage {
                month,
                total_amount: total,
                count,
                avg_amount: average,
            })
            .collect(),
        recent_transactions: transaction_dtos(detail.recent, &detail.accounts),
    }
}
