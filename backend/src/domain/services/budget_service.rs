//! Budgets and their derived spending status.
//!
//! A budget stores only its limit and window; `spent` is recomputed from
//! the matching expense transactions on every read, so budget figures can
//! never drift from the transaction history.

use tracing::info;

use shared::{CreateBudgetRequest, UpdateBudgetRequest};

use crate::domain::dates::{
    days_between_ceil, now_rfc3339, now_utc, parse_end_bound, parse_start_bound, parse_stored,
    to_rfc3339,
};
use crate::domain::models::Budget;
use crate::error::AppError;
use crate::storage::{BudgetRepository, DbConnection, TransactionRepository};

const CRITICAL_USAGE_PCT: f64 = 90.0;
const WARNING_USAGE_PCT: f64 = 75.0;
/// Percentage points over the time-proportional pace before warning
const PACE_TOLERANCE_PCT: f64 = 10.0;

/// Spending figures derived from the budget's expense transactions
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetStatus {
    pub spent: f64,
    pub remaining: f64,
    pub percentage: f64,
}

/// Status plus the per-day trend used by the stats endpoint
pub struct BudgetStats {
    pub budget: Budget,
    pub status: BudgetStatus,
    pub daily_spending: Vec<(String, f64)>,
    pub days_remaining: i64,
    pub daily_budget: f64,
}

pub struct BudgetAlert {
    pub budget: Budget,
    pub status: BudgetStatus,
    pub alerts: Vec<String>,
}

#[derive(Clone)]
pub struct BudgetService {
    budgets: BudgetRepository,
    transactions: TransactionRepository,
}

impl BudgetService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            budgets: BudgetRepository::new(db.clone()),
            transactions: TransactionRepository::new(db),
        }
    }

    pub async fn create(
        &self,
        user_id: &str,
        request: CreateBudgetRequest,
    ) -> Result<(Budget, BudgetStatus), AppError> {
        if request.category.trim().is_empty() {
            return Err(AppError::BadRequest("Please add a category".to_string()));
        }
        if !request.limit.is_finite() || request.limit <= 0.0 {
            return Err(AppError::BadRequest(
                "Limit must be greater than 0".to_string(),
            ));
        }
        let start_date = parse_start_bound(&request.start_date)?;
        let end_date = parse_end_bound(&request.end_date)?;
        if start_date > end_date {
            return Err(AppError::BadRequest(
                "Start date must be before end date".to_string(),
            ));
        }
        let category = request.category.trim().to_string();
        if self
            .budgets
            .overlap_exists(user_id, &category, &start_date, &end_date, None)
            .await?
        {
            return Err(AppError::BadRequest(
                "Budget already exists for this category and time period".to_string(),
            ));
        }

        let budget = Budget {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            category,
            limit_amount: request.limit,
            period: request.period.into(),
            start_date,
            end_date,
            is_active: true,
            notifications: request.notifications.unwrap_or(true),
            created_at: now_rfc3339(),
        };
        self.budgets.insert(&budget).await?;
        info!("created budget {} for user {user_id}", budget.id);

        let status = self.status_of(&budget).await?;
        Ok((budget, status))
    }

    pub async fn get(&self, user_id: &str, id: &str) -> Result<(Budget, BudgetStatus), AppError> {
        let budget = self.require_budget(user_id, id).await?;
        let status = self.status_of(&budget).await?;
        Ok((budget, status))
    }

    pub async fn list(&self, user_id: &str) -> Result<Vec<(Budget, BudgetStatus)>, AppError> {
        let budgets = self.budgets.list_for_user(user_id).await?;
        let mut out = Vec::with_capacity(budgets.len());
        for budget in budgets {
            let status = self.status_of(&budget).await?;
            out.push((budget, status));
        }
        Ok(out)
    }

    pub async fn update(
        &self,
        user_id: &str,
        id: &str,
        request: UpdateBudgetRequest,
    ) -> Result<(Budget, BudgetStatus), AppError> {
        let mut budget = self.require_budget(user_id, id).await?;

        if let Some(category) = request.category {
            if category.trim().is_empty() {
                return Err(AppError::BadRequest("Please add a category".to_string()));
            }
            budget.category = category.trim().to_string();
        }
        if let Some(limit) = request.limit {
            if !limit.is_finite() || limit <= 0.0 {
                return Err(AppError::BadRequest(
                    "Limit must be greater than 0".to_string(),
                ));
            }
            budget.limit_amount = limit;
        }
        if let Some(period) = request.period {
            budget.period = period.into();
        }
        if let Some(start_date) = &request.start_date {
            budget.start_date = parse_start_bound(start_date)?;
        }
        if let Some(end_date) = &request.end_date {
            budget.end_date = parse_end_bound(end_date)?;
        }
        if budget.start_date > budget.end_date {
            return Err(AppError::BadRequest(
                "Start date must be before end date".to_string(),
            ));
        }
        if let Some(is_active) = request.is_active {
            budget.is_active = is_active;
        }
        if let Some(notifications) = request.notifications {
            budget.notifications = notifications;
        }

        if self
            .budgets
            .overlap_exists(
                user_id,
                &budget.category,
                &budget.start_date,
                &budget.end_date,
                Some(id),
            )
            .await?
        {
            return Err(AppError::BadRequest(
                "Budget already exists for this category and time period".to_string(),
            ));
        }

        self.budgets.update(&budget).await?;
        let status = self.status_of(&budget).await?;
        Ok((budget, status))
    }

    pub async fn delete(&self, user_id: &str, id: &str) -> Result<(), AppError> {
        if !self.budgets.delete(user_id, id).await? {
            return Err(AppError::NotFound(format!(
                "Budget not found with id of {id}"
            )));
        }
        info!("deleted budget {id} for user {user_id}");
        Ok(())
    }

    /// Status of every budget whose window is still open, plus its daily
    /// spending trend and the daily amount that would land exactly on the
    /// limit at the window's end
    pub async fn stats(&self, user_id: &str) -> Result<Vec<BudgetStats>, AppError> {
        let now = now_utc();
        let budgets = self
            .budgets
            .list_active_for_user(user_id, &to_rfc3339(now))
            .await?;
        let mut out = Vec::with_capacity(budgets.len());
        for budget in budgets {
            let status = self.status_of(&budget).await?;
            let daily_spending = self
                .transactions
                .daily_expense_totals(
                    user_id,
                    &budget.category,
                    &budget.start_date,
                    &budget.end_date,
                )
                .await?;

            let end = parse_stored(&budget.end_date)?;
            let days_remaining = days_between_ceil(now, end).max(0);
            // Goes negative once the budget is overspent
            let daily_budget = round2(status.remaining / days_remaining.max(1) as f64);
            out.push(BudgetStats {
                budget,
                status,
                daily_spending,
                days_remaining,
                daily_budget,
            });
        }
        Ok(out)
    }

    /// Usage and pace alerts for active budgets with notifications enabled.
    /// Budgets with nothing to report are omitted.
    pub async fn alerts(&self, user_id: &str) -> Result<Vec<BudgetAlert>, AppError> {
        let now = now_utc();
        let budgets = self
            .budgets
            .list_active_for_user(user_id, &now_rfc3339())
            .await?;
        let mut out = Vec::new();
        for budget in budgets {
            if !budget.is_active || !budget.notifications {
                continue;
            }
            let status = self.status_of(&budget).await?;

            let mut alerts = Vec::new();
            if status.percentage >= CRITICAL_USAGE_PCT {
                alerts.push("Critical: Budget almost exhausted".to_string());
            } else if status.percentage >= WARNING_USAGE_PCT {
                alerts.push("Warning: Budget usage high".to_string());
            }

            let start = parse_stored(&budget.start_date)?;
            let end = parse_stored(&budget.end_date)?;
            let total_days = days_between_ceil(start, end).max(1);
            let elapsed_days = days_between_ceil(start, now).clamp(0, total_days);
            let expected_pct = elapsed_days as f64 / total_days as f64 * 100.0;
            if status.percentage > expected_pct + PACE_TOLERANCE_PCT {
                alerts.push("Warning: Spending rate higher than expected".to_string());
            }

            if !alerts.is_empty() {
                out.push(BudgetAlert {
                    budget,
                    status,
                    alerts,
                });
            }
        }
        Ok(out)
    }

    async fn status_of(&self, budget: &Budget) -> Result<BudgetStatus, AppError> {
        let spent = self
            .transactions
            .sum_expenses_in_window(
                &budget.user_id,
                &budget.category,
                &budget.start_date,
                &budget.end_date,
            )
            .await?;
        let percentage = if budget.limit_amount > 0.0 {
            round2(spent / budget.limit_amount * 100.0)
        } else if spent > 0.0 {
            100.0
        } else {
            0.0
        };
        Ok(BudgetStatus {
            spent,
            remaining: round2(budget.limit_amount - spent),
            percentage,
        })
    }

    async fn require_budget(&self, user_id: &str, id: &str) -> Result<Budget, AppError> {
        self.budgets
            .find_for_user(user_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Budget not found with id of {id}")))
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Transaction, TransactionKind};
    use crate::storage::test_support::{seed_account, seed_user};

    async fn setup() -> (BudgetService, DbConnection, String) {
        let db = DbConnection::init_test().await.unwrap();
        let user = seed_user(&db, "alice@example.com").await;
        seed_account(&db, &user).await;
        (BudgetService::new(db.clone()), db, user)
    }

    async fn spend(db: &DbConnection, user: &str, category: &str, amount: f64, date: &str) {
        let t = Transaction {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user.to_string(),
            account_id: format!("acct-{user}"),
            kind: TransactionKind::Expense,
            amount,
            category: category.to_string(),
            description: None,
            date: date.to_string(),
            receipt_url: None,
            tags: vec![],
            created_at: now_rfc3339(),
        };
        let mut tx = db.pool().begin().await.unwrap();
        TransactionRepository::insert(&mut tx, &t).await.unwrap();
        tx.commit().await.unwrap();
    }

    fn monthly_budget(category: &str, limit: f64, start: &str, end: &str) -> CreateBudgetRequest {
        CreateBudgetRequest {
            category: category.to_string(),
            limit,
            period: shared::BudgetPeriod::Monthly,
            start_date: start.to_string(),
            end_date: end.to_string(),
            notifications: Some(true),
        }
    }

    #[tokio::test]
    async fn status_is_derived_from_expenses_in_the_window() {
        let (service, db, user) = setup().await;
        let (budget, _) = service
            .create(&user, monthly_budget("Food", 500.0, "2025-01-01", "2025-01-31"))
            .await
            .unwrap();

        spend(&db, &user, "Food", 100.0, "2025-01-03T12:00:00Z").await;
        spend(&db, &user, "Food", 150.0, "2025-01-10T12:00:00Z").await;
        spend(&db, &user, "Food", 100.0, "2025-01-20T12:00:00Z").await;
        // Outside the window and in another category: ignored
        spend(&db, &user, "Food", 999.0, "2025-02-05T12:00:00Z").await;
        spend(&db, &user, "Transportation", 50.0, "2025-01-15T12:00:00Z").await;

        let (_, status) = service.get(&user, &budget.id).await.unwrap();
        assert_eq!(status.spent, 350.0);
        assert_eq!(status.remaining, 150.0);
        assert_eq!(status.percentage, 70.0);

        spend(&db, &user, "Food", 100.0, "2025-01-25T12:00:00Z").await;
        let (_, status) = service.get(&user, &budget.id).await.unwrap();
        assert_eq!(status.spent, 450.0);
        assert_eq!(status.percentage, 90.0);
    }

    #[tokio::test]
    async fn overlapping_budgets_are_rejected() {
        let (service, _, user) = setup().await;
        service
            .create(&user, monthly_budget("Food", 500.0, "2025-01-01", "2025-01-31"))
            .await
            .unwrap();

        let err = service
            .create(&user, monthly_budget("Food", 300.0, "2025-01-15", "2025-02-15"))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Budget already exists for this category and time period"
        );

        // A different category in the same window is fine
        service
            .create(&user, monthly_budget("Transportation", 200.0, "2025-01-01", "2025-01-31"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn update_may_keep_its_own_window() {
        let (service, _, user) = setup().await;
        let (budget, _) = service
            .create(&user, monthly_budget("Food", 500.0, "2025-01-01", "2025-01-31"))
            .await
            .unwrap();

        let (updated, _) = service
            .update(
                &user,
                &budget.id,
                UpdateBudgetRequest {
                    limit: Some(600.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.limit_amount, 600.0);
    }

    #[tokio::test]
    async fn critical_usage_raises_an_alert() {
        let (service, db, user) = setup().await;
        service
            .create(&user, monthly_budget("Food", 500.0, "2020-01-01", "2099-12-31"))
            .await
            .unwrap();
        spend(&db, &user, "Food", 450.0, "2025-01-10T12:00:00Z").await;

        let alerts = service.alerts(&user).await.unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].status.percentage, 90.0);
        assert!(alerts[0]
            .alerts
            .contains(&"Critical: Budget almost exhausted".to_string()));
    }

    #[tokio::test]
    async fn high_usage_below_critical_raises_a_warning() {
        let (service, db, user) = setup().await;
        service
            .create(&user, monthly_budget("Food", 500.0, "2020-01-01", "2099-12-31"))
            .await
            .unwrap();
        spend(&db, &user, "Food", 400.0, "2025-01-10T12:00:00Z").await;

        let alerts = service.alerts(&user).await.unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].status.percentage, 80.0);
        assert!(alerts[0]
            .alerts
            .contains(&"Warning: Budget usage high".to_string()));
        assert!(!alerts[0]
            .alerts
            .contains(&"Critical: Budget almost exhausted".to_string()));
    }

    #[tokio::test]
    async fn spending_ahead_of_pace_raises_an_alert_on_its_own() {
        let (service, db, user) = setup().await;
        // A decades-long window keeps the elapsed share tiny, so 30%
        // usage is far ahead of pace while well under the warning band
        service
            .create(&user, monthly_budget("Food", 1000.0, "2025-01-01", "2099-12-31"))
            .await
            .unwrap();
        spend(&db, &user, "Food", 300.0, "2025-06-10T12:00:00Z").await;

        let alerts = service.alerts(&user).await.unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(
            alerts[0].alerts,
            vec!["Warning: Spending rate higher than expected".to_string()]
        );
    }

    #[tokio::test]
    async fn quiet_budgets_produce_no_alerts() {
        let (service, db, user) = setup().await;
        service
            .create(&user, monthly_budget("Food", 500.0, "2020-01-01", "2099-12-31"))
            .await
            .unwrap();
        spend(&db, &user, "Food", 10.0, "2025-01-10T12:00:00Z").await;

        assert!(service.alerts(&user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn disabled_notifications_suppress_alerts() {
        let (service, db, user) = setup().await;
        let mut request = monthly_budget("Food", 100.0, "2020-01-01", "2099-12-31");
        request.notifications = Some(false);
        service.create(&user, request).await.unwrap();
        spend(&db, &user, "Food", 95.0, "2025-01-10T12:00:00Z").await;

        assert!(service.alerts(&user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn stats_include_the_daily_trend() {
        let (service, db, user) = setup().await;
        service
            .create(&user, monthly_budget("Food", 500.0, "2025-01-01", "2099-12-31"))
            .await
            .unwrap();
        spend(&db, &user, "Food", 20.0, "2025-01-03T08:00:00Z").await;
        spend(&db, &user, "Food", 10.0, "2025-01-03T19:00:00Z").await;
        spend(&db, &user, "Food", 40.0, "2025-01-05T12:00:00Z").await;

        let stats = service.stats(&user).await.unwrap();
        assert_eq!(stats.len(), 1);
        assert_eq!(
            stats[0].daily_spending,
            vec![
                ("2025-01-03".to_string(), 30.0),
                ("2025-01-05".to_string(), 40.0),
            ]
        );
        assert!(stats[0].days_remaining > 0);
        assert!(stats[0].daily_budget > 0.0);
    }

    #[tokio::test]
    async fn overspent_budgets_report_a_negative_daily_budget() {
        let (service, db, user) = setup().await;
        service
            .create(&user, monthly_budget("Food", 500.0, "2025-01-01", "2099-12-31"))
            .await
            .unwrap();
        spend(&db, &user, "Food", 30000.0, "2025-01-10T12:00:00Z").await;

        let stats = service.stats(&user).await.unwrap();
        assert_eq!(stats.len(), 1);
        assert!(stats[0].status.remaining < 0.0);
        assert!(stats[0].days_remaining > 0);
        assert!(stats[0].daily_budget < 0.0);
    }
}
