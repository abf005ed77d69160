use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::domain::models::{Budget, BudgetPeriod};
use crate::storage::connection::DbConnection;

/// Repository for budget rows
#[derive(Clone)]
pub struct BudgetRepository {
    db: DbConnection,
}

impl BudgetRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub async fn insert(&self, budget: &Budget) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO budgets
                (id, user_id, category, limit_amount, period, start_date, end_date,
                 is_active, notifications, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&budget.id)
        .bind(&budget.user_id)
        .bind(&budget.category)
        .bind(budget.limit_amount)
        .bind(budget.period.as_str())
        .bind(&budget.start_date)
        .bind(&budget.end_date)
        .bind(budget.is_active)
        .bind(budget.notifications)
        .bind(&budget.created_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    pub async fn find_for_user(&self, user_id: &str, id: &str) -> sqlx::Result<Option<Budget>> {
        let row = sqlx::query("SELECT * FROM budgets WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .fetch_optional(self.db.pool())
            .await?;
        row.as_ref().map(map_budget).transpose()
    }

    pub async fn list_for_user(&self, user_id: &str) -> sqlx::Result<Vec<Budget>> {
        let rows = sqlx::query("SELECT * FROM budgets WHERE user_id = ? ORDER BY created_at")
            .bind(user_id)
            .fetch_all(self.db.pool())
            .await?;
        rows.iter().map(map_budget).collect()
    }

    /// Budgets whose window has not yet closed as of `now`
    pub async fn list_active_for_user(&self, user_id: &str, now: &str) -> sqlx::Result<Vec<Budget>> {
        let rows = sqlx::query(
            "SELECT * FROM budgets WHERE user_id = ? AND end_date >= ? ORDER BY created_at",
        )
        .bind(user_id)
        .bind(now)
        .fetch_all(self.db.pool())
        .await?;
        rows.iter().map(map_budget).collect()
    }

    pub async fn update(&self, budget: &Budget) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            UPDATE budgets
            SET category = ?, limit_amount = ?, period = ?, start_date = ?,
                end_date = ?, is_active = ?, notifications = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(&budget.category)
        .bind(budget.limit_amount)
        .bind(budget.period.as_str())
        .bind(&budget.start_date)
        .bind(&budget.end_date)
        .bind(budget.is_active)
        .bind(budget.notifications)
        .bind(&budget.id)
        .bind(&budget.user_id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    pub async fn delete(&self, user_id: &str, id: &str) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM budgets WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Whether another budget of the same category overlaps the given
    /// inclusive window. Two windows overlap when each starts no later
    /// than the other ends.
    pub async fn overlap_exists(
        &self,
        user_id: &str,
        category: &str,
        start_date: &str,
        end_date: &str,
        exclude_id: Option<&str>,
    ) -> sqlx::Result<bool> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS n
            FROM budgets
            WHERE user_id = ? AND category = ?
              AND start_date <= ? AND end_date >= ?
              AND id != ?
            "#,
        )
        .bind(user_id)
        .bind(category)
        .bind(end_date)
        .bind(start_date)
        .bind(exclude_id.unwrap_or(""))
        .fetch_one(self.db.pool())
        .await?;
        let n: i64 = row.get("n");
        Ok(n > 0)
    }
}

fn map_budget(row: &SqliteRow) -> sqlx::Result<Budget> {
    let period: String = row.get("period");
    Ok(Budget {
        id: row.get("id"),
        user_id: row.get("user_id"),
        category: row.get("category"),
        limit_amount: row.get("limit_amount"),
        period: BudgetPeriod::parse(&period).map_err(|e| sqlx::Error::Decode(e.into()))?,
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
        is_active: row.get("is_active"),
        notifications: row.get("notifications"),
        created_at: row.get("created_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dates::now_rfc3339;
    use crate::storage::test_support::seed_user;

    fn test_budget(user_id: &str, category: &str, start: &str, end: &str) -> Budget {
        Budget {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            category: category.to_string(),
            limit_amount: 500.0,
            period: BudgetPeriod::Monthly,
            start_date: start.to_string(),
            end_date: end.to_string(),
            is_active: true,
            notifications: true,
            created_at: now_rfc3339(),
        }
    }

    #[tokio::test]
    async fn overlap_detection_covers_partial_and_contained_windows() {
        let db = DbConnection::init_test().await.unwrap();
        let user = seed_user(&db, "alice@example.com").await;
        let repo = BudgetRepository::new(db);

        let existing = test_budget(&user, "Food", "2025-01-01T00:00:00Z", "2025-01-31T23:59:59Z");
        repo.insert(&existing).await.unwrap();

        // Overlapping tail
        assert!(repo
            .overlap_exists(&user, "Food", "2025-01-20T00:00:00Z", "2025-02-20T23:59:59Z", None)
            .await
            .unwrap());
        // Fully contained
        assert!(repo
            .overlap_exists(&user, "Food", "2025-01-10T00:00:00Z", "2025-01-15T23:59:59Z", None)
            .await
            .unwrap());
        // Disjoint month
        assert!(!repo
            .overlap_exists(&user, "Food", "2025-02-01T00:00:00Z", "2025-02-28T23:59:59Z", None)
            .await
            .unwrap());
        // Different category
        assert!(!repo
            .overlap_exists(&user, "Transportation", "2025-01-10T00:00:00Z", "2025-01-15T23:59:59Z", None)
            .await
            .unwrap());
        // The budget itself is excluded when updating in place
        assert!(!repo
            .overlap_exists(
                &user,
                "Food",
                "2025-01-01T00:00:00Z",
                "2025-01-31T23:59:59Z",
                Some(&existing.id)
            )
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn active_listing_excludes_closed_windows() {
        let db = DbConnection::init_test().await.unwrap();
        let user = seed_user(&db, "alice@example.com").await;
        let repo = BudgetRepository::new(db);

        repo.insert(&test_budget(&user, "Food", "2020-01-01T00:00:00Z", "2020-01-31T23:59:59Z"))
            .await
            .unwrap();
        repo.insert(&test_budget(&user, "Transportation", "2020-01-01T00:00:00Z", "2099-12-31T23:59:59Z"))
            .await
            .unwrap();

        let active = repo
            .list_active_for_user(&user, &now_rfc3339())
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].category, "Transportation");
        assert_eq!(repo.list_for_user(&user).await.unwrap().len(), 2);
    }
}
