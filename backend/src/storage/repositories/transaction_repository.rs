use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection};

use crate::domain::models::{Transaction, TransactionKind};
use crate::storage::connection::DbConnection;

/// Filters for the transaction list endpoint. Date bounds are normalized
/// RFC 3339 UTC strings, so the comparisons are plain lexical SQL.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub kind: Option<String>,
    pub category: Option<String>,
    pub account_id: Option<String>,
}

/// Repository for transaction rows. Reads run against the pool; the writes
/// that must stay consistent with an account-balance adjustment take a
/// `&mut SqliteConnection` owned by the service's database transaction.
#[derive(Clone)]
pub struct TransactionRepository {
    db: DbConnection,
}

impl TransactionRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub async fn insert(conn: &mut SqliteConnection, t: &Transaction) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO transactions
                (id, user_id, account_id, kind, amount, category, description,
                 date, receipt_url, tags, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&t.id)
        .bind(&t.user_id)
        .bind(&t.account_id)
        .bind(t.kind.as_str())
        .bind(t.amount)
        .bind(&t.category)
        .bind(&t.description)
        .bind(&t.date)
        .bind(&t.receipt_url)
        .bind(encode_tags(&t.tags))
        .bind(&t.created_at)
        .execute(conn)
        .await?;
        Ok(())
    }

    pub async fn update(conn: &mut SqliteConnection, t: &Transaction) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            UPDATE transactions
            SET account_id = ?, kind = ?, amount = ?, category = ?,
                description = ?, date = ?, receipt_url = ?, tags = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(&t.account_id)
        .bind(t.kind.as_str())
        .bind(t.amount)
        .bind(&t.category)
        .bind(&t.description)
        .bind(&t.date)
        .bind(&t.receipt_url)
        .bind(encode_tags(&t.tags))
        .bind(&t.id)
        .bind(&t.user_id)
        .execute(conn)
        .await?;
        Ok(())
    }

    pub async fn delete(
        conn: &mut SqliteConnection,
        user_id: &str,
        id: &str,
    ) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove every transaction tied to an account, for the cascade when
    /// the account itself is deleted
    pub async fn delete_for_account(
        conn: &mut SqliteConnection,
        user_id: &str,
        account_id: &str,
    ) -> sqlx::Result<u64> {
        let result =
            sqlx::query("DELETE FROM transactions WHERE account_id = ? AND user_id = ?")
                .bind(account_id)
                .bind(user_id)
                .execute(conn)
                .await?;
        Ok(result.rows_affected())
    }

    pub async fn find_for_user(
        &self,
        user_id: &str,
        id: &str,
    ) -> sqlx::Result<Option<Transaction>> {
        let row = sqlx::query("SELECT * FROM transactions WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .fetch_optional(self.db.pool())
            .await?;
        row.as_ref().map(map_transaction).transpose()
    }

    /// List a filtered page of transactions, newest first
    pub async fn list_filtered(
        &self,
        user_id: &str,
        filter: &TransactionFilter,
        limit: u32,
        offset: u32,
    ) -> sqlx::Result<Vec<Transaction>> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM transactions WHERE user_id = ");
        qb.push_bind(user_id);
        push_filter(&mut qb, filter);
        qb.push(" ORDER BY date DESC LIMIT ");
        qb.push_bind(limit as i64);
        qb.push(" OFFSET ");
        qb.push_bind(offset as i64);

        let rows = qb.build().fetch_all(self.db.pool()).await?;
        rows.iter().map(map_transaction).collect()
    }

    /// Total row count for the same filter, for pagination metadata
    pub async fn count_filtered(
        &self,
        user_id: &str,
        filter: &TransactionFilter,
    ) -> sqlx::Result<u64> {
        let mut qb =
            QueryBuilder::<Sqlite>::new("SELECT COUNT(*) AS n FROM transactions WHERE user_id = ");
        qb.push_bind(user_id);
        push_filter(&mut qb, filter);

        let row = qb.build().fetch_one(self.db.pool()).await?;
        let n: i64 = row.try_get("n")?;
        Ok(n as u64)
    }

    /// Sum of expense amounts for a category within an inclusive window.
    /// This is the "spent" figure budgets derive on every read.
    /// SQLite types the empty aggregate after its literal, so the
    /// fallbacks here must be REAL or decoding the column fails.
    pub async fn sum_expenses_in_window(
        &self,
        user_id: &str,
        category: &str,
        start_date: &str,
        end_date: &str,
    ) -> sqlx::Result<f64> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(SUM(amount), 0.0) AS total
            FROM transactions
            WHERE user_id = ? AND category = ? AND kind = 'expense'
              AND date >= ? AND date <= ?
            "#,
        )
        .bind(user_id)
        .bind(category)
        .bind(start_date)
        .bind(end_date)
        .fetch_one(self.db.pool())
        .await?;
        row.try_get("total")
    }

    /// Per-day expense totals for a category window, oldest day first
    pub async fn daily_expense_totals(
        &self,
        user_id: &str,
        category: &str,
        start_date: &str,
        end_date: &str,
    ) -> sqlx::Result<Vec<(String, f64)>> {
        let rows = sqlx::query(
            r#"
            SELECT substr(date, 1, 10) AS day, SUM(amount) AS total
            FROM transactions
            WHERE user_id = ? AND category = ? AND kind = 'expense'
              AND date >= ? AND date <= ?
            GROUP BY day
            ORDER BY day
            "#,
        )
        .bind(user_id)
        .bind(category)
        .bind(start_date)
        .bind(end_date)
        .fetch_all(self.db.pool())
        .await?;
        rows.iter()
            .map(|r| Ok((r.try_get("day")?, r.try_get("total")?)))
            .collect()
    }

    /// Usage aggregate (total, count, average) for a category since a date
    pub async fn usage_since(
        &self,
        user_id: &str,
        category: &str,
        since: &str,
    ) -> sqlx::Result<(f64, u64, f64)> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(SUM(amount), 0.0) AS total,
                   COUNT(*) AS n,
                   COALESCE(AVG(amount), 0.0) AS average
            FROM transactions
            WHERE user_id = ? AND category = ? AND date >= ?
            "#,
        )
        .bind(user_id)
        .bind(category)
        .bind(since)
        .fetch_one(self.db.pool())
        .await?;
        let n: i64 = row.try_get("n")?;
        Ok((row.try_get("total")?, n as u64, row.try_get("average")?))
    }

    /// Per-month usage aggregates for a category, newest month first
    pub async fn monthly_usage(
        &self,
        user_id: &str,
        category: &str,
    ) -> sqlx::Result<Vec<(String, f64, u64, f64)>> {
        let rows = sqlx::query(
            r#"
            SELECT substr(date, 1, 7) AS month,
                   SUM(amount) AS total,
                   COUNT(*) AS n,
                   AVG(amount) AS average
            FROM transactions
            WHERE user_id = ? AND category = ?
            GROUP BY month
            ORDER BY month DESC
            "#,
        )
        .bind(user_id)
        .bind(category)
        .fetch_all(self.db.pool())
        .await?;
        rows.iter()
            .map(|r| {
                let n: i64 = r.try_get("n")?;
                Ok((
                    r.try_get("month")?,
                    r.try_get("total")?,
                    n as u64,
                    r.try_get("average")?,
                ))
            })
            .collect()
    }

    /// Most recent transactions referencing a category
    pub async fn recent_for_category(
        &self,
        user_id: &str,
        category: &str,
        limit: u32,
    ) -> sqlx::Result<Vec<Transaction>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM transactions
            WHERE user_id = ? AND category = ?
            ORDER BY date DESC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(category)
        .bind(limit as i64)
        .fetch_all(self.db.pool())
        .await?;
        rows.iter().map(map_transaction).collect()
    }

    /// How many of the user's transactions reference a category by name.
    /// Gates category deletion.
    pub async fn count_for_category(&self, user_id: &str, category: &str) -> sqlx::Result<u64> {
        let row =
            sqlx::query("SELECT COUNT(*) AS n FROM transactions WHERE user_id = ? AND category = ?")
                .bind(user_id)
                .bind(category)
                .fetch_one(self.db.pool())
                .await?;
        let n: i64 = row.try_get("n")?;
        Ok(n as u64)
    }

    /// Income and expense totals for an optional window
    pub async fn totals_by_kind(
        &self,
        user_id: &str,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> sqlx::Result<(f64, f64)> {
        let mut qb = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT COALESCE(SUM(CASE WHEN kind = 'income' THEN amount ELSE 0.0 END), 0.0) AS income,
                   COALESCE(SUM(CASE WHEN kind = 'expense' THEN amount ELSE 0.0 END), 0.0) AS expenses
            FROM transactions WHERE user_id = "#,
        );
        qb.push_bind(user_id);
        push_window(&mut qb, start_date, end_date);

        let row = qb.build().fetch_one(self.db.pool()).await?;
        Ok((row.try_get("income")?, row.try_get("expenses")?))
    }

    /// Per-category totals for an optional window, largest total first
    pub async fn category_totals(
        &self,
        user_id: &str,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> sqlx::Result<Vec<(String, f64, u64)>> {
        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT category, SUM(amount) AS total, COUNT(*) AS n FROM transactions WHERE user_id = ",
        );
        qb.push_bind(user_id);
        push_window(&mut qb, start_date, end_date);
        qb.push(" GROUP BY category ORDER BY total DESC");

        let rows = qb.build().fetch_all(self.db.pool()).await?;
        rows.iter()
            .map(|r| {
                let n: i64 = r.try_get("n")?;
                Ok((r.try_get("category")?, r.try_get("total")?, n as u64))
            })
            .collect()
    }

    /// Per-month income/expense totals for an optional window, oldest first
    pub async fn monthly_totals(
        &self,
        user_id: &str,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> sqlx::Result<Vec<(String, f64, f64)>> {
        let mut qb = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT substr(date, 1, 7) AS month,
                   COALESCE(SUM(CASE WHEN kind = 'income' THEN amount ELSE 0.0 END), 0.0) AS income,
                   COALESCE(SUM(CASE WHEN kind = 'expense' THEN amount ELSE 0.0 END), 0.0) AS expenses
            FROM transactions WHERE user_id = "#,
        );
        qb.push_bind(user_id);
        push_window(&mut qb, start_date, end_date);
        qb.push(" GROUP BY month ORDER BY month");

        let rows = qb.build().fetch_all(self.db.pool()).await?;
        rows.iter()
            .map(|r| Ok((r.try_get("month")?, r.try_get("income")?, r.try_get("expenses")?)))
            .collect()
    }

    pub async fn set_receipt_url(
        &self,
        user_id: &str,
        id: &str,
        receipt_url: &str,
    ) -> sqlx::Result<bool> {
        let result =
            sqlx::query("UPDATE transactions SET receipt_url = ? WHERE id = ? AND user_id = ?")
                .bind(receipt_url)
                .bind(id)
                .bind(user_id)
                .execute(self.db.pool())
                .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn push_filter<'a>(qb: &mut QueryBuilder<'a, Sqlite>, filter: &'a TransactionFilter) {
    if let Some(start) = &filter.start_date {
        qb.push(" AND date >= ");
        qb.push_bind(start);
    }
    if let Some(end) = &filter.end_date {
        qb.push(" AND date <= ");
        qb.push_bind(end);
    }
    if let Some(kind) = &filter.kind {
        qb.push(" AND kind = ");
        qb.push_bind(kind);
    }
    if let Some(category) = &filter.category {
        qb.push(" AND category = ");
        qb.push_bind(category);
    }
    if let Some(account_id) = &filter.account_id {
        qb.push(" AND account_id = ");
        qb.push_bind(account_id);
    }
}

fn push_window<'a>(
    qb: &mut QueryBuilder<'a, Sqlite>,
    start_date: Option<&'a str>,
    end_date: Option<&'a str>,
) {
    if let Some(start) = start_date {
        qb.push(" AND date >= ");
        qb.push_bind(start);
    }
    if let Some(end) = end_date {
        qb.push(" AND date <= ");
        qb.push_bind(end);
    }
}

fn encode_tags(tags: &[String]) -> String {
    serde_json::to_string(tags).unwrap_or_else(|_| "[]".to_string())
}

fn map_transaction(row: &SqliteRow) -> sqlx::Result<Transaction> {
    let kind: String = row.try_get("kind")?;
    let tags: String = row.try_get("tags")?;
    Ok(Transaction {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        account_id: row.try_get("account_id")?,
        kind: TransactionKind::parse(&kind).map_err(|e| sqlx::Error::Decode(e.into()))?,
        amount: row.try_get("amount")?,
        category: row.try_get("category")?,
        description: row.try_get("description")?,
        date: row.try_get("date")?,
        receipt_url: row.try_get("receipt_url")?,
        tags: serde_json::from_str(&tags).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        created_at: row.try_get("created_at")?,
    })
}
