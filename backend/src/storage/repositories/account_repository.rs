use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use crate::domain::models::{Account, AccountKind};
use crate::storage::connection::DbConnection;

/// Repository for account rows. Balance adjustments take an explicit
/// connection so they can share a database transaction with the
/// transaction-row write they belong to.
#[derive(Clone)]
pub struct AccountRepository {
    db: DbConnection,
}

impl AccountRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub async fn insert(&self, account: &Account) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO accounts (id, user_id, name, kind, balance, currency, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&account.id)
        .bind(&account.user_id)
        .bind(&account.name)
        .bind(account.kind.as_str())
        .bind(account.balance)
        .bind(&account.currency)
        .bind(&account.created_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    pub async fn find_for_user(&self, user_id: &str, id: &str) -> sqlx::Result<Option<Account>> {
        let row = sqlx::query("SELECT * FROM accounts WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .fetch_optional(self.db.pool())
            .await?;
        row.as_ref().map(map_account).transpose()
    }

    pub async fn list_for_user(&self, user_id: &str) -> sqlx::Result<Vec<Account>> {
        let rows = sqlx::query("SELECT * FROM accounts WHERE user_id = ? ORDER BY created_at")
            .bind(user_id)
            .fetch_all(self.db.pool())
            .await?;
        rows.iter().map(map_account).collect()
    }

    pub async fn update(&self, account: &Account) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            UPDATE accounts
            SET name = ?, kind = ?, balance = ?, currency = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(&account.name)
        .bind(account.kind.as_str())
        .bind(account.balance)
        .bind(&account.currency)
        .bind(&account.id)
        .bind(&account.user_id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    /// Delete on the caller's connection; account removal cascades to the
    /// account's transactions in the same database transaction.
    pub async fn delete(
        conn: &mut SqliteConnection,
        user_id: &str,
        id: &str,
    ) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Apply a signed delta to an account's running balance. Runs on the
    /// caller's connection so the adjustment commits or rolls back together
    /// with the transaction-row write.
    pub async fn adjust_balance(
        conn: &mut SqliteConnection,
        account_id: &str,
        delta: f64,
    ) -> sqlx::Result<()> {
        sqlx::query("UPDATE accounts SET balance = balance + ? WHERE id = ?")
            .bind(delta)
            .bind(account_id)
            .execute(conn)
            .await?;
        Ok(())
    }
}

fn map_account(row: &SqliteRow) -> sqlx::Result<Account> {
    let kind: String = row.get("kind");
    Ok(Account {
        id: row.get("id"),
        user_id: row.get("user_id"),
        name: row.get("name"),
        kind: AccountKind::parse(&kind).map_err(|e| sqlx::Error::Decode(e.into()))?,
        balance: row.get("balance"),
        currency: row.get("currency"),
        created_at: row.get("created_at"),
    })
}
