use anyhow::Result;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use std::sync::Arc;

/// DbConnection manages the SQLite pool and schema setup
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

/// System categories seeded at schema setup: (id, name, kind)
const SYSTEM_CATEGORIES: &[(&str, &str, &str)] = &[
    ("sys-salary", "Salary", "income"),
    ("sys-freelance", "Freelance", "income"),
    ("sys-investment-income", "Investment Income", "income"),
    ("sys-other-income", "Other Income", "income"),
    ("sys-food", "Food", "expense"),
    ("sys-transportation", "Transportation", "expense"),
    ("sys-housing", "Housing", "expense"),
    ("sys-utilities", "Utilities", "expense"),
    ("sys-entertainment", "Entertainment", "expense"),
    ("sys-healthcare", "Healthcare", "expense"),
    ("sys-shopping", "Shopping", "expense"),
    ("sys-other", "Other", "expense"),
];

impl DbConnection {
    /// Create a new database connection
    pub async fn new(url: &str) -> Result<Self> {
        // Create database if it doesn't exist
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            Sqlite::create_database(url).await?
        }

        let pool = SqlitePool::connect(url).await?;
        Self::setup_schema(&pool).await?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Initialize the database at the configured URL
    pub async fn init(url: &str) -> Result<Self> {
        Self::new(url).await
    }

    /// Initialize a test database with a unique name
    #[cfg(test)]
    pub async fn init_test() -> Result<Self> {
        let test_id = uuid::Uuid::new_v4().to_string();
        let db_url = format!("file:memdb_{}?mode=memory&cache=shared", test_id);

        Self::new(&db_url).await
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL DEFAULT 'user',
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS accounts (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                name TEXT NOT NULL,
                kind TEXT NOT NULL,
                balance REAL NOT NULL DEFAULT 0,
                currency TEXT NOT NULL DEFAULT 'USD',
                created_at TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_accounts_user_id
            ON accounts(user_id);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS transactions (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                account_id TEXT NOT NULL,
                kind TEXT NOT NULL,
                amount REAL NOT NULL,
                category TEXT NOT NULL,
                description TEXT,
                date TEXT NOT NULL,
                receipt_url TEXT,
                tags TEXT NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE,
                FOREIGN KEY (account_id) REFERENCES accounts (id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_transactions_user_date
            ON transactions(user_id, date DESC);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_transactions_category
            ON transactions(user_id, category);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS budgets (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                category TEXT NOT NULL,
                limit_amount REAL NOT NULL,
                period TEXT NOT NULL,
                start_date TEXT NOT NULL,
                end_date TEXT NOT NULL,
                is_active INTEGER NOT NULL DEFAULT 1,
                notifications INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_budgets_user_category
            ON budgets(user_id, category);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS categories (
                id TEXT PRIMARY KEY,
                user_id TEXT,
                name TEXT NOT NULL,
                kind TEXT NOT NULL,
                icon TEXT,
                color TEXT,
                parent_id TEXT,
                is_custom INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE,
                FOREIGN KEY (parent_id) REFERENCES categories (id)
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_categories_user_id
            ON categories(user_id);
            "#,
        )
        .execute(pool)
        .await?;

        Self::seed_system_categories(pool).await?;

        Ok(())
    }

    /// Insert the fixed system category set; idempotent across restarts
    async fn seed_system_categories(pool: &SqlitePool) -> Result<()> {
        for (id, name, kind) in SYSTEM_CATEGORIES {
            sqlx::query(
                r#"
                INSERT OR IGNORE INTO categories (id, user_id, name, kind, is_custom, created_at)
                VALUES (?, NULL, ?, ?, 0, '1970-01-01T00:00:00Z')
                "#,
            )
            .bind(id)
            .bind(name)
            .bind(kind)
            .execute(pool)
            .await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::Row;

    #[tokio::test]
    async fn schema_setup_seeds_system_categories() {
        let db = DbConnection::init_test()
            .await
            .expect("Failed to create test database");

        let row = sqlx::query("SELECT COUNT(*) AS n FROM categories WHERE is_custom = 0")
            .fetch_one(db.pool())
            .await
            .expect("Failed to count system categories");
        let n: i64 = row.get("n");
        assert_eq!(n as usize, SYSTEM_CATEGORIES.len());
    }

    #[tokio::test]
    async fn schema_setup_is_idempotent() {
        let test_id = uuid::Uuid::new_v4().to_string();
        let db_url = format!("file:memdb_{}?mode=memory&cache=shared", test_id);

        let first = DbConnection::new(&db_url).await.expect("first setup");
        // Running setup again against the same database must not fail or
        // duplicate the seed rows.
        let _second = DbConnection::new(&db_url).await.expect("second setup");

        let row = sqlx::query("SELECT COUNT(*) AS n FROM categories WHERE is_custom = 0")
            .fetch_one(first.pool())
            .await
            .unwrap();
        let n: i64 = row.get("n");
        assert_eq!(n as usize, SYSTEM_CATEGORIES.len());
    }
}
