//! Helpers shared by the storage and domain tests.

use crate::domain::dates::now_rfc3339;
use crate::storage::connection::DbConnection;

/// Insert a user row directly and return its id
pub async fn seed_user(db: &DbConnection, email: &str) -> String {
    let id = uuid::Uuid::new_v4().to_string();
    sqlx::query(
        r#"
        INSERT INTO users (id, name, email, password_hash, role, created_at)
        VALUES (?, 'Test User', ?, '$2b$10$hash', 'user', ?)
        "#,
    )
    .bind(&id)
    .bind(email)
    .bind(now_rfc3339())
    .execute(db.pool())
    .await
    .expect("Failed to seed user");
    id
}

/// Insert an account row for a user and return its id. Transactions carry
/// a foreign key to accounts, so tests that store transactions directly
/// need a real account row behind the id they reference.
pub async fn seed_account(db: &DbConnection, user_id: &str) -> String {
    let id = format!("acct-{user_id}");
    sqlx::query(
        r#"
        INSERT INTO accounts (id, user_id, name, kind, balance, currency, created_at)
        VALUES (?, ?, 'Checking', 'checking', 0, 'USD', ?)
        "#,
    )
    .bind(&id)
    .bind(user_id)
    .bind(now_rfc3339())
    .execute(db.pool())
    .await
    .expect("Failed to seed account");
    id
}
