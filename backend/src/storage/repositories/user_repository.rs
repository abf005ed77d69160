use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::domain::models::{User, UserRole};
use crate::storage::connection::DbConnection;

/// Repository for user rows
#[derive(Clone)]
pub struct UserRepository {
    db: DbConnection,
}

impl UserRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub async fn insert(&self, user: &User) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, role, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(&user.created_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> sqlx::Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;
        row.as_ref().map(map_user).transpose()
    }

    pub async fn find_by_email(&self, email: &str) -> sqlx::Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(self.db.pool())
            .await?;
        row.as_ref().map(map_user).transpose()
    }

    pub async fn update_details(&self, id: &str, name: &str, email: &str) -> sqlx::Result<()> {
        sqlx::query("UPDATE users SET name = ?, email = ? WHERE id = ?")
            .bind(name)
            .bind(email)
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    pub async fn update_password_hash(&self, id: &str, password_hash: &str) -> sqlx::Result<()> {
        sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }
}

fn map_user(row: &SqliteRow) -> sqlx::Result<User> {
    let role: String = row.get("role");
    Ok(User {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        role: UserRole::parse(&role).map_err(|e| sqlx::Error::Decode(e.into()))?,
        created_at: row.get("created_at"),
    })
}
