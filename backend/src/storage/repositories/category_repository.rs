use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::domain::models::{Category, CategoryKind};
use crate::storage::connection::DbConnection;

/// Repository for category rows. A user sees the system defaults
/// (`is_custom = 0`, no owner) plus their own custom categories.
#[derive(Clone)]
pub struct CategoryRepository {
    db: DbConnection,
}

impl CategoryRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub async fn insert(&self, category: &Category) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO categories
                (id, user_id, name, kind, icon, color, parent_id, is_custom, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&category.id)
        .bind(&category.user_id)
        .bind(&category.name)
        .bind(category.kind.as_str())
        .bind(&category.icon)
        .bind(&category.color)
        .bind(&category.parent_id)
        .bind(category.is_custom)
        .bind(&category.created_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    /// A category the user can see: one of their own or a system default.
    pub async fn find_visible(&self, user_id: &str, id: &str) -> sqlx::Result<Option<Category>> {
        let row = sqlx::query(
            "SELECT * FROM categories WHERE id = ? AND (user_id = ? OR is_custom = 0)",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.db.pool())
        .await?;
        row.as_ref().map(map_category).transpose()
    }

    pub async fn list_visible(
        &self,
        user_id: &str,
        kind: Option<CategoryKind>,
    ) -> sqlx::Result<Vec<Category>> {
        let rows = match kind {
            Some(kind) => {
                sqlx::query(
                    r#"
                    SELECT * FROM categories
                    WHERE (user_id = ? OR is_custom = 0) AND kind = ?
                    ORDER BY name
                    "#,
                )
                .bind(user_id)
                .bind(kind.as_str())
                .fetch_all(self.db.pool())
                .await?
            }
            None => {
                sqlx::query(
                    "SELECT * FROM categories WHERE (user_id = ? OR is_custom = 0) ORDER BY name",
                )
                .bind(user_id)
                .fetch_all(self.db.pool())
                .await?
            }
        };
        rows.iter().map(map_category).collect()
    }

    /// Only the user's own custom categories are editable; system defaults
    /// never match here.
    pub async fn find_custom(&self, user_id: &str, id: &str) -> sqlx::Result<Option<Category>> {
        let row = sqlx::query(
            "SELECT * FROM categories WHERE id = ? AND user_id = ? AND is_custom = 1",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.db.pool())
        .await?;
        row.as_ref().map(map_category).transpose()
    }

    /// Case-insensitive name collision check across everything the user sees.
    pub async fn name_exists(
        &self,
        user_id: &str,
        name: &str,
        exclude_id: Option<&str>,
    ) -> sqlx::Result<bool> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS n
            FROM categories
            WHERE (user_id = ? OR is_custom = 0)
              AND LOWER(name) = LOWER(?)
              AND id != ?
            "#,
        )
        .bind(user_id)
        .bind(name)
        .bind(exclude_id.unwrap_or(""))
        .fetch_one(self.db.pool())
        .await?;
        let n: i64 = row.get("n");
        Ok(n > 0)
    }

    pub async fn update(&self, category: &Category) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            UPDATE categories
            SET name = ?, kind = ?, icon = ?, color = ?, parent_id = ?
            WHERE id = ? AND user_id = ? AND is_custom = 1
            "#,
        )
        .bind(&category.name)
        .bind(category.kind.as_str())
        .bind(&category.icon)
        .bind(&category.color)
        .bind(&category.parent_id)
        .bind(&category.id)
        .bind(&category.user_id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    pub async fn delete(&self, user_id: &str, id: &str) -> sqlx::Result<bool> {
        let result =
            sqlx::query("DELETE FROM categories WHERE id = ? AND user_id = ? AND is_custom = 1")
                .bind(id)
                .bind(user_id)
                .execute(self.db.pool())
                .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn map_category(row: &SqliteRow) -> sqlx::Result<Category> {
    let kind: String = row.get("kind");
    Ok(Category {
        id: row.get("id"),
        user_id: row.get("user_id"),
        name: row.get("name"),
        kind: CategoryKind::parse(&kind).map_err(|e| sqlx::Error::Decode(e.into()))?,
        icon: row.get("icon"),
        color: row.get("color"),
        parent_id: row.get("parent_id"),
        is_custom: row.get("is_custom"),
        created_at: row.get("created_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dates::now_rfc3339;
    use crate::storage::test_support::seed_user;

    fn custom_category(user_id: &str, name: &str) -> Category {
        Category {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: Some(user_id.to_string()),
            name: name.to_string(),
            kind: CategoryKind::Expense,
            icon: Some("📦".to_string()),
            color: Some("#888888".to_string()),
            parent_id: None,
            is_custom: true,
            created_at: now_rfc3339(),
        }
    }

    #[tokio::test]
    async fn visibility_covers_system_defaults_and_own_customs() {
        let db = DbConnection::init_test().await.unwrap();
        let alice = seed_user(&db, "alice@example.com").await;
        let bob = seed_user(&db, "bob@example.com").await;
        let repo = CategoryRepository::new(db);

        let mine = custom_category(&alice, "Coffee");
        repo.insert(&mine).await.unwrap();

        // Seeded system categories plus the one custom
        let visible = repo.list_visible(&alice, None).await.unwrap();
        assert!(visible.iter().any(|c| c.id == "sys-food"));
        assert!(visible.iter().any(|c| c.name == "Coffee"));

        // Bob sees the system set but not Alice's custom
        let bobs = repo.list_visible(&bob, None).await.unwrap();
        assert!(bobs.iter().any(|c| c.id == "sys-food"));
        assert!(!bobs.iter().any(|c| c.name == "Coffee"));

        // Kind filter
        let income = repo
            .list_visible(&alice, Some(CategoryKind::Income))
            .await
            .unwrap();
        assert!(income.iter().all(|c| c.kind == CategoryKind::Income));
        assert!(income.iter().any(|c| c.id == "sys-salary"));
    }

    #[tokio::test]
    async fn system_categories_are_not_editable() {
        let db = DbConnection::init_test().await.unwrap();
        let alice = seed_user(&db, "alice@example.com").await;
        let repo = CategoryRepository::new(db);

        assert!(repo.find_custom(&alice, "sys-food").await.unwrap().is_none());
        assert!(!repo.delete(&alice, "sys-food").await.unwrap());
        // The system row survives
        assert!(repo.find_visible(&alice, "sys-food").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn name_collisions_are_case_insensitive() {
        let db = DbConnection::init_test().await.unwrap();
        let alice = seed_user(&db, "alice@example.com").await;
        let repo = CategoryRepository::new(db);

        let mine = custom_category(&alice, "Coffee");
        repo.insert(&mine).await.unwrap();

        assert!(repo.name_exists(&alice, "coffee", None).await.unwrap());
        // Collides with the seeded "Food" system category too
        assert!(repo.name_exists(&alice, "food", None).await.unwrap());
        assert!(!repo.name_exists(&alice, "Books", None).await.unwrap());
        // A category never collides with itself on rename
        assert!(!repo
            .name_exists(&alice, "Coffee", Some(&mine.id))
            .await
            .unwrap());
    }
}
