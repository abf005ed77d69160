//! Categories: the seeded system set plus per-user customs.
//!
//! System categories are shared, read-only rows; only custom categories
//! can be edited or deleted, and deletion is blocked while transactions
//! still reference the category by name.

use std::collections::HashMap;

use chrono::Duration;
use tracing::info;

use shared::{CreateCategoryRequest, UpdateCategoryRequest};

use crate::domain::dates::{now_rfc3339, now_utc, to_rfc3339};
use crate::domain::models::{Account, Category, CategoryKind, Transaction};
use crate::error::AppError;
use crate::storage::{AccountRepository, CategoryRepository, DbConnection, TransactionRepository};

const USAGE_WINDOW_DAYS: i64 = 30;
const RECENT_TRANSACTIONS: u32 = 5;

/// Usage aggregate over the trailing 30 days
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UsageTotals {
    pub total: f64,
    pub count: u64,
    pub average: f64,
}

/// One category with its per-month history and latest transactions
pub struct CategoryDetail {
    pub category: Category,
    pub parent: Option<Category>,
    /// (month, total, count, average), newest month first
    pub monthly: Vec<(String, f64, u64, f64)>,
    pub recent: Vec<Transaction>,
    pub accounts: HashMap<String, Account>,
}

#[derive(Clone)]
pub struct CategoryService {
    categories: CategoryRepository,
    transactions: TransactionRepository,
    accounts: AccountRepository,
}

impl CategoryService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            categories: CategoryRepository::new(db.clone()),
            transactions: TransactionRepository::new(db.clone()),
            accounts: AccountRepository::new(db),
        }
    }

    /// Everything the user can see, each with its trailing-30-day usage
    pub async fn list(
        &self,
        user_id: &str,
        kind: Option<CategoryKind>,
    ) -> Result<Vec<(Category, UsageTotals)>, AppError> {
        let categories = self.categories.list_visible(user_id, kind).await?;
        let since = to_rfc3339(now_utc() - Duration::days(USAGE_WINDOW_DAYS));
        let mut out = Vec::with_capacity(categories.len());
        for category in categories {
            let (total, count, average) = self
                .transactions
                .usage_since(user_id, &category.name, &since)
                .await?;
            out.push((
                category,
                UsageTotals {
                    total,
                    count,
                    average,
                },
            ));
        }
        Ok(out)
    }

    pub async fn detail(&self, user_id: &str, id: &str) -> Result<CategoryDetail, AppError> {
        let category = self.require_visible(user_id, id).await?;
        let parent = match &category.parent_id {
            Some(parent_id) => self.categories.find_visible(user_id, parent_id).await?,
            None => None,
        };
        let monthly = self.transactions.monthly_usage(user_id, &category.name).await?;
        let recent = self
            .transactions
            .recent_for_category(user_id, &category.name, RECENT_TRANSACTIONS)
            .await?;
        let accounts = self
            .accounts
            .list_for_user(user_id)
            .await?
            .into_iter()
            .map(|a| (a.id.clone(), a))
            .collect();
        Ok(CategoryDetail {
            category,
            parent,
            monthly,
            recent,
            accounts,
        })
    }

    pub async fn create(
        &self,
        user_id: &str,
        request: CreateCategoryRequest,
    ) -> Result<Category, AppError> {
        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::BadRequest(
                "Please add a category name".to_string(),
            ));
        }
        if self.categories.name_exists(user_id, &name, None).await? {
            return Err(AppError::BadRequest(
                "Category with this name already exists".to_string(),
            ));
        }
        let parent_id = match request.parent {
            Some(parent_id) => {
                self.categories
                    .find_visible(user_id, &parent_id)
                    .await?
                    .ok_or_else(|| AppError::BadRequest("Invalid parent category".to_string()))?;
                Some(parent_id)
            }
            None => None,
        };

        let category = Category {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: Some(user_id.to_string()),
            name,
            kind: request.kind.into(),
            icon: request.icon,
            color: request.color,
            parent_id,
            is_custom: true,
            created_at: now_rfc3339(),
        };
        self.categories.insert(&category).await?;
        info!("created category {} for user {user_id}", category.id);
        Ok(category)
    }

    pub async fn update(
        &self,
        user_id: &str,
        id: &str,
        request: UpdateCategoryRequest,
    ) -> Result<Category, AppError> {
        let mut category = self.require_custom(user_id, id).await?;

        if let Some(name) = request.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(AppError::BadRequest(
                    "Please add a category name".to_string(),
                ));
            }
            if self.categories.name_exists(user_id, &name, Some(id)).await? {
                return Err(AppError::BadRequest(
                    "Category with this name already exists".to_string(),
                ));
            }
            category.name = name;
        }
        if let Some(icon) = request.icon {
            category.icon = Some(icon);
        }
        if let Some(color) = request.color {
            category.color = Some(color);
        }
        if let Some(parent_id) = request.parent {
            self.categories
                .find_visible(user_id, &parent_id)
                .await?
                .ok_or_else(|| AppError::BadRequest("Invalid parent category".to_string()))?;
            category.parent_id = Some(parent_id);
        }

        self.categories.update(&category).await?;
        Ok(category)
    }

    pub async fn delete(&self, user_id: &str, id: &str) -> Result<(), AppError> {
        let category = self.require_custom(user_id, id).await?;
        let in_use = self
            .transactions
            .count_for_category(user_id, &category.name)
            .await?;
        if in_use > 0 {
            return Err(AppError::BadRequest(
                "Cannot delete category with existing transactions. Please reassign transactions first."
                    .to_string(),
            ));
        }
        self.categories.delete(user_id, id).await?;
        info!("deleted category {id} for user {user_id}");
        Ok(())
    }

    async fn require_visible(&self, user_id: &str, id: &str) -> Result<Category, AppError> {
        self.categories
            .find_visible(user_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category not found with id of {id}")))
    }

    /// System categories are invisible to edit paths, so the same 404 covers
    /// both missing and non-editable ids
    async fn require_custom(&self, user_id: &str, id: &str) -> Result<Category, AppError> {
        self.categories
            .find_custom(user_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category not found with id of {id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::TransactionKind;
    use crate::storage::test_support::{seed_account, seed_user};

    async fn setup() -> (CategoryService, DbConnection, String) {
        let db = DbConnection::init_test().await.unwrap();
        let user = seed_user(&db, "alice@example.com").await;
        seed_account(&db, &user).await;
        (CategoryService::new(db.clone()), db, user)
    }

    fn create_request(name: &str) -> CreateCategoryRequest {
        CreateCategoryRequest {
            name: name.to_string(),
            kind: shared::CategoryKind::Expense,
            icon: None,
            color: None,
            parent: None,
        }
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

    #[tokio::test]
    async fn listing_attaches_recent_usage() {
        let (service, db, user) = setup().await;
        let recent = to_rfc3339(now_utc() - Duration::days(2));
        let ancient = "2020-01-01T12:00:00Z";
        spend(&db, &user, "Food", 25.0, &recent).await;
        spend(&db, &user, "Food", 999.0, ancient).await;

        let listed = service.list(&user, None).await.unwrap();
        let (_, usage) = listed
            .iter()
            .find(|(c, _)| c.name == "Food")
            .expect("Food should be visible");
        assert_eq!(usage.total, 25.0);
        assert_eq!(usage.count, 1);
    }

    #[tokio::test]
    async fn duplicate_names_are_rejected_even_against_system_categories() {
        let (service, _, user) = setup().await;
        let err = service.create(&user, create_request("food")).await.unwrap_err();
        assert_eq!(err.to_string(), "Category with this name already exists");

        service.create(&user, create_request("Coffee")).await.unwrap();
        let err = service.create(&user, create_request("Coffee")).await.unwrap_err();
        assert_eq!(err.to_string(), "Category with this name already exists");
    }

    #[tokio::test]
    async fn system_categories_cannot_be_modified() {
        let (service, _, user) = setup().await;
        let err = service
            .update(
                &user,
                "sys-food",
                UpdateCategoryRequest {
                    name: Some("Hacked".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Category not found with id of sys-food");
        assert!(service.delete(&user, "sys-food").await.is_err());
    }

    #[tokio::test]
    async fn deletion_is_blocked_while_transactions_reference_the_category() {
        let (service, db, user) = setup().await;
        let category = service.create(&user, create_request("Coffee")).await.unwrap();
        spend(&db, &user, "Coffee", 4.5, "2025-01-05T08:00:00Z").await;

        let err = service.delete(&user, &category.id).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot delete category with existing transactions. Please reassign transactions first."
        );

        // Reassign and retry
        sqlx::query("UPDATE transactions SET category = 'Food' WHERE user_id = ?")
            .bind(&user)
            .execute(db.pool())
            .await
            .unwrap();
        service.delete(&user, &category.id).await.unwrap();
    }

    #[tokio::test]
    async fn detail_resolves_the_parent_and_monthly_history() {
        let (service, db, user) = setup().await;
        let parent = service.create(&user, create_request("Drinks")).await.unwrap();
        let mut request = create_request("Coffee");
        request.parent = Some(parent.id.clone());
        let category = service.create(&user, request).await.unwrap();

        spend(&db, &user, "Coffee", 4.0, "2025-01-05T08:00:00Z").await;
        spend(&db, &user, "Coffee", 6.0, "2025-02-05T08:00:00Z").await;

        let detail = service.detail(&user, &category.id).await.unwrap();
        assert_eq!(detail.parent.as_ref().map(|p| p.name.as_str()), Some("Drinks"));
        assert_eq!(detail.monthly.len(), 2);
        // Newest month first
        assert_eq!(detail.monthly[0].0, "2025-02");
        assert_eq!(detail.recent.len(), 2);
    }
}
