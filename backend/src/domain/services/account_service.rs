//! Account CRUD.

use tracing::info;

use shared::{CreateAccountRequest, UpdateAccountRequest};

use crate::domain::dates::now_rfc3339;
use crate::domain::models::Account;
use crate::error::AppError;
use crate::storage::{AccountRepository, DbConnection, TransactionRepository};

#[derive(Clone)]
pub struct AccountService {
    db: DbConnection,
    accounts: AccountRepository,
}

impl AccountService {
    pub fn new(db: DbConnection) -> Self {
        let accounts = AccountRepository::new(db.clone());
        Self { db, accounts }
    }

    pub async fn create(
        &self,
        user_id: &str,
        request: CreateAccountRequest,
    ) -> Result<Account, AppError> {
        if request.name.trim().is_empty() {
            return Err(AppError::BadRequest(
                "Please add an account name".to_string(),
            ));
        }

        let account = Account {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            name: request.name.trim().to_string(),
            kind: request.kind.into(),
            balance: request.balance.unwrap_or(0.0),
            currency: request.currency.unwrap_or_else(|| "USD".to_string()),
            created_at: now_rfc3339(),
        };
        self.accounts.insert(&account).await?;
        info!("created account {} for user {user_id}", account.id);
        Ok(account)
    }

    pub async fn get(&self, user_id: &str, id: &str) -> Result<Account, AppError> {
        self.accounts
            .find_for_user(user_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Account not found with id of {id}")))
    }

    pub async fn list(&self, user_id: &str) -> Result<Vec<Account>, AppError> {
        Ok(self.accounts.list_for_user(user_id).await?)
    }

    pub async fn update(
        &self,
        user_id: &str,
        id: &str,
        request: UpdateAccountRequest,
    ) -> Result<Account, AppError> {
        let mut account = self.get(user_id, id).await?;

        if let Some(name) = request.name {
            if name.trim().is_empty() {
                return Err(AppError::BadRequest(
                    "Please add an account name".to_string(),
                ));
            }
            account.name = name.trim().to_string();
        }
        if let Some(kind) = request.kind {
            account.kind = kind.into();
        }
        if let Some(balance) = request.balance {
            account.balance = balance;
        }
        if let Some(currency) = request.currency {
            account.currency = currency;
        }

        self.accounts.update(&account).await?;
        Ok(account)
    }

    /// Delete an account and every transaction recorded against it, in one
    /// database transaction.
    pub async fn delete(&self, user_id: &str, id: &str) -> Result<(), AppError> {
        let mut tx = self.db.pool().begin().await?;
        let removed = TransactionRepository::delete_for_account(&mut tx, user_id, id).await?;
        if !AccountRepository::delete(&mut tx, user_id, id).await? {
            tx.rollback().await?;
            return Err(AppError::NotFound(format!(
                "Account not found with id of {id}"
            )));
        }
        tx.commit().await?;
        info!("deleted account {id} and {removed} transactions for user {user_id}");
        Ok(())
    }
}
