//! Transaction CRUD with account-balance side effects.
//!
//! Every write that touches a transaction row also adjusts the owning
//! account's running balance, and the two updates always commit or roll
//! back together. Income adds to the balance; expenses and transfers
//! subtract.

use std::collections::HashMap;

use tracing::info;

use shared::{CreateTransactionRequest, UpdateTransactionRequest};

use crate::domain::dates::{now_rfc3339, parse_end_bound, parse_start_bound, parse_timestamp};
use crate::domain::models::{Account, Transaction};
use crate::error::AppError;
use crate::storage::{
    AccountRepository, DbConnection, TransactionFilter, TransactionRepository,
};

const DEFAULT_PAGE_SIZE: u32 = 25;
const MAX_PAGE_SIZE: u32 = 100;

/// Raw list parameters as they arrive from the query string
#[derive(Debug, Clone, Default)]
pub struct TransactionListParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub kind: Option<shared::TransactionKind>,
    pub category: Option<String>,
    pub account: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// One page of transactions plus the accounts they reference
pub struct TransactionPage {
    pub items: Vec<Transaction>,
    pub accounts: HashMap<String, Account>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

#[derive(Clone)]
pub struct TransactionService {
    db: DbConnection,
    transactions: TransactionRepository,
    accounts: AccountRepository,
}

impl TransactionService {
    pub fn new(db: DbConnection) -> Self {
        let transactions = TransactionRepository::new(db.clone());
        let accounts = AccountRepository::new(db.clone());
        Self {
            db,
            transactions,
            accounts,
        }
    }

    pub async fn create(
        &self,
        user_id: &str,
        request: CreateTransactionRequest,
    ) -> Result<(Transaction, Account), AppError> {
        validate_amount(request.amount)?;
        validate_category(&request.category)?;
        let account = self
            .accounts
            .find_for_user(user_id, &request.account)
            .await?
            .ok_or_else(|| AppError::BadRequest("Invalid account".to_string()))?;

        let date = match &request.date {
            Some(date) => parse_timestamp(date)?,
            None => now_rfc3339(),
        };
        let transaction = Transaction {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            account_id: account.id.clone(),
            kind: request.kind.into(),
            amount: request.amount,
            category: request.category.trim().to_string(),
            description: request.description,
            date,
            receipt_url: None,
            tags: request.tags.unwrap_or_default(),
            created_at: now_rfc3339(),
        };

        let mut tx = self.db.pool().begin().await?;
        TransactionRepository::insert(&mut tx, &transaction).await?;
        AccountRepository::adjust_balance(&mut tx, &account.id, transaction.signed_amount())
            .await?;
        tx.commit().await?;
        info!("created transaction {} for user {user_id}", transaction.id);

        let account = self.require_account(user_id, &transaction.account_id).await?;
        Ok((transaction, account))
    }

    pub async fn get(&self, user_id: &str, id: &str) -> Result<(Transaction, Account), AppError> {
        let transaction = self.require_transaction(user_id, id).await?;
        let account = self.require_account(user_id, &transaction.account_id).await?;
        Ok((transaction, account))
    }

    pub async fn list(
        &self,
        user_id: &str,
        params: TransactionListParams,
    ) -> Result<TransactionPage, AppError> {
        let filter = TransactionFilter {
            start_date: params.start_date.as_deref().map(parse_start_bound).transpose()?,
            end_date: params.end_date.as_deref().map(parse_end_bound).transpose()?,
            kind: params
                .kind
                .map(|k| crate::domain::models::TransactionKind::from(k).as_str().to_string()),
            category: params.category,
            // "all" is the client's explicit no-filter value
            account_id: params.account.filter(|a| a != "all"),
        };
        let page = params.page.unwrap_or(1).max(1);
        let limit = params
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);

        let items = self
            .transactions
            .list_filtered(user_id, &filter, limit, (page - 1) * limit)
            .await?;
        let total = self.transactions.count_filtered(user_id, &filter).await?;
        let accounts = self.account_map(user_id).await?;

        Ok(TransactionPage {
            items,
            accounts,
            total,
            page,
            limit,
        })
    }

    /// Update a transaction, reverting its old balance effect and applying
    /// the new one atomically. Moving the transaction to another account
    /// shifts the effect between the two balances.
    pub async fn update(
        &self,
        user_id: &str,
        id: &str,
        request: UpdateTransactionRequest,
    ) -> Result<(Transaction, Account), AppError> {
        let existing = self.require_transaction(user_id, id).await?;

        let mut updated = existing.clone();
        if let Some(kind) = request.kind {
            updated.kind = kind.into();
        }
        if let Some(amount) = request.amount {
            validate_amount(amount)?;
            updated.amount = amount;
        }
        if let Some(category) = request.category {
            validate_category(&category)?;
            updated.category = category.trim().to_string();
        }
        if let Some(description) = request.description {
            updated.description = Some(description);
        }
        if let Some(date) = &request.date {
            updated.date = parse_timestamp(date)?;
        }
        if let Some(account_id) = &request.account {
            self.accounts
                .find_for_user(user_id, account_id)
                .await?
                .ok_or_else(|| AppError::BadRequest("Invalid account".to_string()))?;
            updated.account_id = account_id.clone();
        }
        if let Some(tags) = request.tags {
            updated.tags = tags;
        }

        let mut tx = self.db.pool().begin().await?;
        AccountRepository::adjust_balance(
            &mut tx,
            &existing.account_id,
            -existing.signed_amount(),
        )
        .await?;
        TransactionRepository::update(&mut tx, &updated).await?;
        AccountRepository::adjust_balance(&mut tx, &updated.account_id, updated.signed_amount())
            .await?;
        tx.commit().await?;

        let account = self.require_account(user_id, &updated.account_id).await?;
        Ok((updated, account))
    }

    /// Delete a transaction and revert its effect on the account balance
    pub async fn delete(&self, user_id: &str, id: &str) -> Result<(), AppError> {
        let existing = self.require_transaction(user_id, id).await?;

        let mut tx = self.db.pool().begin().await?;
        TransactionRepository::delete(&mut tx, user_id, id).await?;
        AccountRepository::adjust_balance(
            &mut tx,
            &existing.account_id,
            -existing.signed_amount(),
        )
        .await?;
        tx.commit().await?;
        info!("deleted transaction {id} for user {user_id}");
        Ok(())
    }

    /// Record a receipt URL against a transaction. The URL has already been
    /// produced by whatever upload flow the client uses; no balance change.
    pub async fn attach_receipt(
        &self,
        user_id: &str,
        id: &str,
        receipt_url: &str,
    ) -> Result<(Transaction, Account), AppError> {
        if receipt_url.trim().is_empty() {
            return Err(AppError::BadRequest("Please add a receipt URL".to_string()));
        }
        if !self
            .transactions
            .set_receipt_url(user_id, id, receipt_url.trim())
            .await?
        {
            return Err(AppError::NotFound(format!(
                "Transaction not found with id of {id}"
            )));
        }
        self.get(user_id, id).await
    }

    async fn require_transaction(&self, user_id: &str, id: &str) -> Result<Transaction, AppError> {
        self.transactions
            .find_for_user(user_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Transaction not found with id of {id}")))
    }

    async fn require_account(&self, user_id: &str, id: &str) -> Result<Account, AppError> {
        self.accounts
            .find_for_user(user_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Account not found with id of {id}")))
    }

    async fn account_map(&self, user_id: &str) -> Result<HashMap<String, Account>, AppError> {
        let accounts = self.accounts.list_for_user(user_id).await?;
        Ok(accounts.into_iter().map(|a| (a.id.clone(), a)).collect())
    }
}

fn validate_amount(amount: f64) -> Result<(), AppError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(AppError::BadRequest(
            "Amount must be greater than 0".to_string(),
        ));
    }
    Ok(())
}

fn validate_category(category: &str) -> Result<(), AppError> {
    if category.trim().is_empty() {
        return Err(AppError::BadRequest("Please add a category".to_string()));
    }
    Ok(())
}
