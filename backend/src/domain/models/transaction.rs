use anyhow::{anyhow, Result};

/// A single money movement against one account.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: String,
    pub user_id: String,
    pub account_id: String,
    pub kind: TransactionKind,
    /// Always stored non-negative; the sign applied to the account balance
    /// comes from `signed_amount`
    pub amount: f64,
    pub category: String,
    pub description: Option<String>,
    /// RFC 3339 UTC timestamp
    pub date: String,
    pub receipt_url: Option<String>,
    pub tags: Vec<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    Income,
    Expense,
    Transfer,
}

impl Transaction {
    /// The effect of this transaction on its account's balance: income
    /// adds, expenses subtract, transfers subtract from the source account.
    pub fn signed_amount(&self) -> f64 {
        signed_amount(self.kind, self.amount)
    }
}

pub fn signed_amount(kind: TransactionKind, amount: f64) -> f64 {
    match kind {
        TransactionKind::Income => amount,
        TransactionKind::Expense | TransactionKind::Transfer => -amount,
    }
}

impl From<shared::TransactionKind> for TransactionKind {
    fn from(kind: shared::TransactionKind) -> Self {
        match kind {
            shared::TransactionKind::Income => TransactionKind::Income,
            shared::TransactionKind::Expense => TransactionKind::Expense,
            shared::TransactionKind::Transfer => TransactionKind::Transfer,
        }
    }
}

impl From<TransactionKind> for shared::TransactionKind {
    fn from(kind: TransactionKind) -> Self {
        match kind {
            TransactionKind::Income => shared::TransactionKind::Income,
            TransactionKind::Expense => shared::TransactionKind::Expense,
            TransactionKind::Transfer => shared::TransactionKind::Transfer,
        }
    }
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
            TransactionKind::Transfer => "transfer",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            "transfer" => Ok(TransactionKind::Transfer),
            other => Err(anyhow!("unknown transaction type: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn income_adds_and_expense_subtracts() {
        assert_eq!(signed_amount(TransactionKind::Income, 30.0), 30.0);
        assert_eq!(signed_amount(TransactionKind::Expense, 30.0), -30.0);
        assert_eq!(signed_amount(TransactionKind::Transfer, 30.0), -30.0);
    }
}
