use anyhow::{anyhow, Result};

/// A money account. `balance` is an eagerly maintained running total,
/// mutated alongside every transaction write rather than recomputed from
/// history on read.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub kind: AccountKind,
    pub balance: f64,
    pub currency: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountKind {
    Checking,
    Savings,
    Credit,
    Investment,
    Cash,
}

impl From<shared::AccountKind> for AccountKind {
    fn from(kind: shared::AccountKind) -> Self {
        match kind {
            shared::AccountKind::Checking => AccountKind::Checking,
            shared::AccountKind::Savings => AccountKind::Savings,
            shared::AccountKind::Credit => AccountKind::Credit,
            shared::AccountKind::Investment => AccountKind::Investment,
            shared::AccountKind::Cash => AccountKind::Cash,
        }
    }
}

impl From<AccountKind> for shared::AccountKind {
    fn from(kind: AccountKind) -> Self {
        match kind {
            AccountKind::Checking => shared::AccountKind::Checking,
            AccountKind::Savings => shared::AccountKind::Savings,
            AccountKind::Credit => shared::AccountKind::Credit,
            AccountKind::Investment => shared::AccountKind::Investment,
            AccountKind::Cash => shared::AccountKind::Cash,
        }
    }
}

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Checking => "checking",
            AccountKind::Savings => "savings",
            AccountKind::Credit => "credit",
            AccountKind::Investment => "investment",
            AccountKind::Cash => "cash",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "checking" => Ok(AccountKind::Checking),
            "savings" => Ok(AccountKind::Savings),
            "credit" => Ok(AccountKind::Credit),
            "investment" => Ok(AccountKind::Investment),
            "cash" => Ok(AccountKind::Cash),
            other => Err(anyhow!("unknown account type: {other}")),
        }
    }
}
