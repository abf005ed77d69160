use anyhow::{anyhow, Result};

/// A transaction category. System categories have no owner and are visible
/// to everyone; custom categories belong to exactly one user. A single
/// parent reference gives a two-tier hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: String,
    /// None for system-provided categories
    pub user_id: Option<String>,
    pub name: String,
    pub kind: CategoryKind,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub parent_id: Option<String>,
    pub is_custom: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryKind {
    Income,
    Expense,
}

impl From<shared::CategoryKind> for CategoryKind {
    fn from(kind: shared::CategoryKind) -> Self {
        match kind {
            shared::CategoryKind::Income => CategoryKind::Income,
            shared::CategoryKind::Expense => CategoryKind::Expense,
        }
    }
}

impl From<CategoryKind> for shared::CategoryKind {
    fn from(kind: CategoryKind) -> Self {
        match kind {
            CategoryKind::Income => shared::CategoryKind::Income,
            CategoryKind::Expense => shared::CategoryKind::Expense,
        }
    }
}

impl CategoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryKind::Income => "income",
            CategoryKind::Expense => "expense",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "income" => Ok(CategoryKind::Income),
            "expense" => Ok(CategoryKind::Expense),
            other => Err(anyhow!("unknown category type: {other}")),
        }
    }
}
