//! Aggregate reporting across the transaction history.

use shared::{CategoryTotal, MonthlyTotal, ReportSummary};

use crate::domain::dates::{parse_end_bound, parse_start_bound};
use crate::error::AppError;
use crate::storage::{DbConnection, TransactionRepository};

#[derive(Clone)]
pub struct ReportService {
    transactions: TransactionRepository,
}

impl ReportService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            transactions: TransactionRepository::new(db),
        }
    }

    /// Income/expense totals, savings rate and the per-category and
    /// per-month breakdowns, over an optional date window
    pub async fn summary(
        &self,
        user_id: &str,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<ReportSummary, AppError> {
        let start = start_date.map(parse_start_bound).transpose()?;
        let end = end_date.map(parse_end_bound).transpose()?;
        let start = start.as_deref();
        let end = end.as_deref();

        let (total_income, total_expenses) =
            self.transactions.totals_by_kind(user_id, start, end).await?;
        let net = total_income - total_expenses;
        let savings_rate = if total_income > 0.0 {
            (net / total_income * 10_000.0).round() / 100.0
        } else {
            0.0
        };

        let by_category = self
            .transactions
            .category_totals(user_id, start, end)
            .await?
            .into_iter()
            .map(|(category, total, count)| CategoryTotal {
                category,
                total,
                count,
            })
            .collect();
        let monthly = self
            .transactions
            .monthly_totals(user_id, start, end)
            .await?
            .into_iter()
            .map(|(month, income, expenses)| MonthlyTotal {
                month,
                income,
                expenses,
            })
            .collect();

        Ok(ReportSummary {
            total_income,
            total_expenses,
            net,
            savings_rate,
            by_category,
            monthly,
        })
    }
}
