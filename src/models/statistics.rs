//! Aggregate statistics for a period.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Aggregate totals for one [`super::Period`].
///
/// Recomputed by the backend on every request; never merged with an
/// earlier snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatisticsSnapshot {
    /// Sum of income.
    pub total_income: Decimal,
    /// Sum of expenses.
    pub total_expense: Decimal,
    /// Income minus expenses, when the backend sends it.
    #[serde(default)]
    pub balance: Option<Decimal>,
    /// Number of transactions in the period.
    #[serde(default)]
    pub transactions_count: u64,
    /// Number of distinct categories in the period.
    #[serde(default)]
    pub categories_count: u64,
    /// Mean transaction amount.
    #[serde(default)]
    pub avg_transaction: Decimal,
}

impl StatisticsSnapshot {
    /// Returns the balance, deriving it from the totals when absent.
    #[inline]
    #[must_use]
    pub fn balance(&self) -> Decimal {
        self.balance
            .unwrap_or_else(|| self.total_income - self.total_expense)
    }
}
