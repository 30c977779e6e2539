//! Path table of the backend REST API.
//!
//! Maps each resource call to its verb and path. The mapping is pure: the
//! same inputs always produce the same request line.

use crate::client::Method;
use crate::models::{ChartKind, Period, TransactionId, TransactionQuery};

/// Path of the chat endpoint, relative to the backend origin.
pub const CHAT_PATH: &str = "/ai-chat/";

/// One backend resource call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// List transactions matching a query.
    ListTransactions(TransactionQuery),
    /// Create a transaction.
    CreateTransaction,
    /// Replace a transaction.
    UpdateTransaction(TransactionId),
    /// Delete a transaction.
    DeleteTransaction(TransactionId),
    /// Aggregate statistics for a period.
    Statistics(Period),
    /// Series for one chart.
    ChartData(ChartKind),
    /// Spending recommendations.
    Recommendations,
    /// Next-month forecast.
    Forecast,
    /// Insight cards.
    Insights,
    /// Chat message.
    Chat,
}

impl Endpoint {
    /// Returns the HTTP verb.
    #[inline]
    #[must_use]
    pub const fn method(&self) -> Method {
        match *self {
            Self::CreateTransaction | Self::Chat => Method::Post,
            Self::UpdateTransaction(_) => Method::Put,
            Self::DeleteTransaction(_) => Method::Delete,
            Self::ListTransactions(_)
            | Self::Statistics(_)
            | Self::ChartData(_)
            | Self::Recommendations
            | Self::Forecast
            | Self::Insights => Method::Get,
        }
    }

    /// Returns the path, relative to the API root unless
    /// [`Self::is_api_relative`] is `false`.
    #[must_use]
    #[allow(clippy::ref_patterns, reason = "the list query is borrowed, not moved")]
    pub fn path(&self) -> String {
        match *self {
            Self::ListTransactions(ref query) => {
                format!("/transactions/?{}", query.to_query_string())
            }
            Self::CreateTransaction => "/transactions/".to_owned(),
            Self::UpdateTransaction(id) | Self::DeleteTransaction(id) => {
                format!("/transactions/{id}/")
            }
            Self::Statistics(period) => format!("/transactions/statistics/?period={period}"),
            Self::ChartData(kind) => format!("/transactions/chart_data/?type={kind}"),
            Self::Recommendations => "/ai/recommendations/".to_owned(),
            Self::Forecast => "/ai/forecast/".to_owned(),
            Self::Insights => "/ai/insights/".to_owned(),
            Self::Chat => CHAT_PATH.to_owned(),
        }
    }

    /// Whether the path is resolved under the API root.
    #[inline]
    #[must_use]
    pub const fn is_api_relative(&self) -> bool {
        !matches!(*self, Self::Chat)
    }
}

impl core::fmt::Display for Endpoint {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} {}", self.method(), self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionType;

    #[test]
    fn request_lines_match_path_table() {
        let cases = [
            (
                Endpoint::ListTransactions(TransactionQuery::new()),
                Method::Get,
                "/transactions/?",
            ),
            (Endpoint::CreateTransaction, Method::Post, "/transactions/"),
            (
                Endpoint::UpdateTransaction(TransactionId::new(7)),
                Method::Put,
                "/transactions/7/",
            ),
            (
                Endpoint::DeleteTransaction(TransactionId::new(7)),
                Method::Delete,
                "/transactions/7/",
            ),
            (
                Endpoint::Statistics(Period::Week),
                Method::Get,
                "/transactions/statistics/?period=week",
            ),
            (
                Endpoint::ChartData(ChartKind::Category),
                Method::Get,
                "/transactions/chart_data/?type=category",
            ),
            (Endpoint::Recommendations, Method::Get, "/ai/recommendations/"),
            (Endpoint::Forecast, Method::Get, "/ai/forecast/"),
            (Endpoint::Insights, Method::Get, "/ai/insights/"),
            (Endpoint::Chat, Method::Post, "/ai-chat/"),
        ];
        for (endpoint, method, path) in cases {
            assert_eq!(endpoint.method(), method, "{endpoint}");
            assert_eq!(endpoint.path(), path, "{endpoint}");
        }
    }

    #[test]
    fn mapping_is_deterministic() {
        let query = TransactionQuery::new().kind(TransactionType::Expense);
        let first = Endpoint::ListTransactions(query.clone());
        let second = Endpoint::ListTransactions(query);
        assert_eq!(first.path(), second.path());
        assert_eq!(first.path(), "/transactions/?type=expense");
    }

    #[test]
    fn only_chat_is_outside_api_root() {
        assert!(!Endpoint::Chat.is_api_relative());
        assert!(Endpoint::Forecast.is_api_relative());
        assert!(Endpoint::CreateTransaction.is_api_relative());
    }

    #[test]
    fn display_shows_request_line() {
        assert_eq!(
            Endpoint::Statistics(Period::Year).to_string(),
            "GET /transactions/statistics/?period=year"
        );
    }
}
