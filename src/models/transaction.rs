//! Transaction model, create/update payload, and list query.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{CategoryId, TransactionId, TransactionType};

/// A single income or expense record as the backend returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Server-assigned identifier.
    pub id: TransactionId,
    /// Income or expense.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Unsigned amount; the sign follows from [`Self::kind`].
    pub amount: Decimal,
    /// Free-text note.
    #[serde(default)]
    pub description: String,
    /// Booking date.
    pub date: NaiveDate,
    /// Category identifier, if categorised.
    pub category: Option<CategoryId>,
    /// Category display name (read-only).
    #[serde(default)]
    pub category_name: Option<String>,
    /// Category icon class (read-only).
    #[serde(default)]
    pub category_icon: Option<String>,
    /// Category colour (read-only).
    #[serde(default)]
    pub category_color: Option<String>,
    /// Creation timestamp (read-only).
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Last modification timestamp (read-only).
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Transaction {
    /// Returns the amount with expenses negated.
    #[inline]
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            TransactionType::Income => self.amount,
            TransactionType::Expense => -self.amount,
        }
    }

    /// Returns the DOM identifier of this transaction's table row.
    #[inline]
    #[must_use]
    pub fn row_id(&self) -> String {
        row_id(self.id)
    }
}

/// Returns the DOM identifier of the table row for `id`.
#[inline]
#[must_use]
pub fn row_id(id: TransactionId) -> String {
    format!("transaction-{id}")
}

/// Payload for creating or replacing a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTransaction {
    /// Income or expense.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Unsigned amount.
    pub amount: Decimal,
    /// Free-text note.
    pub description: String,
    /// Booking date.
    pub date: NaiveDate,
    /// Category identifier.
    pub category: Option<CategoryId>,
}

impl NewTransaction {
    /// Creates an uncategorised payload with an empty note.
    #[inline]
    #[must_use]
    pub const fn new(kind: TransactionType, amount: Decimal, date: NaiveDate) -> Self {
        Self {
            kind,
            amount,
            description: String::new(),
            date,
            category: None,
        }
    }

    /// Sets the free-text note.
    #[inline]
    #[must_use]
    pub fn description<T: Into<String>>(mut self, description: T) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the category.
    #[inline]
    #[must_use]
    pub const fn category(mut self, category: CategoryId) -> Self {
        self.category = Some(category);
        self
    }
}

/// Optional filters for listing transactions.
///
/// Only set criteria end up in the query string; an empty query yields an
/// empty string.
///
/// # Examples
///
/// ```
/// use fintrack_rs::models::{TransactionQuery, TransactionType};
///
/// let query = TransactionQuery::new().kind(TransactionType::Expense).search("coffee");
/// assert_eq!(query.to_query_string(), "type=expense&search=coffee");
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TransactionQuery {
    /// Income or expense only.
    pub kind: Option<TransactionType>,
    /// Category identifier.
    pub category: Option<CategoryId>,
    /// Start date (inclusive).
    pub date_from: Option<NaiveDate>,
    /// End date (inclusive).
    pub date_to: Option<NaiveDate>,
    /// Free-text search.
    pub search: Option<String>,
    /// Ordering field, e.g. `-date`.
    pub ordering: Option<String>,
}

impl TransactionQuery {
    /// Creates an empty query that lists everything.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to one transaction type.
    #[inline]
    #[must_use]
    pub const fn kind(mut self, kind: TransactionType) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Restricts to one category.
    #[inline]
    #[must_use]
    pub const fn category(mut self, category: CategoryId) -> Self {
        self.category = Some(category);
        self
    }

    /// Restricts to a date range (inclusive).
    #[inline]
    #[must_use]
    pub const fn date_range(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.date_from = Some(from);
        self.date_to = Some(to);
        self
    }

    /// Adds a free-text search term.
    #[inline]
    #[must_use]
    pub fn search<T: Into<String>>(mut self, term: T) -> Self {
        self.search = Some(term.into());
        self
    }

    /// Sets the ordering field.
    #[inline]
    #[must_use]
    pub fn ordering<T: Into<String>>(mut self, field: T) -> Self {
        self.ordering = Some(field.into());
        self
    }

    /// Serialises the set criteria as a URL query string (no leading `?`).
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        if let Some(kind) = self.kind {
            _ = serializer.append_pair("type", kind.as_str());
        }
        if let Some(category) = self.category {
            _ = serializer.append_pair("category", &category.to_string());
        }
        if let Some(from) = self.date_from {
            _ = serializer.append_pair("date_from", &from.format("%Y-%m-%d").to_string());
        }
        if let Some(to) = self.date_to {
            _ = serializer.append_pair("date_to", &to.format("%Y-%m-%d").to_string());
        }
        if let Some(term) = self.search.as_deref() {
            _ = serializer.append_pair("search", term);
        }
        if let Some(field) = self.ordering.as_deref() {
            _ = serializer.append_pair("ordering", field);
        }
        serializer.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn deserialize_backend_transaction() {
        let json = r##"{
            "id": 15,
            "type": "expense",
            "amount": "1250.50",
            "description": "Groceries",
            "date": "2024-03-02",
            "category": 3,
            "category_name": "Food",
            "category_icon": "bi-cup-hot",
            "category_color": "#ff9900",
            "created_at": "2024-03-02T12:30:00.123456+03:00",
            "updated_at": "2024-03-02T12:30:00.123456+03:00"
        }"##;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.id, TransactionId::new(15));
        assert_eq!(tx.kind, TransactionType::Expense);
        assert_eq!(tx.amount, "1250.50".parse::<Decimal>().unwrap());
        assert_eq!(tx.date, date(2024, 3, 2));
        assert_eq!(tx.category, Some(CategoryId::new(3)));
        assert_eq!(tx.category_name.as_deref(), Some("Food"));
        assert_eq!(tx.signed_amount(), "-1250.50".parse::<Decimal>().unwrap());
        assert!(tx.created_at.is_some());
    }

    #[test]
    fn deserialize_minimal_transaction_with_numeric_amount() {
        let json = r#"{"id": 1, "type": "income", "amount": 1000, "date": "2024-01-01", "category": null}"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.amount, Decimal::from(1000));
        assert!(tx.description.is_empty());
        assert_eq!(tx.row_id(), "transaction-1");
    }

    #[test]
    fn new_transaction_serializes_backend_field_names() {
        let payload = NewTransaction::new(
            TransactionType::Expense,
            "99.90".parse().unwrap(),
            date(2024, 5, 1),
        )
        .description("Taxi")
        .category(CategoryId::new(4));
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["type"], "expense");
        assert_eq!(value["amount"], "99.90");
        assert_eq!(value["description"], "Taxi");
        assert_eq!(value["date"], "2024-05-01");
        assert_eq!(value["category"], 4);
    }

    #[test]
    fn empty_query_is_empty_string() {
        assert_eq!(TransactionQuery::new().to_query_string(), "");
    }

    #[test]
    fn query_encodes_all_criteria() {
        let query = TransactionQuery::new()
            .kind(TransactionType::Income)
            .category(CategoryId::new(2))
            .date_range(date(2024, 1, 1), date(2024, 1, 31))
            .search("salary & bonus")
            .ordering("-date");
        assert_eq!(
            query.to_query_string(),
            "type=income&category=2&date_from=2024-01-01&date_to=2024-01-31&search=salary+%26+bonus&ordering=-date"
        );
    }
}
