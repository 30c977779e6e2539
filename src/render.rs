//! Pure render functions: fetched values in, [`Node`] trees out.
//!
//! Nothing here touches a surface; the pipeline decides where a tree goes.
//! Markup follows the dashboard's Bootstrap classes.

use core::time::Duration;

use rust_decimal::Decimal;

use crate::models::{
    Currency, ForecastResult, Insight, Priority, Recommendation, RecommendationType,
    StatisticsSnapshot, Transaction, TransactionType, format_money,
};
use crate::view::{Element, Node};

/// Prompt shown before deleting a transaction.
pub const DELETE_PROMPT: &str = "Are you sure you want to delete this transaction?";

/// How long a notification stays visible.
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(5);

/// Severity of a notification, named after the alert colour it uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationLevel {
    /// Action completed.
    Success,
    /// Something went wrong.
    Danger,
    /// Needs attention.
    Warning,
    /// Neutral.
    Info,
}

impl NotificationLevel {
    /// Bootstrap contextual class suffix.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Danger => "danger",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

/// A transient message shown outside any region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Text shown to the user.
    pub message: String,
    /// Severity.
    pub level: NotificationLevel,
    /// Time until the surface drops it.
    pub dismiss_after: Duration,
}

impl Notification {
    /// Creates a notification with the default lifetime.
    #[inline]
    #[must_use]
    pub fn new<T: Into<String>>(message: T, level: NotificationLevel) -> Self {
        Self {
            message: message.into(),
            level,
            dismiss_after: NOTIFICATION_TTL,
        }
    }

    /// Shorthand for a success notification.
    #[inline]
    #[must_use]
    pub fn success<T: Into<String>>(message: T) -> Self {
        Self::new(message, NotificationLevel::Success)
    }

    /// Shorthand for an error notification.
    #[inline]
    #[must_use]
    pub fn error<T: Into<String>>(message: T) -> Self {
        Self::new(message, NotificationLevel::Danger)
    }
}

/// Bootstrap icon element, e.g. `bi-wallet2`.
fn icon(name: &str, extra: &str) -> Element {
    let bare = name.trim_start_matches("bi ").trim();
    let classes = if bare.starts_with("bi-") {
        format!("bi {bare}")
    } else {
        bare.to_owned()
    };
    let element = Element::new("i").class(&classes);
    if extra.is_empty() {
        element
    } else {
        element.class(extra)
    }
}

/// Spinner shown while a region loads.
#[must_use]
pub fn loading() -> Node {
    Element::new("div")
        .class("text-center py-5")
        .child(
            Element::new("div")
                .class("spinner-border text-primary")
                .attr("role", "status")
                .child(
                    Element::new("span")
                        .class("visually-hidden")
                        .text("Loading..."),
                ),
        )
        .into()
}

/// Placeholder for a region whose first load failed.
#[must_use]
pub fn error_placeholder(message: &str) -> Node {
    Element::new("div")
        .class("alert alert-light border text-muted region-error")
        .attr("role", "alert")
        .child(icon("bi-exclamation-octagon", "me-2"))
        .text(message)
        .into()
}

/// One statistics card.
fn stat_card(background: &str, icon_name: &str, title: &str, amount: Decimal, currency: Currency) -> Element {
    Element::new("div").class("col-md-3").child(
        Element::new("div")
            .class("card text-white stat-card")
            .class(background)
            .child(
                Element::new("div")
                    .class("card-body")
                    .child(
                        Element::new("h6")
                            .class("card-title")
                            .child(icon(icon_name, "me-2"))
                            .text(title),
                    )
                    .child(
                        Element::new("h3")
                            .class("mb-0")
                            .text(format_money(amount, currency)),
                    ),
            ),
    )
}

/// Background class of the balance card.
#[inline]
#[must_use]
pub fn balance_class(balance: Decimal) -> &'static str {
    if balance.is_sign_negative() && !balance.is_zero() {
        "bg-warning"
    } else {
        "bg-primary"
    }
}

/// Four cards: income, expenses, balance, average transaction.
#[must_use]
pub fn statistics_cards(stats: &StatisticsSnapshot, currency: Currency) -> Node {
    let balance = stats.balance();
    Element::new("div")
        .class("row g-3")
        .child(stat_card("bg-success", "bi-arrow-up-circle", "Income", stats.total_income, currency))
        .child(stat_card("bg-danger", "bi-arrow-down-circle", "Expenses", stats.total_expense, currency))
        .child(stat_card(balance_class(balance), "bi-wallet2", "Balance", balance, currency))
        .child(stat_card("bg-info", "bi-graph-up", "Average transaction", stats.avg_transaction, currency))
        .into()
}

/// Alert colour for a recommendation priority.
#[inline]
#[must_use]
pub const fn priority_class(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "danger",
        Priority::Medium => "warning",
        Priority::Low => "info",
    }
}

/// Icon for a recommendation type.
#[inline]
#[must_use]
pub const fn recommendation_icon(kind: RecommendationType) -> &'static str {
    match kind {
        RecommendationType::Warning => "bi-exclamation-triangle",
        RecommendationType::Alert => "bi-exclamation-circle",
        RecommendationType::Info => "bi-info-circle",
        RecommendationType::Success => "bi-check-circle",
    }
}

/// One recommendation alert.
fn recommendation(rec: &Recommendation, currency: Currency) -> Element {
    let mut body = Element::new("div")
        .class("flex-grow-1")
        .child(Element::new("h6").class("alert-heading mb-1").text(rec.title.as_str()))
        .child(Element::new("p").class("mb-0").text(rec.message.as_str()));
    if let Some(amount) = rec.amount {
        body = body.child(
            Element::new("small")
                .class("text-muted")
                .text(format!("Amount: {}", format_money(amount, currency))),
        );
    }
    Element::new("div")
        .class("alert d-flex align-items-start recommendation")
        .class(&format!("alert-{}", priority_class(rec.priority)))
        .child(icon(recommendation_icon(rec.kind), "fs-4 me-3"))
        .child(body)
}

/// Recommendation list, or an empty-state message when there are none.
#[must_use]
pub fn recommendations(recs: &[Recommendation], currency: Currency) -> Node {
    if recs.is_empty() {
        return Element::new("div")
            .class("alert alert-info")
            .child(icon("bi-info-circle", "me-2"))
            .text("No recommendations yet. Keep adding transactions to get personal advice.")
            .into();
    }
    Element::new("div")
        .class("recommendations")
        .children_from(recs.iter().map(|rec| recommendation(rec, currency)))
        .into()
}

/// Forecast card with per-category projections.
#[must_use]
pub fn forecast(result: &ForecastResult, currency: Currency) -> Node {
    let mut summary = Element::new("div")
        .class("alert alert-info")
        .child(
            Element::new("h4")
                .class("mb-3")
                .text(format!("Expected expenses: {}", format_money(result.total_forecast, currency))),
        )
        .child(Element::new("small").class("text-muted").text(format!(
            "Based on the last {} months",
            result.based_on_months
        )));
    if let Some(confidence) = result.confidence.as_deref() {
        summary = summary.child(
            Element::new("span")
                .class("badge bg-secondary ms-2")
                .text(format!("Confidence: {confidence}")),
        );
    }

    let items = result.category_forecasts.iter().map(|cat| {
        let mut label = Element::new("div");
        if !cat.icon.is_empty() {
            let mut glyph = icon(&cat.icon, "me-2");
            if !cat.color.is_empty() {
                glyph = glyph.attr("style", format!("color: {}", cat.color));
            }
            label = label.child(glyph);
        }
        Element::new("div")
            .class("list-group-item d-flex justify-content-between align-items-center")
            .child(label.text(cat.category.as_str()))
            .child(
                Element::new("span")
                    .class("badge bg-primary rounded-pill")
                    .text(format_money(cat.forecast, currency)),
            )
    });

    Element::new("div")
        .class("card")
        .child(
            Element::new("div").class("card-header bg-primary text-white").child(
                Element::new("h5")
                    .class("mb-0")
                    .child(icon("bi-graph-up-arrow", "me-2"))
                    .text("Next month forecast"),
            ),
        )
        .child(
            Element::new("div")
                .class("card-body")
                .child(summary)
                .child(Element::new("h6").class("mt-4 mb-3").text("By category:"))
                .child(Element::new("div").class("list-group").children_from(items)),
        )
        .into()
}

/// Insight cards in a two-column grid.
#[must_use]
pub fn insights(items: &[Insight]) -> Node {
    let cards = items.iter().map(|insight| {
        Element::new("div").class("col-md-6").child(
            Element::new("div").class("card h-100").child(
                Element::new("div")
                    .class("card-body")
                    .child(
                        Element::new("div")
                            .class("d-flex align-items-center mb-2")
                            .child(icon(&insight.icon, "fs-3 text-primary me-3"))
                            .child(
                                Element::new("div")
                                    .child(Element::new("h6").class("mb-0").text(insight.title.as_str()))
                                    .child(
                                        Element::new("h4")
                                            .class("mb-0 text-primary")
                                            .text(insight.value.as_str()),
                                    ),
                            ),
                    )
                    .child(
                        Element::new("p")
                            .class("text-muted mb-0 small")
                            .text(insight.description.as_str()),
                    ),
            ),
        )
    });
    Element::new("div").class("row g-3").children_from(cards).into()
}

/// Table row for one transaction, identified as `transaction-{id}`.
#[must_use]
pub fn transaction_row(tx: &Transaction, currency: Currency) -> Element {
    let (sign, colour) = match tx.kind {
        TransactionType::Income => ("+", "text-success"),
        TransactionType::Expense => ("-", "text-danger"),
    };
    let mut category = Element::new("td");
    if let Some(icon_name) = tx.category_icon.as_deref() {
        let mut glyph = icon(icon_name, "me-2");
        if let Some(color) = tx.category_color.as_deref() {
            glyph = glyph.attr("style", format!("color: {color}"));
        }
        category = category.child(glyph);
    }
    category = category.text(tx.category_name.as_deref().unwrap_or("-"));

    Element::new("tr")
        .id(tx.row_id())
        .child(Element::new("td").text(tx.date.format("%d.%m.%Y").to_string()))
        .child(category)
        .child(Element::new("td").text(tx.description.as_str()))
        .child(
            Element::new("td")
                .class("text-end fw-bold")
                .class(colour)
                .text(format!("{sign}{}", format_money(tx.amount.abs(), currency))),
        )
        .child(
            Element::new("td").class("text-end").child(
                Element::new("button")
                    .class("btn btn-sm btn-outline-danger delete-transaction")
                    .attr("data-id", tx.id.to_string())
                    .child(icon("bi-trash", "")),
            ),
        )
}

/// Table body with one row per transaction, or an empty-state row.
#[must_use]
pub fn transaction_table(txs: &[Transaction], currency: Currency) -> Node {
    if txs.is_empty() {
        return Element::new("tbody")
            .child(
                Element::new("tr").child(
                    Element::new("td")
                        .attr("colspan", "5")
                        .class("text-center text-muted")
                        .text("No transactions yet"),
                ),
            )
            .into();
    }
    Element::new("tbody")
        .children_from(txs.iter().map(|tx| transaction_row(tx, currency)))
        .into()
}

/// Dismissible alert for a notification.
#[must_use]
pub fn notification(note: &Notification) -> Node {
    Element::new("div")
        .class("alert alert-dismissible fade show position-fixed top-0 end-0 m-3")
        .class(&format!("alert-{}", note.level.as_str()))
        .attr("role", "alert")
        .text(note.message.as_str())
        .child(
            Element::new("button")
                .attr("type", "button")
                .class("btn-close")
                .attr("data-bs-dismiss", "alert"),
        )
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategoryForecast, TransactionId};

    fn dec(raw: &str) -> Decimal {
        raw.parse().unwrap()
    }

    fn stats(income: &str, expense: &str) -> StatisticsSnapshot {
        StatisticsSnapshot {
            total_income: dec(income),
            total_expense: dec(expense),
            balance: None,
            transactions_count: 0,
            categories_count: 0,
            avg_transaction: dec("50"),
        }
    }

    fn cards(node: &Node) -> Vec<&Element> {
        node.as_element()
            .unwrap()
            .descendants()
            .into_iter()
            .filter(|el| el.has_class("stat-card"))
            .collect()
    }

    #[test]
    fn statistics_render_four_cards_with_derived_balance() {
        let node = statistics_cards(&stats("1000", "400"), Currency::Rub);
        let found = cards(&node);
        assert_eq!(found.len(), 4);
        let text = node.text_content();
        assert!(text.contains("600,00\u{a0}₽"));
        assert!(text.contains("1\u{a0}000,00\u{a0}₽"));
        assert!(found.get(2).unwrap().has_class("bg-primary"));
    }

    #[test]
    fn negative_balance_uses_warning_colour() {
        let node = statistics_cards(&stats("100", "400"), Currency::Rub);
        let found = cards(&node);
        assert!(found.get(2).unwrap().has_class("bg-warning"));
        assert!(node.text_content().contains("-300,00\u{a0}₽"));
    }

    #[test]
    fn recommendation_colours_and_icons() {
        let rec = Recommendation {
            kind: RecommendationType::Alert,
            title: "Limit".to_owned(),
            message: "Budget exceeded".to_owned(),
            priority: Priority::High,
            category: None,
            amount: Some(dec("1500")),
        };
        let node = recommendations(&[rec], Currency::Rub);
        let root = node.as_element().unwrap();
        let alert = root.descendants().into_iter().find(|el| el.has_class("alert")).unwrap();
        assert!(alert.has_class("alert-danger"));
        assert!(root.descendants().iter().any(|el| el.has_class("bi-exclamation-circle")));
        assert!(node.text_content().contains("Amount: 1\u{a0}500,00\u{a0}₽"));
    }

    #[test]
    fn empty_recommendations_show_message() {
        let node = recommendations(&[], Currency::Rub);
        assert!(node.text_content().contains("No recommendations yet"));
    }

    #[test]
    fn priority_mapping() {
        assert_eq!(priority_class(Priority::High), "danger");
        assert_eq!(priority_class(Priority::Medium), "warning");
        assert_eq!(priority_class(Priority::Low), "info");
        assert_eq!(recommendation_icon(RecommendationType::Success), "bi-check-circle");
    }

    #[test]
    fn forecast_lists_categories() {
        let result = ForecastResult {
            total_forecast: dec("45000"),
            category_forecasts: vec![CategoryForecast {
                category: "Food".to_owned(),
                forecast: dec("15000"),
                icon: "bi-cup-hot".to_owned(),
                color: "#ff9900".to_owned(),
            }],
            based_on_months: 3,
            confidence: None,
        };
        let node = forecast(&result, Currency::Rub);
        let text = node.text_content();
        assert!(text.contains("45\u{a0}000,00\u{a0}₽"));
        assert!(text.contains("last 3 months"));
        assert!(text.contains("Food"));
        assert!(node.to_html().contains(r#"style="color: #ff9900""#));
    }

    #[test]
    fn insights_escape_backend_text() {
        let node = insights(&[Insight {
            title: "<b>Top</b>".to_owned(),
            value: "Food".to_owned(),
            description: String::new(),
            icon: "bi-star".to_owned(),
        }]);
        assert!(node.to_html().contains("&lt;b&gt;Top&lt;/b&gt;"));
    }

    #[test]
    fn transaction_row_has_stable_id_and_signed_amount() {
        let tx = Transaction {
            id: TransactionId::new(12),
            kind: TransactionType::Expense,
            amount: dec("99.9"),
            description: "Taxi".to_owned(),
            date: chrono::NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            category: None,
            category_name: None,
            category_icon: None,
            category_color: None,
            created_at: None,
            updated_at: None,
        };
        let row = transaction_row(&tx, Currency::Rub);
        assert_eq!(row.element_id(), Some("transaction-12"));
        let text = Node::from(row).text_content();
        assert!(text.contains("01.05.2024"));
        assert!(text.contains("-99,90\u{a0}₽"));
    }

    #[test]
    fn notification_markup() {
        let node = notification(&Notification::error("Could not add transaction"));
        let root = node.as_element().unwrap();
        assert!(root.has_class("alert-danger"));
        assert_eq!(Notification::success("ok").dismiss_after, Duration::from_secs(5));
    }

    #[test]
    fn loading_and_placeholder() {
        assert!(loading().to_html().contains("spinner-border"));
        assert!(error_placeholder("Failed to load").text_content().contains("Failed to load"));
    }
}
