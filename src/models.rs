//! Data models for the finance tracker API.
//!
//! Every type here is a display-only view-model: it is deserialised from a
//! backend response, rendered, and dropped. Field names follow the
//! backend's snake_case JSON.

mod chat;
mod enums;
mod forecast;
mod ids;
mod insight;
mod money;
mod recommendation;
mod series;
mod statistics;
mod transaction;

pub use chat::{ChatReply, ChatRequest};
pub use enums::{ChartKind, Period, Priority, RecommendationType, TransactionType};
pub use forecast::{CategoryForecast, ForecastResult};
pub use ids::{CategoryId, TransactionId};
pub use insight::Insight;
pub use money::{Currency, Money, format_money};
pub use recommendation::Recommendation;
pub use series::{ChartDataset, ChartSeries, ColorSpec};
pub use statistics::StatisticsSnapshot;
pub use transaction::{NewTransaction, Transaction, TransactionQuery, row_id};
