//! Typed client and render pipeline for a personal finance tracker.
//!
//! The crate covers the presentation side of the tracker: it talks to the
//! backend REST API (transactions, statistics, charts, recommendations,
//! forecast, insights, chat) and turns the responses into typed UI trees and
//! chart configurations.
//!
//! - [`client`]: HTTP client with CSRF headers, retries and timeouts, in
//!   async and blocking flavours.
//! - [`api`]: one typed method per backend endpoint.
//! - [`render`], [`view`], [`chart`]: pure functions from data to UI trees
//!   and Chart.js configurations.
//! - `pipeline`, `wiring` (feature `async`): region state, stale-response
//!   discarding and UI event handling.
//!
//! # Example
//!
//! ```rust,no_run
//! # #[cfg(feature = "blocking")]
//! # fn main() -> fintrack_rs::error::Result<()> {
//! use fintrack_rs::api::FinanceApiBlocking;
//! use fintrack_rs::client::BlockingApiClient;
//! use fintrack_rs::models::{Currency, Period};
//!
//! let client = BlockingApiClient::builder()
//!     .base_url("http://localhost:8000")
//!     .build()?;
//! let api = FinanceApiBlocking::new(client);
//! let stats = api.statistics(Period::Month)?;
//! let cards = fintrack_rs::render::statistics_cards(&stats, Currency::Rub);
//! println!("{}", cards.to_html());
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "blocking"))]
//! # fn main() {}
//! ```

pub mod api;
pub mod chart;
pub mod chat;
pub mod client;
pub mod config;
pub mod credentials;
pub mod endpoint;
pub mod error;
pub mod models;
#[cfg(feature = "async")]
pub mod pipeline;
pub mod render;
pub mod view;
#[cfg(feature = "async")]
pub mod wiring;
