//! Render pipeline: fetch, render and swap region content.
//!
//! Each region moves through `Idle → Loading → Rendered | Failed`. Every
//! load takes a ticket carrying a per-region sequence number; a completion
//! whose ticket is no longer the latest for its region is discarded
//! without touching the surface. A failed load shows a notification and
//! puts back the region's last good render, or an error placeholder if it
//! never rendered.
//!
//! The pipeline state sits behind a [`Mutex`] that is only held between
//! awaits, so several loads may be in flight at once.

mod memory;

use core::future::Future;
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

pub use memory::InMemorySurface;

use crate::api::ResourceSource;
use crate::chart::{ChartBackend, ChartConfig, ChartSlot, ChartStyle, build_chart};
use crate::error::{FintrackError, Result};
use crate::models::{ChartKind, Currency, Period, TransactionQuery};
use crate::render::{self, Notification};
use crate::view::Node;

/// Fixed identifiers of the dashboard regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RegionId {
    /// Statistics cards.
    Statistics,
    /// Monthly income/expense chart.
    MonthlyChart,
    /// Expenses-by-category chart.
    CategoryChart,
    /// Balance trend chart.
    TrendChart,
    /// Recommendation list.
    Recommendations,
    /// Forecast card.
    Forecast,
    /// Insight cards.
    Insights,
    /// Transaction table body.
    Transactions,
    /// Chat transcript.
    ChatMessages,
}

impl RegionId {
    /// Every region, in page order.
    pub const ALL: [Self; 9] = [
        Self::Statistics,
        Self::MonthlyChart,
        Self::CategoryChart,
        Self::TrendChart,
        Self::Recommendations,
        Self::Forecast,
        Self::Insights,
        Self::Transactions,
        Self::ChatMessages,
    ];

    /// DOM identifier of the region's container.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Statistics => "statistics-container",
            Self::MonthlyChart => "monthlyChart",
            Self::CategoryChart => "categoryChart",
            Self::TrendChart => "trendChart",
            Self::Recommendations => "recommendations-container",
            Self::Forecast => "forecast-container",
            Self::Insights => "insights-container",
            Self::Transactions => "transactions-table",
            Self::ChatMessages => "ai-chat-messages",
        }
    }

    /// Region that shows the chart `kind`.
    #[inline]
    #[must_use]
    pub const fn for_chart(kind: ChartKind) -> Self {
        match kind {
            ChartKind::Monthly => Self::MonthlyChart,
            ChartKind::Category => Self::CategoryChart,
            ChartKind::Trend => Self::TrendChart,
        }
    }

    /// Chart kind shown in this region, if it is a chart canvas.
    #[inline]
    #[must_use]
    pub const fn chart_kind(self) -> Option<ChartKind> {
        match self {
            Self::MonthlyChart => Some(ChartKind::Monthly),
            Self::CategoryChart => Some(ChartKind::Category),
            Self::TrendChart => Some(ChartKind::Trend),
            Self::Statistics
            | Self::Recommendations
            | Self::Forecast
            | Self::Insights
            | Self::Transactions
            | Self::ChatMessages => None,
        }
    }

    /// Notification text for a failed load.
    #[inline]
    #[must_use]
    pub const fn failure_message(self) -> &'static str {
        match self {
            Self::Statistics => "Failed to load statistics",
            Self::MonthlyChart => "Failed to load the monthly chart",
            Self::CategoryChart => "Failed to load the category chart",
            Self::TrendChart => "Failed to load the balance trend",
            Self::Recommendations => "Failed to load recommendations",
            Self::Forecast => "Failed to load the forecast",
            Self::Insights => "Failed to load insights",
            Self::Transactions => "Failed to load transactions",
            Self::ChatMessages => "Failed to load the conversation",
        }
    }
}

impl core::fmt::Display for RegionId {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle phase of a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RegionPhase {
    /// Never loaded.
    #[default]
    Idle,
    /// A load is in flight.
    Loading,
    /// Showing fetched content.
    Rendered,
    /// The latest load failed.
    Failed,
}

/// Proof that a load was started; finishing with a superseded ticket is
/// a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    /// Region the load targets.
    region: RegionId,
    /// Sequence number within the region.
    seq: u64,
}

impl Ticket {
    /// Region the load targets.
    #[inline]
    #[must_use]
    pub const fn region(&self) -> RegionId {
        self.region
    }

    /// Sequence number within the region.
    #[inline]
    #[must_use]
    pub const fn seq(&self) -> u64 {
        self.seq
    }
}

/// What a load did to its region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderOutcome {
    /// New content is on the surface.
    Rendered,
    /// The load failed; the user was notified and the region reverted.
    Failed,
    /// A newer load superseded this one; nothing was written.
    Stale,
    /// The region is not on the surface; nothing was fetched or written.
    Skipped,
}

/// The page the pipeline renders into.
pub trait Surface: core::fmt::Debug + Send {
    /// Whether the region's container exists.
    fn has_region(&self, region: RegionId) -> bool;

    /// Replaces the region's content.
    ///
    /// # Errors
    ///
    /// Returns [`FintrackError::DomMissing`] if the container is absent.
    fn replace(&mut self, region: RegionId, content: Node) -> Result<()>;

    /// Appends to the region's content and scrolls it to the newest entry.
    ///
    /// # Errors
    ///
    /// Returns [`FintrackError::DomMissing`] if the container is absent.
    fn append(&mut self, region: RegionId, content: Node) -> Result<()>;

    /// Removes the element with DOM id `node_id`. Returns whether one was
    /// removed.
    fn remove_node(&mut self, node_id: &str) -> bool;

    /// Shows a transient notification.
    fn notify(&mut self, notification: Notification);
}

/// Bookkeeping for one region.
#[derive(Debug, Default)]
struct RegionState {
    /// Current phase.
    phase: RegionPhase,
    /// Sequence number of the newest ticket.
    latest: u64,
    /// Last successfully rendered content.
    last_good: Option<Node>,
}

/// Everything behind the pipeline lock.
#[derive(Debug)]
struct PipelineState<S, B> {
    /// Page being rendered.
    surface: S,
    /// Chart library.
    backend: B,
    /// Per-region bookkeeping.
    regions: BTreeMap<RegionId, RegionState>,
}

/// Drives region loads against a [`Surface`] and a [`ChartBackend`].
#[derive(Debug)]
pub struct RenderPipeline<S, B> {
    /// Shared mutable state.
    state: Mutex<PipelineState<S, B>>,
    /// Currency amounts are tagged with.
    currency: Currency,
}

impl<S: Surface, B: ChartBackend> RenderPipeline<S, B> {
    /// Creates a pipeline over `surface` and `backend`.
    #[inline]
    #[must_use]
    pub fn new(surface: S, backend: B) -> Self {
        Self {
            state: Mutex::new(PipelineState {
                surface,
                backend,
                regions: BTreeMap::new(),
            }),
            currency: Currency::default(),
        }
    }

    /// Sets the currency amounts are displayed in.
    #[inline]
    #[must_use]
    pub const fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    /// Currency amounts are displayed in.
    #[inline]
    #[must_use]
    pub const fn currency(&self) -> Currency {
        self.currency
    }

    /// Runs `f` with the surface and chart backend.
    #[inline]
    pub fn inspect<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&S, &B) -> R,
    {
        self.with_state(|state| f(&state.surface, &state.backend))
    }

    /// Consumes the pipeline and returns the surface and chart backend.
    #[inline]
    pub fn into_parts(self) -> (S, B) {
        let state = self
            .state
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        (state.surface, state.backend)
    }

    /// Current phase of `region`.
    #[must_use]
    pub fn phase(&self, region: RegionId) -> RegionPhase {
        self.with_state(|state| {
            state
                .regions
                .get(&region)
                .map_or(RegionPhase::Idle, |entry| entry.phase)
        })
    }

    /// Whether `region` is on the surface.
    #[must_use]
    pub fn has_region(&self, region: RegionId) -> bool {
        self.with_state(|state| state.surface.has_region(region))
    }

    /// Starts a load: issues a ticket and shows the loading indicator.
    ///
    /// Returns `None` when the region is not on the surface.
    pub fn begin(&self, region: RegionId) -> Option<Ticket> {
        self.with_state(|state| {
            if !state.surface.has_region(region) {
                tracing::debug!(
                    error = %FintrackError::DomMissing { region: region.as_str() },
                    "skipping load"
                );
                return None;
            }
            let entry = state.regions.entry(region).or_default();
            entry.latest += 1;
            entry.phase = RegionPhase::Loading;
            let ticket = Ticket {
                region,
                seq: entry.latest,
            };
            if region.chart_kind().is_none() {
                // Chart canvases keep their live chart until the new one is built.
                if let Err(err) = state.surface.replace(region, render::loading()) {
                    tracing::debug!(error = %err, "loading indicator not shown");
                }
            }
            tracing::trace!(region = %region, seq = ticket.seq, "load started");
            Some(ticket)
        })
    }

    /// Completes a content load.
    pub fn finish(&self, ticket: Ticket, result: Result<Node>) -> RenderOutcome {
        self.with_state(|state| {
            if !Self::is_current(state, ticket) {
                return RenderOutcome::Stale;
            }
            let region = ticket.region;
            match result {
                Ok(node) => match state.surface.replace(region, node.clone()) {
                    Ok(()) => {
                        let entry = state.regions.entry(region).or_default();
                        entry.phase = RegionPhase::Rendered;
                        entry.last_good = Some(node);
                        tracing::debug!(region = %region, "region rendered");
                        RenderOutcome::Rendered
                    }
                    Err(err) => {
                        tracing::debug!(region = %region, error = %err, "region vanished");
                        RenderOutcome::Skipped
                    }
                },
                Err(err) => {
                    tracing::warn!(region = %region, error = %err, "region load failed");
                    Self::fail(state, region, None);
                    RenderOutcome::Failed
                }
            }
        })
    }

    /// Completes a chart load, rebuilding the chart held in `slot`.
    pub fn finish_chart(
        &self,
        ticket: Ticket,
        result: Result<ChartConfig>,
        slot: &mut ChartSlot<B::Handle>,
    ) -> RenderOutcome {
        self.with_state(|state| {
            if !Self::is_current(state, ticket) {
                return RenderOutcome::Stale;
            }
            let region = ticket.region;
            let built = result.and_then(|config| {
                slot.replace(&mut state.backend, region.as_str(), &config)
            });
            match built {
                Ok(()) => {
                    let entry = state.regions.entry(region).or_default();
                    entry.phase = RegionPhase::Rendered;
                    tracing::debug!(region = %region, "chart rendered");
                    RenderOutcome::Rendered
                }
                Err(err) => {
                    tracing::warn!(region = %region, error = %err, "chart load failed");
                    Self::fail(state, region, Some(slot.is_occupied()));
                    RenderOutcome::Failed
                }
            }
        })
    }

    /// Loads and renders the statistics cards for `period`.
    pub async fn load_statistics<R: ResourceSource>(
        &self,
        source: &R,
        period: Period,
    ) -> RenderOutcome {
        let currency = self.currency;
        self.load(RegionId::Statistics, source.fetch_statistics(period), |stats| {
            render::statistics_cards(stats, currency)
        })
        .await
    }

    /// Loads and renders the recommendation list.
    pub async fn load_recommendations<R: ResourceSource>(&self, source: &R) -> RenderOutcome {
        let currency = self.currency;
        self.load(
            RegionId::Recommendations,
            source.fetch_recommendations(),
            |recs| render::recommendations(recs, currency),
        )
        .await
    }

    /// Loads and renders the forecast card.
    pub async fn load_forecast<R: ResourceSource>(&self, source: &R) -> RenderOutcome {
        let currency = self.currency;
        self.load(RegionId::Forecast, source.fetch_forecast(), |result| {
            render::forecast(result, currency)
        })
        .await
    }

    /// Loads and renders the insight cards.
    pub async fn load_insights<R: ResourceSource>(&self, source: &R) -> RenderOutcome {
        self.load(RegionId::Insights, source.fetch_insights(), |items| {
            render::insights(items)
        })
        .await
    }

    /// Loads and renders the transaction table.
    pub async fn load_transactions<R: ResourceSource>(
        &self,
        source: &R,
        query: TransactionQuery,
    ) -> RenderOutcome {
        let currency = self.currency;
        self.load(
            RegionId::Transactions,
            source.fetch_transactions(query),
            |txs| render::transaction_table(txs, currency),
        )
        .await
    }

    /// Loads a chart series and rebuilds the chart in `slot`.
    ///
    /// The slot keeps its live chart until the new configuration is ready,
    /// so a load dropped mid-flight leaves the old chart in place. It holds
    /// at most one live chart.
    pub async fn render_chart<R: ResourceSource>(
        &self,
        source: &R,
        kind: ChartKind,
        style: ChartStyle,
        slot: &mut ChartSlot<B::Handle>,
    ) -> RenderOutcome {
        let Some(ticket) = self.begin(RegionId::for_chart(kind)) else {
            return RenderOutcome::Skipped;
        };
        let currency = self.currency;
        let result = source
            .fetch_chart(kind)
            .await
            .map(|series| build_chart(kind, &series, style, currency));
        self.finish_chart(ticket, result, slot)
    }

    /// Appends a node to `region`; a missing region is a no-op.
    pub fn append(&self, region: RegionId, content: Node) -> RenderOutcome {
        self.with_state(|state| match state.surface.append(region, content) {
            Ok(()) => RenderOutcome::Rendered,
            Err(err) => {
                tracing::debug!(error = %err, "append skipped");
                RenderOutcome::Skipped
            }
        })
    }

    /// Removes the element with DOM id `node_id`.
    pub fn remove_node(&self, node_id: &str) -> bool {
        self.with_state(|state| state.surface.remove_node(node_id))
    }

    /// Shows a notification.
    pub fn notify(&self, notification: Notification) {
        self.with_state(|state| state.surface.notify(notification));
    }

    /// Fetches with `fetch` after the region check, then renders.
    async fn load<T, Fut, F>(&self, region: RegionId, fetch: Fut, render: F) -> RenderOutcome
    where
        Fut: Future<Output = Result<T>>,
        F: FnOnce(&T) -> Node,
    {
        let Some(ticket) = self.begin(region) else {
            return RenderOutcome::Skipped;
        };
        let result = fetch.await;
        self.finish(ticket, result.map(|value| render(&value)))
    }

    /// Whether `ticket` is still the newest for its region.
    fn is_current(state: &PipelineState<S, B>, ticket: Ticket) -> bool {
        let latest = state
            .regions
            .get(&ticket.region)
            .map_or(0, |entry| entry.latest);
        if latest == ticket.seq {
            true
        } else {
            tracing::warn!(
                region = %ticket.region,
                seq = ticket.seq,
                latest,
                "discarding stale completion"
            );
            false
        }
    }

    /// Notifies and reverts a failed region.
    ///
    /// `chart_live` is `Some` for chart regions and tells whether a chart
    /// is still showing.
    fn fail(state: &mut PipelineState<S, B>, region: RegionId, chart_live: Option<bool>) {
        state
            .surface
            .notify(Notification::error(region.failure_message()));
        let entry = state.regions.entry(region).or_default();
        entry.phase = RegionPhase::Failed;
        let restore = match chart_live {
            Some(true) => None,
            Some(false) => Some(render::error_placeholder(region.failure_message())),
            None => Some(entry.last_good.clone().unwrap_or_else(|| {
                render::error_placeholder(region.failure_message())
            })),
        };
        let Some(node) = restore else {
            return;
        };
        if let Err(err) = state.surface.replace(region, node) {
            tracing::debug!(region = %region, error = %err, "region not restored");
        }
    }

    /// Locks the state and applies a closure.
    fn with_state<R>(&self, f: impl FnOnce(&mut PipelineState<S, B>) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::chart::RecordingChartBackend;
    use crate::models::{
        ChartDataset, ChartSeries, ChatReply, ForecastResult, Insight, NewTransaction,
        Recommendation, StatisticsSnapshot, Transaction, TransactionId,
    };
    use crate::render::NotificationLevel;

    /// Scripted resource source for pipeline tests.
    #[derive(Debug, Default)]
    struct MockSource {
        /// Scripted state.
        inner: Mutex<MockInner>,
    }

    /// Scripted responses and call log.
    #[derive(Debug, Default)]
    struct MockInner {
        /// Periods requested, in order.
        periods: Vec<Period>,
        /// Statuses to fail the next calls with.
        failures: Vec<u16>,
        /// Total calls.
        calls: usize,
        /// Wait before answering chart fetches.
        chart_delay: Option<core::time::Duration>,
    }

    impl MockSource {
        fn fail_next(&self, status: u16) {
            self.inner.lock().unwrap().failures.push(status);
        }

        fn delay_charts(&self, delay: core::time::Duration) {
            self.inner.lock().unwrap().chart_delay = Some(delay);
        }

        fn calls(&self) -> usize {
            self.inner.lock().unwrap().calls
        }

        fn periods(&self) -> Vec<Period> {
            self.inner.lock().unwrap().periods.clone()
        }

        fn respond<T>(&self, value: T) -> Result<T> {
            let mut inner = self.inner.lock().unwrap();
            inner.calls += 1;
            if inner.failures.is_empty() {
                Ok(value)
            } else {
                let status = inner.failures.remove(0);
                Err(FintrackError::Http {
                    status,
                    message: "Not found.".to_owned(),
                })
            }
        }
    }

    fn snapshot(income: i64, expense: i64) -> StatisticsSnapshot {
        StatisticsSnapshot {
            total_income: Decimal::from(income),
            total_expense: Decimal::from(expense),
            balance: None,
            transactions_count: 0,
            categories_count: 0,
            avg_transaction: Decimal::from(50),
        }
    }

    impl ResourceSource for MockSource {
        async fn fetch_statistics(&self, period: Period) -> Result<StatisticsSnapshot> {
            self.inner.lock().unwrap().periods.push(period);
            let stats = if period == Period::Year {
                snapshot(12_000, 4_800)
            } else {
                snapshot(1000, 400)
            };
            self.respond(stats)
        }

        async fn fetch_chart(&self, _kind: ChartKind) -> Result<ChartSeries> {
            let delay = self.inner.lock().unwrap().chart_delay;
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            self.respond(ChartSeries {
                labels: vec!["May".to_owned()],
                datasets: vec![ChartDataset::new("Income", vec![1.0])],
            })
        }

        async fn fetch_recommendations(&self) -> Result<Vec<Recommendation>> {
            self.respond(Vec::new())
        }

        async fn fetch_forecast(&self) -> Result<ForecastResult> {
            self.respond(ForecastResult {
                total_forecast: Decimal::from(100),
                category_forecasts: Vec::new(),
                based_on_months: 3,
                confidence: None,
            })
        }

        async fn fetch_insights(&self) -> Result<Vec<Insight>> {
            self.respond(Vec::new())
        }

        async fn fetch_transactions(&self, _query: TransactionQuery) -> Result<Vec<Transaction>> {
            self.respond(Vec::new())
        }

        async fn submit_transaction(&self, _transaction: NewTransaction) -> Result<Transaction> {
            Err(FintrackError::Config("not scripted".to_owned()))
        }

        async fn remove_transaction(&self, _id: TransactionId) -> Result<()> {
            self.respond(())
        }

        async fn send_chat(&self, message: String) -> Result<ChatReply> {
            self.respond(ChatReply { response: message })
        }
    }

    fn pipeline() -> RenderPipeline<InMemorySurface, RecordingChartBackend> {
        RenderPipeline::new(InMemorySurface::dashboard(), RecordingChartBackend::default())
    }

    fn stat_cards(surface: &InMemorySurface) -> usize {
        surface
            .content(RegionId::Statistics)
            .iter()
            .filter_map(Node::as_element)
            .flat_map(|el| el.descendants())
            .filter(|el| el.has_class("stat-card"))
            .count()
    }

    #[tokio::test]
    async fn statistics_render_balance_and_switch_period() {
        let pipeline = pipeline();
        let source = MockSource::default();

        let outcome = pipeline.load_statistics(&source, Period::Month).await;
        assert_eq!(outcome, RenderOutcome::Rendered);
        pipeline.inspect(|surface, _| {
            assert!(surface.text(RegionId::Statistics).contains("600,00\u{a0}₽"));
            assert_eq!(stat_cards(surface), 4);
        });

        let outcome = pipeline.load_statistics(&source, Period::Year).await;
        assert_eq!(outcome, RenderOutcome::Rendered);
        assert_eq!(source.periods(), [Period::Month, Period::Year]);
        pipeline.inspect(|surface, _| {
            let text = surface.text(RegionId::Statistics);
            assert!(text.contains("7\u{a0}200,00\u{a0}₽"));
            assert!(!text.contains("600,00\u{a0}₽"));
            assert_eq!(stat_cards(surface), 4);
        });
    }

    #[tokio::test]
    async fn stale_completion_is_discarded() {
        let pipeline = pipeline();
        let first = pipeline.begin(RegionId::Insights).unwrap();
        let second = pipeline.begin(RegionId::Insights).unwrap();
        assert!(second.seq() > first.seq());

        let newest = Node::text("newest");
        assert_eq!(
            pipeline.finish(second, Ok(newest.clone())),
            RenderOutcome::Rendered
        );
        assert_eq!(
            pipeline.finish(first, Ok(Node::text("older"))),
            RenderOutcome::Stale
        );
        assert_eq!(
            pipeline.finish(
                first,
                Err(FintrackError::Http {
                    status: 500,
                    message: String::new()
                })
            ),
            RenderOutcome::Stale
        );
        pipeline.inspect(|surface, _| {
            assert_eq!(surface.content(RegionId::Insights), [newest]);
            assert!(surface.notifications().is_empty());
        });
    }

    #[tokio::test]
    async fn failure_notifies_and_reverts_to_last_good() {
        let pipeline = pipeline();
        let source = MockSource::default();
        assert_eq!(pipeline.load_forecast(&source).await, RenderOutcome::Rendered);
        let good = pipeline.inspect(|surface, _| surface.text(RegionId::Forecast));

        source.fail_next(404);
        assert_eq!(pipeline.load_forecast(&source).await, RenderOutcome::Failed);
        assert_eq!(pipeline.phase(RegionId::Forecast), RegionPhase::Failed);
        pipeline.inspect(|surface, _| {
            assert_eq!(surface.text(RegionId::Forecast), good);
            let notes = surface.notifications();
            assert_eq!(notes.len(), 1);
            assert_eq!(notes.first().unwrap().level, NotificationLevel::Danger);
        });

        assert_eq!(pipeline.load_forecast(&source).await, RenderOutcome::Rendered);
        assert_eq!(pipeline.phase(RegionId::Forecast), RegionPhase::Rendered);
    }

    #[tokio::test]
    async fn first_failure_shows_placeholder() {
        let pipeline = pipeline();
        let source = MockSource::default();
        source.fail_next(404);
        assert_eq!(pipeline.load_insights(&source).await, RenderOutcome::Failed);
        pipeline.inspect(|surface, _| {
            assert!(surface.text(RegionId::Insights).contains("Failed to load insights"));
        });
    }

    #[tokio::test]
    async fn missing_region_is_skipped_without_fetch() {
        let pipeline = RenderPipeline::new(
            InMemorySurface::with_regions([RegionId::Statistics]),
            RecordingChartBackend::default(),
        );
        let source = MockSource::default();
        assert_eq!(
            pipeline.load_recommendations(&source).await,
            RenderOutcome::Skipped
        );
        assert_eq!(source.calls(), 0);
        assert_eq!(pipeline.phase(RegionId::Recommendations), RegionPhase::Idle);
    }

    #[tokio::test]
    async fn loading_indicator_is_shown_while_in_flight() {
        let pipeline = pipeline();
        let _ticket = pipeline.begin(RegionId::Recommendations).unwrap();
        assert_eq!(pipeline.phase(RegionId::Recommendations), RegionPhase::Loading);
        pipeline.inspect(|surface, _| {
            assert!(surface.text(RegionId::Recommendations).contains("Loading..."));
        });
    }

    #[tokio::test]
    async fn chart_rerender_destroys_exactly_one_prior_instance() {
        let pipeline = pipeline();
        let source = MockSource::default();
        let mut slot = ChartSlot::empty();
        let outcome = pipeline
            .render_chart(&source, ChartKind::Trend, ChartStyle::Plain, &mut slot)
            .await;
        assert_eq!(outcome, RenderOutcome::Rendered);
        pipeline.inspect(|_, backend| assert_eq!(backend.destroyed(), 0));

        let outcome = pipeline
            .render_chart(&source, ChartKind::Trend, ChartStyle::Plain, &mut slot)
            .await;
        assert_eq!(outcome, RenderOutcome::Rendered);
        assert!(slot.is_occupied());
        pipeline.inspect(|_, backend| {
            assert_eq!(backend.constructed(), 2);
            assert_eq!(backend.destroyed(), 1);
            assert_eq!(backend.live(), 1);
        });
    }

    #[tokio::test]
    async fn failed_chart_fetch_keeps_live_chart() {
        let pipeline = pipeline();
        let source = MockSource::default();
        let mut slot = ChartSlot::empty();
        _ = pipeline
            .render_chart(&source, ChartKind::Monthly, ChartStyle::Glow, &mut slot)
            .await;
        source.fail_next(503);
        let outcome = pipeline
            .render_chart(&source, ChartKind::Monthly, ChartStyle::Glow, &mut slot)
            .await;
        assert_eq!(outcome, RenderOutcome::Failed);
        assert!(slot.is_occupied());
        pipeline.inspect(|surface, backend| {
            assert_eq!(backend.destroyed(), 0);
            assert_eq!(surface.notifications().len(), 1);
        });
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_chart_reload_keeps_live_chart() {
        let pipeline = pipeline();
        let source = MockSource::default();
        let mut slot = ChartSlot::empty();
        _ = pipeline
            .render_chart(&source, ChartKind::Trend, ChartStyle::Plain, &mut slot)
            .await;

        source.delay_charts(core::time::Duration::from_secs(5));
        let abandoned = tokio::time::timeout(
            core::time::Duration::from_millis(10),
            pipeline.render_chart(&source, ChartKind::Trend, ChartStyle::Plain, &mut slot),
        )
        .await;
        assert!(abandoned.is_err());
        assert!(slot.is_occupied());
        pipeline.inspect(|_, backend| {
            assert_eq!(backend.destroyed(), 0);
            assert_eq!(backend.live(), 1);
        });

        source.delay_charts(core::time::Duration::ZERO);
        let outcome = pipeline
            .render_chart(&source, ChartKind::Trend, ChartStyle::Plain, &mut slot)
            .await;
        assert_eq!(outcome, RenderOutcome::Rendered);
        pipeline.inspect(|_, backend| {
            assert_eq!(backend.destroyed(), 1);
            assert_eq!(backend.live(), 1);
        });
    }

    #[test]
    fn region_ids_match_dom() {
        let ids: Vec<&str> = RegionId::ALL.iter().map(|region| region.as_str()).collect();
        assert_eq!(
            ids,
            [
                "statistics-container",
                "monthlyChart",
                "categoryChart",
                "trendChart",
                "recommendations-container",
                "forecast-container",
                "insights-container",
                "transactions-table",
                "ai-chat-messages",
            ]
        );
        assert_eq!(RegionId::for_chart(ChartKind::Category), RegionId::CategoryChart);
        assert_eq!(RegionId::TrendChart.chart_kind(), Some(ChartKind::Trend));
    }
}
