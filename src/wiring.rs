//! Event wiring: UI events to resource calls and re-renders.
//!
//! [`Dashboard`] owns the resource source, the render pipeline and one chart
//! slot per chart region, and maps each [`UiEvent`] onto them.

use core::fmt;

use crate::api::ResourceSource;
use crate::chart::{ChartBackend, ChartSlot, ChartStyle};
use crate::chat::{ChatLine, ChatMode, ChatResponder, ServerResponder, StubResponder, prepare_message};
use crate::models::{ChartKind, NewTransaction, Period, TransactionId, TransactionQuery, row_id};
use crate::pipeline::{RegionId, RenderOutcome, RenderPipeline, Surface};
use crate::render::{DELETE_PROMPT, Notification};

/// A blocking yes/no prompt.
pub trait Confirm: Send {
    /// Asks the user; `true` means proceed.
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool + Send,
{
    #[inline]
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Something the user did on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// The page finished loading.
    PageLoaded,
    /// The transaction form was submitted.
    TransactionSubmitted(NewTransaction),
    /// A delete button was clicked.
    DeleteRequested(TransactionId),
    /// The statistics period selector changed.
    PeriodChanged(Period),
    /// A region's refresh control was used.
    RefreshRequested(RegionId),
    /// Text was sent from the chat input.
    ChatSubmitted(String),
}

/// A chart region's live chart and style.
#[derive(Debug)]
struct ChartRegion<H> {
    /// Live chart, if any.
    slot: ChartSlot<H>,
    /// How the chart is drawn.
    style: ChartStyle,
}

impl<H> ChartRegion<H> {
    /// An empty region with the kind's default style.
    const fn new(kind: ChartKind) -> Self {
        Self {
            slot: ChartSlot::empty(),
            style: ChartStyle::default_for(kind),
        }
    }
}

/// The dashboard page: binds UI events to the render pipeline.
pub struct Dashboard<R, S, B: ChartBackend, C> {
    /// Where data comes from.
    source: R,
    /// Where it is rendered.
    pipeline: RenderPipeline<S, B>,
    /// Delete confirmation prompt.
    confirm: C,
    /// Selected statistics period.
    period: Period,
    /// Filter for the transaction table.
    query: TransactionQuery,
    /// Chat responder selection.
    chat_mode: ChatMode,
    /// Local responder for [`ChatMode::Stub`].
    stub: StubResponder,
    /// Monthly chart.
    monthly: ChartRegion<B::Handle>,
    /// Category chart.
    category: ChartRegion<B::Handle>,
    /// Balance trend chart.
    trend: ChartRegion<B::Handle>,
}

impl<R, S, B, C> fmt::Debug for Dashboard<R, S, B, C>
where
    R: fmt::Debug,
    S: fmt::Debug,
    B: ChartBackend,
{
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dashboard")
            .field("source", &self.source)
            .field("pipeline", &self.pipeline)
            .field("period", &self.period)
            .field("query", &self.query)
            .field("chat_mode", &self.chat_mode)
            .field("monthly", &self.monthly)
            .field("category", &self.category)
            .field("trend", &self.trend)
            .finish_non_exhaustive()
    }
}

impl<R, S, B, C> Dashboard<R, S, B, C>
where
    R: ResourceSource,
    S: Surface,
    B: ChartBackend,
    C: Confirm,
{
    /// Creates a dashboard with the default period, chart styles and the
    /// stub chat responder.
    #[inline]
    #[must_use]
    pub fn new(source: R, pipeline: RenderPipeline<S, B>, confirm: C) -> Self {
        Self {
            source,
            pipeline,
            confirm,
            period: Period::default(),
            query: TransactionQuery::default(),
            chat_mode: ChatMode::default(),
            stub: StubResponder::default(),
            monthly: ChartRegion::new(ChartKind::Monthly),
            category: ChartRegion::new(ChartKind::Category),
            trend: ChartRegion::new(ChartKind::Trend),
        }
    }

    /// Sets the chat responder.
    #[inline]
    #[must_use]
    pub fn with_chat_mode(mut self, mode: ChatMode) -> Self {
        self.chat_mode = mode;
        self
    }

    /// Replaces the stub responder used in [`ChatMode::Stub`].
    #[inline]
    #[must_use]
    pub fn with_stub_responder(mut self, stub: StubResponder) -> Self {
        self.stub = stub;
        self
    }

    /// Sets the style of one chart.
    #[inline]
    #[must_use]
    pub fn with_chart_style(mut self, kind: ChartKind, style: ChartStyle) -> Self {
        self.chart_region(kind).style = style;
        self
    }

    /// Sets the transaction table filter.
    #[inline]
    #[must_use]
    pub fn with_query(mut self, query: TransactionQuery) -> Self {
        self.query = query;
        self
    }

    /// The render pipeline.
    #[inline]
    #[must_use]
    pub const fn pipeline(&self) -> &RenderPipeline<S, B> {
        &self.pipeline
    }

    /// The resource source.
    #[inline]
    #[must_use]
    pub const fn source(&self) -> &R {
        &self.source
    }

    /// Selected statistics period.
    #[inline]
    #[must_use]
    pub const fn period(&self) -> Period {
        self.period
    }

    /// Whether a chart is live in the region for `kind`.
    #[inline]
    #[must_use]
    pub const fn has_chart(&self, kind: ChartKind) -> bool {
        match kind {
            ChartKind::Monthly => self.monthly.slot.is_occupied(),
            ChartKind::Category => self.category.slot.is_occupied(),
            ChartKind::Trend => self.trend.slot.is_occupied(),
        }
    }

    /// Handles one event. Returns what happened to each touched region.
    #[tracing::instrument(skip_all)]
    pub async fn dispatch(&mut self, event: UiEvent) -> Vec<(RegionId, RenderOutcome)> {
        match event {
            UiEvent::PageLoaded => self.load_all().await,
            UiEvent::TransactionSubmitted(transaction) => self.submit(transaction).await,
            UiEvent::DeleteRequested(id) => self.delete(id).await,
            UiEvent::PeriodChanged(period) => {
                tracing::debug!(period = period.as_str(), "period changed");
                self.period = period;
                vec![self.refresh(RegionId::Statistics).await]
            }
            UiEvent::RefreshRequested(region) => vec![self.refresh(region).await],
            UiEvent::ChatSubmitted(text) => self.chat(&text).await,
        }
    }

    /// Renders every region present on the surface.
    async fn load_all(&mut self) -> Vec<(RegionId, RenderOutcome)> {
        let mut outcomes = Vec::with_capacity(RegionId::ALL.len());
        for region in RegionId::ALL {
            if region == RegionId::ChatMessages {
                continue;
            }
            outcomes.push(self.refresh(region).await);
        }
        outcomes
    }

    /// Re-renders one region.
    async fn refresh(&mut self, region: RegionId) -> (RegionId, RenderOutcome) {
        let source = &self.source;
        let pipeline = &self.pipeline;
        let outcome = match region {
            RegionId::Statistics => pipeline.load_statistics(source, self.period).await,
            RegionId::Recommendations => pipeline.load_recommendations(source).await,
            RegionId::Forecast => pipeline.load_forecast(source).await,
            RegionId::Insights => pipeline.load_insights(source).await,
            RegionId::Transactions => pipeline.load_transactions(source, self.query.clone()).await,
            RegionId::MonthlyChart => self.refresh_chart(ChartKind::Monthly).await,
            RegionId::CategoryChart => self.refresh_chart(ChartKind::Category).await,
            RegionId::TrendChart => self.refresh_chart(ChartKind::Trend).await,
            RegionId::ChatMessages => RenderOutcome::Skipped,
        };
        (region, outcome)
    }

    /// Rebuilds one chart, destroying the previous instance.
    async fn refresh_chart(&mut self, kind: ChartKind) -> RenderOutcome {
        let chart = match kind {
            ChartKind::Monthly => &mut self.monthly,
            ChartKind::Category => &mut self.category,
            ChartKind::Trend => &mut self.trend,
        };
        self.pipeline
            .render_chart(&self.source, kind, chart.style, &mut chart.slot)
            .await
    }

    /// Creates a transaction, then refreshes statistics and the monthly chart.
    async fn submit(&mut self, transaction: NewTransaction) -> Vec<(RegionId, RenderOutcome)> {
        match self.source.submit_transaction(transaction).await {
            Ok(created) => {
                tracing::debug!(id = %created.id, "transaction created");
                self.pipeline
                    .notify(Notification::success("Transaction added"));
                vec![
                    self.refresh(RegionId::Statistics).await,
                    self.refresh(RegionId::MonthlyChart).await,
                ]
            }
            Err(err) => {
                tracing::warn!(error = %err, "transaction not created");
                self.pipeline
                    .notify(Notification::error("Could not add transaction"));
                Vec::new()
            }
        }
    }

    /// Deletes a transaction after confirmation and drops its row.
    async fn delete(&mut self, id: TransactionId) -> Vec<(RegionId, RenderOutcome)> {
        if !self.confirm.confirm(DELETE_PROMPT) {
            tracing::debug!(%id, "delete declined");
            return Vec::new();
        }
        match self.source.remove_transaction(id).await {
            Ok(()) => {
                let removed = self.pipeline.remove_node(&row_id(id));
                tracing::debug!(%id, removed, "transaction deleted");
                self.pipeline
                    .notify(Notification::success("Transaction deleted"));
                let outcome = if removed {
                    RenderOutcome::Rendered
                } else {
                    RenderOutcome::Skipped
                };
                vec![(RegionId::Transactions, outcome)]
            }
            Err(err) => {
                tracing::warn!(%id, error = %err, "transaction not deleted");
                self.pipeline
                    .notify(Notification::error("Could not delete transaction"));
                vec![(RegionId::Transactions, RenderOutcome::Failed)]
            }
        }
    }

    /// Appends the user's line, asks the responder and appends its reply.
    async fn chat(&self, raw: &str) -> Vec<(RegionId, RenderOutcome)> {
        let Some(message) = prepare_message(raw) else {
            return Vec::new();
        };
        let region = RegionId::ChatMessages;
        let sent = self.pipeline.append(region, ChatLine::user(message).render());
        let reply = match self.chat_mode {
            ChatMode::Stub => self.stub.respond(message).await,
            ChatMode::Server => ServerResponder::new(&self.source).respond(message).await,
        };
        let outcome = match reply {
            Ok(text) => self.pipeline.append(region, ChatLine::assistant(text).render()),
            Err(err) => {
                tracing::warn!(error = %err, "chat reply failed");
                self.pipeline
                    .notify(Notification::error("The assistant is unavailable"));
                RenderOutcome::Failed
            }
        };
        vec![(region, sent), (region, outcome)]
    }

    /// Chart region for `kind`.
    const fn chart_region(&mut self, kind: ChartKind) -> &mut ChartRegion<B::Handle> {
        match kind {
            ChartKind::Monthly => &mut self.monthly,
            ChartKind::Category => &mut self.category,
            ChartKind::Trend => &mut self.trend,
        }
    }
}
