//! Chart backend that records calls instead of drawing.

use std::collections::BTreeSet;

use super::{ChartBackend, ChartConfig};
use crate::error::{FintrackError, Result};

/// Handle issued by [`RecordingChartBackend`].
#[derive(Debug, PartialEq, Eq)]
pub struct RecordedChart {
    /// Sequential instance number.
    pub id: u64,
    /// Canvas the chart was built on.
    pub canvas_id: String,
}

/// In-memory [`ChartBackend`] that counts constructions and destructions.
///
/// Useful for tests and for headless rendering, where the last
/// configuration per canvas can be inspected or serialised.
#[derive(Debug, Default)]
pub struct RecordingChartBackend {
    /// Next instance number.
    next_id: u64,
    /// Number of successful constructions.
    constructed: usize,
    /// Number of destructions.
    destroyed: usize,
    /// Instances not yet destroyed.
    live: BTreeSet<u64>,
    /// Configurations in construction order.
    history: Vec<(String, ChartConfig)>,
    /// Whether the next construction fails.
    fail_next: bool,
}

impl RecordingChartBackend {
    /// Number of charts constructed so far.
    #[inline]
    #[must_use]
    pub const fn constructed(&self) -> usize {
        self.constructed
    }

    /// Number of charts destroyed so far.
    #[inline]
    #[must_use]
    pub const fn destroyed(&self) -> usize {
        self.destroyed
    }

    /// Number of charts currently alive.
    #[inline]
    #[must_use]
    pub fn live(&self) -> usize {
        self.live.len()
    }

    /// Last configuration built on `canvas_id`.
    #[must_use]
    pub fn last_config(&self, canvas_id: &str) -> Option<&ChartConfig> {
        self.history
            .iter()
            .rev()
            .find(|entry| entry.0 == canvas_id)
            .map(|entry| &entry.1)
    }

    /// Makes the next [`ChartBackend::construct`] call fail.
    #[inline]
    pub const fn fail_next_construct(&mut self) {
        self.fail_next = true;
    }
}

impl ChartBackend for RecordingChartBackend {
    type Handle = RecordedChart;

    fn construct(&mut self, canvas_id: &str, config: &ChartConfig) -> Result<RecordedChart> {
        if self.fail_next {
            self.fail_next = false;
            return Err(FintrackError::Chart(format!(
                "cannot construct chart on `{canvas_id}`"
            )));
        }
        self.next_id += 1;
        self.constructed += 1;
        _ = self.live.insert(self.next_id);
        self.history.push((canvas_id.to_owned(), config.clone()));
        tracing::trace!(canvas_id, id = self.next_id, "chart constructed");
        Ok(RecordedChart {
            id: self.next_id,
            canvas_id: canvas_id.to_owned(),
        })
    }

    fn destroy(&mut self, handle: RecordedChart) {
        if self.live.remove(&handle.id) {
            self.destroyed += 1;
            tracing::trace!(canvas_id = %handle.canvas_id, id = handle.id, "chart destroyed");
        }
    }
}
