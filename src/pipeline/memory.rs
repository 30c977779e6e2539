//! In-memory surface for tests and headless rendering.
//!
//! Provides [`InMemorySurface`], a [`Surface`] that keeps each region's
//! content as a list of [`Node`]s and records notifications with their
//! dismissal deadlines.

use std::collections::BTreeMap;

use tokio::time::Instant;

use super::{RegionId, Surface};
use crate::error::{FintrackError, Result};
use crate::render::Notification;
use crate::view::{Element, Node};

/// A surface held entirely in memory.
///
/// Regions must be added before they can be rendered into; a load against
/// an absent region is skipped, as it would be on a page without that
/// container.
///
/// # Example
///
/// ```rust
/// use fintrack_rs::pipeline::{InMemorySurface, RegionId, Surface};
///
/// let surface = InMemorySurface::dashboard();
/// assert!(surface.has_region(RegionId::Statistics));
/// assert!(surface.content(RegionId::Statistics).is_empty());
/// ```
#[derive(Debug, Default)]
pub struct InMemorySurface {
    /// Content of each present region.
    regions: BTreeMap<RegionId, Vec<Node>>,
    /// Shown notifications with the instant they expire.
    notifications: Vec<(Notification, Instant)>,
    /// Index of the entry each appended-to region is scrolled to.
    scrolled_to: BTreeMap<RegionId, usize>,
    /// Replace calls per region.
    writes: BTreeMap<RegionId, usize>,
}

impl InMemorySurface {
    /// Creates a surface with no regions.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a surface with every dashboard region present.
    #[inline]
    #[must_use]
    pub fn dashboard() -> Self {
        Self::with_regions(RegionId::ALL)
    }

    /// Creates a surface with only the given regions present.
    #[must_use]
    pub fn with_regions<I: IntoIterator<Item = RegionId>>(regions: I) -> Self {
        let mut surface = Self::new();
        for region in regions {
            surface.add_region(region);
        }
        surface
    }

    /// Adds an empty region, keeping existing content if already present.
    #[inline]
    pub fn add_region(&mut self, region: RegionId) {
        _ = self.regions.entry(region).or_default();
    }

    /// Removes a region and its content.
    #[inline]
    pub fn remove_region(&mut self, region: RegionId) {
        drop(self.regions.remove(&region));
    }

    /// Content of `region`; empty when the region is absent.
    #[must_use]
    pub fn content(&self, region: RegionId) -> &[Node] {
        self.regions.get(&region).map_or(&[], Vec::as_slice)
    }

    /// Concatenated text of `region`.
    #[must_use]
    pub fn text(&self, region: RegionId) -> String {
        self.content(region).iter().map(Node::text_content).collect()
    }

    /// HTML of `region`.
    #[must_use]
    pub fn html(&self, region: RegionId) -> String {
        self.content(region).iter().map(Node::to_html).collect()
    }

    /// Number of times `region` was replaced.
    #[inline]
    #[must_use]
    pub fn writes(&self, region: RegionId) -> usize {
        self.writes.get(&region).copied().unwrap_or_default()
    }

    /// Index of the entry `region` is scrolled to, if anything was
    /// appended to it.
    #[inline]
    #[must_use]
    pub fn scrolled_to(&self, region: RegionId) -> Option<usize> {
        self.scrolled_to.get(&region).copied()
    }

    /// Notifications that have not yet expired.
    #[must_use]
    pub fn notifications(&self) -> Vec<&Notification> {
        let now = Instant::now();
        self.notifications
            .iter()
            .filter(|entry| entry.1 > now)
            .map(|entry| &entry.0)
            .collect()
    }

    /// Drops expired notifications and returns how many were dropped.
    pub fn prune_expired(&mut self) -> usize {
        let now = Instant::now();
        let before = self.notifications.len();
        self.notifications.retain(|entry| entry.1 > now);
        before - self.notifications.len()
    }
}

impl Surface for InMemorySurface {
    #[inline]
    fn has_region(&self, region: RegionId) -> bool {
        self.regions.contains_key(&region)
    }

    fn replace(&mut self, region: RegionId, content: Node) -> Result<()> {
        let slot = self
            .regions
            .get_mut(&region)
            .ok_or(FintrackError::DomMissing {
                region: region.as_str(),
            })?;
        *slot = vec![content];
        *self.writes.entry(region).or_default() += 1;
        _ = self.scrolled_to.remove(&region);
        Ok(())
    }

    fn append(&mut self, region: RegionId, content: Node) -> Result<()> {
        let slot = self
            .regions
            .get_mut(&region)
            .ok_or(FintrackError::DomMissing {
                region: region.as_str(),
            })?;
        slot.push(content);
        _ = self.scrolled_to.insert(region, slot.len() - 1);
        Ok(())
    }

    fn remove_node(&mut self, node_id: &str) -> bool {
        for nodes in self.regions.values_mut() {
            if let Some(index) = nodes
                .iter()
                .position(|node| node.as_element().and_then(Element::element_id) == Some(node_id))
            {
                drop(nodes.remove(index));
                return true;
            }
            let removed = nodes.iter_mut().any(|node| {
                node.as_element_mut()
                    .is_some_and(|element| element.remove_by_id(node_id))
            });
            if removed {
                return true;
            }
        }
        false
    }

    fn notify(&mut self, notification: Notification) {
        tracing::debug!(
            level = notification.level.as_str(),
            message = %notification.message,
            "notification shown"
        );
        let deadline = Instant::now() + notification.dismiss_after;
        self.notifications.push((notification, deadline));
    }
}

#[cfg(test)]
mod tests {
    use core::time::Duration;

    use super::*;

    #[test]
    fn replace_requires_region() {
        let mut surface = InMemorySurface::with_regions([RegionId::Forecast]);
        assert!(surface.replace(RegionId::Forecast, Node::text("ok")).is_ok());
        let err = surface
            .replace(RegionId::Insights, Node::text("nope"))
            .unwrap_err();
        assert!(matches!(
            err,
            FintrackError::DomMissing {
                region: "insights-container"
            }
        ));
        assert_eq!(surface.writes(RegionId::Forecast), 1);
    }

    #[test]
    fn append_scrolls_to_newest() {
        let mut surface = InMemorySurface::dashboard();
        surface
            .append(RegionId::ChatMessages, Node::text("hi"))
            .unwrap();
        surface
            .append(RegionId::ChatMessages, Node::text("there"))
            .unwrap();
        assert_eq!(surface.content(RegionId::ChatMessages).len(), 2);
        assert_eq!(surface.scrolled_to(RegionId::ChatMessages), Some(1));
    }

    #[test]
    fn remove_node_searches_nested_rows() {
        let mut surface = InMemorySurface::dashboard();
        let body = Element::new("tbody")
            .child(Element::new("tr").id("transaction-1"))
            .child(Element::new("tr").id("transaction-2"));
        surface
            .replace(RegionId::Transactions, body.into())
            .unwrap();
        assert!(surface.remove_node("transaction-1"));
        assert!(!surface.remove_node("transaction-1"));
        assert!(surface.html(RegionId::Transactions).contains("transaction-2"));
        assert!(!surface.html(RegionId::Transactions).contains("transaction-1"));
    }

    #[tokio::test(start_paused = true)]
    async fn notifications_expire() {
        let mut surface = InMemorySurface::new();
        surface.notify(Notification::success("Saved"));
        assert_eq!(surface.notifications().len(), 1);

        tokio::time::advance(Duration::from_secs(4)).await;
        assert_eq!(surface.prune_expired(), 0);

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(surface.notifications().is_empty());
        assert_eq!(surface.prune_expired(), 1);
    }
}
