//! Live "is the terminal width inside this range" subscriptions.

use std::ops::{Bound, RangeBounds};
use tokio::sync::watch;

/// Minimum width, in columns, for the full header navigation
pub const WIDE_LAYOUT_MIN_COLUMNS: u16 = 100;

/// Half-open width range `[low, high)`; `high == None` is unbounded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidthRange {
    pub low: u16,
    pub high: Option<u16>,
}

impl WidthRange {
    pub fn from_bounds(range: impl RangeBounds<u16>) -> Self {
        let low = match range.start_bound() {
            Bound::Included(&n) => n,
            Bound::Excluded(&n) => n.saturating_add(1),
            Bound::Unbounded => 0,
        };
        let high = match range.end_bound() {
            Bound::Included(&n) => n.checked_add(1),
            Bound::Excluded(&n) => Some(n),
            Bound::Unbounded => None,
        };
        Self { low, high }
    }

    pub fn contains(&self, width: u16) -> bool {
        width >= self.low && self.high.map_or(true, |high| width < high)
    }
}

/// Publishes the current terminal width to every [`WidthWatch`]
pub struct Viewport {
    width: watch::Sender<u16>,
}

impl Viewport {
    pub fn new(width: u16) -> Self {
        let (width, _) = watch::channel(width);
        Self { width }
    }

    pub fn width(&self) -> u16 {
        *self.width.borrow()
    }

    /// Record a new width; watchers are only woken when it changed
    pub fn set_width(&self, width: u16) {
        self.width.send_if_modified(|current| {
            if *current == width {
                return false;
            }
            *current = width;
            true
        });
    }

    /// Watch whether the width lies in `range`.
    ///
    /// The range is fixed for the life of the watch. Dropping the watch
    /// unsubscribes it.
    pub fn within(&self, range: impl RangeBounds<u16>) -> WidthWatch {
        let range = WidthRange::from_bounds(range);
        let mut rx = self.width.subscribe();
        let matches = range.contains(*rx.borrow_and_update());
        WidthWatch { range, rx, matches }
    }

    /// Number of live watches
    pub fn subscriber_count(&self) -> usize {
        self.width.receiver_count()
    }
}

/// Membership of the viewport width in a fixed range, kept current
pub struct WidthWatch {
    range: WidthRange,
    rx: watch::Receiver<u16>,
    matches: bool,
}

impl WidthWatch {
    pub fn range(&self) -> WidthRange {
        self.range
    }

    /// Current membership, folding in any width change since the last call
    pub fn get(&mut self) -> bool {
        if self.rx.has_changed().unwrap_or(false) {
            let width = *self.rx.borrow_and_update();
            self.update(width);
        }
        self.matches
    }

    /// Wait until membership flips and return the new value.
    ///
    /// Returns `None` once the viewport is gone.
    pub async fn changed(&mut self) -> Option<bool> {
        loop {
            self.rx.changed().await.ok()?;
            let width = *self.rx.borrow_and_update();
            if self.update(width) {
                return Some(self.matches);
            }
        }
    }

    fn update(&mut self, width: u16) -> bool {
        let matches = self.range.contains(width);
        if matches == self.matches {
            return false;
        }
        tracing::debug!(width, low = self.range.low, high = ?self.range.high, matches, "width range membership changed");
        self.matches = matches;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbounded_range_tracks_width() {
        let viewport = Viewport::new(1024);
        let mut wide = viewport.within(768..);
        assert!(wide.get());

        viewport.set_width(500);
        assert!(!wide.get());

        viewport.set_width(768);
        assert!(wide.get());
    }

    #[test]
    fn initial_value_is_computed_at_subscription() {
        let viewport = Viewport::new(500);
        let mut wide = viewport.within(768..);
        assert!(!wide.get());
    }

    #[test]
    fn upper_bound_is_exclusive() {
        let viewport = Viewport::new(767);
        let mut narrow = viewport.within(0..768);
        assert!(narrow.get());

        viewport.set_width(768);
        assert!(!narrow.get());

        assert_eq!(WidthRange::from_bounds(0..=767), WidthRange::from_bounds(0..768));
    }

    #[test]
    fn last_notification_wins() {
        let viewport = Viewport::new(1024);
        let mut wide = viewport.within(768..);

        viewport.set_width(500);
        viewport.set_width(900);
        viewport.set_width(300);
        assert!(!wide.get());
    }

    #[test]
    fn dropping_a_watch_unsubscribes() {
        let viewport = Viewport::new(80);
        let a = viewport.within(..100);
        let b = viewport.within(100..);
        assert_eq!(viewport.subscriber_count(), 2);

        drop(a);
        assert_eq!(viewport.subscriber_count(), 1);
        drop(b);
        assert_eq!(viewport.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn changed_resolves_only_on_flip() {
        let viewport = Viewport::new(1024);
        let mut wide = viewport.within(768..);

        viewport.set_width(900);
        viewport.set_width(400);
        assert_eq!(wide.changed().await, Some(false));

        drop(viewport);
        assert_eq!(wide.changed().await, None);
    }
}
