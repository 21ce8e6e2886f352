//! Visibility gate for lazily loaded images.
//!
//! The host platform owns the actual intersection observer; this module holds the options it is
//! created with, a geometry helper that computes entries the same way, and the subscription that
//! turns the first qualifying entry into a single [`VisibilitySignal`].

pub const DEFAULT_ROOT_MARGIN_PX: f64 = 50.0;
pub const DEFAULT_THRESHOLD: f64 = 0.1;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    fn right(&self) -> f64 {
        self.x + self.width
    }

    fn bottom(&self) -> f64 {
        self.y + self.height
    }

    fn expand(&self, margin: f64) -> Self {
        Self::new(
            self.x - margin,
            self.y - margin,
            self.width + margin * 2.0,
            self.height + margin * 2.0,
        )
    }

    fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        (left <= right && top <= bottom).then(|| Rect::new(left, top, right - left, bottom - top))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntersectionEntry {
    pub is_intersecting: bool,
    pub intersection_ratio: f64,
}

/// Options the observer is created with: a 50px root margin and a 10% threshold.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObserverOptions {
    pub root_margin_px: f64,
    pub threshold: f64,
}

impl Default for ObserverOptions {
    fn default() -> Self {
        Self {
            root_margin_px: DEFAULT_ROOT_MARGIN_PX,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl ObserverOptions {
    /// CSS form of the root margin, e.g. `50px`.
    pub fn root_margin(&self) -> String {
        format!("{}px", self.root_margin_px)
    }

    /// Entry for `target` against `viewport` grown by the root margin. A target counts as
    /// intersecting once the visible share of its area reaches the threshold.
    pub fn entry_for(&self, target: Rect, viewport: Rect) -> IntersectionEntry {
        let root = viewport.expand(self.root_margin_px);
        let ratio = match root.intersection(&target) {
            Some(overlap) if target.area() > 0.0 => (overlap.area() / target.area()).min(1.0),
            Some(_) => 1.0,
            None => 0.0,
        };
        IntersectionEntry {
            is_intersecting: ratio > 0.0 && ratio >= self.threshold,
            intersection_ratio: ratio,
        }
    }
}

/// Platform observer reduced to the one operation the gate needs.
pub trait ObserverHandle {
    fn disconnect(&mut self);
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VisibilitySignal {
    BecameVisible,
}

/// Owns an observer until it fires once or is torn down. Dropping tears down.
#[derive(Debug)]
pub struct VisibilitySubscription<H: ObserverHandle> {
    handle: Option<H>,
}

impl<H: ObserverHandle> VisibilitySubscription<H> {
    pub fn new(handle: H) -> Self {
        Self {
            handle: Some(handle),
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    /// Feed an observer callback. The first intersecting entry disconnects the observer and
    /// yields the signal; later calls yield nothing.
    pub fn on_entry(&mut self, entry: &IntersectionEntry) -> Option<VisibilitySignal> {
        if !entry.is_intersecting {
            return None;
        }
        let mut handle = self.handle.take()?;
        handle.disconnect();
        Some(VisibilitySignal::BecameVisible)
    }

    /// Disconnect if the observer has not fired yet.
    pub fn teardown(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            handle.disconnect();
        }
    }
}

impl<H: ObserverHandle> Drop for VisibilitySubscription<H> {
    fn drop(&mut self) {
        self.teardown();
    }
}
