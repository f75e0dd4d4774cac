//! Reference-counted busy indicator
//!
//! The overlay is shown when the first request starts and hidden when the last
//! one finishes. Release happens in `Drop`, so an early return, an error or a
//! dropped future all hide it the same way.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// Surface that visually blocks the page while requests are outstanding.
pub trait BusyOverlay: Send + Sync {
    fn set_visible(&self, visible: bool);
}

/// Overlay that only records its state. Used by the CLI and by tests.
#[derive(Debug, Default)]
pub struct OverlayFlag {
    visible: AtomicBool,
    shown: AtomicUsize,
    hidden: AtomicUsize,
}

impl OverlayFlag {
    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    /// Number of times the overlay went from hidden to visible.
    pub fn times_shown(&self) -> usize {
        self.shown.load(Ordering::SeqCst)
    }

    pub fn times_hidden(&self) -> usize {
        self.hidden.load(Ordering::SeqCst)
    }
}

impl BusyOverlay for OverlayFlag {
    fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::SeqCst);
        if visible {
            self.shown.fetch_add(1, Ordering::SeqCst);
        } else {
            self.hidden.fetch_add(1, Ordering::SeqCst);
        }
    }
}

pub struct BusyIndicator {
    overlay: Arc<dyn BusyOverlay>,
    in_flight: Mutex<usize>,
}

impl BusyIndicator {
    pub fn new(overlay: Arc<dyn BusyOverlay>) -> Arc<Self> {
        Arc::new(Self {
            overlay,
            in_flight: Mutex::new(0),
        })
    }

    /// Mark one request as in flight until the returned guard is dropped.
    pub fn acquire(self: &Arc<Self>) -> BusyGuard {
        let mut count = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        *count += 1;
        if *count == 1 {
            debug!("[BUSY] Showing overlay");
            self.overlay.set_visible(true);
        }
        BusyGuard {
            indicator: Arc::clone(self),
        }
    }

    pub fn in_flight(&self) -> usize {
        *self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn release(&self) {
        let mut count = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        *count = count.saturating_sub(1);
        if *count == 0 {
            debug!("[BUSY] Hiding overlay");
            self.overlay.set_visible(false);
        }
    }
}

#[must_use = "the overlay is hidden as soon as the guard is dropped"]
pub struct BusyGuard {
    indicator: Arc<BusyIndicator>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.indicator.release();
    }
}
