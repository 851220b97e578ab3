//! Scroll observation and the "near the bottom" trigger that drives pagination.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::trace;

pub const DEFAULT_THRESHOLD: f64 = 100.0;

/// Viewport position relative to the document, in arbitrary units (pixels, rows).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub viewport_height: f64,
    pub scroll_y: f64,
    pub document_height: f64,
}

impl ScrollMetrics {
    pub fn near_bottom(&self, threshold: f64) -> bool {
        self.viewport_height + self.scroll_y >= self.document_height - threshold
    }
}

type Listener = Arc<dyn Fn(ScrollMetrics) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

/// Source of scroll events. Listeners stay registered while their
/// `ScrollSubscription` is alive.
#[derive(Clone, Default)]
pub struct ScrollEvents {
    registry: Arc<Mutex<Registry>>,
}

impl std::fmt::Debug for ScrollEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollEvents")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ScrollEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, listener: F) -> ScrollSubscription
    where
        F: Fn(ScrollMetrics) + Send + Sync + 'static,
    {
        let mut registry = lock(&self.registry);
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.push((id, Arc::new(listener)));
        ScrollSubscription {
            registry: self.registry.clone(),
            id,
        }
    }

    /// Deliver one scroll event to every registered listener.
    pub fn emit(&self, metrics: ScrollMetrics) {
        // Listeners run unlocked so they may subscribe or unsubscribe.
        let listeners: Vec<Listener> = lock(&self.registry)
            .listeners
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        trace!(?metrics, listeners = listeners.len(), "Scroll event");
        for listener in listeners {
            listener(metrics);
        }
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.registry).listeners.len()
    }
}

/// Registration handle; the listener is removed when this is dropped.
#[must_use = "the listener is removed when the subscription is dropped"]
pub struct ScrollSubscription {
    registry: Arc<Mutex<Registry>>,
    id: u64,
}

impl std::fmt::Debug for ScrollSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollSubscription").field("id", &self.id).finish()
    }
}

impl Drop for ScrollSubscription {
    fn drop(&mut self) {
        lock(&self.registry).listeners.retain(|(id, _)| *id != self.id);
    }
}

/// Calls back whenever a scroll event lands within `threshold` of the
/// document bottom. Every qualifying event fires; there is no debouncing,
/// so the callee must tolerate repeats.
pub struct ScrollProximityTrigger;

impl ScrollProximityTrigger {
    pub fn attach<F>(events: &ScrollEvents, threshold: f64, callback: F) -> ScrollSubscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        events.subscribe(move |metrics| {
            if metrics.near_bottom(threshold) {
                callback();
            }
        })
    }

    pub fn attach_default<F>(events: &ScrollEvents, callback: F) -> ScrollSubscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self::attach(events, DEFAULT_THRESHOLD, callback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn at(scroll_y: f64) -> ScrollMetrics {
        ScrollMetrics {
            viewport_height: 800.0,
            scroll_y,
            document_height: 2000.0,
        }
    }

    #[test]
    fn test_near_bottom() {
        assert!(!at(1099.0).near_bottom(100.0));
        assert!(at(1100.0).near_bottom(100.0));
        assert!(at(1200.0).near_bottom(0.0));
        assert!(!at(1199.0).near_bottom(0.0));
    }

    #[test]
    fn test_trigger_fires_on_every_qualifying_event() {
        let events = ScrollEvents::new();
        let fired = Arc::new(AtomicUsize::new(0));

        let counter = fired.clone();
        let subscription = ScrollProximityTrigger::attach_default(&events, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        events.emit(at(0.0));
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        events.emit(at(1150.0));
        events.emit(at(1160.0));
        assert_eq!(fired.load(Ordering::SeqCst), 2);

        drop(subscription);
        assert_eq!(events.listener_count(), 0);
        events.emit(at(1200.0));
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_dropping_one_subscription_keeps_others() {
        let events = ScrollEvents::new();
        let seen = Arc::new(AtomicUsize::new(0));

        let a = {
            let seen = seen.clone();
            events.subscribe(move |_| {
                seen.fetch_add(1, Ordering::SeqCst);
            })
        };
        let _b = {
            let seen = seen.clone();
            events.subscribe(move |_| {
                seen.fetch_add(10, Ordering::SeqCst);
            })
        };

        drop(a);
        events.emit(at(0.0));
        assert_eq!(seen.load(Ordering::SeqCst), 10);
        assert_eq!(events.listener_count(), 1);
    }
}
