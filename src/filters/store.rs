use tokio::sync::watch;
use tracing::debug;

use super::state::FilterState;

/// Process-local holder of the active `FilterState`.
///
/// Only the filter UI writes; readers call `get` or follow changes through
/// `subscribe`.
#[derive(Debug)]
pub struct FilterStore {
    tx: watch::Sender<FilterState>,
}

impl Default for FilterStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterStore {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(FilterState::default());
        Self { tx }
    }

    pub fn get(&self) -> FilterState {
        self.tx.borrow().clone()
    }

    /// Replace the state wholesale. Callers merge on their side.
    pub fn set(&self, next: FilterState) {
        debug!(genres = ?next.genres(), certification = ?next.certification(), "Filters set");
        self.tx.send_replace(next);
    }

    pub fn reset(&self) {
        self.set(FilterState::default());
    }

    pub fn subscribe(&self) -> watch::Receiver<FilterState> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set_reset() {
        let store = FilterStore::new();
        assert!(store.get().is_empty());

        let next = store.get().toggle_genre("Drama").with_certification(Some("PG-13"));
        store.set(next.clone());
        assert_eq!(store.get(), next);

        store.reset();
        assert_eq!(store.get(), FilterState::default());
    }

    #[test]
    fn test_set_passes_values_through() {
        let store = FilterStore::new();
        store.set(FilterState::new(vec!["Not A Genre".into()], Some("XYZ".into())));
        assert_eq!(store.get().genres(), &["Not A Genre".to_string()]);
        assert_eq!(store.get().certification(), Some("XYZ"));
    }

    #[tokio::test]
    async fn test_subscribe_sees_changes() {
        let store = FilterStore::new();
        let mut rx = store.subscribe();

        store.set(FilterState::default().toggle_genre("Terror"));
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().has_genre("Terror"));

        store.reset();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_empty());
    }
}
