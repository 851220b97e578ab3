use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::filters::{FilterKey, FilterState};
use crate::gateway::{GatewayError, GatewayResult, Movie, MovieGateway, Page};

/// Page cap of the movie service.
pub const DEFAULT_MAX_PAGES: u32 = 500;

/// What a call to `FeedController::fetch_next` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A non-empty page was appended.
    Appended { page: u32, count: usize },
    /// The service returned an empty page; the feed is complete.
    Exhausted,
    /// Another fetch is in flight.
    Busy,
    /// The feed is already complete.
    Done,
    /// The filters changed while the request was in flight; the response was dropped.
    Stale,
}

/// Read-only view of the feed for the presentation layer.
#[derive(Debug, Clone)]
pub struct FeedSnapshot {
    pub filters: FilterState,
    pub page_count: usize,
    pub movie_count: usize,
    pub next_page: u32,
    pub is_fetching_next_page: bool,
    pub has_more: bool,
    pub last_error: Option<GatewayError>,
}

#[derive(Debug)]
struct FeedState {
    filters: FilterState,
    key: FilterKey,
    pages: Vec<Page>,
    next_page: u32,
    is_fetching: bool,
    has_more: bool,
    last_error: Option<GatewayError>,
    // Bumped on every reset; in-flight requests carry the value they started with.
    generation: u64,
}

impl FeedState {
    fn new(filters: FilterState) -> Self {
        Self {
            key: filters.key(),
            filters,
            pages: Vec::new(),
            next_page: 1,
            is_fetching: false,
            has_more: true,
            last_error: None,
            generation: 0,
        }
    }

    fn reset(&mut self, filters: FilterState) {
        self.key = filters.key();
        self.filters = filters;
        self.pages.clear();
        self.next_page = 1;
        self.is_fetching = false;
        self.has_more = true;
        self.last_error = None;
        self.generation += 1;
    }
}

fn lock(state: &Mutex<FeedState>) -> MutexGuard<'_, FeedState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clears the in-flight flag if a fetch is dropped before it completes.
struct InFlight<'a> {
    state: &'a Mutex<FeedState>,
    generation: u64,
    armed: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed {
            let mut state = lock(self.state);
            if state.generation == self.generation {
                state.is_fetching = false;
            }
        }
    }
}

/// Forward-only paginated feed for the current filter selection.
///
/// At most one page request is in flight at a time. Only the feed of the
/// current filters is retained.
pub struct FeedController {
    gateway: Arc<dyn MovieGateway>,
    max_pages: u32,
    state: Mutex<FeedState>,
}

impl std::fmt::Debug for FeedController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedController")
            .field("max_pages", &self.max_pages)
            .field("state", &*lock(&self.state))
            .finish()
    }
}

impl FeedController {
    pub fn new(gateway: Arc<dyn MovieGateway>, filters: FilterState, max_pages: u32) -> Self {
        Self {
            gateway,
            max_pages,
            state: Mutex::new(FeedState::new(filters)),
        }
    }

    pub async fn fetch_next(&self) -> GatewayResult<FetchOutcome> {
        let (page, filters, generation) = {
            let mut state = lock(&self.state);
            if state.is_fetching {
                return Ok(FetchOutcome::Busy);
            }
            if !state.has_more {
                return Ok(FetchOutcome::Done);
            }
            if state.next_page > self.max_pages {
                state.has_more = false;
                return Ok(FetchOutcome::Done);
            }
            state.is_fetching = true;
            (state.next_page, state.filters.clone(), state.generation)
        };

        let mut guard = InFlight {
            state: &self.state,
            generation,
            armed: true,
        };

        debug!(page, generation, "Fetching feed page");
        let result = self.gateway.list_movies(page, &filters).await;

        guard.armed = false;
        let mut state = lock(&self.state);
        if state.generation != generation {
            warn!(page, generation, current = state.generation, "Discarding stale feed page");
            return Ok(FetchOutcome::Stale);
        }
        state.is_fetching = false;

        match result {
            Ok(movies) if movies.is_empty() => {
                info!(page, "Feed exhausted");
                state.has_more = false;
                state.last_error = None;
                Ok(FetchOutcome::Exhausted)
            }
            Ok(movies) => {
                let count = movies.len();
                state.pages.push(Page { number: page, movies });
                state.next_page = page + 1;
                if state.next_page > self.max_pages {
                    state.has_more = false;
                }
                state.last_error = None;
                Ok(FetchOutcome::Appended { page, count })
            }
            Err(e) => {
                warn!(page, "Failed to fetch feed page: {}", e);
                state.last_error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Switch the feed to `filters`. Returns `None` when the selection is
    /// equal to the current one, otherwise the outcome of fetching page 1.
    pub async fn on_filter_change(&self, filters: FilterState) -> GatewayResult<Option<FetchOutcome>> {
        if !self.reset_for(filters) {
            return Ok(None);
        }
        self.fetch_next().await.map(Some)
    }

    fn reset_for(&self, filters: FilterState) -> bool {
        let mut state = lock(&self.state);
        if state.key == filters.key() {
            // Same selection, keep the new display order.
            state.filters = filters;
            return false;
        }
        info!(genres = ?filters.genres(), certification = ?filters.certification(), "Filters changed, resetting feed");
        state.reset(filters);
        true
    }

    /// Apply every change published by a filter store until the store is dropped.
    ///
    /// The first page of each new selection is fetched on a spawned task, so a
    /// later change can overtake it.
    pub async fn follow(self: Arc<Self>, mut filters: watch::Receiver<FilterState>) {
        // The value current at subscription time counts as seen, so apply it first.
        let initial = filters.borrow_and_update().clone();
        self.apply_followed(initial);

        while filters.changed().await.is_ok() {
            let next = filters.borrow_and_update().clone();
            self.apply_followed(next);
        }
        debug!("Filter store closed, no longer following");
    }

    fn apply_followed(self: &Arc<Self>, filters: FilterState) {
        if self.reset_for(filters) {
            let feed = self.clone();
            tokio::spawn(async move {
                if let Err(e) = feed.fetch_next().await {
                    debug!("First page after filter change failed: {}", e);
                }
            });
        }
    }

    /// All movies fetched so far, in fetch order.
    pub fn flattened(&self) -> Vec<Movie> {
        lock(&self.state)
            .pages
            .iter()
            .flat_map(|page| page.movies.iter().cloned())
            .collect()
    }

    pub fn pages(&self) -> Vec<Page> {
        lock(&self.state).pages.clone()
    }

    pub fn has_more(&self) -> bool {
        lock(&self.state).has_more
    }

    pub fn is_fetching_next_page(&self) -> bool {
        lock(&self.state).is_fetching
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        let state = lock(&self.state);
        FeedSnapshot {
            filters: state.filters.clone(),
            page_count: state.pages.len(),
            movie_count: state.pages.iter().map(|p| p.movies.len()).sum(),
            next_page: state.next_page,
            is_fetching_next_page: state.is_fetching,
            has_more: state.has_more,
            last_error: state.last_error.clone(),
        }
    }
}
