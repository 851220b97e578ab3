use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::filters::FilterStore;
use crate::gateway::{GatewayError, MovieGateway, MovieRecommendation};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LookupError {
    #[error("Movie ID is required")]
    MissingId,
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

pub const DEFAULT_CAPACITY: usize = 256;

type LookupKey = (String, Option<String>);

/// Bounded result cache; the oldest entry is evicted first.
#[derive(Default)]
struct LookupCache {
    entries: HashMap<LookupKey, Arc<MovieRecommendation>>,
    order: VecDeque<LookupKey>,
}

impl LookupCache {
    fn insert(&mut self, key: LookupKey, rec: Arc<MovieRecommendation>, capacity: usize) {
        if self.entries.insert(key.clone(), rec).is_none() {
            self.order.push_back(key);
        }
        while self.entries.len() > capacity {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                }
                None => break,
            }
        }
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}

/// Single-movie query with recommendations, cached per id and ceiling.
/// Failed lookups are not cached.
pub struct MovieLookup {
    gateway: Arc<dyn MovieGateway>,
    capacity: usize,
    cache: RwLock<LookupCache>,
}

impl MovieLookup {
    pub fn new(gateway: Arc<dyn MovieGateway>) -> Self {
        Self::with_capacity(gateway, DEFAULT_CAPACITY)
    }

    /// A `capacity` of 0 disables caching.
    pub fn with_capacity(gateway: Arc<dyn MovieGateway>, capacity: usize) -> Self {
        Self {
            gateway,
            capacity,
            cache: RwLock::new(LookupCache::default()),
        }
    }

    pub async fn len(&self) -> usize {
        self.cache.read().await.entries.len()
    }

    pub async fn get(
        &self,
        id: &str,
        certification: Option<&str>,
    ) -> Result<Arc<MovieRecommendation>, LookupError> {
        if id.trim().is_empty() {
            return Err(LookupError::MissingId);
        }

        let key = (id.to_string(), certification.map(str::to_string));
        if let Some(hit) = self.cache.read().await.entries.get(&key) {
            debug!(id, "Movie lookup cache hit");
            return Ok(hit.clone());
        }

        let rec = Arc::new(self.gateway.get_movie_by_id(id, certification).await?);
        self.cache.write().await.insert(key, rec.clone(), self.capacity);
        Ok(rec)
    }

    /// Look up `id` under the ceiling currently selected in `filters`.
    pub async fn get_for_filters(
        &self,
        id: &str,
        filters: &FilterStore,
    ) -> Result<Arc<MovieRecommendation>, LookupError> {
        let current = filters.get();
        self.get(id, current.certification()).await
    }

    pub async fn clear(&self) {
        self.cache.write().await.clear();
    }
}
