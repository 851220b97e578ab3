use async_trait::async_trait;

use super::model::{Movie, MovieRecommendation};
use crate::filters::FilterState;

/// Access to the remote movie service. Every call is a single attempt.
#[async_trait]
pub trait MovieGateway: Send + Sync {
    /// Fetch one 1-based page of movies matching `filters`.
    /// An empty list means there are no further pages.
    async fn list_movies(&self, page: u32, filters: &FilterState) -> GatewayResult<Vec<Movie>>;

    /// Fetch a movie and its recommendations. The certification ceiling is
    /// applied by the service.
    async fn get_movie_by_id(
        &self,
        id: &str,
        certification: Option<&str>,
    ) -> GatewayResult<MovieRecommendation>;
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GatewayError {
    #[error("Request to {url} failed: {message}")]
    Network { url: String, message: String },
    #[error("Request to {url} returned status {status}")]
    Status { url: String, status: u16 },
    #[error("Failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },
    #[error("Movie not found: {0}")]
    NotFound(String),
}

impl GatewayError {
    /// Transport failures and unsuccessful statuses both count as network errors.
    pub fn is_network(&self) -> bool {
        matches!(self, GatewayError::Network { .. } | GatewayError::Status { .. })
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;
