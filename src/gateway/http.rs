use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use super::model::{ListRequest, ListResponse, Movie, MovieRecommendation};
use super::repo::{GatewayError, GatewayResult, MovieGateway};
use crate::config::ApiConfig;
use crate::filters::FilterState;

/// `MovieGateway` backed by the movie service's JSON HTTP API.
#[derive(Debug, Clone)]
pub struct HttpMovieGateway {
    client: Client,
    base_url: String,
    page_size: u32,
}

impl HttpMovieGateway {
    pub fn new(base_url: &str, page_size: u32, timeout: Option<Duration>) -> GatewayResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| GatewayError::Network {
            url: base_url.to_string(),
            message: format!("Failed to create HTTP client: {}", e),
        })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            page_size,
        })
    }

    pub fn from_config(config: &ApiConfig) -> GatewayResult<Self> {
        Self::new(&config.base_url, config.page_size, config.timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn read_json<T: DeserializeOwned>(
        url: &str,
        response: reqwest::Response,
    ) -> GatewayResult<T> {
        let body = response.bytes().await.map_err(|e| GatewayError::Network {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        serde_json::from_slice(&body).map_err(|e| GatewayError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

fn network_error(url: &str, err: reqwest::Error) -> GatewayError {
    GatewayError::Network {
        url: url.to_string(),
        message: err.to_string(),
    }
}

#[async_trait]
impl MovieGateway for HttpMovieGateway {
    async fn list_movies(&self, page: u32, filters: &FilterState) -> GatewayResult<Vec<Movie>> {
        let url = format!("{}/movies", self.base_url);
        let body = ListRequest {
            page,
            page_size: self.page_size,
            genres: filters.genres().iter().map(String::as_str).collect(),
            maximum_certification: filters.certification(),
        };

        debug!(page, genres = ?body.genres, certification = ?body.maximum_certification, "POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| network_error(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let list: ListResponse = Self::read_json(&url, response).await?;
        debug!(page, count = list.items.len(), "Received movie page");
        Ok(list.items)
    }

    async fn get_movie_by_id(
        &self,
        id: &str,
        certification: Option<&str>,
    ) -> GatewayResult<MovieRecommendation> {
        let url = format!("{}/movies/{}", self.base_url, urlencoding::encode(id));

        debug!(id, certification = ?certification, "GET {}", url);

        let mut request = self.client.get(&url);
        if let Some(cert) = certification {
            request = request.query(&[("maximum_certification", cert)]);
        }

        let response = request.send().await.map_err(|e| network_error(&url, e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(GatewayError::NotFound(id.to_string()));
        }
        if !status.is_success() {
            return Err(GatewayError::Status {
                url,
                status: status.as_u16(),
            });
        }

        Self::read_json(&url, response).await
    }
}
