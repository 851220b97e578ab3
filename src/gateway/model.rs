use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: String,
    pub title: String,
    pub year: i32,
    #[serde(default)]
    pub poster_path: String,
    #[serde(default)]
    pub backdrop_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    pub certification: String,
}

impl Movie {
    pub fn poster_url(&self, image_base: &str) -> Option<String> {
        image_url(image_base, &self.poster_path)
    }

    pub fn backdrop_url(&self, image_base: &str) -> Option<String> {
        image_url(image_base, &self.backdrop_path)
    }
}

fn image_url(base: &str, path: &str) -> Option<String> {
    if path.is_empty() {
        return None;
    }
    let base = base.trim_end_matches('/');
    if path.starts_with('/') {
        Some(format!("{}{}", base, path))
    } else {
        Some(format!("{}/{}", base, path))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredMovie {
    pub similarity_score: f32,
    pub movie: Movie,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRecommendation {
    pub searched_movie: Movie,
    #[serde(default)]
    pub results: Vec<ScoredMovie>,
}

/// One gateway response unit, tagged with the 1-based page number it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub number: u32,
    pub movies: Vec<Movie>,
}

/// Request body of `POST /movies`.
#[derive(Debug, Clone, Serialize)]
pub struct ListRequest<'a> {
    pub page: u32,
    pub page_size: u32,
    pub genres: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_certification: Option<&'a str>,
}

/// Response body of `POST /movies`. Pagination totals are not used.
#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse {
    pub items: Vec<Movie>,
}
