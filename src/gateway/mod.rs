pub mod http;
pub mod model;
pub mod repo;

pub use http::HttpMovieGateway;
pub use model::*;
pub use repo::*;
