pub mod browse;
pub mod config;
pub mod feed;
pub mod filters;
pub mod gateway;
pub mod scroll;

pub use browse::{run, Command};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Movie service error: {0}")]
    Gateway(#[from] gateway::GatewayError),
    #[error("Lookup error: {0}")]
    Lookup(#[from] feed::LookupError),
}
