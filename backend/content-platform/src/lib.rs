/// Content Platform Library
///
/// Videos, lessons and podcasts behind a REST API: a seeded "for you" video
/// feed and range-aware streaming of the stored media.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers and route registration
/// - `models`: row and response types
/// - `services`: feed ordering and media serving
/// - `db`: repositories over PostgreSQL
/// - `middleware`: bearer-token authentication and request metrics
/// - `error`: error types and their HTTP rendering
/// - `config`: configuration from the environment
/// - `metrics`: Prometheus collectors
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod openapi;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
