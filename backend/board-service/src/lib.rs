/// Board Service Library
///
/// Job-board REST backend for the critik platform: job posts with attached
/// resume documents, comments with up/down voting, favorites, and user
/// profiles. Session authentication and resume storage/conversion live in
/// external collaborators; this service owns the persistent state and its
/// invariants.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers and the response envelope
/// - `models`: Row types and API enums
/// - `services`: Business logic (vote engine, listing queries, CRUD)
/// - `middleware`: Gateway identity extraction and request metrics
/// - `error`: Error taxonomy and HTTP mapping
/// - `config`: Configuration management
/// - `metrics`: Prometheus collectors and the /metrics endpoint
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
