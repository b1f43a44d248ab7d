//! Axum HTTP API over the draft store and assembly engine.
//!
//! Every endpoint answers with the `{success, output, error}` envelope.

pub mod config;
pub mod envelope;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use envelope::Envelope;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
