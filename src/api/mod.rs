//! # HTTP API
//!
//! The axum surface over query translation, execution, serialization, and
//! rendering.

pub mod errors;
pub mod handler;
pub mod server;

pub use errors::{ApiError, ApiResult, ErrorResponse};
pub use handler::ApiState;
pub use server::ApiServer;
