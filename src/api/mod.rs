//! # HTTP API
//!
//! Axum transport for the secret lifecycle: routing, form decoding, content
//! negotiation and the error-to-status mapping.

pub mod deadline;
pub mod error;
pub mod handlers;
pub mod negotiate;
pub mod request;
pub mod routes;
pub mod server;

pub use error::{ApiError, ErrorBody};
pub use negotiate::{Negotiated, ResponseFormat};
pub use routes::{build_router, ApiState};
pub use server::{serve, start_api_server};
