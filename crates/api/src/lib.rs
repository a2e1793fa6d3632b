//! HTTP API layer for survey-rs.
//!
//! - **Endpoints**: poll, question and choice management, poll submission, sign-in
//! - **Extractors**: authentication, pagination, session cookie
//! - **Middleware**: bearer token resolution
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::{AppState, auth_middleware};
