//! HTTP API server for Pinmark.
//!
//! This crate provides:
//! - Image inspection and marking endpoints
//! - Listing, serving and deletion of marked images
//! - Image record CRUD and folder sync under `/db`
//! - Health and Prometheus metrics endpoints

pub mod catalog;
pub mod error;
pub mod handlers;
pub mod marking;
pub mod metrics;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
