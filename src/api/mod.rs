//! API Module
//!
//! HTTP handlers and routing for the demo server.
//!
//! # Endpoints
//! - `GET /samples` - Memoized sample list
//! - `GET /samples/:id` - Memoized sample by id
//! - `DELETE /samples/:id` - Drop a memoized sample
//! - `GET /samples/:id/exists` - Whether a sample is memoized
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
