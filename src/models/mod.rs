//! Response models for the demo server API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing HTTP response bodies.

pub mod responses;

// Re-export commonly used types
pub use responses::{
    ErrorResponse, ExistsResponse, HealthResponse, RemoveResponse, SampleResponse, StatsResponse,
};
