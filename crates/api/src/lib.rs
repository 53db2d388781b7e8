//! HTTP API layer for the SCP platform.
//!
//! This crate provides the REST API:
//!
//! - **Endpoints**: catalog, links, orders, chat, complaints, incidents
//! - **Extractors**: authenticated user and scoped viewer
//! - **Middleware**: Bearer-token authentication
//! - **Response**: the `{data, success, message?}` envelope
//!
//! Built on Axum 0.8 with Tower middleware stack.

// Allow dead_code for API compatibility fields in request structs
#![allow(dead_code)]

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use response::ApiResponse;
