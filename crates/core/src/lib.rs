//! Core business logic for the SCP platform.

pub mod services;

pub use services::*;
