//! Core runtime infrastructure.
//!
//! - [`config`] - Configuration parsing and validation
//! - [`runtime`] - Node runtime orchestration
//! - [`error`] - Error types

pub mod config;
pub mod error;
pub mod runtime;
