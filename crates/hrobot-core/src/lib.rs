//! # hrobot-core
//!
//! Core types and utilities for working with the Hetzner Robot web service.
//!
//! This crate provides the shared error type, connection configuration, HTTP
//! client settings and identifier types used by the Robot API client and the
//! provider layer built on top of it.
//!
//! ## Modules
//!
//! - [`error`] - Error types and vendor error body mapping
//! - [`ids`] - Strongly-typed identifiers for Robot resources
//! - [`config`] - Connection settings with environment defaults
//! - [`client`] - HTTP client configuration
//! - [`form`] - Builder for form-encoded request bodies

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod error;
pub mod form;
pub mod ids;

// Re-export commonly used types
pub use error::{ApiError, Error, Result};
