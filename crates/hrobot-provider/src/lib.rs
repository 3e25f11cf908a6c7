//! # hrobot-provider
//!
//! Host-facing layer of the Hetzner Robot provider.
//!
//! A [`Provider`] holds the type tables for every resource and data source,
//! builds one [`hrobot_api::RobotClient`] during configuration and dispatches
//! lifecycle calls to the matching handler.
//!
//! ## Modules
//!
//! - [`schema`] - attribute declarations and input validation
//! - [`state`] - the attribute bag handed to handlers
//! - [`diagnostics`] - errors and warnings reported to the host
//! - [`api`] - the [`RobotApi`] seam handlers call through
//! - [`resources`] / [`data_sources`] - lifecycle handlers
//! - [`provider`] - registry, configuration and dispatch
//! - [`logging`] - subscriber setup for host processes
//!
//! ```no_run
//! use hrobot_provider::Provider;
//! use serde_json::json;
//!
//! # async fn run() {
//! hrobot_provider::init_logging();
//! let mut provider = Provider::new();
//! let diagnostics = provider.configure(json!({"username": "robot", "password": "secret"}));
//! assert!(diagnostics.is_empty());
//!
//! let servers = provider
//!     .read_data_source("hetzner-robot_servers", json!({}))
//!     .await;
//! # }
//! ```

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod data_sources;
pub mod diagnostics;
pub mod flatten;
pub mod logging;
pub mod provider;
pub mod resources;
pub mod schema;
pub mod state;

pub use api::RobotApi;
pub use data_sources::DataSource;
pub use diagnostics::{Diagnostic, Severity};
pub use logging::{init_logging, try_init_logging};
pub use provider::{CreateError, DispatchResult, Provider};
pub use resources::Resource;
pub use schema::{Attribute, AttributeType, Schema};
pub use state::{AttributeMap, ResourceData};
