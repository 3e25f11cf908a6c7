//! Robot web service client and data models.
//!
//! This crate exposes strongly typed structures and an asynchronous HTTP client for the
//! Hetzner Robot web service: dedicated servers, boot profiles, firewalls, vSwitches
//! and SSH keys.

#![deny(missing_docs)]

pub mod boot;
pub mod client;
pub mod firewall;
pub mod key;
pub mod models;
pub mod server;
pub mod vswitch;

pub use client::{RobotClient, RobotClientBuilder};
pub use models::{
    BootConfig, BootProfile, Choice, CreateKeyRequest, Firewall, FirewallRequest, FirewallRule,
    FirewallRules, FirewallStatus, LinuxConfig, LinuxRequest, RenameServerRequest, RescueConfig,
    RescueRequest, Server, ServerSubnet, SshKey, VSwitch, VSwitchRequest, VSwitchSummary,
};
pub use server::{parse_server, parse_server_list};

/// Convenient result alias matching the shared Robot error type.
pub type Result<T> = hrobot_core::Result<T>;
