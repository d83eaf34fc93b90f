//! netctl: manage network policy resources on a control-plane API
//!
//! The [`resource::Registry`] maps kind names and aliases to descriptors that
//! carry columns and CRUD adapters. Adapters forward to a backing
//! [`client::Client`], either the REST client or the in-memory one.

pub mod api;
pub mod client;
pub mod command;
pub mod config;
pub mod context;
pub mod error;
pub mod output;
pub mod resource;

/// Version injected at compile time via NETCTL_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("NETCTL_VERSION") {
    Some(v) => v,
    None => "dev",
};
