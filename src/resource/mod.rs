//! Resource abstraction layer
//!
//! This module maps resource kinds to the metadata and operations the CLI
//! needs to manage them.
//!
//! # Architecture
//!
//! - [`registry`] - Alias table built once at startup, read-only afterwards
//! - [`descriptor`] - Per-kind bundle of columns and CRUD adapters
//! - [`column`] - Typed column extraction with a placeholder for absent values
//! - [`decode`] - Turns YAML/JSON documents into resources
//! - `kinds` - The built-in registrations
//!
//! # Example
//!
//! ```ignore
//! use netctl::resource::Registry;
//! use netctl::client::MemoryClient;
//! use netctl::context::Context;
//!
//! async fn list_configs(client: &MemoryClient) -> netctl::error::Result<usize> {
//!     let registry = Registry::with_defaults();
//!     let descriptor = registry.lookup("bgpconfig")?;
//!     let list = descriptor
//!         .list(&Context::new(), client, descriptor.new_object("", None))
//!         .await?;
//!     Ok(list.len())
//! }
//! ```

pub mod column;
pub mod decode;
pub mod descriptor;
mod kinds;
pub mod registry;

pub use column::{ColumnSet, PLACEHOLDER};
pub use decode::parse_documents;
pub use descriptor::ResourceDescriptor;
pub use registry::{Registration, Registry, RegistryBuilder};
