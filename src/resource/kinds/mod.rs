//! Built-in kind registrations
//!
//! One module per kind, each exposing a `registration()`.

mod bgp_configuration;
mod bgp_peer;

use super::registry::RegistryBuilder;
use crate::error::Result;

/// Register every built-in kind
pub fn register_all(builder: &mut RegistryBuilder) -> Result<()> {
    builder
        .register(bgp_configuration::registration())?
        .register(bgp_peer::registration())?;
    Ok(())
}
