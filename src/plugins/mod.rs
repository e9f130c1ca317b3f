//! Built-in plugin units
//!
//! Each unit contributes its registrations through a `register` function
//! during the load phase, the same entry-point shape dynamic units use.
//! A unit failing to register aborts startup.

pub mod about;
pub mod cleanup;
pub mod ping;
pub mod tags;

use crate::application::errors::RegistryError;
use crate::application::registry::Registrar;

/// A statically linked registration unit
pub struct PluginUnit {
    pub name: &'static str,
    pub register: fn(&mut Registrar) -> Result<(), RegistryError>,
}

/// Every unit compiled into the binary, in load order.
pub fn builtin() -> Vec<PluginUnit> {
    vec![
        PluginUnit {
            name: "ping",
            register: ping::register,
        },
        PluginUnit {
            name: "about",
            register: about::register,
        },
        PluginUnit {
            name: "tags",
            register: tags::register,
        },
        PluginUnit {
            name: "cleanup",
            register: cleanup::register,
        },
    ]
}

/// Runs every built-in unit against the registrar.
pub fn register_builtin(registrar: &mut Registrar) -> Result<(), RegistryError> {
    for unit in builtin() {
        (unit.register)(registrar).map_err(|e| RegistryError::Load {
            unit: unit.name.to_string(),
            reason: e.to_string(),
        })?;
        tracing::debug!("Loaded built-in unit '{}'", unit.name);
    }
    Ok(())
}
