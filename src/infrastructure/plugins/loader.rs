//! Plugin loader - imports registration units from shared libraries
//!
//! The plugin root is walked recursively; every shared library found is a
//! unit, named after its file stem, and imported exactly once. Units built
//! under the same name in different directories are skipped after the
//! first. Any unit that fails to import aborts startup.

use std::path::{Path, PathBuf};

use libloading::{Library, Symbol};

use crate::application::errors::RegistryError;
use crate::application::registry::Registrar;

/// Symbol every dynamic unit must export.
pub const PLUGIN_ENTRY: &[u8] = b"warden_plugin_register\0";

/// Entry point signature. Appends registrations to the registrar and
/// returns zero on success. Units must be built against the same crate
/// version as the host binary.
pub type PluginRegisterFn = unsafe extern "C" fn(registrar: *mut Registrar) -> i32;

/// A shared library found under the plugin root
#[derive(Debug, Clone)]
pub struct DiscoveredUnit {
    pub name: String,
    pub path: PathBuf,
}

/// Plugin loader
pub struct PluginLoader {
    root: PathBuf,
    // Keeps each imported library alive as long as its registrations.
    libraries: Vec<Library>,
}

impl PluginLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            libraries: Vec::new(),
        }
    }

    /// Walks the plugin root and names each unit after its file stem.
    pub fn discover(&self) -> Result<Vec<DiscoveredUnit>, RegistryError> {
        if !self.root.exists() {
            tracing::warn!("Plugin directory does not exist: {}", self.root.display());
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        walk(&self.root, &mut files).map_err(|e| RegistryError::Load {
            unit: self.root.display().to_string(),
            reason: format!("failed to walk plugin directory: {}", e),
        })?;

        let mut units: Vec<DiscoveredUnit> = Vec::new();
        for path in files {
            let name = match unit_name(&path) {
                Some(name) => name,
                None => continue,
            };
            if let Some(existing) = units.iter().find(|u| u.name == name) {
                tracing::warn!(
                    "Skipping {}: unit '{}' already found at {}",
                    path.display(),
                    name,
                    existing.path.display()
                );
                continue;
            }
            units.push(DiscoveredUnit { name, path });
        }
        Ok(units)
    }

    /// Imports every discovered unit, running its entry point against the
    /// registrar. Returns the number of units imported.
    pub fn load_into(&mut self, registrar: &mut Registrar) -> Result<usize, RegistryError> {
        let units = self.discover()?;
        let count = units.len();
        for unit in &units {
            self.load_unit(unit, registrar)?;
        }
        Ok(count)
    }

    fn load_unit(
        &mut self,
        unit: &DiscoveredUnit,
        registrar: &mut Registrar,
    ) -> Result<(), RegistryError> {
        let library = unsafe {
            Library::new(&unit.path).map_err(|e| RegistryError::Load {
                unit: unit.name.clone(),
                reason: format!("failed to load library: {}", e),
            })?
        };

        let status = {
            let entry: Symbol<PluginRegisterFn> = unsafe {
                library.get(PLUGIN_ENTRY).map_err(|e| RegistryError::Load {
                    unit: unit.name.clone(),
                    reason: format!("entry point not found: {}", e),
                })?
            };
            unsafe { entry(registrar as *mut Registrar) }
        };
        if status != 0 {
            return Err(RegistryError::Load {
                unit: unit.name.clone(),
                reason: format!("entry point returned {}", status),
            });
        }

        tracing::info!("Imported plugin unit '{}' from {}", unit.name, unit.path.display());
        self.libraries.push(library);
        Ok(())
    }
}

/// Collects shared library files below `dir`, in a stable order.
fn walk(dir: &Path, found: &mut Vec<PathBuf>) -> std::io::Result<()> {
    let mut entries = std::fs::read_dir(dir)?.collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(|entry| entry.path());
    for entry in entries {
        let path = entry.path();
        if path.is_dir() {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.starts_with('.') {
                    continue;
                }
            }
            walk(&path, found)?;
        } else if path.extension().and_then(|e| e.to_str())
            == Some(std::env::consts::DLL_EXTENSION)
        {
            found.push(path);
        }
    }
    Ok(())
}

fn unit_name(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    Some(stem.strip_prefix("lib").unwrap_or(stem).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn dll(name: &str) -> String {
        format!("{}.{}", name, std::env::consts::DLL_EXTENSION)
    }

    #[test]
    fn discovers_units_recursively_and_once() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        fs::write(root.join(dll("ping")), b"").expect("write");
        fs::create_dir_all(root.join("moderation/deep")).expect("mkdir");
        fs::write(root.join("moderation/deep").join(dll("cleanup")), b"").expect("write");
        // Same unit name in another directory: only one import.
        fs::write(root.join("moderation").join(dll("ping")), b"").expect("write");
        fs::write(root.join("README.md"), b"docs").expect("write");

        let units = PluginLoader::new(root).discover().expect("discovers");

        let mut names: Vec<&str> = units.iter().map(|u| u.name.as_str()).collect();
        names.sort();
        assert_eq!(names, ["cleanup", "ping"]);
    }

    #[test]
    fn missing_root_yields_no_units() {
        let dir = tempfile::tempdir().expect("tempdir");
        let loader = PluginLoader::new(dir.path().join("nope"));
        assert!(loader.discover().expect("empty").is_empty());
    }

    #[test]
    fn hidden_directories_are_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        fs::create_dir_all(root.join(".cache")).expect("mkdir");
        fs::write(root.join(".cache").join(dll("ghost")), b"").expect("write");

        let units = PluginLoader::new(root).discover().expect("discovers");
        assert!(units.is_empty());
    }

    #[test]
    fn library_prefix_is_stripped_from_unit_names() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        fs::write(root.join(dll("libgreet")), b"").expect("write");

        let units = PluginLoader::new(root).discover().expect("discovers");
        assert_eq!(units[0].name, "greet");
    }

    #[test]
    fn importing_a_broken_unit_is_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        fs::write(root.join(dll("broken")), b"not a shared library").expect("write");

        let mut registrar = Registrar::new();
        let err = PluginLoader::new(root)
            .load_into(&mut registrar)
            .unwrap_err();
        assert!(matches!(err, RegistryError::Load { .. }));
    }
}
