use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::error::{DriverError, Result};
use crate::traits::{ModuleMetadata, ModuleResolver};

const MANIFEST: &str = "package.json";

/// Resolves installed packages by their `package.json` manifest.
///
/// A module `name` resolves to the first `<root>/<name>` directory holding a
/// manifest, searching the roots in order. Loaded metadata is cached per module.
#[derive(Debug, Default)]
pub struct PackageResolver {
    roots: Vec<PathBuf>,
    cache: Mutex<HashMap<String, ModuleMetadata>>,
}

impl PackageResolver {
    pub fn new(roots: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn not_found(name: &str, reason: impl Into<String>) -> DriverError {
        DriverError::ModuleNotFound {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

impl ModuleResolver for PackageResolver {
    fn resolve(&self, name: &str) -> Result<PathBuf> {
        self.roots
            .iter()
            .map(|root| root.join(name))
            .find(|dir| dir.join(MANIFEST).is_file())
            .ok_or_else(|| {
                let reason = format!("no {MANIFEST} in {} search path(s)", self.roots.len());
                Self::not_found(name, reason)
            })
    }

    fn load(&self, name: &str) -> Result<ModuleMetadata> {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(metadata) = cache.get(name) {
            return Ok(metadata.clone());
        }

        let manifest = self.resolve(name)?.join(MANIFEST);
        let contents = std::fs::read_to_string(&manifest)
            .map_err(|e| Self::not_found(name, format!("{}: {e}", manifest.display())))?;
        let metadata: ModuleMetadata = serde_json::from_str(&contents)
            .map_err(|e| Self::not_found(name, format!("{}: {e}", manifest.display())))?;

        tracing::debug!(module = name, version = %metadata.version, "loaded module metadata");
        cache.insert(name.to_string(), metadata.clone());
        Ok(metadata)
    }

    fn invalidate(&self, name: &str) {
        self.cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(name);
    }
}
