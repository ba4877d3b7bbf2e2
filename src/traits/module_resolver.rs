use std::path::PathBuf;

use serde::Deserialize;

use crate::error::Result;

/// Name and version declared by an installed module.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModuleMetadata {
    pub name: String,
    pub version: String,
}

/// Locates and loads installed modules on behalf of drivers.
pub trait ModuleResolver: Send + Sync {
    /// Returns the path of the installed module.
    fn resolve(&self, name: &str) -> Result<PathBuf>;

    /// Loads the module metadata, possibly from a cache.
    fn load(&self, name: &str) -> Result<ModuleMetadata>;

    /// Drops any cached resolution for `name`.
    fn invalidate(&self, name: &str);

    /// Forces re-detection of the module.
    fn reload(&self, name: &str) -> Result<ModuleMetadata> {
        self.invalidate(name);
        self.load(name)
    }
}
