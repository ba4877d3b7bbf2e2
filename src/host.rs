use std::path::{Path, PathBuf};

/// Environment variable the host sets to `1` when running in a native runtime.
pub const NATIVE_RUNTIME_ENV: &str = "IS_NODE_RUNTIME";

/// What the hosting process is able to do on behalf of drivers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostCapabilities {
    /// Whether the host can load and install native driver dependencies.
    pub native_runtime: bool,
    /// Root used to resolve relative file paths from credentials.
    pub workspace_root: Option<PathBuf>,
}

impl HostCapabilities {
    pub fn native() -> Self {
        Self {
            native_runtime: true,
            workspace_root: None,
        }
    }

    pub fn sandboxed() -> Self {
        Self::default()
    }

    /// Reads the native runtime flag from [`NATIVE_RUNTIME_ENV`].
    pub fn from_env() -> Self {
        let native_runtime = std::env::var(NATIVE_RUNTIME_ENV)
            .ok()
            .and_then(|v| v.trim().parse::<i64>().ok())
            == Some(1);
        Self {
            native_runtime,
            workspace_root: None,
        }
    }

    pub fn with_workspace_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.workspace_root = Some(root.into());
        self
    }

    /// Resolves a relative path against the workspace root, if one is known.
    pub fn to_absolute_path(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        match &self.workspace_root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}
