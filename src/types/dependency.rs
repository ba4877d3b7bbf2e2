use std::fmt;

use serde::{Deserialize, Serialize};

/// How a dependency is provided to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    /// An installable package, verified before the driver runs.
    Package,
    /// A runnable script. Declared, never verified.
    Script,
}

/// An external module a driver kind requires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DependencyKind,
    /// Exact version required, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

impl Dependency {
    pub fn new(name: impl Into<String>, kind: DependencyKind, version: Option<&str>) -> Self {
        Self {
            name: name.into(),
            kind,
            version: version.map(str::to_string),
            args: Vec::new(),
        }
    }

    pub fn package(name: impl Into<String>, version: Option<&str>) -> Self {
        Self::new(name, DependencyKind::Package, version)
    }

    pub fn script(name: impl Into<String>, args: &[&str]) -> Self {
        Self {
            args: args.iter().map(|s| s.to_string()).collect(),
            ..Self::new(name, DependencyKind::Script, None)
        }
    }
}

/// What the host has to do to satisfy the declared dependencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallAction {
    Install,
    Upgrade,
}

impl fmt::Display for InstallAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallAction::Install => f.write_str("install"),
            InstallAction::Upgrade => f.write_str("upgrade"),
        }
    }
}
