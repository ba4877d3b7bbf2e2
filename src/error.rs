use std::sync::Arc;

use thiserror::Error;

use crate::types::{Credentials, Dependency, InstallAction};

/// An opaque, driver-specific error carried inside a query result.
pub type RawError = Arc<dyn std::error::Error + Send + Sync>;

/// Error type for driver operations
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// A statement error re-raised from a query result.
    #[error(transparent)]
    QueryFailed(RawError),

    #[error("Expected {expected} row(s), got {actual}")]
    UnexpectedRowCount { expected: usize, actual: usize },

    #[error("Driver returned no result for statement: {0}")]
    NoResult(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Query generator does not support {0}")]
    UnsupportedQuery(&'static str),

    #[error("Count query did not return a numeric total: {0}")]
    InvalidTotal(String),

    #[error("Page {page} with page size {limit} is out of range")]
    InvalidPage { page: u64, limit: u64 },

    #[error("Dependencies can only be installed when running in a native runtime host")]
    UnsupportedHost,

    #[error(
        "Connection {} needs to {action} dependencies: {}",
        .credentials.connection_id(),
        dependency_names(.dependencies)
    )]
    MissingDependencies {
        dependencies: Vec<Dependency>,
        credentials: Box<Credentials>,
        action: InstallAction,
    },

    #[error("Module {name} could not be resolved: {reason}")]
    ModuleNotFound { name: String, reason: String },

    #[error("No driver available for {0}")]
    UnsupportedDriver(String),

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),
}

impl DriverError {
    /// Wraps any error as the raw error of a failed statement.
    pub fn query<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        DriverError::QueryFailed(Arc::new(err))
    }
}

/// Builds a raw error from a plain message.
pub fn message_error(message: impl Into<String>) -> RawError {
    Arc::from(Box::<dyn std::error::Error + Send + Sync>::from(message.into()))
}

fn dependency_names(dependencies: &[Dependency]) -> String {
    dependencies
        .iter()
        .map(|dep| match &dep.version {
            Some(version) => format!("{}@{}", dep.name, version),
            None => dep.name.clone(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type alias for driver operations
pub type Result<T> = std::result::Result<T, DriverError>;
