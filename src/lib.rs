//! drivercore - the contract every database driver plugin implements for a
//! multi-database tooling host.
//!
//! A concrete driver implements [`DatabaseDriver`]: open/close a single
//! connection and execute statements. Single-result queries, table
//! description and paginated record retrieval are derived from that one
//! `query` primitive. The host talks to drivers only through [`DriverClient`],
//! which also enforces dependency checks and degrades missing explorer support
//! to empty results.
//!
//! # Example
//! ```ignore
//! use drivercore::{Credentials, DriverClient, HostCapabilities, QueryOptions, TableMetadata};
//! use drivercore::types::ShowRecordsOptions;
//!
//! let credentials = Credentials::from_json(r#"{"id":"c1","driver":"PostgreSQL","database":"app"}"#)?;
//! let client = DriverClient::connect(credentials, HostCapabilities::from_env()).await?;
//!
//! let page = client
//!     .show_records(
//!         &TableMetadata::new("users").with_schema("public"),
//!         ShowRecordsOptions::new(50).page(2),
//!         &QueryOptions::default(),
//!     )
//!     .await?;
//! println!("{} of {:?} rows", page[0].len(), page[0].total);
//! ```

pub mod builders;
pub mod dependencies;
pub mod drivers;
pub mod error;
pub mod host;
pub mod resolver;
pub mod traits;
pub mod types;

mod client;

// Re-export main types for convenient access
pub use client::DriverClient;
pub use error::{DriverError, RawError, Result};
pub use host::HostCapabilities;
pub use resolver::PackageResolver;
pub use traits::{DatabaseDriver, ModuleResolver, QueryGenerator, SchemaExplorer, StatementTemplate};
pub use types::{
    Credentials, ExplorerItem, ItemType, QueryOptions, QueryResult, Row, Statements, TableMetadata,
};
