use std::sync::Arc;

use serde_json::Value;
use tracing::{Instrument, Span};

use crate::dependencies;
use crate::drivers::TokioPostgresDriver;
use crate::error::{DriverError, Result};
use crate::host::HostCapabilities;
use crate::resolver::PackageResolver;
use crate::traits::{DatabaseDriver, ModuleResolver};
use crate::types::{
    BaseQueryFilters, Credentials, ExplorerItem, ItemType, QueryOptions, QueryResult, Row,
    ShowRecordsOptions, Statements, TableMetadata,
};

/// Main entry point for the host.
/// Holds one driver instance and exposes the driver contract surface.
pub struct DriverClient {
    driver: Arc<dyn DatabaseDriver>,
    host: HostCapabilities,
    resolver: Arc<dyn ModuleResolver>,
    span: Span,
}

impl DriverClient {
    /// Create a client around a driver, with explicit host capabilities and module resolver.
    pub fn new(
        driver: Arc<dyn DatabaseDriver>,
        host: HostCapabilities,
        resolver: Arc<dyn ModuleResolver>,
    ) -> Self {
        let span = tracing::info_span!(
            "driver",
            kind = %driver.credentials().driver().to_lowercase(),
            id = %driver.id()
        );
        Self {
            driver,
            host,
            resolver,
            span,
        }
    }

    /// Create a new client with a custom driver.
    /// Host capabilities are read from the environment; no module search paths are configured.
    pub fn with_driver(driver: Arc<dyn DatabaseDriver>) -> Self {
        Self::new(
            driver,
            HostCapabilities::from_env(),
            Arc::new(PackageResolver::default()),
        )
    }

    /// Create a client for the built-in driver matching the credentials' kind, and open it.
    ///
    /// # Example
    /// ```ignore
    /// let credentials = Credentials::from_json(settings)?;
    /// let client = DriverClient::connect(credentials, HostCapabilities::from_env()).await?;
    /// ```
    pub async fn connect(credentials: Credentials, host: HostCapabilities) -> Result<Self> {
        let driver: Arc<dyn DatabaseDriver> = match credentials.driver().to_lowercase().as_str() {
            "postgresql" | "postgres" | "pg" => Arc::new(TokioPostgresDriver::new(credentials)),
            other => return Err(DriverError::UnsupportedDriver(other.to_string())),
        };
        let client = Self::new(driver, host, Arc::new(PackageResolver::default()));
        client.open().await?;
        Ok(client)
    }

    pub fn driver(&self) -> &Arc<dyn DatabaseDriver> {
        &self.driver
    }

    pub fn credentials(&self) -> &Credentials {
        self.driver.credentials()
    }

    pub fn id(&self) -> String {
        self.driver.id()
    }

    pub async fn open(&self) -> Result<()> {
        async {
            tracing::debug!("opening connection");
            self.driver.open().await
        }
        .instrument(self.span.clone())
        .await
    }

    pub async fn close(&self) -> Result<()> {
        async {
            tracing::debug!("closing connection");
            self.driver.close().await
        }
        .instrument(self.span.clone())
        .await
    }

    pub async fn query(
        &self,
        statements: impl Into<Statements>,
        opts: &QueryOptions,
    ) -> Result<Vec<QueryResult>> {
        let statements = statements.into();
        async {
            tracing::debug!(statements = statements.len(), "executing query");
            self.driver.query(statements, opts).await
        }
        .instrument(self.span.clone())
        .await
    }

    pub async fn single_query(&self, statement: &str, opts: &QueryOptions) -> Result<QueryResult> {
        self.driver
            .single_query(statement, opts)
            .instrument(self.span.clone())
            .await
    }

    pub async fn query_results(&self, statement: &str, opts: &QueryOptions) -> Result<Vec<Row>> {
        self.driver
            .query_results(statement, opts)
            .instrument(self.span.clone())
            .await
    }

    pub async fn describe_table(
        &self,
        table: &TableMetadata,
        opts: &QueryOptions,
    ) -> Result<Vec<QueryResult>> {
        self.driver
            .describe_table(table, opts)
            .instrument(self.span.clone())
            .await
    }

    pub async fn show_records(
        &self,
        table: &TableMetadata,
        page: ShowRecordsOptions,
        opts: &QueryOptions,
    ) -> Result<Vec<QueryResult>> {
        self.driver
            .show_records(table, page, opts)
            .instrument(self.span.clone())
            .await
    }

    /// Lists the children of an explorer node. Never fails: drivers without an
    /// explorer, and explorer errors, yield an empty list.
    pub async fn get_children_for_item(
        &self,
        item: &ExplorerItem,
        parent: Option<&ExplorerItem>,
    ) -> Vec<ExplorerItem> {
        async {
            let Some(explorer) = self.driver.explorer() else {
                self.warn_not_implemented("get_children_for_item");
                return Vec::new();
            };
            explorer
                .children_for_item(item, parent)
                .await
                .unwrap_or_else(|e| {
                    tracing::warn!(
                        channel = "error",
                        item = %item.label,
                        error = %e,
                        "failed to list explorer children"
                    );
                    Vec::new()
                })
        }
        .instrument(self.span.clone())
        .await
    }

    /// Searches explorer nodes. Never fails, like [`DriverClient::get_children_for_item`].
    pub async fn search_items(
        &self,
        item_type: ItemType,
        search: &str,
        extra: Option<&Value>,
    ) -> Vec<ExplorerItem> {
        async {
            let Some(explorer) = self.driver.explorer() else {
                self.warn_not_implemented("search_items");
                return Vec::new();
            };
            explorer
                .search_items(item_type, search, extra)
                .await
                .unwrap_or_else(|e| {
                    tracing::warn!(
                        channel = "error",
                        search,
                        error = %e,
                        "failed to search explorer items"
                    );
                    Vec::new()
                })
        }
        .instrument(self.span.clone())
        .await
    }

    pub fn get_base_query_filters(&self) -> BaseQueryFilters {
        self.credentials().base_query_filters()
    }

    /// Checks the driver's declared dependencies before it may run in this host.
    pub async fn need_to_install_dependencies(&self) -> Result<bool> {
        async {
            dependencies::need_to_install_dependencies(
                self.driver.dependencies(),
                self.credentials(),
                &self.host,
                self.resolver.as_ref(),
            )
        }
        .instrument(self.span.clone())
        .await
    }

    fn warn_not_implemented(&self, hook: &str) {
        tracing::warn!(
            channel = "error",
            "###### Attention ######\n{} not implemented for {}\n####################",
            hook,
            self.credentials().driver()
        );
    }
}
