use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio_postgres::{Client, Config, NoTls, SimpleQueryMessage};

use crate::builders::{AnsiQueries, SelectBuilder};
use crate::drivers::ConnectionSlot;
use crate::error::{DriverError, Result};
use crate::traits::{DatabaseDriver, QueryGenerator, SchemaExplorer};
use crate::types::{
    quote_literal, Credentials, Dependency, ExplorerItem, ItemType, QueryOptions, QueryResult, Row,
    Statements,
};

const DEFAULT_SEARCH_LIMIT: u64 = 100;

/// PostgreSQL driver implementation using tokio-postgres.
pub struct TokioPostgresDriver {
    credentials: Credentials,
    queries: AnsiQueries,
    dependencies: Vec<Dependency>,
    connection: ConnectionSlot<Client>,
}

impl TokioPostgresDriver {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            queries: AnsiQueries::new(),
            dependencies: Vec::new(),
            connection: ConnectionSlot::new(),
        }
    }

    /// Declare host-side packages this connection needs.
    pub fn with_dependencies(mut self, dependencies: Vec<Dependency>) -> Self {
        self.dependencies = dependencies;
        self
    }

    /// Builds the connection config from credentials.
    /// A `connectionString` option takes precedence over the individual fields.
    pub fn config(&self) -> Result<Config> {
        let credentials = &self.credentials;
        if let Some(connection_string) = credentials.option_str("connectionString") {
            return connection_string
                .parse::<Config>()
                .map_err(|e| DriverError::ConnectionFailed(e.to_string()));
        }

        let mut config = Config::new();
        config.host(credentials.server().unwrap_or("localhost"));
        if let Some(port) = credentials.port() {
            config.port(port);
        }
        if let Some(user) = credentials.username() {
            config.user(user);
        }
        if let Some(password) = credentials.option_str("password") {
            config.password(password);
        }
        if !credentials.database().is_empty() {
            config.dbname(credentials.database());
        }
        if let Some(seconds) = credentials
            .options()
            .get("connectionTimeout")
            .and_then(Value::as_u64)
        {
            config.connect_timeout(Duration::from_secs(seconds));
        }
        Ok(config)
    }

    async fn client(&self) -> Result<Arc<Client>> {
        self.connection
            .get_or_open(|| async {
                let config = self.config()?;
                let (client, connection) = config
                    .connect(NoTls)
                    .await
                    .map_err(|e| DriverError::ConnectionFailed(e.to_string()))?;

                // Spawn the connection handler
                let id = self.id();
                tokio::spawn(async move {
                    if let Err(e) = connection.await {
                        tracing::error!(
                            connection = %id,
                            error = %e,
                            "PostgreSQL connection error"
                        );
                    }
                });

                tracing::debug!(connection = %self.id(), "PostgreSQL connection established");
                Ok(client)
            })
            .await
    }

    async fn labels(&self, sql: &str) -> Result<Vec<Row>> {
        self.query_results(sql, &QueryOptions::default()).await
    }
}

#[async_trait]
impl DatabaseDriver for TokioPostgresDriver {
    fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    fn queries(&self) -> &dyn QueryGenerator {
        &self.queries
    }

    fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    fn explorer(&self) -> Option<&dyn SchemaExplorer> {
        Some(self as &dyn SchemaExplorer)
    }

    async fn open(&self) -> Result<()> {
        self.client().await.map(|_| ())
    }

    async fn close(&self) -> Result<()> {
        // Dropping the last client handle terminates the connection task.
        if self.connection.take().await.is_some() {
            tracing::debug!(connection = %self.id(), "PostgreSQL connection closed");
        }
        Ok(())
    }

    async fn query(&self, statements: Statements, opts: &QueryOptions) -> Result<Vec<QueryResult>> {
        let client = self.client().await?;
        let mut results = Vec::with_capacity(statements.len());

        for sql in statements.iter() {
            let result = match client.simple_query(sql).await {
                Ok(messages) => simple_query_result(self.id(), sql, messages),
                Err(e) => QueryResult::failure(self.id(), sql, Arc::new(e)),
            };
            results.push(result.with_options(opts));
        }

        Ok(results)
    }
}

#[async_trait]
impl SchemaExplorer for TokioPostgresDriver {
    async fn children_for_item(
        &self,
        item: &ExplorerItem,
        _parent: Option<&ExplorerItem>,
    ) -> Result<Vec<ExplorerItem>> {
        match item.item_type {
            ItemType::Connection | ItemType::ConnectedConnection => {
                let sql = SelectBuilder::from("pg_catalog.pg_database")
                    .columns(&["datname AS label"])
                    .where_("datallowconn AND NOT datistemplate")
                    .order_by("datname")
                    .build();
                let filter = self.credentials.base_query_filters().database_filter;
                let rows = self.labels(&sql).await?;
                Ok(labels_of(&rows)?
                    .into_iter()
                    .filter(|name| filter.allows(name))
                    .map(|name| {
                        ExplorerItem::new(name.clone(), ItemType::Database)
                            .with_database(name)
                            .with_child_type(ItemType::Schema)
                            .with_icon("database")
                    })
                    .collect())
            }
            ItemType::Database => {
                let database = item.database.as_deref().unwrap_or(&item.label);
                let sql = SelectBuilder::from("information_schema.schemata")
                    .columns(&["schema_name AS label"])
                    .where_(format!("catalog_name = {}", quote_literal(database)))
                    .where_("schema_name !~ '^pg_'")
                    .where_("schema_name <> 'information_schema'")
                    .order_by("schema_name")
                    .build();
                let rows = self.labels(&sql).await?;
                Ok(labels_of(&rows)?
                    .into_iter()
                    .map(|name| {
                        ExplorerItem::new(name.clone(), ItemType::Schema)
                            .with_database(database)
                            .with_schema(name)
                            .with_icon("group-by-ref-type")
                    })
                    .collect())
            }
            ItemType::Schema => {
                let group = |label: &str, child_type: ItemType| {
                    let mut group = ExplorerItem::new(label, ItemType::ResourceGroup)
                        .with_child_type(child_type)
                        .with_schema(item.schema.clone().unwrap_or_else(|| item.label.clone()));
                    group.database = item.database.clone();
                    group
                };
                Ok(vec![
                    group("Tables", ItemType::Table),
                    group("Views", ItemType::View),
                ])
            }
            ItemType::ResourceGroup => {
                let (table_type, child_type) = match item.child_type {
                    Some(ItemType::Table) => ("BASE TABLE", ItemType::Table),
                    Some(ItemType::View) => ("VIEW", ItemType::View),
                    _ => return Ok(Vec::new()),
                };
                let schema = item.schema.as_deref().unwrap_or("public");
                let sql = SelectBuilder::from("information_schema.tables")
                    .columns(&["table_name AS label"])
                    .where_(format!("table_schema = {}", quote_literal(schema)))
                    .where_(format!("table_type = {}", quote_literal(table_type)))
                    .order_by("table_name")
                    .build();
                let rows = self.labels(&sql).await?;
                Ok(labels_of(&rows)?
                    .into_iter()
                    .map(|name| {
                        let mut table = ExplorerItem::new(name.clone(), child_type)
                            .with_schema(schema)
                            .with_table(name);
                        table.database = item.database.clone();
                        table
                    })
                    .collect())
            }
            ItemType::Table | ItemType::View | ItemType::MaterializedView => {
                let table = item.table.as_deref().unwrap_or(&item.label);
                let mut select = SelectBuilder::from("information_schema.columns")
                    .columns(&["column_name AS label", "data_type AS detail"])
                    .where_(format!("table_name = {}", quote_literal(table)));
                if let Some(schema) = &item.schema {
                    select = select.where_(format!("table_schema = {}", quote_literal(schema)));
                }
                let rows = self.labels(&select.order_by("ordinal_position").build()).await?;
                rows.iter()
                    .map(|row| -> Result<ExplorerItem> {
                        let mut column = ExplorerItem::new(text(row, "label")?, ItemType::Column)
                            .with_table(table)
                            .with_detail(text(row, "detail")?);
                        column.schema = item.schema.clone();
                        column.database = item.database.clone();
                        Ok(column)
                    })
                    .collect()
            }
            _ => Ok(Vec::new()),
        }
    }

    async fn search_items(
        &self,
        item_type: ItemType,
        search: &str,
        extra: Option<&Value>,
    ) -> Result<Vec<ExplorerItem>> {
        let limit = extra
            .and_then(|e| e.get("limit"))
            .and_then(Value::as_u64)
            .unwrap_or(DEFAULT_SEARCH_LIMIT);
        let pattern = quote_literal(&format!("%{search}%"));

        match item_type {
            ItemType::Table | ItemType::View => {
                let table_type = if item_type == ItemType::View { "VIEW" } else { "BASE TABLE" };
                let sql = SelectBuilder::from("information_schema.tables")
                    .columns(&["table_schema AS schema", "table_name AS label"])
                    .where_(format!("table_name ILIKE {pattern}"))
                    .where_(format!("table_type = {}", quote_literal(table_type)))
                    .where_("table_schema NOT IN ('pg_catalog', 'information_schema')")
                    .order_by("table_name")
                    .limit(Some(limit))
                    .build();
                let rows = self.labels(&sql).await?;
                rows.iter()
                    .map(|row| -> Result<ExplorerItem> {
                        let label = text(row, "label")?;
                        Ok(ExplorerItem::new(label.clone(), item_type)
                            .with_schema(text(row, "schema")?)
                            .with_table(label))
                    })
                    .collect()
            }
            ItemType::Column => {
                let mut select = SelectBuilder::from("information_schema.columns")
                    .columns(&[
                        "table_schema AS schema",
                        "table_name AS table",
                        "column_name AS label",
                        "data_type AS detail",
                    ])
                    .where_(format!("column_name ILIKE {pattern}"))
                    .where_("table_schema NOT IN ('pg_catalog', 'information_schema')");
                if let Some(table) = extra.and_then(|e| e.get("table")).and_then(Value::as_str) {
                    select = select.where_(format!("table_name = {}", quote_literal(table)));
                }
                let sql = select
                    .order_by("table_name")
                    .order_by("ordinal_position")
                    .limit(Some(limit))
                    .build();
                let rows = self.labels(&sql).await?;
                rows.iter()
                    .map(|row| -> Result<ExplorerItem> {
                        Ok(ExplorerItem::new(text(row, "label")?, ItemType::Column)
                            .with_schema(text(row, "schema")?)
                            .with_table(text(row, "table")?)
                            .with_detail(text(row, "detail")?))
                    })
                    .collect()
            }
            _ => Ok(Vec::new()),
        }
    }
}

/// Converts simple-query messages of one statement into a result.
fn simple_query_result(
    connection_id: String,
    sql: &str,
    messages: Vec<SimpleQueryMessage>,
) -> QueryResult {
    let mut output = StatementOutput::default();
    for message in messages {
        match message {
            SimpleQueryMessage::RowDescription(columns) => {
                output.describe(columns.iter().map(|c| c.name().to_string()).collect());
            }
            SimpleQueryMessage::Row(row) => {
                if output.columns.is_empty() {
                    output.describe(row.columns().iter().map(|c| c.name().to_string()).collect());
                }
                output.push_row(
                    (0..row.len())
                        .map(|i| row.get(i).map_or(Value::Null, Value::from))
                        .collect(),
                );
            }
            SimpleQueryMessage::CommandComplete(n) => output.affected = Some(n),
            _ => {}
        }
    }
    output.finish(connection_id, sql)
}

/// Columns, rows and affected count collected for one statement.
#[derive(Default)]
struct StatementOutput {
    columns: Vec<String>,
    rows: Vec<Row>,
    affected: Option<u64>,
}

impl StatementOutput {
    fn describe(&mut self, columns: Vec<String>) {
        self.columns = columns;
    }

    fn push_row(&mut self, values: Vec<Value>) {
        self.rows.push(Row::new(&self.columns, values));
    }

    fn finish(self, connection_id: String, sql: &str) -> QueryResult {
        let result = QueryResult::success(connection_id, sql, self.columns, self.rows);
        match self.affected {
            Some(n) if result.is_empty() && result.cols.is_empty() => {
                result.with_message(format!("Query ok with {n} rows affected"))
            }
            _ => result,
        }
    }
}

/// Reads a column as text; NULL becomes an empty string.
fn text(row: &Row, column: &str) -> Result<String> {
    Ok(match row.get(column)? {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn labels_of(rows: &[Row]) -> Result<Vec<String>> {
    rows.iter().map(|row| text(row, "label")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_fields() {
        let credentials = Credentials::new("c1", "PostgreSQL", "app")
            .with_server("db.internal", Some(6543))
            .with_username("reader")
            .with_option("password", "secret")
            .with_option("connectionTimeout", 3);
        let config = TokioPostgresDriver::new(credentials).config().unwrap();

        assert_eq!(config.get_ports(), &[6543]);
        assert_eq!(config.get_user(), Some("reader"));
        assert_eq!(config.get_dbname(), Some("app"));
        assert_eq!(config.get_password(), Some(&b"secret"[..]));
        assert_eq!(config.get_connect_timeout(), Some(&Duration::from_secs(3)));
    }

    #[test]
    fn test_config_from_connection_string() {
        let credentials = Credentials::new("c1", "PostgreSQL", "ignored")
            .with_option("connectionString", "postgres://admin@localhost:5433/warehouse");
        let config = TokioPostgresDriver::new(credentials).config().unwrap();
        assert_eq!(config.get_dbname(), Some("warehouse"));
        assert_eq!(config.get_ports(), &[5433]);
    }

    #[test]
    fn test_invalid_connection_string() {
        let credentials = Credentials::new("c1", "PostgreSQL", "app")
            .with_option("connectionString", "postgres://localhost:notaport/app");
        let err = TokioPostgresDriver::new(credentials).config().unwrap_err();
        assert!(matches!(err, DriverError::ConnectionFailed(_)));
    }

    #[test]
    fn test_text_coerces_values() {
        let columns = vec!["label".to_string(), "n".to_string(), "missing".to_string()];
        let row = Row::new(&columns, vec![Value::from("users"), Value::from(3), Value::Null]);
        assert_eq!(text(&row, "label").unwrap(), "users");
        assert_eq!(text(&row, "n").unwrap(), "3");
        assert_eq!(text(&row, "missing").unwrap(), "");
        assert!(text(&row, "nope").is_err());
    }

    #[test]
    fn test_empty_select_keeps_described_columns() {
        let mut output = StatementOutput::default();
        output.describe(vec!["id".to_string(), "name".to_string()]);
        output.affected = Some(0);
        let result = output.finish("c1".to_string(), "SELECT id, name FROM users WHERE false");

        assert_eq!(result.cols, vec!["id", "name"]);
        assert!(result.is_empty());
        assert!(result.messages.is_empty());
    }

    #[test]
    fn test_command_reports_affected_rows() {
        let mut output = StatementOutput::default();
        output.affected = Some(3);
        let result = output.finish("c1".to_string(), "DELETE FROM users");

        assert!(result.cols.is_empty());
        assert_eq!(result.messages[0].message, "Query ok with 3 rows affected");
    }

    #[test]
    fn test_rows_follow_described_columns() {
        let mut output = StatementOutput::default();
        output.describe(vec!["b".to_string(), "a".to_string()]);
        output.push_row(vec![Value::from("2"), Value::from("1")]);
        let result = output.finish("c1".to_string(), "SELECT 2 AS b, 1 AS a");

        assert_eq!(result.results[0].columns(), vec!["b", "a"]);
        assert_eq!(result.results[0].get("a").unwrap(), "1");
    }

    #[tokio::test]
    async fn test_close_without_open_is_noop() {
        let driver = TokioPostgresDriver::new(Credentials::new("c1", "PostgreSQL", "app"));
        driver.close().await.unwrap();
        driver.close().await.unwrap();
    }
}
