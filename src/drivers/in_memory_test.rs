use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::builders::AnsiQueries;
use crate::drivers::ConnectionSlot;
use crate::error::{message_error, DriverError, Result};
use crate::traits::{DatabaseDriver, QueryGenerator, SchemaExplorer};
use crate::types::{
    Credentials, Dependency, ExplorerItem, ItemType, QueryOptions, QueryResult, Row, Statements,
};

/// A recorded statement execution for verification.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedQuery {
    pub sql: String,
    pub request_id: Option<String>,
}

/// A scripted statement outcome.
#[derive(Debug, Clone, Default)]
pub struct TestResponse {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    /// When set, the statement fails with this message.
    pub error: Option<String>,
}

impl TestResponse {
    pub fn empty() -> Self {
        Self::default()
    }

    fn into_result(self, connection_id: String, sql: &str) -> QueryResult {
        match self.error {
            Some(message) => QueryResult::failure(connection_id, sql, message_error(message)),
            None => {
                let rows = self
                    .rows
                    .into_iter()
                    .map(|values| Row::new(&self.columns, values))
                    .collect();
                QueryResult::success(connection_id, sql, self.columns, rows)
            }
        }
    }
}

/// An in-memory database driver for testing.
///
/// Allows configuring expected responses and verifying executed statements.
///
/// # Example
/// ```
/// use drivercore::drivers::{InMemoryTestDriver, InMemoryTestResponseBuilder};
/// use drivercore::types::Credentials;
///
/// let driver = InMemoryTestDriver::new(Credentials::new("c1", "Test", "db1")).with_response(
///     InMemoryTestResponseBuilder::new()
///         .columns(&["id", "name"])
///         .row(&["1", "Alice"])
///         .build(),
/// );
/// ```
pub struct InMemoryTestDriver {
    credentials: Credentials,
    queries: Box<dyn QueryGenerator>,
    dependencies: Vec<Dependency>,
    responses: Mutex<VecDeque<TestResponse>>,
    statement_responses: Mutex<HashMap<String, TestResponse>>,
    recorded_queries: Mutex<Vec<RecordedQuery>>,
    default_response: TestResponse,
    connection: ConnectionSlot<usize>,
    open_error: Option<String>,
    lost_on: HashMap<String, String>,
    opens: AtomicUsize,
    closes: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    explorer_items: Option<HashMap<String, Vec<ExplorerItem>>>,
}

impl InMemoryTestDriver {
    /// Create a new in-memory test driver with no pre-configured responses.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            queries: Box::new(AnsiQueries::new()),
            dependencies: Vec::new(),
            responses: Mutex::new(VecDeque::new()),
            statement_responses: Mutex::new(HashMap::new()),
            recorded_queries: Mutex::new(Vec::new()),
            default_response: TestResponse::empty(),
            connection: ConnectionSlot::new(),
            open_error: None,
            lost_on: HashMap::new(),
            opens: AtomicUsize::new(0),
            closes: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            explorer_items: None,
        }
    }

    /// Replace the query generator.
    pub fn with_queries(mut self, queries: impl QueryGenerator + 'static) -> Self {
        self.queries = Box::new(queries);
        self
    }

    pub fn with_dependencies(mut self, dependencies: Vec<Dependency>) -> Self {
        self.dependencies = dependencies;
        self
    }

    /// Add a response to be returned by the next statement.
    /// Responses are returned in FIFO order.
    pub fn with_response(self, response: TestResponse) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    /// Add multiple responses to be returned by subsequent statements.
    pub fn with_responses(self, responses: impl IntoIterator<Item = TestResponse>) -> Self {
        let mut queue = self.responses.lock().unwrap();
        for response in responses {
            queue.push_back(response);
        }
        drop(queue);
        self
    }

    /// Always answer `sql` with `response`, ahead of the FIFO queue.
    pub fn with_statement_response(self, sql: impl Into<String>, response: TestResponse) -> Self {
        self.statement_responses
            .lock()
            .unwrap()
            .insert(sql.into(), response);
        self
    }

    /// Set a default response to use when no queued responses remain.
    pub fn with_default_response(mut self, response: TestResponse) -> Self {
        self.default_response = response;
        self
    }

    /// Make every `open` fail with a connection error.
    pub fn with_open_error(mut self, message: impl Into<String>) -> Self {
        self.open_error = Some(message.into());
        self
    }

    /// Make `query` itself fail with a connection error when it reaches `sql`.
    pub fn with_connection_lost_on(
        mut self,
        sql: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        self.lost_on.insert(sql.into(), message.into());
        self
    }

    /// Enable the schema explorer, listing `children` under the node labelled `parent`.
    pub fn with_children(mut self, parent: impl Into<String>, children: Vec<ExplorerItem>) -> Self {
        self.explorer_items
            .get_or_insert_with(HashMap::new)
            .insert(parent.into(), children);
        self
    }

    /// Get all recorded statements that have been executed.
    pub fn recorded_queries(&self) -> Vec<RecordedQuery> {
        self.recorded_queries.lock().unwrap().clone()
    }

    /// Get the last recorded statement, if any.
    pub fn last_query(&self) -> Option<RecordedQuery> {
        self.recorded_queries.lock().unwrap().last().cloned()
    }

    /// Number of connections actually opened.
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    /// Number of live connections released.
    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    /// Highest number of statements that were executing at the same time.
    pub fn max_concurrent_statements(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub async fn is_open(&self) -> bool {
        self.connection.is_open().await
    }

    /// Assert that the last statement matches the expected SQL.
    pub fn assert_last_query(&self, expected_sql: &str) {
        let last = self.last_query().expect("No queries were recorded");
        assert_eq!(
            last.sql, expected_sql,
            "SQL mismatch.\nExpected: {}\nActual: {}",
            expected_sql, last.sql
        );
    }

    /// Assert that exactly n statements were executed.
    pub fn assert_query_count(&self, expected: usize) {
        let actual = self.recorded_queries.lock().unwrap().len();
        assert_eq!(
            actual, expected,
            "Query count mismatch. Expected: {}, Actual: {}",
            expected, actual
        );
    }

    fn next_response(&self, sql: &str) -> TestResponse {
        if let Some(response) = self.statement_responses.lock().unwrap().get(sql) {
            return response.clone();
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.default_response.clone())
    }
}

#[async_trait]
impl DatabaseDriver for InMemoryTestDriver {
    fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    fn queries(&self) -> &dyn QueryGenerator {
        self.queries.as_ref()
    }

    fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    fn explorer(&self) -> Option<&dyn SchemaExplorer> {
        self.explorer_items.as_ref().map(|_| self as &dyn SchemaExplorer)
    }

    async fn open(&self) -> Result<()> {
        self.connection
            .get_or_open(|| async {
                tokio::task::yield_now().await;
                if let Some(message) = &self.open_error {
                    return Err(DriverError::ConnectionFailed(message.clone()));
                }
                Ok(self.opens.fetch_add(1, Ordering::SeqCst) + 1)
            })
            .await?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        if self.connection.take().await.is_some() {
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }

    async fn query(&self, statements: Statements, opts: &QueryOptions) -> Result<Vec<QueryResult>> {
        self.open().await?;

        let mut results = Vec::with_capacity(statements.len());
        for sql in statements.iter() {
            self.recorded_queries.lock().unwrap().push(RecordedQuery {
                sql: sql.to_string(),
                request_id: opts.request_id.clone(),
            });

            let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(running, Ordering::SeqCst);
            tokio::task::yield_now().await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if let Some(message) = self.lost_on.get(sql) {
                return Err(DriverError::ConnectionFailed(message.clone()));
            }
            results.push(
                self.next_response(sql)
                    .into_result(self.id(), sql)
                    .with_options(opts),
            );
        }
        Ok(results)
    }
}

#[async_trait]
impl SchemaExplorer for InMemoryTestDriver {
    async fn children_for_item(
        &self,
        item: &ExplorerItem,
        _parent: Option<&ExplorerItem>,
    ) -> Result<Vec<ExplorerItem>> {
        Ok(self
            .explorer_items
            .as_ref()
            .and_then(|items| items.get(&item.label))
            .cloned()
            .unwrap_or_default())
    }

    async fn search_items(
        &self,
        item_type: ItemType,
        search: &str,
        _extra: Option<&Value>,
    ) -> Result<Vec<ExplorerItem>> {
        let search = search.to_lowercase();
        Ok(self
            .explorer_items
            .iter()
            .flat_map(|items| items.values().flatten())
            .filter(|item| {
                item.item_type == item_type && item.label.to_lowercase().contains(&search)
            })
            .cloned()
            .collect())
    }
}

/// Builder for creating test responses easily.
pub struct InMemoryTestResponseBuilder {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
    error: Option<String>,
}

impl InMemoryTestResponseBuilder {
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            error: None,
        }
    }

    /// Set the column names for the response.
    pub fn columns(mut self, cols: &[&str]) -> Self {
        self.columns = cols.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Add a row of string values.
    pub fn row(mut self, values: &[&str]) -> Self {
        self.rows
            .push(values.iter().map(|s| Value::from(*s)).collect());
        self
    }

    /// Add a row of JSON values.
    pub fn values(mut self, values: Vec<Value>) -> Self {
        self.rows.push(values);
        self
    }

    /// Make the statement fail with `message`.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(message.into());
        self
    }

    /// Build the TestResponse.
    pub fn build(self) -> TestResponse {
        TestResponse {
            columns: self.columns,
            rows: self.rows,
            error: self.error,
        }
    }
}

impl Default for InMemoryTestResponseBuilder {
    fn default() -> Self {
        Self::new()
    }
}
