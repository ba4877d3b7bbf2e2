use async_trait::async_trait;
use serde_json::Value;

use crate::error::{DriverError, Result};
use crate::traits::{QueryGenerator, SchemaExplorer, TemplateParams};
use crate::types::{
    Credentials, Dependency, QueryOptions, QueryResult, QueryType, Row, ShowRecordsOptions,
    Statements, TableMetadata,
};

/// Trait for database driver implementations.
/// Drivers are responsible for:
/// - Opening and closing a single live connection
/// - Executing statements and reporting each outcome as a QueryResult
/// - Supplying the dialect query generator
///
/// Every other query-shaped operation is derived from [`DatabaseDriver::query`].
#[async_trait]
pub trait DatabaseDriver: Send + Sync {
    /// The credentials bound at construction.
    fn credentials(&self) -> &Credentials;

    /// The dialect statement generators for this driver.
    fn queries(&self) -> &dyn QueryGenerator;

    /// External modules this driver kind requires.
    fn dependencies(&self) -> &[Dependency] {
        &[]
    }

    /// Schema browsing support. Drivers without one get an empty explorer tree.
    fn explorer(&self) -> Option<&dyn SchemaExplorer> {
        None
    }

    /// Establishes the connection.
    /// Repeated or concurrent calls must converge on the same connection.
    async fn open(&self) -> Result<()>;

    /// Releases the connection. Must succeed when already closed.
    async fn close(&self) -> Result<()>;

    /// Executes the statements in order, returning one result per statement.
    /// Statement failures are reported inside the results.
    async fn query(&self, statements: Statements, opts: &QueryOptions) -> Result<Vec<QueryResult>>;

    /// The stable connection identifier.
    fn id(&self) -> String {
        self.credentials().connection_id()
    }

    /// Executes one statement and returns its result.
    async fn single_query(&self, statement: &str, opts: &QueryOptions) -> Result<QueryResult> {
        self.query(Statements::single(statement), opts)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DriverError::NoResult(statement.to_string()))
    }

    /// Executes one statement and returns its rows, or the statement's own error.
    async fn query_results(&self, statement: &str, opts: &QueryOptions) -> Result<Vec<Row>> {
        self.single_query(statement, opts).await?.into_rows()
    }

    async fn describe_table(
        &self,
        table: &TableMetadata,
        opts: &QueryOptions,
    ) -> Result<Vec<QueryResult>> {
        let template = self.queries().describe_table()?;
        let statement = template.render(&TemplateParams::new(table));
        let mut result = self.single_query(&statement, opts).await?;
        result.base_query = Some(template.raw().to_string());
        Ok(vec![result])
    }

    /// Fetches one page of records.
    ///
    /// When the generator can count records, the fetch and count statements run
    /// concurrently and the fetch result is enriched with the paging metadata.
    /// Otherwise the fetch statement's plain results are returned.
    async fn show_records(
        &self,
        table: &TableMetadata,
        page: ShowRecordsOptions,
        opts: &QueryOptions,
    ) -> Result<Vec<QueryResult>> {
        let queries = self.queries();
        let fetch = queries
            .fetch_records()
            .ok_or(DriverError::UnsupportedQuery("fetchRecords"))?;
        let params = TemplateParams::paged(table, page.limit, page.offset()?);
        let fetch_statement = fetch.render(&params);

        let Some(count) = queries.count_records() else {
            tracing::debug!(
                table = %table.label,
                "no count generator, fetching records without total"
            );
            return self.query(Statements::single(fetch_statement), opts).await;
        };
        let count_statement = count.render(&params);

        let (mut records, total) = tokio::try_join!(
            self.single_query(&fetch_statement, opts),
            self.single_query(&count_statement, opts),
        )?;

        records.base_query = Some(fetch.raw().to_string());
        records.page_size = Some(page.limit);
        records.page = Some(page.page);
        records.total = Some(coerce_total(total)?);
        records.query_type = Some(QueryType::ShowRecords);
        records.query_params = Some(table.clone());
        Ok(vec![records])
    }
}

/// Reads the numeric `total` column from the first row of a count result.
fn coerce_total(result: QueryResult) -> Result<u64> {
    let rows = result.into_rows()?;
    let row = rows
        .first()
        .ok_or_else(|| DriverError::InvalidTotal("count query returned no rows".to_string()))?;
    match row.get("total")? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .ok_or_else(|| DriverError::InvalidTotal(n.to_string())),
        Value::String(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| DriverError::InvalidTotal(s.clone())),
        other => Err(DriverError::InvalidTotal(other.to_string())),
    }
}
