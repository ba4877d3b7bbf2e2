use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{message_error, DriverError, RawError, Result};
use crate::types::TableMetadata;

/// A single record returned by a statement, keyed by column name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    values: Map<String, Value>,
}

impl Row {
    /// Creates a Row from column names and values, keeping the column order.
    /// A repeated column name keeps its first position and takes the last value.
    pub fn new(columns: &[String], values: Vec<Value>) -> Self {
        let values = columns
            .iter()
            .zip(values)
            .map(|(col, val)| (col.clone(), val))
            .collect();
        Self { values }
    }

    /// Gets a value by column name.
    pub fn get(&self, column: &str) -> Result<&Value> {
        self.values
            .get(column)
            .ok_or_else(|| DriverError::ColumnNotFound(column.to_string()))
    }

    /// Returns all column names in this row.
    pub fn columns(&self) -> Vec<&str> {
        self.values.keys().map(|s| s.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<Map<String, Value>> for Row {
    fn from(values: Map<String, Value>) -> Self {
        Self { values }
    }
}

/// A timestamped message attached to a query result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogMessage {
    pub message: String,
    pub date: DateTime<Utc>,
}

impl LogMessage {
    /// Wraps any displayable value into a message stamped with the current time.
    pub fn prepare(message: impl Display) -> Self {
        Self {
            message: message.to_string(),
            date: Utc::now(),
        }
    }
}

/// Marks results produced by derived operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QueryType {
    ShowRecords,
}

/// Outcome of one executed statement.
///
/// Statement failures are reported here rather than returned as `Err`, so a
/// batch can report success and failure per statement.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    #[serde(rename = "connId")]
    pub connection_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub result_id: String,
    pub cols: Vec<String>,
    pub error: bool,
    #[serde(skip)]
    pub raw_error: Option<RawError>,
    pub results: Vec<Row>,
    pub query: String,
    pub messages: Vec<LogMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_type: Option<QueryType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_params: Option<TableMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl QueryResult {
    /// A successful result.
    pub fn success(
        connection_id: impl Into<String>,
        query: impl Into<String>,
        cols: Vec<String>,
        results: Vec<Row>,
    ) -> Self {
        Self {
            connection_id: connection_id.into(),
            request_id: None,
            result_id: Uuid::new_v4().to_string(),
            cols,
            error: false,
            raw_error: None,
            results,
            query: query.into(),
            messages: Vec::new(),
            page: None,
            page_size: None,
            total: None,
            query_type: None,
            query_params: None,
            base_query: None,
            label: None,
        }
    }

    /// A failed result carrying the raw error; its message is logged onto the result.
    pub fn failure(
        connection_id: impl Into<String>,
        query: impl Into<String>,
        raw_error: RawError,
    ) -> Self {
        let mut result = Self::success(connection_id, query, Vec::new(), Vec::new());
        result.error = true;
        result.messages.push(LogMessage::prepare(&raw_error));
        result.raw_error = Some(raw_error);
        result
    }

    pub fn with_message(mut self, message: impl Display) -> Self {
        self.messages.push(LogMessage::prepare(message));
        self
    }

    /// Echoes per-call options onto the result.
    pub fn with_options(mut self, opts: &crate::types::QueryOptions) -> Self {
        self.request_id = opts.request_id.clone();
        self.label = opts.label.clone();
        self
    }

    /// Extracts a single row from the result.
    /// Returns an error if the result contains zero or more than one row.
    pub fn single_row(self) -> Result<Row> {
        match <[Row; 1]>::try_from(self.results) {
            Ok([row]) => Ok(row),
            Err(rows) => Err(DriverError::UnexpectedRowCount {
                expected: 1,
                actual: rows.len(),
            }),
        }
    }

    /// Returns the rows, or the embedded raw error if the statement failed.
    pub fn into_rows(self) -> Result<Vec<Row>> {
        if !self.error {
            return Ok(self.results);
        }
        let raw = match self.raw_error {
            Some(raw) => raw,
            None => message_error(
                self.messages
                    .last()
                    .map(|m| m.message.as_str())
                    .unwrap_or("query failed"),
            ),
        };
        Err(DriverError::QueryFailed(raw))
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(values: &[(&str, Value)]) -> Row {
        let columns: Vec<String> = values.iter().map(|(c, _)| c.to_string()).collect();
        Row::new(&columns, values.iter().map(|(_, v)| v.clone()).collect())
    }

    #[test]
    fn test_row_get() {
        let row = row(&[("id", Value::from(1)), ("name", Value::from("John"))]);
        assert_eq!(row.get("id").unwrap(), &Value::from(1));
        assert_eq!(row.get("name").unwrap(), "John");
        assert!(matches!(
            row.get("missing"),
            Err(DriverError::ColumnNotFound(c)) if c == "missing"
        ));
    }

    #[test]
    fn test_row_keeps_statement_column_order() {
        let row = row(&[
            ("zeta", Value::from(1)),
            ("alpha", Value::from(2)),
            ("mid", Value::from(3)),
        ]);
        assert_eq!(row.columns(), vec!["zeta", "alpha", "mid"]);
        assert_eq!(
            serde_json::to_string(&row).unwrap(),
            r#"{"zeta":1,"alpha":2,"mid":3}"#
        );

        let repeated = Row::new(
            &["zeta".to_string(), "alpha".to_string(), "zeta".to_string()],
            vec![Value::from(1), Value::from(2), Value::from(3)],
        );
        assert_eq!(repeated.columns(), vec!["zeta", "alpha"]);
        assert_eq!(repeated.get("zeta").unwrap(), &Value::from(3));
    }

    #[test]
    fn test_single_row_error_on_multiple() {
        let result = QueryResult::success(
            "c1",
            "SELECT id FROM t",
            vec!["id".to_string()],
            vec![row(&[("id", Value::from(1))]), row(&[("id", Value::from(2))])],
        );
        match result.single_row().unwrap_err() {
            DriverError::UnexpectedRowCount { expected, actual } => {
                assert_eq!(expected, 1);
                assert_eq!(actual, 2);
            }
            other => panic!("Expected UnexpectedRowCount error, got {other:?}"),
        }
    }

    #[test]
    fn test_failure_logs_message_and_rethrows() {
        let raw = message_error("syntax error at or near \"SELEC\"");
        let result = QueryResult::failure("c1", "SELEC 1", raw);
        assert!(result.error);
        assert_eq!(result.messages.len(), 1);
        assert!(result.messages[0].message.contains("syntax error"));

        let err = result.into_rows().unwrap_err();
        assert_eq!(err.to_string(), "syntax error at or near \"SELEC\"");
    }

    #[test]
    fn test_serializes_for_host() {
        let mut result = QueryResult::success("c1", "SELECT 1", vec!["one".to_string()], vec![]);
        result.page_size = Some(10);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["connId"], "c1");
        assert_eq!(json["pageSize"], 10);
        assert!(json.get("total").is_none());
        assert!(json.get("rawError").is_none());
    }
}
