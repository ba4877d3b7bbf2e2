use crate::builders::{QueryTemplate, SelectBuilder};
use crate::error::Result;
use crate::traits::{QueryGenerator, StatementTemplate};
use crate::types::quote_literal;

const DESCRIBE_TABLE_RAW: &str = "SELECT column_name, data_type, is_nullable, column_default \
     FROM information_schema.columns \
     WHERE table_name = :label [AND table_schema = :schema] ORDER BY ordinal_position";
const FETCH_RECORDS_RAW: &str = "SELECT * FROM :table LIMIT :limit OFFSET :offset";
const COUNT_RECORDS_RAW: &str = "SELECT COUNT(1) AS total FROM :table";

/// Query generator for databases exposing `information_schema` and LIMIT/OFFSET.
#[derive(Debug)]
pub struct AnsiQueries {
    describe_table: QueryTemplate,
    fetch_records: QueryTemplate,
    count_records: Option<QueryTemplate>,
}

impl AnsiQueries {
    pub fn new() -> Self {
        Self {
            describe_table: QueryTemplate::new(DESCRIBE_TABLE_RAW, |params| {
                let table = params.table;
                let mut select = SelectBuilder::from("information_schema.columns")
                    .columns(&["column_name", "data_type", "is_nullable", "column_default"])
                    .where_(format!("table_name = {}", quote_literal(&table.label)));
                if let Some(schema) = &table.schema {
                    select = select.where_(format!("table_schema = {}", quote_literal(schema)));
                }
                select.order_by("ordinal_position").build()
            }),
            fetch_records: QueryTemplate::new(FETCH_RECORDS_RAW, |params| {
                SelectBuilder::from_table(params.table)
                    .limit(params.limit)
                    .offset(params.offset)
                    .build()
            }),
            count_records: Some(QueryTemplate::new(COUNT_RECORDS_RAW, |params| {
                SelectBuilder::from_table(params.table)
                    .columns(&["COUNT(1) AS total"])
                    .build()
            })),
        }
    }

    /// Drops the count generator, for backends where counting is too expensive.
    pub fn without_count(mut self) -> Self {
        self.count_records = None;
        self
    }
}

impl Default for AnsiQueries {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryGenerator for AnsiQueries {
    fn describe_table(&self) -> Result<&dyn StatementTemplate> {
        Ok(&self.describe_table)
    }

    fn fetch_records(&self) -> Option<&dyn StatementTemplate> {
        Some(&self.fetch_records)
    }

    fn count_records(&self) -> Option<&dyn StatementTemplate> {
        self.count_records
            .as_ref()
            .map(|t| t as &dyn StatementTemplate)
    }
}
