use serde::{Deserialize, Serialize};

/// Metadata describing a table or view, as selected in the explorer tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableMetadata {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(default)]
    pub is_view: bool,
}

impl TableMetadata {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            database: None,
            schema: None,
            is_view: false,
        }
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    pub fn view(mut self) -> Self {
        self.is_view = true;
        self
    }

    /// Returns the fully qualified table name (schema.table or just table).
    pub fn qualified_name(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", quote_ident(schema), quote_ident(&self.label)),
            None => quote_ident(&self.label),
        }
    }
}

/// Quotes an identifier with double quotes, doubling embedded quotes.
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quotes a string literal with single quotes, doubling embedded quotes.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
