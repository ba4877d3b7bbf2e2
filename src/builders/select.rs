use crate::types::TableMetadata;

/// Builds SELECT statement text for query generators.
#[derive(Debug, Clone, Default)]
pub struct SelectBuilder {
    columns: Vec<String>,
    table: String,
    conditions: Vec<String>,
    order_by: Vec<String>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl SelectBuilder {
    /// Start a SELECT over the given table expression.
    pub fn from(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Self::default()
        }
    }

    /// Start a SELECT over a table's qualified name.
    pub fn from_table(table: &TableMetadata) -> Self {
        Self::from(table.qualified_name())
    }

    /// Specify the column expressions to select. Defaults to `*`.
    pub fn columns(mut self, cols: &[&str]) -> Self {
        self.columns = cols.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Add a condition; conditions are joined with AND.
    pub fn where_(mut self, condition: impl Into<String>) -> Self {
        self.conditions.push(condition.into());
        self
    }

    pub fn order_by(mut self, expr: impl Into<String>) -> Self {
        self.order_by.push(expr.into());
        self
    }

    /// Add a LIMIT to the query.
    pub fn limit(mut self, n: Option<u64>) -> Self {
        self.limit = n;
        self
    }

    /// Add an OFFSET to the query.
    pub fn offset(mut self, n: Option<u64>) -> Self {
        self.offset = n;
        self
    }

    /// Build the SQL statement.
    pub fn build(&self) -> String {
        let mut sql = String::with_capacity(256);

        // SELECT clause
        sql.push_str("SELECT ");
        if self.columns.is_empty() {
            sql.push('*');
        } else {
            sql.push_str(&self.columns.join(", "));
        }

        // FROM clause
        sql.push_str(" FROM ");
        sql.push_str(&self.table);

        // WHERE clause
        if !self.conditions.is_empty() {
            sql.push_str(" WHERE ");
            if self.conditions.len() == 1 {
                sql.push_str(&self.conditions[0]);
            } else {
                let wrapped: Vec<String> =
                    self.conditions.iter().map(|c| format!("({c})")).collect();
                sql.push_str(&wrapped.join(" AND "));
            }
        }

        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order_by.join(", "));
        }

        // LIMIT / OFFSET clauses
        if let Some(limit) = self.limit {
            sql.push_str(" LIMIT ");
            sql.push_str(&limit.to_string());
        }
        if let Some(offset) = self.offset {
            sql.push_str(" OFFSET ");
            sql.push_str(&offset.to_string());
        }

        sql
    }
}
