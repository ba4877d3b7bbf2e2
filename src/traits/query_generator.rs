use crate::error::{DriverError, Result};
use crate::types::TableMetadata;

/// Parameters passed to statement templates.
#[derive(Debug, Clone, Copy)]
pub struct TemplateParams<'a> {
    pub table: &'a TableMetadata,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl<'a> TemplateParams<'a> {
    pub fn new(table: &'a TableMetadata) -> Self {
        Self {
            table,
            limit: None,
            offset: None,
        }
    }

    pub fn paged(table: &'a TableMetadata, limit: u64, offset: u64) -> Self {
        Self {
            table,
            limit: Some(limit),
            offset: Some(offset),
        }
    }
}

/// A statement builder that also exposes its raw template text.
pub trait StatementTemplate: Send + Sync {
    /// The template text, echoed on results for diagnostics.
    fn raw(&self) -> &str;

    /// Renders the statement for the given parameters.
    fn render(&self, params: &TemplateParams<'_>) -> String;
}

/// Dialect-specific statement generators injected into a driver.
///
/// Record fetch and count are optional and feature-detected at call time.
pub trait QueryGenerator: Send + Sync {
    fn describe_table(&self) -> Result<&dyn StatementTemplate> {
        Err(DriverError::UnsupportedQuery("describeTable"))
    }

    fn fetch_records(&self) -> Option<&dyn StatementTemplate> {
        None
    }

    fn count_records(&self) -> Option<&dyn StatementTemplate> {
        None
    }
}
