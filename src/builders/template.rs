use std::fmt;

use crate::traits::{StatementTemplate, TemplateParams};
use crate::types::quote_literal;

type RenderFn = Box<dyn Fn(&TemplateParams<'_>) -> String + Send + Sync>;

/// A statement template: raw text for diagnostics plus a renderer.
pub struct QueryTemplate {
    raw: String,
    render: RenderFn,
}

impl QueryTemplate {
    pub fn new<F>(raw: impl Into<String>, render: F) -> Self
    where
        F: Fn(&TemplateParams<'_>) -> String + Send + Sync + 'static,
    {
        Self {
            raw: raw.into(),
            render: Box::new(render),
        }
    }

    /// A template rendered by substituting placeholders in its raw text.
    ///
    /// Supported placeholders: `{table}` (qualified, quoted name), `{label}` and
    /// `{schema}` (string literals), `{limit}` and `{offset}`.
    pub fn interpolated(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let text = raw.clone();
        Self::new(raw, move |params| interpolate(&text, params))
    }
}

fn interpolate(text: &str, params: &TemplateParams<'_>) -> String {
    let table = params.table;
    text.replace("{table}", &table.qualified_name())
        .replace("{label}", &quote_literal(&table.label))
        .replace(
            "{schema}",
            &quote_literal(table.schema.as_deref().unwrap_or_default()),
        )
        .replace("{limit}", &params.limit.unwrap_or_default().to_string())
        .replace("{offset}", &params.offset.unwrap_or_default().to_string())
}

impl StatementTemplate for QueryTemplate {
    fn raw(&self) -> &str {
        &self.raw
    }

    fn render(&self, params: &TemplateParams<'_>) -> String {
        (self.render)(params)
    }
}

impl fmt::Debug for QueryTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryTemplate")
            .field("raw", &self.raw)
            .finish()
    }
}
