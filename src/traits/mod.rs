mod driver;
mod explorer;
mod module_resolver;
mod query_generator;

pub use driver::DatabaseDriver;
pub use explorer::SchemaExplorer;
pub use module_resolver::{ModuleMetadata, ModuleResolver};
pub use query_generator::{QueryGenerator, StatementTemplate, TemplateParams};
