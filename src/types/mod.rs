mod credentials;
mod dependency;
mod explorer;
mod row;
mod statement;
mod table;

pub use self::credentials::{BaseQueryFilters, Credentials, DatabaseFilter, DatabaseFilterConfig};
pub use self::dependency::{Dependency, DependencyKind, InstallAction};
pub use self::explorer::{ExplorerItem, ItemType};
pub use self::row::{LogMessage, QueryResult, QueryType, Row};
pub use self::statement::{QueryOptions, ShowRecordsOptions, Statements};
pub use self::table::{quote_ident, quote_literal, TableMetadata};
