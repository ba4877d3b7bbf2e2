use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::types::{ExplorerItem, ItemType};

/// Vendor-specific schema browsing for the explorer tree.
///
/// Drivers opt in by returning themselves from
/// [`DatabaseDriver::explorer`](crate::traits::DatabaseDriver::explorer).
#[async_trait]
pub trait SchemaExplorer: Send + Sync {
    /// Lists the children of an explorer node.
    async fn children_for_item(
        &self,
        item: &ExplorerItem,
        parent: Option<&ExplorerItem>,
    ) -> Result<Vec<ExplorerItem>>;

    /// Searches nodes of the given type whose name matches `search`.
    async fn search_items(
        &self,
        item_type: ItemType,
        search: &str,
        extra: Option<&Value>,
    ) -> Result<Vec<ExplorerItem>>;
}
