use serde::{Deserialize, Serialize};

/// The kind of node shown in the explorer tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemType {
    Connection,
    ConnectedConnection,
    Database,
    Schema,
    Table,
    View,
    MaterializedView,
    Column,
    Function,
    ResourceGroup,
    NoChild,
}

/// A node in the explorer tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorerItem {
    pub label: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    /// Type of the nodes listed under this one, for resource groups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_type: Option<ItemType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_id: Option<String>,
}

impl ExplorerItem {
    pub fn new(label: impl Into<String>, item_type: ItemType) -> Self {
        Self {
            label: label.into(),
            item_type,
            child_type: None,
            database: None,
            schema: None,
            table: None,
            detail: None,
            description: None,
            icon_id: None,
        }
    }

    pub fn with_child_type(mut self, child_type: ItemType) -> Self {
        self.child_type = Some(child_type);
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_icon(mut self, icon_id: impl Into<String>) -> Self {
        self.icon_id = Some(icon_id.into());
        self
    }
}
