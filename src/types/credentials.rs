use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{DriverError, Result};

/// Show/hide lists of database names, as written in the host settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatabaseFilterConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hide: Option<Vec<String>>,
}

/// Normalized database filter. An empty `show` list means "everything not hidden".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseFilter {
    pub show: Vec<String>,
    pub hide: Vec<String>,
}

impl DatabaseFilter {
    /// Returns true if `database` should be listed.
    pub fn allows(&self, database: &str) -> bool {
        if self.hide.iter().any(|h| h == database) {
            return false;
        }
        self.show.is_empty() || self.show.iter().any(|s| s == database)
    }
}

/// Filters applied by drivers when building explorer queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseQueryFilters {
    pub database_filter: DatabaseFilter,
}

/// Immutable connection descriptor handed to a driver at construction.
///
/// Keys the host does not model explicitly are kept as driver options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    driver: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    server: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    username: Option<String>,
    #[serde(default)]
    database: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    database_filter: Option<DatabaseFilterConfig>,
    #[serde(flatten)]
    options: Map<String, Value>,
}

impl Credentials {
    pub fn new(
        id: impl Into<String>,
        driver: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            driver: driver.into(),
            server: None,
            port: None,
            username: None,
            database: database.into(),
            database_filter: None,
            options: Map::new(),
        }
    }

    /// Parses credentials from the host's JSON connection settings.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| DriverError::InvalidCredentials(e.to_string()))
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_server(mut self, server: impl Into<String>, port: Option<u16>) -> Self {
        self.server = Some(server.into());
        self.port = port;
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_database_filter(mut self, filter: DatabaseFilterConfig) -> Self {
        self.database_filter = Some(filter);
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// The stable connection identifier.
    ///
    /// Falls back to `name|server|port|database|driver` when no explicit id was set.
    pub fn connection_id(&self) -> String {
        if !self.id.is_empty() {
            return self.id.clone();
        }
        [
            self.name.clone(),
            self.server.clone().unwrap_or_default(),
            self.port.map(|p| p.to_string()).unwrap_or_default(),
            self.database.clone(),
            self.driver.clone(),
        ]
        .join("|")
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The driver kind tag, e.g. `PostgreSQL`.
    pub fn driver(&self) -> &str {
        &self.driver
    }

    pub fn server(&self) -> Option<&str> {
        self.server.as_deref()
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn database_filter(&self) -> Option<&DatabaseFilterConfig> {
        self.database_filter.as_ref()
    }

    pub fn options(&self) -> &Map<String, Value> {
        &self.options
    }

    /// Returns a driver option as a string, if set.
    pub fn option_str(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(Value::as_str)
    }

    /// Normalizes the database filter.
    ///
    /// Without a show list, only the credential's own database is shown, unless a
    /// hide list was set, in which case everything not hidden is shown.
    pub fn base_query_filters(&self) -> BaseQueryFilters {
        let config = self.database_filter.clone().unwrap_or_default();
        let show = match (config.show, &config.hide) {
            (Some(show), _) => show,
            (None, Some(_)) => Vec::new(),
            (None, None) => vec![self.database.clone()],
        };
        BaseQueryFilters {
            database_filter: DatabaseFilter {
                show,
                hide: config.hide.unwrap_or_default(),
            },
        }
    }
}
