use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Switch represents a managed Arista device and its eAPI connection
/// parameters. The password is never serialized back out to API clients.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Switch {
    pub id: i64,
    pub hostname: String,
    pub ip_address: String,
    pub port: i64,
    pub use_https: bool,
    pub timeout_secs: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub model: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub eos_version: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Switch {
    /// Base URL of the switch's eAPI endpoint
    pub fn eapi_url(&self) -> String {
        let scheme = if self.use_https { "https" } else { "http" };
        format!("{}://{}:{}/command-api", scheme, self.ip_address, self.port)
    }
}

/// CreateSwitchRequest for adding a switch to the inventory
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSwitchRequest {
    pub hostname: String,
    pub ip_address: String,
    #[serde(default = "default_eapi_port")]
    pub port: i64,
    #[serde(default = "default_true")]
    pub use_https: bool,
    #[serde(default = "default_timeout")]
    pub timeout_secs: i64,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// UpdateSwitchRequest for editing a switch. An empty password means
/// "keep the stored credential".
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSwitchRequest {
    pub hostname: String,
    pub ip_address: String,
    #[serde(default = "default_eapi_port")]
    pub port: i64,
    #[serde(default = "default_true")]
    pub use_https: bool,
    #[serde(default = "default_timeout")]
    pub timeout_secs: i64,
    pub username: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Result of an eAPI reachability test (show version)
#[derive(Debug, Clone, Serialize)]
pub struct SwitchTestResult {
    pub reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eos_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn default_eapi_port() -> i64 {
    443
}

fn default_true() -> bool {
    true
}

fn default_timeout() -> i64 {
    30
}
