use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Canonical interface switching modes
pub mod interface_mode {
    pub const ACCESS: &str = "access";
    pub const TRUNK: &str = "trunk";
    pub const ROUTED: &str = "routed";
    pub const UNKNOWN: &str = "unknown";
}

/// Canonical admin/oper status values
pub mod link_status {
    pub const UP: &str = "up";
    pub const DOWN: &str = "down";
    pub const UNKNOWN: &str = "unknown";
}

/// Interface is a locally cached row for a physical switch port.
/// Replaced wholesale on each sync; the device remains the source of truth.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Interface {
    pub id: i64,
    pub switch_id: i64,
    pub interface_name: String,
    pub mode: String,
    pub admin_status: String,
    pub oper_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vlan_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub native_vlan_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trunk_vlans: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<i64>,
    pub description: String,
    pub port_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transceiver_temp: Option<f64>,
    pub is_port_channel_member: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_synced: Option<DateTime<Utc>>,
}

/// InterfaceView is a reconciled interface entry as returned to API
/// clients: either a cached/live physical port or a synthetic
/// port-channel entry. Port-channel members never appear here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterfaceView {
    pub interface_name: String,
    pub mode: String,
    pub admin_status: String,
    pub oper_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vlan_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub native_vlan_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trunk_vlans: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<i64>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub port_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transceiver_temp: Option<f64>,
    pub is_port_channel: bool,
}

impl Default for InterfaceView {
    fn default() -> Self {
        Self {
            interface_name: String::new(),
            mode: interface_mode::UNKNOWN.to_string(),
            admin_status: link_status::UNKNOWN.to_string(),
            oper_status: link_status::UNKNOWN.to_string(),
            vlan_id: None,
            native_vlan_id: None,
            trunk_vlans: None,
            speed: None,
            description: String::new(),
            port_type: String::new(),
            transceiver_temp: None,
            is_port_channel: false,
        }
    }
}

/// ConfigureInterfaceRequest is a partial field update pushed to the
/// device and mirrored into the cache row.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigureInterfaceRequest {
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub vlan_id: Option<i64>,
    #[serde(default)]
    pub native_vlan_id: Option<i64>,
    #[serde(default)]
    pub trunk_vlans: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
}

/// Result of an interface sync (full cache replace from a live read)
#[derive(Debug, Clone, Serialize)]
pub struct SyncResult {
    pub success: bool,
    pub synced: usize,
    pub errors: Vec<String>,
}
