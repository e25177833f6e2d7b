use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// PortChannel is a logical LACP aggregate interface cached per switch
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PortChannel {
    pub id: i64,
    pub switch_id: i64,
    pub port_channel_name: String,
    pub port_channel_number: i64,
    pub mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vlan_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub native_vlan_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trunk_vlans: Option<String>,
    pub lacp_mode: String,
    pub description: String,
    pub admin_status: String,
    pub oper_status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// PortChannelWithMembers is the API shape for list endpoints
#[derive(Debug, Clone, Serialize)]
pub struct PortChannelWithMembers {
    #[serde(flatten)]
    pub port_channel: PortChannel,
    pub members: Vec<String>,
}

/// Valid port-channel number range on EOS
pub const PORT_CHANNEL_MIN: i64 = 1;
pub const PORT_CHANNEL_MAX: i64 = 4096;
