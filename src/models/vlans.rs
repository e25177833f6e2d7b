use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Vlan is a VLAN definition cached per switch
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Vlan {
    pub id: i64,
    pub switch_id: i64,
    pub vlan_id: i64,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// CreateVlanRequest creates a VLAN on the device and in the cache
#[derive(Debug, Clone, Deserialize)]
pub struct CreateVlanRequest {
    pub vlan_id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Valid VLAN id range on EOS
pub const VLAN_ID_MIN: i64 = 1;
pub const VLAN_ID_MAX: i64 = 4094;

/// Sanitize a VLAN name to what EOS accepts: alphanumerics, underscore
/// and hyphen, truncated to 32 characters. Everything else becomes an
/// underscore.
pub fn sanitize_vlan_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .take(32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_vlan_name() {
        assert_eq!(sanitize_vlan_name("Servers"), "Servers");
        assert_eq!(sanitize_vlan_name("my vlan #1"), "my_vlan__1");
        assert_eq!(sanitize_vlan_name("dmz-edge_2"), "dmz-edge_2");
    }

    #[test]
    fn test_sanitize_vlan_name_truncates() {
        let long = "a".repeat(50);
        assert_eq!(sanitize_vlan_name(&long).len(), 32);
    }
}
