//! Declarative field extraction for vendor payloads.
//!
//! eAPI responses are inconsistent about field naming and nesting across
//! commands and EOS releases (`adminStatus` vs `admin_state`,
//! `accessVlanId` vs `vlanId`, ...). Each logical field has an ordered
//! key list; extraction is first-match-wins so the precedence stays
//! auditable in one place.

use serde_json::{Map, Value};

pub const ADMIN_STATUS: &[&str] = &["adminStatus", "admin_state", "adminState", "enabled"];
pub const OPER_STATUS: &[&str] = &[
    "operStatus",
    "oper_state",
    "lineProtocolStatus",
    "interfaceStatus",
];
pub const MODE: &[&str] = &["mode", "switchportMode", "forwardingModel"];
pub const ACCESS_VLAN: &[&str] = &["accessVlanId", "accessVlan", "vlanId", "vlan_id"];
pub const NATIVE_VLAN: &[&str] = &[
    "trunkNativeVlanId",
    "trunkingNativeVlanId",
    "nativeVlanId",
    "native_vlan",
];
pub const TRUNK_VLANS: &[&str] = &["trunkAllowedVlans", "trunkingVlans", "trunkVlans", "trunk_vlans"];
pub const SPEED: &[&str] = &["bandwidth", "speed", "interfaceSpeed"];
pub const DESCRIPTION: &[&str] = &["description", "interfaceDescription"];
pub const PORT_TYPE: &[&str] = &["interfaceType", "hardware", "portType", "type"];
pub const TEMPERATURE: &[&str] = &["temperature", "tempSensor", "temp"];
pub const OPTIC_SERIAL: &[&str] = &["vendorSn", "serialNum", "serialNumber", "serial_number"];
pub const OPTIC_PART: &[&str] = &["vendorPn", "partNum", "partNumber", "part_number"];
pub const MEDIA_TYPE: &[&str] = &["mediaType", "detectedMediaType", "transceiverType"];
pub const LINK_STATUS: &[&str] = &["linkStatus", "link_state"];
pub const LACP_MODE: &[&str] = &["lacpMode", "protocol"];

/// First string value found under any of `keys`, searched across the
/// given objects in order (outer entry first, then nested sub-objects).
pub fn first_str(sources: &[&Map<String, Value>], keys: &[&str]) -> Option<String> {
    for key in keys {
        for obj in sources {
            match obj.get(*key) {
                Some(Value::String(s)) if !s.is_empty() => return Some(s.clone()),
                Some(Value::Bool(b)) => return Some(b.to_string()),
                _ => {}
            }
        }
    }
    None
}

/// First integer value found under any of `keys`. Numeric strings are
/// accepted; some payloads quote their VLAN ids.
pub fn first_i64(sources: &[&Map<String, Value>], keys: &[&str]) -> Option<i64> {
    for key in keys {
        for obj in sources {
            match obj.get(*key) {
                Some(Value::Number(n)) => return n.as_i64(),
                Some(Value::String(s)) => {
                    if let Ok(v) = s.trim().parse::<i64>() {
                        return Some(v);
                    }
                }
                _ => {}
            }
        }
    }
    None
}

/// First float value found under any of `keys`
pub fn first_f64(sources: &[&Map<String, Value>], keys: &[&str]) -> Option<f64> {
    for key in keys {
        for obj in sources {
            match obj.get(*key) {
                Some(Value::Number(n)) => return n.as_f64(),
                Some(Value::String(s)) => {
                    if let Ok(v) = s.trim().parse::<f64>() {
                        return Some(v);
                    }
                }
                _ => {}
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> Map<String, Value> {
        v.as_object().unwrap().clone()
    }

    #[test]
    fn test_first_match_wins_precedence() {
        let entry = obj(json!({"adminStatus": "up", "admin_state": "down"}));
        assert_eq!(first_str(&[&entry], ADMIN_STATUS).as_deref(), Some("up"));
    }

    #[test]
    fn test_fallback_to_second_key() {
        let entry = obj(json!({"admin_state": "down"}));
        assert_eq!(first_str(&[&entry], ADMIN_STATUS).as_deref(), Some("down"));
    }

    #[test]
    fn test_outer_source_beats_nested_for_same_key() {
        let outer = obj(json!({"accessVlanId": 10}));
        let nested = obj(json!({"accessVlanId": 20}));
        assert_eq!(first_i64(&[&outer, &nested], ACCESS_VLAN), Some(10));
    }

    #[test]
    fn test_earlier_key_beats_earlier_source() {
        // Key order dominates source order: accessVlanId anywhere wins
        // over vlanId in the outer object
        let outer = obj(json!({"vlanId": 99}));
        let nested = obj(json!({"accessVlanId": 10}));
        assert_eq!(first_i64(&[&outer, &nested], ACCESS_VLAN), Some(10));
    }

    #[test]
    fn test_numeric_string_accepted() {
        let entry = obj(json!({"vlanId": "42"}));
        assert_eq!(first_i64(&[&entry], ACCESS_VLAN), Some(42));
    }

    #[test]
    fn test_missing_returns_none() {
        let entry = obj(json!({"unrelated": 1}));
        assert_eq!(first_str(&[&entry], MODE), None);
        assert_eq!(first_f64(&[&entry], TEMPERATURE), None);
    }
}
