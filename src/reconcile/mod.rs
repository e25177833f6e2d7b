//! Interface reconciliation: merges live switch-reported state with the
//! local cache, fills missing fields from fallback data sources, and
//! enforces the port-channel exclusion/inclusion rules.

pub mod probe;

use anyhow::Result;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

use crate::db::{PortChannelSync, Store};
use crate::eapi::{EapiClient, FORMAT_JSON};
use crate::models::*;

/// Where to read interface state from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceSource {
    Cache,
    Live,
}

impl InterfaceSource {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "cache" => Some(Self::Cache),
            "live" => Some(Self::Live),
            _ => None,
        }
    }
}

/// Port-type strings that mean "no optic installed". Presence is
/// inferred when the port type matches none of these OR the optic
/// carries a serial/part number.
const ABSENCE_INDICATORS: &[&str] = &["not present", "none", "n/a", "absent", "--", "unknown", "empty"];

/// Temperatures outside this open interval are sensor garbage
const TEMP_MIN: f64 = 0.0;
const TEMP_MAX: f64 = 200.0;

/// List interfaces for a switch from the requested source. Both paths
/// exclude port-channel members and surface every port-channel as a
/// synthetic entry.
pub async fn list_interfaces(
    store: &Store,
    target: &Switch,
    source: InterfaceSource,
) -> Result<Vec<InterfaceView>> {
    match source {
        InterfaceSource::Live => list_live(store, target).await,
        InterfaceSource::Cache => list_cached(store, target.id).await,
    }
}

async fn list_live(store: &Store, target: &Switch) -> Result<Vec<InterfaceView>> {
    let client = EapiClient::new(target)?;

    let result = client.run_command("show interfaces", FORMAT_JSON).await?;
    let mut entries = parse_interface_map(&result);

    // Secondary source: "show interfaces status" fills status, port type
    // and speed where the primary payload left them unknown. Enrichment
    // failures degrade the listing instead of failing it.
    match client.run_command("show interfaces status", FORMAT_JSON).await {
        Ok(status) => enrich_from_status(&mut entries, &status),
        Err(e) => tracing::warn!("interface status enrichment failed for {}: {}", target.hostname, e),
    }

    // Tertiary source: per-optic transceiver data
    match client.run_command("show interfaces transceiver", FORMAT_JSON).await {
        Ok(optics) => enrich_from_transceivers(&mut entries, &optics),
        Err(e) => tracing::warn!("transceiver enrichment failed for {}: {}", target.hostname, e),
    }

    let members = store.port_channel_member_set(target.id).await?;
    let port_channels = store.list_port_channels(target.id).await?;
    Ok(merge_standalone(entries, &members, &port_channels))
}

async fn list_cached(store: &Store, switch_id: i64) -> Result<Vec<InterfaceView>> {
    let rows = store.list_interfaces(switch_id).await?;
    let entries = dedupe_by_name(rows).into_iter().map(row_to_view).collect();

    let members = store.port_channel_member_set(switch_id).await?;
    let port_channels = store.list_port_channels(switch_id).await?;
    Ok(merge_standalone(entries, &members, &port_channels))
}

/// Full cache replace from a live read
pub async fn sync_interfaces(store: &Store, target: &Switch) -> Result<SyncResult> {
    let entries = list_live(store, target).await?;
    let physical: Vec<InterfaceView> = entries.into_iter().filter(|e| !e.is_port_channel).collect();
    let synced = store.replace_interfaces(target.id, &physical).await?;
    Ok(SyncResult {
        success: true,
        synced,
        errors: Vec::new(),
    })
}

/// Replace the VLAN cache from a live `show vlan` read
pub async fn sync_vlans(store: &Store, target: &Switch) -> Result<usize> {
    let client = EapiClient::new(target)?;
    let result = client.run_command("show vlan", FORMAT_JSON).await?;

    let mut entries: Vec<(i64, String)> = Vec::new();
    if let Some(vlans) = result.get("vlans").and_then(Value::as_object) {
        for (id_str, entry) in vlans {
            let vlan_id = match id_str.trim().parse::<i64>() {
                Ok(v) if (VLAN_ID_MIN..=VLAN_ID_MAX).contains(&v) => v,
                _ => continue,
            };
            let name = entry
                .get("name")
                .and_then(Value::as_str)
                .map(sanitize_vlan_name)
                .unwrap_or_default();
            entries.push((vlan_id, name));
        }
    }
    entries.sort_by_key(|(id, _)| *id);

    store.replace_vlans(target.id, &entries).await
}

/// Replace the port-channel cache (and membership) from live reads
pub async fn sync_port_channels(store: &Store, target: &Switch) -> Result<usize> {
    let client = EapiClient::new(target)?;
    let summary = client
        .run_command("show port-channel summary", FORMAT_JSON)
        .await?;

    // Switchport details are a separate command; tolerate its absence
    let switchports = match client.run_command("show interfaces switchport", FORMAT_JSON).await {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!("switchport read failed for {}: {}", target.hostname, e);
            Value::Null
        }
    };

    let entries = parse_port_channels(&summary, &switchports);
    store.replace_port_channels(target.id, &entries).await
}

// ---------- live payload parsing ----------

fn parse_interface_map(result: &Value) -> Vec<InterfaceView> {
    let mut entries = Vec::new();
    let interfaces = match result.get("interfaces").and_then(Value::as_object) {
        Some(m) => m,
        None => return entries,
    };

    for (name, entry) in interfaces {
        // Port-channels come from their own cache records as synthetic
        // entries; skip the device's own aggregate rows here
        if name.starts_with("Port-Channel") {
            continue;
        }
        let obj = match entry.as_object() {
            Some(o) => o,
            None => continue,
        };
        entries.push(parse_interface_entry(name, obj));
    }

    entries.sort_by(|a, b| a.interface_name.cmp(&b.interface_name));
    entries
}

fn parse_interface_entry(name: &str, obj: &Map<String, Value>) -> InterfaceView {
    // Probe the entry itself first, then nested switchport detail
    let nested = obj
        .get("switchportInfo")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    let sources: Vec<&Map<String, Value>> = vec![obj, &nested];

    let mode = probe::first_str(&sources, probe::MODE)
        .map(|m| normalize_mode(&m))
        .unwrap_or_else(|| interface_mode::UNKNOWN.to_string());

    InterfaceView {
        interface_name: name.to_string(),
        admin_status: probe::first_str(&sources, probe::ADMIN_STATUS)
            .map(|s| normalize_admin_status(&s))
            .unwrap_or_else(|| link_status::UNKNOWN.to_string()),
        oper_status: probe::first_str(&sources, probe::OPER_STATUS)
            .map(|s| normalize_oper_status(&s))
            .unwrap_or_else(|| link_status::UNKNOWN.to_string()),
        vlan_id: probe::first_i64(&sources, probe::ACCESS_VLAN),
        native_vlan_id: probe::first_i64(&sources, probe::NATIVE_VLAN),
        trunk_vlans: probe::first_str(&sources, probe::TRUNK_VLANS),
        speed: sources.iter().find_map(|s| {
            probe::SPEED.iter().find_map(|k| s.get(*k).and_then(parse_speed))
        }),
        description: probe::first_str(&sources, probe::DESCRIPTION).unwrap_or_default(),
        port_type: probe::first_str(&sources, probe::PORT_TYPE).unwrap_or_default(),
        transceiver_temp: None,
        is_port_channel: false,
        mode,
    }
}

fn enrich_from_status(entries: &mut [InterfaceView], status: &Value) {
    let statuses = match status.get("interfaceStatuses").and_then(Value::as_object) {
        Some(m) => m,
        None => return,
    };

    for entry in entries.iter_mut() {
        let obj = match statuses.get(&entry.interface_name).and_then(Value::as_object) {
            Some(o) => o,
            None => continue,
        };
        let sources = [obj];

        if entry.admin_status == link_status::UNKNOWN {
            if let Some(link) = probe::first_str(&sources, probe::LINK_STATUS) {
                entry.admin_status = if link.eq_ignore_ascii_case("disabled") {
                    link_status::DOWN.to_string()
                } else {
                    link_status::UP.to_string()
                };
            }
        }
        if entry.oper_status == link_status::UNKNOWN {
            if let Some(s) = probe::first_str(&sources, probe::OPER_STATUS)
                .or_else(|| probe::first_str(&sources, probe::LINK_STATUS))
            {
                entry.oper_status = status_oper_status(&s);
            }
        }

        if entry.port_type.is_empty() {
            if let Some(pt) = probe::first_str(&sources, probe::PORT_TYPE) {
                entry.port_type = pt;
            }
        }
        if entry.speed.is_none() {
            entry.speed = probe::SPEED
                .iter()
                .find_map(|k| obj.get(*k).and_then(parse_speed));
        }
    }
}

fn enrich_from_transceivers(entries: &mut [InterfaceView], optics: &Value) {
    let optic_map = match optics.get("interfaces").and_then(Value::as_object) {
        Some(m) => m,
        None => return,
    };

    for entry in entries.iter_mut() {
        let optic = match find_optic(optic_map, &entry.interface_name) {
            Some(o) => o,
            None => continue,
        };
        let obj = match optic.as_object() {
            Some(o) => o,
            None => continue,
        };
        if !optic_present(obj) {
            continue;
        }
        if let Some(temp) = probe::first_f64(&[obj], probe::TEMPERATURE) {
            if temp > TEMP_MIN && temp < TEMP_MAX {
                entry.transceiver_temp = Some(temp);
            }
        }
    }
}

/// An optic is present when its media/port type matches none of the
/// absence indicators OR it reports a serial/part number.
fn optic_present(obj: &Map<String, Value>) -> bool {
    let has_identifier = probe::first_str(&[obj], probe::OPTIC_SERIAL)
        .or_else(|| probe::first_str(&[obj], probe::OPTIC_PART))
        .map(|s| !s.trim().is_empty())
        .unwrap_or(false);
    if has_identifier {
        return true;
    }

    match probe::first_str(&[obj], probe::MEDIA_TYPE)
        .or_else(|| probe::first_str(&[obj], probe::PORT_TYPE))
    {
        Some(media) => {
            let media = media.trim().to_lowercase();
            !ABSENCE_INDICATORS.iter().any(|a| media == *a)
        }
        None => false,
    }
}

/// Optic lookup: exact name match first, then a normalized
/// (case/whitespace/punctuation-insensitive) partial match.
fn find_optic<'a>(optics: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    if let Some(v) = optics.get(name) {
        return Some(v);
    }

    let wanted = normalize_interface_name(name);
    optics
        .iter()
        .find(|(k, _)| {
            let candidate = normalize_interface_name(k);
            candidate.contains(&wanted) || wanted.contains(&candidate)
        })
        .map(|(_, v)| v)
}

fn normalize_interface_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase()
}

/// Convert a speed value to bits/second: numbers are taken as-is,
/// textual speeds like "10G" are numeric prefix × 10^9.
fn parse_speed(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64().filter(|s| *s > 0),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(n) = s.parse::<i64>() {
                return Some(n).filter(|s| *s > 0);
            }
            let numeric: String = s
                .chars()
                .take_while(|c| c.is_ascii_digit() || *c == '.')
                .collect();
            let value: f64 = numeric.parse().ok()?;
            if value <= 0.0 {
                return None;
            }
            Some((value * 1e9) as i64)
        }
        _ => None,
    }
}

fn normalize_mode(mode: &str) -> String {
    let m = mode.trim().to_lowercase();
    if m.contains("trunk") {
        interface_mode::TRUNK.to_string()
    } else if m.contains("access") || m.contains("bridged") {
        interface_mode::ACCESS.to_string()
    } else if m.contains("routed") || m.contains("l3") {
        interface_mode::ROUTED.to_string()
    } else {
        interface_mode::UNKNOWN.to_string()
    }
}

fn normalize_admin_status(s: &str) -> String {
    match s.trim().to_lowercase().as_str() {
        "up" | "enabled" | "true" | "connected" => link_status::UP.to_string(),
        "down" | "disabled" | "false" => link_status::DOWN.to_string(),
        _ => link_status::UNKNOWN.to_string(),
    }
}

fn normalize_oper_status(s: &str) -> String {
    match s.trim().to_lowercase().as_str() {
        "up" | "connected" => link_status::UP.to_string(),
        "down" | "notconnect" | "disabled" | "notpresent" | "lowerlayerdown" => {
            link_status::DOWN.to_string()
        }
        _ => link_status::UNKNOWN.to_string(),
    }
}

/// Status-payload mapping used during enrichment: the status table
/// always reports a link state, so anything other than up/connected is
/// down, never unknown.
fn status_oper_status(s: &str) -> String {
    match s.trim().to_lowercase().as_str() {
        "up" | "connected" => link_status::UP.to_string(),
        _ => link_status::DOWN.to_string(),
    }
}

// ---------- merge rules ----------

/// Apply the exclusion and inclusion rules: drop port-channel members
/// from the standalone list, then surface every port-channel as a
/// synthetic entry.
fn merge_standalone(
    entries: Vec<InterfaceView>,
    members: &HashSet<String>,
    port_channels: &[PortChannel],
) -> Vec<InterfaceView> {
    let mut out: Vec<InterfaceView> = entries
        .into_iter()
        .filter(|e| !members.contains(&e.interface_name))
        .collect();

    for pc in port_channels {
        out.push(synthetic_port_channel_entry(pc));
    }
    out
}

fn synthetic_port_channel_entry(pc: &PortChannel) -> InterfaceView {
    InterfaceView {
        interface_name: pc.port_channel_name.clone(),
        mode: pc.mode.clone(),
        admin_status: pc.admin_status.clone(),
        oper_status: pc.oper_status.clone(),
        vlan_id: pc.vlan_id,
        native_vlan_id: pc.native_vlan_id,
        trunk_vlans: pc.trunk_vlans.clone(),
        speed: None,
        description: pc.description.clone(),
        port_type: "Port-Channel".to_string(),
        transceiver_temp: None,
        is_port_channel: true,
    }
}

/// Keep the most recently synced row per interface name
fn dedupe_by_name(rows: Vec<Interface>) -> Vec<Interface> {
    let mut by_name: HashMap<String, Interface> = HashMap::new();
    for row in rows {
        match by_name.get(&row.interface_name) {
            Some(existing) if existing.last_synced >= row.last_synced => {}
            _ => {
                by_name.insert(row.interface_name.clone(), row);
            }
        }
    }
    let mut out: Vec<Interface> = by_name.into_values().collect();
    out.sort_by(|a, b| a.interface_name.cmp(&b.interface_name));
    out
}

fn row_to_view(row: Interface) -> InterfaceView {
    InterfaceView {
        interface_name: row.interface_name,
        mode: row.mode,
        admin_status: row.admin_status,
        oper_status: row.oper_status,
        vlan_id: row.vlan_id,
        native_vlan_id: row.native_vlan_id,
        trunk_vlans: row.trunk_vlans,
        speed: row.speed,
        description: row.description,
        port_type: row.port_type,
        transceiver_temp: row.transceiver_temp,
        is_port_channel: false,
    }
}

// ---------- port-channel parsing ----------

fn parse_port_channels(summary: &Value, switchports: &Value) -> Vec<PortChannelSync> {
    let mut out = Vec::new();
    let map = match summary.get("portChannels").and_then(Value::as_object) {
        Some(m) => m,
        None => return out,
    };

    for (name, entry) in map {
        let number = match name.strip_prefix("Port-Channel").and_then(|n| n.parse::<i64>().ok()) {
            Some(n) if (PORT_CHANNEL_MIN..=PORT_CHANNEL_MAX).contains(&n) => n,
            _ => continue,
        };
        let obj = match entry.as_object() {
            Some(o) => o,
            None => continue,
        };

        let mut members: Vec<String> = Vec::new();
        for key in ["activePorts", "inactivePorts", "ports"] {
            if let Some(ports) = obj.get(key).and_then(Value::as_object) {
                members.extend(ports.keys().cloned());
            }
        }
        members.sort();
        members.dedup();

        let lacp_mode = probe::first_str(&[obj], probe::LACP_MODE)
            .map(|p| normalize_lacp_mode(&p))
            .unwrap_or_else(|| "on".to_string());

        let admin_status = probe::first_str(&[obj], probe::ADMIN_STATUS)
            .map(|s| normalize_admin_status(&s))
            .unwrap_or_else(|| link_status::UNKNOWN.to_string());

        let oper_status = probe::first_str(&[obj], probe::LINK_STATUS)
            .or_else(|| probe::first_str(&[obj], probe::OPER_STATUS))
            .map(|s| normalize_oper_status(&s))
            .unwrap_or_else(|| link_status::UNKNOWN.to_string());

        let (mode, vlan_id, native_vlan_id, trunk_vlans) = switchport_fields(switchports, name);

        out.push(PortChannelSync {
            port_channel_name: name.clone(),
            port_channel_number: number,
            mode,
            vlan_id,
            native_vlan_id,
            trunk_vlans,
            lacp_mode,
            admin_status,
            oper_status,
            members,
        });
    }

    out.sort_by_key(|e| e.port_channel_number);
    out
}

fn switchport_fields(
    switchports: &Value,
    name: &str,
) -> (String, Option<i64>, Option<i64>, Option<String>) {
    let unknown = (interface_mode::UNKNOWN.to_string(), None, None, None);
    let entry = match switchports
        .get("switchports")
        .and_then(Value::as_object)
        .and_then(|m| m.get(name))
        .and_then(Value::as_object)
    {
        Some(e) => e,
        None => return unknown,
    };

    let nested = entry
        .get("switchportInfo")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    let sources: Vec<&Map<String, Value>> = vec![entry, &nested];

    (
        probe::first_str(&sources, probe::MODE)
            .map(|m| normalize_mode(&m))
            .unwrap_or_else(|| interface_mode::UNKNOWN.to_string()),
        probe::first_i64(&sources, probe::ACCESS_VLAN),
        probe::first_i64(&sources, probe::NATIVE_VLAN),
        probe::first_str(&sources, probe::TRUNK_VLANS),
    )
}

fn normalize_lacp_mode(s: &str) -> String {
    match s.trim().to_lowercase().as_str() {
        "active" | "lacp" => "active".to_string(),
        "passive" => "passive".to_string(),
        _ => "on".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use serde_json::json;

    fn pc(name: &str, number: i64) -> PortChannel {
        PortChannel {
            id: number,
            switch_id: 1,
            port_channel_name: name.to_string(),
            port_channel_number: number,
            mode: interface_mode::TRUNK.to_string(),
            vlan_id: None,
            native_vlan_id: Some(1),
            trunk_vlans: Some("10,20".to_string()),
            lacp_mode: "active".to_string(),
            description: String::new(),
            admin_status: link_status::UP.to_string(),
            oper_status: link_status::UP.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn view(name: &str) -> InterfaceView {
        InterfaceView {
            interface_name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_speed_numeric() {
        assert_eq!(parse_speed(&json!(10_000_000_000i64)), Some(10_000_000_000));
        assert_eq!(parse_speed(&json!("1000000000")), Some(1_000_000_000));
    }

    #[test]
    fn test_parse_speed_textual() {
        assert_eq!(parse_speed(&json!("10G")), Some(10_000_000_000));
        assert_eq!(parse_speed(&json!("2.5G")), Some(2_500_000_000));
        assert_eq!(parse_speed(&json!("40Gbps")), Some(40_000_000_000));
    }

    #[test]
    fn test_parse_speed_invalid() {
        assert_eq!(parse_speed(&json!("auto")), None);
        assert_eq!(parse_speed(&json!(0)), None);
        assert_eq!(parse_speed(&json!(null)), None);
    }

    #[test]
    fn test_optic_present_by_media_type() {
        let present = json!({"mediaType": "10GBASE-SR"});
        let absent = json!({"mediaType": "Not Present"});
        assert!(optic_present(present.as_object().unwrap()));
        assert!(!optic_present(absent.as_object().unwrap()));
    }

    #[test]
    fn test_optic_present_by_serial_overrides_media() {
        let optic = json!({"mediaType": "n/a", "vendorSn": "ABC123"});
        assert!(optic_present(optic.as_object().unwrap()));
    }

    #[test]
    fn test_optic_absent_without_any_signal() {
        let optic = json!({"temperature": 33.0});
        assert!(!optic_present(optic.as_object().unwrap()));
    }

    #[test]
    fn test_find_optic_exact_then_normalized() {
        let optics = json!({
            "Ethernet49/1": {"temperature": 31.0},
            "ethernet 50-1": {"temperature": 40.0}
        });
        let map = optics.as_object().unwrap();
        assert!(find_optic(map, "Ethernet49/1").is_some());
        // Normalized partial match: punctuation and case ignored
        let found = find_optic(map, "Ethernet50/1").unwrap();
        assert_eq!(found.get("temperature").unwrap().as_f64(), Some(40.0));
        assert!(find_optic(map, "Ethernet99").is_none());
    }

    #[test]
    fn test_temperature_bounds_discard_invalid() {
        let mut entries = vec![view("Ethernet1"), view("Ethernet2")];
        let optics = json!({
            "interfaces": {
                "Ethernet1": {"mediaType": "10GBASE-SR", "temperature": 250.0},
                "Ethernet2": {"mediaType": "10GBASE-SR", "temperature": 35.5}
            }
        });
        enrich_from_transceivers(&mut entries, &optics);
        assert_eq!(entries[0].transceiver_temp, None);
        assert_eq!(entries[1].transceiver_temp, Some(35.5));
    }

    #[test]
    fn test_status_enrichment_fills_unknown_only() {
        let mut entries = vec![view("Ethernet1")];
        entries[0].admin_status = link_status::UP.to_string();
        let status = json!({
            "interfaceStatuses": {
                "Ethernet1": {
                    "linkStatus": "disabled",
                    "lineProtocolStatus": "connected",
                    "interfaceType": "10GBASE-SR",
                    "bandwidth": "10G"
                }
            }
        });
        enrich_from_status(&mut entries, &status);
        // Already-known admin status is untouched
        assert_eq!(entries[0].admin_status, "up");
        assert_eq!(entries[0].oper_status, "up");
        assert_eq!(entries[0].port_type, "10GBASE-SR");
        assert_eq!(entries[0].speed, Some(10_000_000_000));
    }

    #[test]
    fn test_status_enrichment_disabled_means_admin_down() {
        let mut entries = vec![view("Ethernet1")];
        let status = json!({
            "interfaceStatuses": {
                "Ethernet1": {"linkStatus": "disabled"}
            }
        });
        enrich_from_status(&mut entries, &status);
        assert_eq!(entries[0].admin_status, "down");
        assert_eq!(entries[0].oper_status, "down");
    }

    #[test]
    fn test_status_enrichment_unrecognized_protocol_is_down() {
        let mut entries = vec![view("Ethernet1")];
        let status = json!({
            "interfaceStatuses": {
                "Ethernet1": {"lineProtocolStatus": "testing"}
            }
        });
        enrich_from_status(&mut entries, &status);
        // The status table always has a link state; it never leaves an
        // interface unknown
        assert_eq!(entries[0].oper_status, "down");
    }

    #[test]
    fn test_members_excluded_and_port_channels_synthesized() {
        let entries = vec![view("Ethernet1"), view("Ethernet2"), view("Ethernet3")];
        let members: HashSet<String> =
            ["Ethernet1".to_string(), "Ethernet2".to_string()].into();
        let pcs = vec![pc("Port-Channel10", 10)];

        let merged = merge_standalone(entries, &members, &pcs);
        let names: Vec<&str> = merged.iter().map(|e| e.interface_name.as_str()).collect();
        assert_eq!(names, vec!["Ethernet3", "Port-Channel10"]);

        // Standalone set and member set are disjoint
        assert!(merged.iter().all(|e| !members.contains(&e.interface_name)));
        let synthetic = &merged[1];
        assert!(synthetic.is_port_channel);
        assert_eq!(synthetic.port_type, "Port-Channel");
        assert_eq!(synthetic.speed, None);
        assert_eq!(synthetic.trunk_vlans.as_deref(), Some("10,20"));
    }

    #[test]
    fn test_dedupe_keeps_most_recent_sync() {
        let now = Utc::now();
        let older = Interface {
            id: 1,
            switch_id: 1,
            interface_name: "Ethernet1".to_string(),
            mode: interface_mode::ACCESS.to_string(),
            admin_status: link_status::UP.to_string(),
            oper_status: link_status::UP.to_string(),
            vlan_id: Some(10),
            native_vlan_id: None,
            trunk_vlans: None,
            speed: None,
            description: String::new(),
            port_type: String::new(),
            transceiver_temp: None,
            is_port_channel_member: false,
            last_synced: Some(now - Duration::hours(1)),
        };
        let mut newer = older.clone();
        newer.id = 2;
        newer.vlan_id = Some(20);
        newer.last_synced = Some(now);

        let deduped = dedupe_by_name(vec![older, newer]);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].vlan_id, Some(20));
    }

    #[test]
    fn test_parse_interface_entry_probes_nested_switchport() {
        let entry = json!({
            "description": "uplink",
            "switchportInfo": {
                "mode": "trunk",
                "trunkAllowedVlans": "10,20",
                "trunkNativeVlanId": 1
            }
        });
        let view = parse_interface_entry("Ethernet1", entry.as_object().unwrap());
        assert_eq!(view.mode, "trunk");
        assert_eq!(view.native_vlan_id, Some(1));
        assert_eq!(view.trunk_vlans.as_deref(), Some("10,20"));
        assert_eq!(view.description, "uplink");
    }

    #[test]
    fn test_parse_port_channels_with_switchport_detail() {
        let summary = json!({
            "portChannels": {
                "Port-Channel10": {
                    "protocol": "lacp",
                    "activePorts": {"Ethernet1": {}, "Ethernet2": {}},
                    "inactivePorts": {}
                }
            }
        });
        let switchports = json!({
            "switchports": {
                "Port-Channel10": {
                    "switchportInfo": {
                        "mode": "trunk",
                        "trunkAllowedVlans": "10,20",
                        "trunkNativeVlanId": 1
                    }
                }
            }
        });
        let parsed = parse_port_channels(&summary, &switchports);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].port_channel_number, 10);
        assert_eq!(parsed[0].members, vec!["Ethernet1", "Ethernet2"]);
        assert_eq!(parsed[0].lacp_mode, "active");
        assert_eq!(parsed[0].mode, "trunk");
        assert_eq!(parsed[0].trunk_vlans.as_deref(), Some("10,20"));
        // The summary carries no admin state; never invent one
        assert_eq!(parsed[0].admin_status, "unknown");
    }

    #[test]
    fn test_parse_port_channels_reads_admin_status() {
        let summary = json!({
            "portChannels": {
                "Port-Channel20": {
                    "adminState": "disabled",
                    "linkStatus": "down",
                    "activePorts": {}
                }
            }
        });
        let parsed = parse_port_channels(&summary, &Value::Null);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].admin_status, "down");
        assert_eq!(parsed[0].oper_status, "down");
    }
}
