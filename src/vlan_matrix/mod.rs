//! Per-interface × per-VLAN tagging matrix: compute the current
//! none/tagged/untagged state from cached switch data, and apply edited
//! assignments back to the device with partial-failure tolerance.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::db::Store;
use crate::eapi::{EapiClient, FORMAT_JSON};
use crate::models::*;
use crate::reconcile::{self, InterfaceSource};

/// Canonical matrix cell states
pub mod assignment {
    pub const NONE: &str = "none";
    pub const TAGGED: &str = "tagged";
    pub const UNTAGGED: &str = "untagged";
}

#[derive(Debug, Clone, Serialize)]
pub struct MatrixRow {
    pub interface: String,
    pub mode: String,
    pub is_port_channel: bool,
    pub assignments: BTreeMap<i64, String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VlanMatrix {
    pub vlans: Vec<Vlan>,
    pub interfaces: Vec<MatrixRow>,
}

/// One edited interface row submitted by the client. The mode is part
/// of the edit: a trunk row with only an untagged VLAN is a valid
/// native-only trunk, not an access port.
#[derive(Debug, Clone, Deserialize)]
pub struct MatrixChange {
    pub interface: String,
    pub mode: String,
    pub assignments: BTreeMap<i64, String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplyMatrixResult {
    pub success: bool,
    pub applied: usize,
    pub errors: Vec<String>,
}

/// Build the matrix from cached interface and VLAN state
pub async fn get_matrix(store: &Store, target: &Switch) -> Result<VlanMatrix> {
    let vlans = store.list_vlans(target.id).await?;
    let interfaces =
        reconcile::list_interfaces(store, target, InterfaceSource::Cache).await?;

    let rows = compute_matrix(&vlans, &interfaces);
    Ok(VlanMatrix {
        vlans,
        interfaces: rows,
    })
}

/// Classify every interface × VLAN pair.
///
/// `untagged`: access (or unknown) mode with the VLAN equal to the
/// configured access VLAN, or no access VLAN set and the pair is the
/// default VLAN 1; trunk mode with the VLAN equal to the native VLAN.
/// `tagged`: trunk mode with the VLAN in the allowed set. Routed
/// interfaces carry nothing.
pub fn compute_matrix(vlans: &[Vlan], interfaces: &[InterfaceView]) -> Vec<MatrixRow> {
    let vlan1_exists = vlans.iter().any(|v| v.vlan_id == 1);

    interfaces
        .iter()
        .map(|iface| {
            let trunk_set = iface
                .trunk_vlans
                .as_deref()
                .map(parse_vlan_list)
                .unwrap_or_default();

            let assignments = vlans
                .iter()
                .map(|v| {
                    let state = cell_state(iface, v.vlan_id, &trunk_set, vlan1_exists);
                    (v.vlan_id, state.to_string())
                })
                .collect();

            MatrixRow {
                interface: iface.interface_name.clone(),
                mode: iface.mode.clone(),
                is_port_channel: iface.is_port_channel,
                assignments,
            }
        })
        .collect()
}

fn cell_state(
    iface: &InterfaceView,
    vlan_id: i64,
    trunk_set: &[i64],
    vlan1_exists: bool,
) -> &'static str {
    match iface.mode.as_str() {
        interface_mode::ROUTED => assignment::NONE,
        interface_mode::TRUNK => {
            if iface.native_vlan_id == Some(vlan_id) {
                assignment::UNTAGGED
            } else if trunk_set.contains(&vlan_id) {
                assignment::TAGGED
            } else {
                assignment::NONE
            }
        }
        _ => {
            // access and unknown modes behave alike
            let untagged = match iface.vlan_id {
                Some(access) if access > 0 => access == vlan_id,
                _ => vlan_id == 1 && vlan1_exists,
            };
            if untagged {
                assignment::UNTAGGED
            } else {
                assignment::NONE
            }
        }
    }
}

/// Parse an EOS VLAN list like "1,10-12,20" into individual ids
pub fn parse_vlan_list(list: &str) -> Vec<i64> {
    let mut out = Vec::new();
    for part in list.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        if let Some((lo, hi)) = part.split_once('-') {
            if let (Ok(lo), Ok(hi)) = (lo.trim().parse::<i64>(), hi.trim().parse::<i64>()) {
                if lo <= hi {
                    out.extend(lo..=hi);
                }
            }
        } else if let Ok(v) = part.parse::<i64>() {
            out.push(v);
        }
    }
    out.sort_unstable();
    out.dedup();
    out
}

fn format_vlan_list(ids: &[i64]) -> String {
    ids.iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Desired switchport configuration derived from one edited matrix row
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedConfig {
    pub mode: String,
    pub access_vlan: Option<i64>,
    pub native_vlan: Option<i64>,
    pub trunk_vlans: Vec<i64>,
}

/// Turn a row of assignments into a concrete interface configuration
/// for the requested mode. Access rows carry exactly one untagged VLAN
/// and no tagged ones; trunk rows carry at most one untagged (the
/// native VLAN) and at least one VLAN overall, so a native-only trunk
/// stays a trunk.
pub fn derive_interface_config(change: &MatrixChange) -> Result<DerivedConfig, String> {
    let mut untagged: Vec<i64> = Vec::new();
    let mut tagged: Vec<i64> = Vec::new();

    for (&vlan_id, state) in &change.assignments {
        match state.as_str() {
            assignment::UNTAGGED => untagged.push(vlan_id),
            assignment::TAGGED => tagged.push(vlan_id),
            assignment::NONE => {}
            other => {
                return Err(format!(
                    "{}: unknown assignment state '{}' for VLAN {}",
                    change.interface, other, vlan_id
                ))
            }
        }
    }

    if untagged.len() > 1 {
        return Err(format!(
            "{}: more than one untagged VLAN ({})",
            change.interface,
            format_vlan_list(&untagged)
        ));
    }

    match change.mode.as_str() {
        interface_mode::ACCESS => {
            if !tagged.is_empty() {
                return Err(format!(
                    "{}: access mode cannot carry tagged VLANs ({})",
                    change.interface,
                    format_vlan_list(&tagged)
                ));
            }
            let access = untagged.first().copied().ok_or_else(|| {
                format!(
                    "{}: access mode requires exactly one untagged VLAN",
                    change.interface
                )
            })?;
            Ok(DerivedConfig {
                mode: interface_mode::ACCESS.to_string(),
                access_vlan: Some(access),
                native_vlan: None,
                trunk_vlans: Vec::new(),
            })
        }
        interface_mode::TRUNK => {
            if untagged.is_empty() && tagged.is_empty() {
                return Err(format!(
                    "{}: trunk mode requires at least one VLAN (tagged or untagged)",
                    change.interface
                ));
            }
            tagged.sort_unstable();
            Ok(DerivedConfig {
                mode: interface_mode::TRUNK.to_string(),
                access_vlan: None,
                native_vlan: untagged.first().copied(),
                trunk_vlans: tagged,
            })
        }
        other => Err(format!(
            "{}: mode must be access or trunk (got '{}')",
            change.interface, other
        )),
    }
}

fn switchport_commands(interface: &str, cfg: &DerivedConfig) -> Vec<String> {
    let mut cmds = vec![format!("interface {}", interface)];
    if cfg.mode == interface_mode::TRUNK {
        cmds.push("switchport mode trunk".to_string());
        if let Some(native) = cfg.native_vlan {
            cmds.push(format!("switchport trunk native vlan {}", native));
        }
        if !cfg.trunk_vlans.is_empty() {
            cmds.push(format!(
                "switchport trunk allowed vlan {}",
                format_vlan_list(&cfg.trunk_vlans)
            ));
        }
    } else {
        cmds.push("switchport mode access".to_string());
        if let Some(access) = cfg.access_vlan {
            cmds.push(format!("switchport access vlan {}", access));
        }
    }
    cmds
}

/// Mirror a derived configuration onto the cached row. Only the mode
/// and VLAN fields are the matrix's to change; status, speed,
/// description and optic data stay as the last sync left them.
fn overlay_cache_row(
    existing: Option<Interface>,
    name: &str,
    cfg: &DerivedConfig,
) -> InterfaceView {
    let mut view = match existing {
        Some(row) => InterfaceView {
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
        },
        None => InterfaceView {
            interface_name: name.to_string(),
            ..Default::default()
        },
    };

    view.mode = cfg.mode.clone();
    view.vlan_id = cfg.access_vlan;
    view.native_vlan_id = cfg.native_vlan;
    view.trunk_vlans = if cfg.trunk_vlans.is_empty() {
        None
    } else {
        Some(format_vlan_list(&cfg.trunk_vlans))
    };
    view
}

/// Push edited matrix rows to the device. Interfaces are processed
/// independently; one failure never aborts the rest.
pub async fn apply_matrix(
    store: &Store,
    target: &Switch,
    changes: &[MatrixChange],
) -> Result<ApplyMatrixResult> {
    let client = EapiClient::new(target)?;

    let mut applied = 0usize;
    let mut errors: Vec<String> = Vec::new();

    for change in changes {
        let cfg = match derive_interface_config(change) {
            Ok(c) => c,
            Err(e) => {
                errors.push(e);
                continue;
            }
        };

        let commands = switchport_commands(&change.interface, &cfg);
        let mut cmds: Vec<&str> = Vec::with_capacity(commands.len() + 1);
        cmds.push("configure");
        cmds.extend(commands.iter().map(String::as_str));

        if let Err(e) = client.run_commands(&cmds, FORMAT_JSON).await {
            errors.push(format!("{}: {}", change.interface, e));
            continue;
        }

        let existing = match store.get_interface(target.id, &change.interface).await {
            Ok(row) => row,
            Err(e) => {
                errors.push(format!("{}: cache read failed: {}", change.interface, e));
                continue;
            }
        };
        let view = overlay_cache_row(existing, &change.interface, &cfg);
        if let Err(e) = store.upsert_interface(target.id, &view).await {
            // Device accepted the change; only the cache write failed
            errors.push(format!("{}: cache update failed: {}", change.interface, e));
            continue;
        }

        applied += 1;
    }

    Ok(ApplyMatrixResult {
        success: errors.is_empty(),
        applied,
        errors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn vlan(id: i64, name: &str) -> Vlan {
        Vlan {
            id,
            switch_id: 1,
            vlan_id: id,
            name: name.to_string(),
            description: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn iface(name: &str, mode: &str) -> InterfaceView {
        InterfaceView {
            interface_name: name.to_string(),
            mode: mode.to_string(),
            ..Default::default()
        }
    }

    fn change(interface: &str, mode: &str, assignments: &[(i64, &str)]) -> MatrixChange {
        MatrixChange {
            interface: interface.to_string(),
            mode: mode.to_string(),
            assignments: assignments
                .iter()
                .map(|(id, s)| (*id, s.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_parse_vlan_list_ranges() {
        assert_eq!(parse_vlan_list("1,10-12,20"), vec![1, 10, 11, 12, 20]);
        assert_eq!(parse_vlan_list(" 5 , 5 ,3 "), vec![3, 5]);
        assert_eq!(parse_vlan_list(""), Vec::<i64>::new());
        assert_eq!(parse_vlan_list("20-10"), Vec::<i64>::new());
    }

    #[test]
    fn test_matrix_trunk_interface() {
        let vlans = vec![vlan(1, "default"), vlan(10, "Servers"), vlan(20, "Voice")];
        let mut trunk = iface("Ethernet1", interface_mode::TRUNK);
        trunk.native_vlan_id = Some(10);
        trunk.trunk_vlans = Some("20".to_string());

        let rows = compute_matrix(&vlans, &[trunk]);
        let a = &rows[0].assignments;
        assert_eq!(a[&1], "none");
        assert_eq!(a[&10], "untagged");
        assert_eq!(a[&20], "tagged");
    }

    #[test]
    fn test_matrix_access_interface() {
        let vlans = vec![vlan(1, "default"), vlan(10, "Servers")];
        let mut access = iface("Ethernet2", interface_mode::ACCESS);
        access.vlan_id = Some(10);

        let rows = compute_matrix(&vlans, &[access]);
        assert_eq!(rows[0].assignments[&10], "untagged");
        assert_eq!(rows[0].assignments[&1], "none");
    }

    #[test]
    fn test_matrix_access_defaults_to_vlan1() {
        let vlans = vec![vlan(1, "default"), vlan(10, "Servers")];
        let access = iface("Ethernet3", interface_mode::ACCESS);

        let rows = compute_matrix(&vlans, &[access]);
        assert_eq!(rows[0].assignments[&1], "untagged");
        assert_eq!(rows[0].assignments[&10], "none");
    }

    #[test]
    fn test_matrix_no_default_when_vlan1_missing() {
        let vlans = vec![vlan(10, "Servers")];
        let access = iface("Ethernet3", interface_mode::ACCESS);

        let rows = compute_matrix(&vlans, &[access]);
        assert_eq!(rows[0].assignments[&10], "none");
    }

    #[test]
    fn test_matrix_routed_carries_nothing() {
        let vlans = vec![vlan(1, "default"), vlan(10, "Servers")];
        let mut routed = iface("Ethernet4", interface_mode::ROUTED);
        routed.vlan_id = Some(10);

        let rows = compute_matrix(&vlans, &[routed]);
        assert!(rows[0].assignments.values().all(|s| s == "none"));
    }

    #[test]
    fn test_derive_rejects_multiple_untagged() {
        let c = change("Ethernet1", "trunk", &[(10, "untagged"), (20, "untagged")]);
        let err = derive_interface_config(&c).unwrap_err();
        assert!(err.contains("more than one untagged"));
    }

    #[test]
    fn test_derive_rejects_empty_trunk_row() {
        let c = change("Ethernet1", "trunk", &[(10, "none"), (20, "none")]);
        let err = derive_interface_config(&c).unwrap_err();
        assert!(err.contains("at least one VLAN"));
    }

    #[test]
    fn test_derive_rejects_unknown_mode() {
        let c = change("Ethernet1", "routed", &[(10, "untagged")]);
        assert!(derive_interface_config(&c).is_err());
    }

    #[test]
    fn test_derive_access_from_single_untagged() {
        let c = change("Ethernet1", "access", &[(10, "untagged")]);
        let cfg = derive_interface_config(&c).unwrap();
        assert_eq!(cfg.mode, "access");
        assert_eq!(cfg.access_vlan, Some(10));
        assert!(cfg.trunk_vlans.is_empty());
    }

    #[test]
    fn test_derive_access_rejects_tagged() {
        let c = change("Ethernet1", "access", &[(10, "untagged"), (20, "tagged")]);
        let err = derive_interface_config(&c).unwrap_err();
        assert!(err.contains("tagged"));
    }

    #[test]
    fn test_derive_access_requires_untagged() {
        let c = change("Ethernet1", "access", &[(10, "none")]);
        let err = derive_interface_config(&c).unwrap_err();
        assert!(err.contains("untagged"));
    }

    #[test]
    fn test_derive_trunk_from_tagged_set() {
        let c = change(
            "Ethernet1",
            "trunk",
            &[(10, "untagged"), (20, "tagged"), (30, "tagged")],
        );
        let cfg = derive_interface_config(&c).unwrap();
        assert_eq!(cfg.mode, "trunk");
        assert_eq!(cfg.native_vlan, Some(10));
        assert_eq!(cfg.trunk_vlans, vec![20, 30]);
        assert_eq!(cfg.access_vlan, None);
    }

    #[test]
    fn test_derive_trunk_without_native() {
        let c = change("Ethernet1", "trunk", &[(20, "tagged")]);
        let cfg = derive_interface_config(&c).unwrap();
        assert_eq!(cfg.mode, "trunk");
        assert_eq!(cfg.native_vlan, None);
        assert_eq!(cfg.trunk_vlans, vec![20]);
    }

    #[test]
    fn test_derive_trunk_native_only_stays_trunk() {
        // An untagged VLAN alone is a native-only trunk, not access
        let c = change("Ethernet1", "trunk", &[(10, "untagged"), (20, "none")]);
        let cfg = derive_interface_config(&c).unwrap();
        assert_eq!(cfg.mode, "trunk");
        assert_eq!(cfg.native_vlan, Some(10));
        assert_eq!(cfg.access_vlan, None);
        assert!(cfg.trunk_vlans.is_empty());
    }

    #[test]
    fn test_switchport_commands_trunk() {
        let cfg = DerivedConfig {
            mode: interface_mode::TRUNK.to_string(),
            access_vlan: None,
            native_vlan: Some(10),
            trunk_vlans: vec![20, 30],
        };
        assert_eq!(
            switchport_commands("Ethernet1", &cfg),
            vec![
                "interface Ethernet1",
                "switchport mode trunk",
                "switchport trunk native vlan 10",
                "switchport trunk allowed vlan 20,30",
            ]
        );
    }

    #[test]
    fn test_switchport_commands_native_only_trunk() {
        let cfg = DerivedConfig {
            mode: interface_mode::TRUNK.to_string(),
            access_vlan: None,
            native_vlan: Some(10),
            trunk_vlans: Vec::new(),
        };
        // No "allowed vlan" line when the tagged set is empty
        assert_eq!(
            switchport_commands("Ethernet1", &cfg),
            vec![
                "interface Ethernet1",
                "switchport mode trunk",
                "switchport trunk native vlan 10",
            ]
        );
    }

    #[test]
    fn test_overlay_preserves_non_vlan_fields() {
        let row = Interface {
            id: 7,
            switch_id: 1,
            interface_name: "Ethernet1".to_string(),
            mode: interface_mode::ACCESS.to_string(),
            admin_status: link_status::UP.to_string(),
            oper_status: link_status::UP.to_string(),
            vlan_id: Some(10),
            native_vlan_id: None,
            trunk_vlans: None,
            speed: Some(10_000_000_000),
            description: "uplink".to_string(),
            port_type: "10GBASE-SR".to_string(),
            transceiver_temp: Some(34.5),
            is_port_channel_member: false,
            last_synced: Some(Utc::now()),
        };
        let cfg = DerivedConfig {
            mode: interface_mode::TRUNK.to_string(),
            access_vlan: None,
            native_vlan: Some(10),
            trunk_vlans: vec![20, 30],
        };

        let view = overlay_cache_row(Some(row), "Ethernet1", &cfg);
        assert_eq!(view.mode, "trunk");
        assert_eq!(view.vlan_id, None);
        assert_eq!(view.native_vlan_id, Some(10));
        assert_eq!(view.trunk_vlans.as_deref(), Some("20,30"));
        // Everything the matrix does not own survives the write
        assert_eq!(view.admin_status, "up");
        assert_eq!(view.oper_status, "up");
        assert_eq!(view.speed, Some(10_000_000_000));
        assert_eq!(view.description, "uplink");
        assert_eq!(view.port_type, "10GBASE-SR");
        assert_eq!(view.transceiver_temp, Some(34.5));
    }

    #[test]
    fn test_overlay_without_cached_row() {
        let cfg = DerivedConfig {
            mode: interface_mode::ACCESS.to_string(),
            access_vlan: Some(10),
            native_vlan: None,
            trunk_vlans: Vec::new(),
        };
        let view = overlay_cache_row(None, "Ethernet9", &cfg);
        assert_eq!(view.interface_name, "Ethernet9");
        assert_eq!(view.mode, "access");
        assert_eq!(view.vlan_id, Some(10));
        assert_eq!(view.admin_status, "unknown");
    }

    #[test]
    fn test_switchport_commands_access() {
        let cfg = DerivedConfig {
            mode: interface_mode::ACCESS.to_string(),
            access_vlan: Some(10),
            native_vlan: None,
            trunk_vlans: Vec::new(),
        };
        assert_eq!(
            switchport_commands("Ethernet2", &cfg),
            vec![
                "interface Ethernet2",
                "switchport mode access",
                "switchport access vlan 10",
            ]
        );
    }
}
