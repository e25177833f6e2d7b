use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::audit;
use crate::auth::AuthUser;
use crate::eapi::{EapiClient, FORMAT_JSON};
use crate::models::*;
use crate::reconcile::{self, InterfaceSource};
use crate::AppState;

use super::{load_switch, ApiError};

#[derive(Debug, Deserialize)]
pub struct SourceQuery {
    #[serde(default)]
    pub source: Option<String>,
}

/// GET /api/switches/:id/interfaces?source=cache|live
pub async fn list(
    _auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(query): Query<SourceQuery>,
) -> Result<Json<Vec<InterfaceView>>, ApiError> {
    let source = match query.source.as_deref() {
        None => InterfaceSource::Cache,
        Some(s) => InterfaceSource::parse(s)
            .ok_or_else(|| ApiError::bad_request("source must be 'cache' or 'live'"))?,
    };

    let switch = load_switch(&state.store, id).await?;
    let interfaces = reconcile::list_interfaces(&state.store, &switch, source).await?;
    Ok(Json(interfaces))
}

/// POST /api/switches/:id/interfaces/sync
pub async fn sync(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<SyncResult>, ApiError> {
    let switch = load_switch(&state.store, id).await?;
    let result = reconcile::sync_interfaces(&state.store, &switch).await?;

    audit::record(
        &state.store,
        Some(auth.user_id()),
        "sync",
        "interfaces",
        Some(id),
        &format!("synced {} interfaces from {}", result.synced, switch.hostname),
    )
    .await;

    Ok(Json(result))
}

/// PUT /api/switches/:id/interfaces/:name
///
/// Push a partial interface configuration to the device, then mirror the
/// change into the cache row.
pub async fn configure(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path((id, name)): Path<(i64, String)>,
    Json(req): Json<ConfigureInterfaceRequest>,
) -> Result<Json<InterfaceView>, ApiError> {
    let switch = load_switch(&state.store, id).await?;
    let commands = build_commands(&name, &req)?;

    let client = EapiClient::new(&switch)?;
    let mut cmds: Vec<&str> = Vec::with_capacity(commands.len() + 1);
    cmds.push("configure");
    cmds.extend(commands.iter().map(String::as_str));
    client.run_commands(&cmds, FORMAT_JSON).await?;

    let mut view = match state.store.get_interface(id, &name).await? {
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
            interface_name: name.clone(),
            ..Default::default()
        },
    };

    if let Some(mode) = &req.mode {
        view.mode = mode.clone();
    }
    if req.vlan_id.is_some() {
        view.vlan_id = req.vlan_id;
    }
    if req.native_vlan_id.is_some() {
        view.native_vlan_id = req.native_vlan_id;
    }
    if req.trunk_vlans.is_some() {
        view.trunk_vlans = req.trunk_vlans.clone();
    }
    if let Some(desc) = &req.description {
        view.description = desc.clone();
    }
    if let Some(enabled) = req.enabled {
        view.admin_status = if enabled {
            link_status::UP.to_string()
        } else {
            link_status::DOWN.to_string()
        };
    }

    state.store.upsert_interface(id, &view).await?;

    audit::record(
        &state.store,
        Some(auth.user_id()),
        "configure",
        "interface",
        Some(id),
        &format!("configured {} on {}", name, switch.hostname),
    )
    .await;

    Ok(Json(view))
}

/// Translate a partial update into CLI commands. Mode-dependent fields
/// are validated here so the device never sees a contradictory batch.
fn build_commands(name: &str, req: &ConfigureInterfaceRequest) -> Result<Vec<String>, ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::bad_request("interface name is required"));
    }

    let mut cmds = vec![format!("interface {}", name)];

    if let Some(mode) = &req.mode {
        match mode.as_str() {
            interface_mode::ACCESS => cmds.push("switchport mode access".to_string()),
            interface_mode::TRUNK => cmds.push("switchport mode trunk".to_string()),
            interface_mode::ROUTED => cmds.push("no switchport".to_string()),
            other => {
                return Err(ApiError::bad_request(format!(
                    "mode must be access, trunk, or routed (got '{}')",
                    other
                )))
            }
        }
    }

    if let Some(vlan) = req.vlan_id {
        if !(VLAN_ID_MIN..=VLAN_ID_MAX).contains(&vlan) {
            return Err(ApiError::bad_request("vlan_id out of range"));
        }
        cmds.push(format!("switchport access vlan {}", vlan));
    }
    if let Some(native) = req.native_vlan_id {
        if !(VLAN_ID_MIN..=VLAN_ID_MAX).contains(&native) {
            return Err(ApiError::bad_request("native_vlan_id out of range"));
        }
        cmds.push(format!("switchport trunk native vlan {}", native));
    }
    if let Some(trunk) = &req.trunk_vlans {
        if !trunk.trim().is_empty() {
            cmds.push(format!("switchport trunk allowed vlan {}", trunk.trim()));
        }
    }
    if let Some(desc) = &req.description {
        if desc.trim().is_empty() {
            cmds.push("no description".to_string());
        } else {
            cmds.push(format!("description {}", desc.trim()));
        }
    }
    if let Some(enabled) = req.enabled {
        cmds.push(if enabled { "no shutdown" } else { "shutdown" }.to_string());
    }

    if cmds.len() == 1 {
        return Err(ApiError::bad_request("no configuration fields provided"));
    }
    Ok(cmds)
}
