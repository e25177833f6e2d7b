use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use std::sync::Arc;

use crate::audit;
use crate::auth::AuthUser;
use crate::eapi::{EapiClient, FORMAT_JSON};
use crate::models::*;
use crate::reconcile;
use crate::AppState;

use super::{created, load_switch, ApiError, MessageResponse};

/// GET /api/switches/:id/vlans
pub async fn list(
    _auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Vlan>>, ApiError> {
    load_switch(&state.store, id).await?;
    let vlans = state.store.list_vlans(id).await?;
    Ok(Json(vlans))
}

/// POST /api/switches/:id/vlans
///
/// Creates the VLAN on the device first; the cache row is only written
/// after the device accepts it.
pub async fn create(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<CreateVlanRequest>,
) -> Result<(StatusCode, Json<Vlan>), ApiError> {
    if !(VLAN_ID_MIN..=VLAN_ID_MAX).contains(&req.vlan_id) {
        return Err(ApiError::bad_request(format!(
            "vlan_id must be between {} and {}",
            VLAN_ID_MIN, VLAN_ID_MAX
        )));
    }

    let switch = load_switch(&state.store, id).await?;
    let name = if req.name.trim().is_empty() {
        format!("VLAN{:04}", req.vlan_id)
    } else {
        sanitize_vlan_name(&req.name)
    };

    let client = EapiClient::new(&switch)?;
    let cmds = [
        "configure".to_string(),
        format!("vlan {}", req.vlan_id),
        format!("name {}", name),
    ];
    let cmd_refs: Vec<&str> = cmds.iter().map(String::as_str).collect();
    client.run_commands(&cmd_refs, FORMAT_JSON).await?;

    let vlan = state
        .store
        .upsert_vlan(id, req.vlan_id, &name, &req.description)
        .await?;

    audit::record(
        &state.store,
        Some(auth.user_id()),
        "create",
        "vlan",
        Some(id),
        &format!("created VLAN {} ({}) on {}", req.vlan_id, name, switch.hostname),
    )
    .await;

    Ok(created(vlan))
}

/// DELETE /api/switches/:id/vlans/:vlan_id
pub async fn delete(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path((id, vlan_id)): Path<(i64, i64)>,
) -> Result<Json<MessageResponse>, ApiError> {
    if vlan_id == 1 {
        return Err(ApiError::bad_request("the default VLAN cannot be deleted"));
    }

    let switch = load_switch(&state.store, id).await?;

    let client = EapiClient::new(&switch)?;
    let cmds = ["configure".to_string(), format!("no vlan {}", vlan_id)];
    let cmd_refs: Vec<&str> = cmds.iter().map(String::as_str).collect();
    client.run_commands(&cmd_refs, FORMAT_JSON).await?;

    state.store.delete_vlan(id, vlan_id).await?;

    audit::record(
        &state.store,
        Some(auth.user_id()),
        "delete",
        "vlan",
        Some(id),
        &format!("deleted VLAN {} on {}", vlan_id, switch.hostname),
    )
    .await;

    Ok(MessageResponse::new("vlan deleted"))
}

/// POST /api/switches/:id/vlans/sync
pub async fn sync(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let switch = load_switch(&state.store, id).await?;
    let synced = reconcile::sync_vlans(&state.store, &switch).await?;

    audit::record(
        &state.store,
        Some(auth.user_id()),
        "sync",
        "vlans",
        Some(id),
        &format!("synced {} VLANs from {}", synced, switch.hostname),
    )
    .await;

    Ok(Json(json!({"success": true, "synced": synced})))
}
