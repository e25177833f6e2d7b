use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use std::sync::Arc;

use crate::audit;
use crate::auth::AuthUser;
use crate::eapi::{EapiClient, FORMAT_JSON};
use crate::models::*;
use crate::AppState;

use super::{created, load_switch, ApiError, MessageResponse};

/// GET /api/switches
pub async fn list(
    _auth: AuthUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Switch>>, ApiError> {
    let switches = state.store.list_switches().await?;
    Ok(Json(switches))
}

/// GET /api/switches/:id
pub async fn get(
    _auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Switch>, ApiError> {
    let switch = load_switch(&state.store, id).await?;
    Ok(Json(switch))
}

/// POST /api/switches
pub async fn create(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateSwitchRequest>,
) -> Result<(StatusCode, Json<Switch>), ApiError> {
    if req.hostname.trim().is_empty() || req.ip_address.trim().is_empty() {
        return Err(ApiError::bad_request("hostname and ip_address are required"));
    }
    if req.username.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("username and password are required"));
    }

    let switch = state.store.create_switch(&req).await?;
    audit::record(
        &state.store,
        Some(auth.user_id()),
        "create",
        "switch",
        Some(switch.id),
        &format!("added switch {} ({})", switch.hostname, switch.ip_address),
    )
    .await;

    Ok(created(switch))
}

/// PUT /api/switches/:id
pub async fn update(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateSwitchRequest>,
) -> Result<Json<Switch>, ApiError> {
    if req.hostname.trim().is_empty() || req.ip_address.trim().is_empty() {
        return Err(ApiError::bad_request("hostname and ip_address are required"));
    }

    let switch = state.store.update_switch(id, &req).await?;
    audit::record(
        &state.store,
        Some(auth.user_id()),
        "update",
        "switch",
        Some(id),
        &format!("updated switch {}", switch.hostname),
    )
    .await;

    Ok(Json(switch))
}

/// DELETE /api/switches/:id
pub async fn delete(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let switch = load_switch(&state.store, id).await?;
    state.store.delete_switch(id).await?;

    audit::record(
        &state.store,
        Some(auth.user_id()),
        "delete",
        "switch",
        Some(id),
        &format!("removed switch {}", switch.hostname),
    )
    .await;

    Ok(MessageResponse::new("switch deleted"))
}

/// POST /api/switches/:id/test
///
/// Reachability probe: run `show version` and record the reported model
/// and EOS version on success. An unreachable device is a normal result
/// here, not an error response.
pub async fn test(
    _auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<SwitchTestResult>, ApiError> {
    let switch = load_switch(&state.store, id).await?;
    let client = EapiClient::new(&switch)?;

    match client.run_command("show version", FORMAT_JSON).await {
        Ok(version) => {
            let model = str_field(&version, "modelName");
            let eos_version = str_field(&version, "version");
            let serial_number = str_field(&version, "serialNumber");

            if let (Some(m), Some(v)) = (&model, &eos_version) {
                state.store.update_switch_facts(id, m, v).await?;
            }

            Ok(Json(SwitchTestResult {
                reachable: true,
                model,
                eos_version,
                serial_number,
                error: None,
            }))
        }
        Err(e) => Ok(Json(SwitchTestResult {
            reachable: false,
            model: None,
            eos_version: None,
            serial_number: None,
            error: Some(e.to_string()),
        })),
    }
}

fn str_field(v: &Value, key: &str) -> Option<String> {
    v.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
