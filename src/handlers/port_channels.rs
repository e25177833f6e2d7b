use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::json;
use std::sync::Arc;

use crate::audit;
use crate::auth::AuthUser;
use crate::models::*;
use crate::reconcile;
use crate::AppState;

use super::{load_switch, ApiError};

/// GET /api/switches/:id/port-channels
pub async fn list(
    _auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<PortChannelWithMembers>>, ApiError> {
    load_switch(&state.store, id).await?;

    let channels = state.store.list_port_channels(id).await?;
    let mut out = Vec::with_capacity(channels.len());
    for pc in channels {
        let members = state.store.list_port_channel_members(pc.id).await?;
        out.push(PortChannelWithMembers {
            port_channel: pc,
            members,
        });
    }
    Ok(Json(out))
}

/// POST /api/switches/:id/port-channels/sync
pub async fn sync(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let switch = load_switch(&state.store, id).await?;
    let synced = reconcile::sync_port_channels(&state.store, &switch).await?;

    audit::record(
        &state.store,
        Some(auth.user_id()),
        "sync",
        "port_channels",
        Some(id),
        &format!("synced {} port-channels from {}", synced, switch.hostname),
    )
    .await;

    Ok(Json(json!({"success": true, "synced": synced})))
}
