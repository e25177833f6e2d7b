use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::audit;
use crate::auth::AuthUser;
use crate::codec::{self, ConfigDiff};
use crate::models::*;
use crate::workflow::{self, BackupOutcome, RestoreOutcome};
use crate::AppState;

use super::{created, load_switch, ApiError};

/// GET /api/switches/:id/backups
pub async fn list(
    _auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<ConfigBackup>>, ApiError> {
    load_switch(&state.store, id).await?;
    let backups = state.store.list_backups(id).await?;
    Ok(Json(backups))
}

/// POST /api/switches/:id/backups
pub async fn create(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<CreateBackupRequest>,
) -> Result<(StatusCode, Json<BackupOutcome>), ApiError> {
    let switch = load_switch(&state.store, id).await?;

    let outcome = workflow::backup(
        &state.store,
        &switch,
        backup_type::MANUAL,
        Some(auth.user_id()),
        &req.notes,
    )
    .await?;

    audit::record(
        &state.store,
        Some(auth.user_id()),
        "backup",
        "switch",
        Some(id),
        &format!(
            "backup of {}: {}",
            switch.hostname,
            if outcome.changed { "new snapshot" } else { "unchanged" }
        ),
    )
    .await;

    Ok(created(outcome))
}

/// GET /api/backups/:id
pub async fn get(
    _auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<BackupWithContent>, ApiError> {
    let backup = state
        .store
        .get_backup(id)
        .await?
        .ok_or_else(|| ApiError::not_found("backup"))?;
    Ok(Json(backup.into()))
}

/// POST /api/backups/:id/restore
pub async fn restore(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<RestoreOutcome>, ApiError> {
    let backup = state
        .store
        .get_backup(id)
        .await?
        .ok_or_else(|| ApiError::not_found("backup"))?;
    let switch = load_switch(&state.store, backup.switch_id).await?;

    let outcome =
        workflow::restore(&state.store, &switch, &backup, Some(auth.user_id())).await?;

    audit::record(
        &state.store,
        Some(auth.user_id()),
        "restore",
        "switch",
        Some(switch.id),
        &format!(
            "restore of backup {} to {}: {}",
            id,
            switch.hostname,
            if outcome.success { "ok" } else { "failed" }
        ),
    )
    .await;

    Ok(Json(outcome))
}

/// GET /api/backups/:a/diff/:b
///
/// Positional line diff of two stored snapshots. Both must belong to the
/// same switch so the comparison is meaningful.
pub async fn diff(
    _auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path((a, b)): Path<(i64, i64)>,
) -> Result<Json<ConfigDiff>, ApiError> {
    let first = state
        .store
        .get_backup(a)
        .await?
        .ok_or_else(|| ApiError::not_found("backup"))?;
    let second = state
        .store
        .get_backup(b)
        .await?
        .ok_or_else(|| ApiError::not_found("backup"))?;

    if first.switch_id != second.switch_id {
        return Err(ApiError::bad_request(
            "backups belong to different switches",
        ));
    }

    Ok(Json(codec::diff_lines(&first.config_text, &second.config_text)))
}
