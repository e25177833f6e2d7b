use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::audit;
use crate::auth::AuthUser;
use crate::vlan_matrix::{self, ApplyMatrixResult, MatrixChange, VlanMatrix};
use crate::AppState;

use super::{load_switch, ApiError};

/// GET /api/switches/:id/vlan-matrix
pub async fn get(
    _auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<VlanMatrix>, ApiError> {
    let switch = load_switch(&state.store, id).await?;
    let matrix = vlan_matrix::get_matrix(&state.store, &switch).await?;
    Ok(Json(matrix))
}

/// POST /api/switches/:id/vlan-matrix
///
/// Partial-failure tolerant: a rejected interface is reported in
/// `errors` while the rest are still applied.
pub async fn apply(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(changes): Json<Vec<MatrixChange>>,
) -> Result<Json<ApplyMatrixResult>, ApiError> {
    if changes.is_empty() {
        return Err(ApiError::bad_request("no changes provided"));
    }

    let switch = load_switch(&state.store, id).await?;
    let result = vlan_matrix::apply_matrix(&state.store, &switch, &changes).await?;

    audit::record(
        &state.store,
        Some(auth.user_id()),
        "apply_matrix",
        "switch",
        Some(id),
        &format!(
            "vlan matrix on {}: {} applied, {} errors",
            switch.hostname,
            result.applied,
            result.errors.len()
        ),
    )
    .await;

    Ok(Json(result))
}
