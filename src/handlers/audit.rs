use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::auth::AuthUser;
use crate::models::AuditEntry;
use crate::AppState;

use super::ApiError;

#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    #[serde(default = "default_limit")]
    pub limit: i32,
}

fn default_limit() -> i32 {
    100
}

/// GET /api/audit
pub async fn list(
    _auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<AuditQuery>,
) -> Result<Json<Vec<AuditEntry>>, ApiError> {
    let limit = query.limit.clamp(1, 1000);
    let entries = state.store.list_audit_entries(limit).await?;
    Ok(Json(entries))
}
