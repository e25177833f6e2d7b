use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::audit;
use crate::auth::AuthUser;
use crate::eapi::{EapiClient, RUNNING_CONFIG_COMMANDS};
use crate::workflow::{self, ApplyOptions, ApplyOutcome, ValidationReport};
use crate::AppState;

use super::{load_switch, ApiError};

/// GET /api/switches/:id/config
pub async fn get_running(
    _auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let switch = load_switch(&state.store, id).await?;
    let client = EapiClient::new(&switch)?;
    let config = client.run_first_ok_text(RUNNING_CONFIG_COMMANDS).await?;

    Ok(Json(json!({
        "switch_id": id,
        "hostname": switch.hostname,
        "config": config,
    })))
}

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub config: String,
}

/// POST /api/switches/:id/config/validate
///
/// Pure syntax check; never contacts the device.
pub async fn validate(
    _auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<ValidateRequest>,
) -> Result<Json<ValidationReport>, ApiError> {
    load_switch(&state.store, id).await?;
    Ok(Json(workflow::validate_syntax(&req.config)))
}

#[derive(Debug, Deserialize)]
pub struct ApplyConfigRequest {
    pub config: String,
    #[serde(default = "default_true")]
    pub auto_backup: bool,
    #[serde(default)]
    pub validate_only: bool,
    #[serde(default)]
    pub reload_on_complete: bool,
}

fn default_true() -> bool {
    true
}

/// POST /api/switches/:id/config/apply
pub async fn apply(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<ApplyConfigRequest>,
) -> Result<Json<ApplyOutcome>, ApiError> {
    let switch = load_switch(&state.store, id).await?;

    let opts = ApplyOptions {
        auto_backup: req.auto_backup,
        validate_only: req.validate_only,
        reload_on_complete: req.reload_on_complete,
    };
    let outcome =
        workflow::apply_config(&state.store, &switch, &req.config, &opts, Some(auth.user_id()))
            .await?;

    let detail = if req.validate_only {
        format!("validated config for {}", switch.hostname)
    } else if outcome.success {
        format!("applied config to {}", switch.hostname)
    } else {
        format!(
            "config apply to {} failed: {}",
            switch.hostname,
            outcome.error.as_deref().unwrap_or("unknown error")
        )
    };
    audit::record(
        &state.store,
        Some(auth.user_id()),
        "apply_config",
        "switch",
        Some(id),
        &detail,
    )
    .await;

    Ok(Json(outcome))
}
