pub mod auth;
pub mod audit;
pub mod backups;
pub mod configs;
pub mod interfaces;
pub mod port_channels;
pub mod switches;
pub mod vlan_matrix;
pub mod vlans;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::eapi::EapiError;

/// Error response - {"error": "message"}
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// API error type
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }

    pub fn not_found(resource: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: format!("{} not found", resource),
        }
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: msg.into(),
        }
    }

    pub fn bad_gateway(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: msg.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse::new(self.message)),
        )
            .into_response()
    }
}

/// Explicit error-kind mapping at the boundary: device-side failures are
/// the gateway's fault (502), malformed requests are the caller's (400).
impl From<EapiError> for ApiError {
    fn from(err: EapiError) -> Self {
        match err {
            EapiError::Validation(msg) => Self::bad_request(msg),
            EapiError::Communication(msg) => Self::bad_gateway(format!("switch unreachable: {}", msg)),
            EapiError::Command { .. } => Self::bad_gateway(err.to_string()),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        // Check for typed errors first (no fragile string matching)
        if let Some(nf) = err.downcast_ref::<crate::db::NotFoundError>() {
            return Self::not_found(&nf.to_string());
        }
        match err.downcast::<EapiError>() {
            Ok(eapi) => eapi.into(),
            Err(err) => Self::internal(err.to_string()),
        }
    }
}

/// Message response for simple status messages
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(msg: impl Into<String>) -> Json<Self> {
        Json(Self { message: msg.into() })
    }
}

/// Response helper: return 201 Created with JSON body
pub fn created<T: Serialize>(item: T) -> (StatusCode, Json<T>) {
    (StatusCode::CREATED, Json(item))
}

/// Healthcheck endpoint - returns 200 OK with status
pub async fn healthcheck() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "eos-console",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Fetch a switch row or produce a 404
pub async fn load_switch(
    store: &crate::db::Store,
    id: i64,
) -> Result<crate::models::Switch, ApiError> {
    store
        .get_switch(id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("switch"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_is_debuggable_in_results() {
        // Handler helpers return Result<_, ApiError>; unwrap/expect in
        // tests needs the error side to format
        let err: Result<(), ApiError> = Err(ApiError::bad_request("nope"));
        let rendered = format!("{:?}", err);
        assert!(rendered.contains("nope"));
    }

    #[test]
    fn test_eapi_error_kind_mapping() {
        let e = ApiError::from(EapiError::Validation("bad input".to_string()));
        assert_eq!(e.status, StatusCode::BAD_REQUEST);

        let e = ApiError::from(EapiError::Communication("timeout".to_string()));
        assert_eq!(e.status, StatusCode::BAD_GATEWAY);

        let e = ApiError::from(EapiError::command("rejected"));
        assert_eq!(e.status, StatusCode::BAD_GATEWAY);
    }
}
