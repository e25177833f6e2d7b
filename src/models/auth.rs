use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User account for console operators
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// Canonical user roles
pub mod user_role {
    pub const ADMIN: &str = "admin";
    pub const OPERATOR: &str = "operator";
    pub const VIEWER: &str = "viewer";
}

/// JWT claims carried by authenticated requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub username: String,
    pub role: String,
    pub exp: usize,
}

/// LoginRequest for POST /api/auth/login
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// LoginResponse carries the issued token
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    pub role: String,
}
