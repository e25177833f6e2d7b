use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Canonical backup type values
pub mod backup_type {
    pub const MANUAL: &str = "manual";
    pub const BEFORE_CHANGE: &str = "before_change";
}

/// ConfigBackup is an immutable snapshot of a switch's configuration.
/// Identical content for the same switch is never stored twice; the
/// config_hash column is the dedup key.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ConfigBackup {
    pub id: i64,
    pub switch_id: i64,
    #[serde(skip_serializing)]
    pub config_text: String,
    pub config_hash: String,
    pub backup_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub notes: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_changes: Option<String>,
}

/// BackupWithContent includes the full configuration text (single-backup
/// endpoint only; list endpoints omit it)
#[derive(Debug, Clone, Serialize)]
pub struct BackupWithContent {
    pub id: i64,
    pub switch_id: i64,
    pub config_text: String,
    pub config_hash: String,
    pub backup_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub notes: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_changes: Option<String>,
}

impl From<ConfigBackup> for BackupWithContent {
    fn from(b: ConfigBackup) -> Self {
        Self {
            id: b.id,
            switch_id: b.switch_id,
            config_text: b.config_text,
            config_hash: b.config_hash,
            backup_type: b.backup_type,
            created_by: b.created_by,
            created_at: b.created_at,
            notes: b.notes,
            config_changes: b.config_changes,
        }
    }
}

/// CreateBackupRequest triggers a manual backup
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBackupRequest {
    #[serde(default)]
    pub notes: String,
}

/// AuditEntry is one row of the append-only audit trail
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuditEntry {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    pub action: String,
    pub target_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_id: Option<i64>,
    pub details: String,
    pub created_at: DateTime<Utc>,
}
