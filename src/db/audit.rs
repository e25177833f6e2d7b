use anyhow::Result;
use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::models::*;

/// Append-only audit trail database operations
pub struct AuditRepo;

impl AuditRepo {
    pub async fn insert(
        pool: &Pool<Sqlite>,
        user_id: Option<i64>,
        action: &str,
        target_type: &str,
        target_id: Option<i64>,
        details: &str,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_log (user_id, action, target_type, target_id, details, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(action)
        .bind(target_type)
        .bind(target_id)
        .bind(details)
        .bind(Utc::now())
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn list_recent(pool: &Pool<Sqlite>, limit: i32) -> Result<Vec<AuditEntry>> {
        let rows = sqlx::query_as::<_, AuditEntry>(
            r#"
            SELECT id, user_id, action, target_type, target_id, details, created_at
            FROM audit_log ORDER BY created_at DESC LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }
}
