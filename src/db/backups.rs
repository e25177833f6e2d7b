use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::models::*;

const SELECT_BACKUP: &str = r#"
    SELECT id, switch_id, config_text, config_hash, backup_type,
           created_by, created_at, notes, config_changes
    FROM config_backups
"#;

/// Fields for a new backup row. Callers must run the hash-dedup check
/// first (ConfigWorkflow::backup does); this insert is unconditional.
#[derive(Debug)]
pub struct NewBackup<'a> {
    pub switch_id: i64,
    pub config_text: &'a str,
    pub config_hash: &'a str,
    pub backup_type: &'a str,
    pub created_by: Option<i64>,
    pub notes: &'a str,
    pub config_changes: Option<String>,
}

/// Config backup database operations. Rows are immutable: no update, no
/// delete, only insert and read.
pub struct BackupRepo;

impl BackupRepo {
    pub async fn list(pool: &Pool<Sqlite>, switch_id: i64) -> Result<Vec<ConfigBackup>> {
        let rows = sqlx::query_as::<_, ConfigBackup>(&format!(
            "{} WHERE switch_id = ? ORDER BY created_at DESC",
            SELECT_BACKUP
        ))
        .bind(switch_id)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    pub async fn get(pool: &Pool<Sqlite>, id: i64) -> Result<Option<ConfigBackup>> {
        let row = sqlx::query_as::<_, ConfigBackup>(&format!("{} WHERE id = ?", SELECT_BACKUP))
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row)
    }

    pub async fn find_by_hash(
        pool: &Pool<Sqlite>,
        switch_id: i64,
        hash: &str,
    ) -> Result<Option<ConfigBackup>> {
        let row = sqlx::query_as::<_, ConfigBackup>(&format!(
            "{} WHERE switch_id = ? AND config_hash = ? ORDER BY created_at DESC LIMIT 1",
            SELECT_BACKUP
        ))
        .bind(switch_id)
        .bind(hash)
        .fetch_optional(pool)
        .await?;
        Ok(row)
    }

    pub async fn insert(pool: &Pool<Sqlite>, req: &NewBackup<'_>) -> Result<ConfigBackup> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO config_backups
                (switch_id, config_text, config_hash, backup_type, created_by,
                 created_at, notes, config_changes)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(req.switch_id)
        .bind(req.config_text)
        .bind(req.config_hash)
        .bind(req.backup_type)
        .bind(req.created_by)
        .bind(now)
        .bind(req.notes)
        .bind(&req.config_changes)
        .execute(pool)
        .await?;

        Self::get(pool, result.last_insert_rowid())
            .await?
            .context("Backup not found after insert")
    }
}
