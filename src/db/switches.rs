use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::models::*;

const SELECT_SWITCH: &str = r#"
    SELECT id, hostname, ip_address, port, use_https, timeout_secs,
           username, password, model, eos_version, description,
           created_at, updated_at
    FROM switches
"#;

/// Switch inventory database operations
pub struct SwitchRepo;

impl SwitchRepo {
    pub async fn list(pool: &Pool<Sqlite>) -> Result<Vec<Switch>> {
        let rows = sqlx::query_as::<_, Switch>(&format!("{} ORDER BY hostname", SELECT_SWITCH))
            .fetch_all(pool)
            .await?;
        Ok(rows)
    }

    pub async fn get(pool: &Pool<Sqlite>, id: i64) -> Result<Option<Switch>> {
        let row = sqlx::query_as::<_, Switch>(&format!("{} WHERE id = ?", SELECT_SWITCH))
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row)
    }

    pub async fn create(pool: &Pool<Sqlite>, req: &CreateSwitchRequest) -> Result<Switch> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO switches (hostname, ip_address, port, use_https, timeout_secs,
                                  username, password, model, description, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&req.hostname)
        .bind(&req.ip_address)
        .bind(req.port)
        .bind(req.use_https)
        .bind(req.timeout_secs)
        .bind(&req.username)
        .bind(&req.password)
        .bind(req.model.clone().unwrap_or_default())
        .bind(req.description.clone().unwrap_or_default())
        .bind(now)
        .bind(now)
        .execute(pool)
        .await?;

        Self::get(pool, result.last_insert_rowid())
            .await?
            .context("Switch not found after creation")
    }

    pub async fn update(pool: &Pool<Sqlite>, id: i64, req: &UpdateSwitchRequest) -> Result<Switch> {
        let existing = Self::get(pool, id)
            .await?
            .ok_or_else(|| super::NotFoundError::new("Switch", &id.to_string()))?;

        // Empty/absent password keeps the stored credential
        let password = match &req.password {
            Some(p) if !p.is_empty() => p.clone(),
            _ => existing.password,
        };

        let now = Utc::now();
        sqlx::query(
            r#"
            UPDATE switches SET hostname = ?, ip_address = ?, port = ?, use_https = ?,
                                timeout_secs = ?, username = ?, password = ?, model = ?,
                                description = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&req.hostname)
        .bind(&req.ip_address)
        .bind(req.port)
        .bind(req.use_https)
        .bind(req.timeout_secs)
        .bind(&req.username)
        .bind(&password)
        .bind(req.model.clone().unwrap_or_default())
        .bind(req.description.clone().unwrap_or_default())
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;

        Self::get(pool, id)
            .await?
            .context("Switch not found after update")
    }

    pub async fn delete(pool: &Pool<Sqlite>, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM switches WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(super::NotFoundError::new("Switch", &id.to_string()).into());
        }
        Ok(())
    }

    pub async fn update_facts(pool: &Pool<Sqlite>, id: i64, model: &str, eos_version: &str) -> Result<()> {
        let now = Utc::now();
        sqlx::query("UPDATE switches SET model = ?, eos_version = ?, updated_at = ? WHERE id = ?")
            .bind(model)
            .bind(eos_version)
            .bind(now)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
