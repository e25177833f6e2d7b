use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::models::*;

const SELECT_VLAN: &str = r#"
    SELECT id, switch_id, vlan_id, name, description, created_at, updated_at
    FROM vlans
"#;

/// VLAN cache database operations
pub struct VlanRepo;

impl VlanRepo {
    pub async fn list(pool: &Pool<Sqlite>, switch_id: i64) -> Result<Vec<Vlan>> {
        let rows = sqlx::query_as::<_, Vlan>(&format!(
            "{} WHERE switch_id = ? ORDER BY vlan_id",
            SELECT_VLAN
        ))
        .bind(switch_id)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    pub async fn get(pool: &Pool<Sqlite>, switch_id: i64, vlan_id: i64) -> Result<Option<Vlan>> {
        let row = sqlx::query_as::<_, Vlan>(&format!(
            "{} WHERE switch_id = ? AND vlan_id = ?",
            SELECT_VLAN
        ))
        .bind(switch_id)
        .bind(vlan_id)
        .fetch_optional(pool)
        .await?;
        Ok(row)
    }

    pub async fn upsert(
        pool: &Pool<Sqlite>,
        switch_id: i64,
        vlan_id: i64,
        name: &str,
        description: &str,
    ) -> Result<Vlan> {
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO vlans (switch_id, vlan_id, name, description, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT (switch_id, vlan_id) DO UPDATE SET
                name = excluded.name,
                description = excluded.description,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(switch_id)
        .bind(vlan_id)
        .bind(name)
        .bind(description)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await?;

        Self::get(pool, switch_id, vlan_id)
            .await?
            .context("VLAN not found after upsert")
    }

    pub async fn delete(pool: &Pool<Sqlite>, switch_id: i64, vlan_id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM vlans WHERE switch_id = ? AND vlan_id = ?")
            .bind(switch_id)
            .bind(vlan_id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(super::NotFoundError::new("VLAN", &vlan_id.to_string()).into());
        }
        Ok(())
    }

    /// Full cache replace from a live read: (vlan_id, name) pairs.
    /// Delete-then-insert, same last-write-wins model as interfaces.
    pub async fn replace_all(
        pool: &Pool<Sqlite>,
        switch_id: i64,
        entries: &[(i64, String)],
    ) -> Result<usize> {
        sqlx::query("DELETE FROM vlans WHERE switch_id = ?")
            .bind(switch_id)
            .execute(pool)
            .await?;

        let now = Utc::now();
        let mut inserted = 0;
        for (vlan_id, name) in entries {
            sqlx::query(
                r#"
                INSERT OR REPLACE INTO vlans (switch_id, vlan_id, name, description, created_at, updated_at)
                VALUES (?, ?, ?, '', ?, ?)
                "#,
            )
            .bind(switch_id)
            .bind(vlan_id)
            .bind(name)
            .bind(now)
            .bind(now)
            .execute(pool)
            .await?;
            inserted += 1;
        }
        Ok(inserted)
    }
}
