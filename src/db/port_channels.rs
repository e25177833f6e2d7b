use anyhow::Result;
use chrono::Utc;
use sqlx::{Pool, Sqlite};
use std::collections::HashSet;

use crate::models::*;

const SELECT_PORT_CHANNEL: &str = r#"
    SELECT id, switch_id, port_channel_name, port_channel_number, mode,
           vlan_id, native_vlan_id, trunk_vlans, lacp_mode, description,
           admin_status, oper_status, created_at, updated_at
    FROM port_channels
"#;

/// One port-channel as read from the device, used for cache replacement
#[derive(Debug, Clone)]
pub struct PortChannelSync {
    pub port_channel_name: String,
    pub port_channel_number: i64,
    pub mode: String,
    pub vlan_id: Option<i64>,
    pub native_vlan_id: Option<i64>,
    pub trunk_vlans: Option<String>,
    pub lacp_mode: String,
    pub admin_status: String,
    pub oper_status: String,
    pub members: Vec<String>,
}

/// Port-channel cache database operations
pub struct PortChannelRepo;

impl PortChannelRepo {
    pub async fn list(pool: &Pool<Sqlite>, switch_id: i64) -> Result<Vec<PortChannel>> {
        let rows = sqlx::query_as::<_, PortChannel>(&format!(
            "{} WHERE switch_id = ? ORDER BY port_channel_number",
            SELECT_PORT_CHANNEL
        ))
        .bind(switch_id)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    pub async fn list_members(pool: &Pool<Sqlite>, port_channel_id: i64) -> Result<Vec<String>> {
        let rows: Vec<String> = sqlx::query_scalar(
            "SELECT interface_name FROM port_channel_members WHERE port_channel_id = ? ORDER BY interface_name",
        )
        .bind(port_channel_id)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    /// All interface names that belong to some port-channel on this switch
    pub async fn member_set(pool: &Pool<Sqlite>, switch_id: i64) -> Result<HashSet<String>> {
        let rows: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT m.interface_name
            FROM port_channel_members m
            JOIN port_channels p ON p.id = m.port_channel_id
            WHERE p.switch_id = ?
            "#,
        )
        .bind(switch_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().collect())
    }

    /// Full cache replace from a live read. Members are cascade-deleted
    /// with their parents, then re-inserted per entry.
    pub async fn replace_all(
        pool: &Pool<Sqlite>,
        switch_id: i64,
        entries: &[PortChannelSync],
    ) -> Result<usize> {
        sqlx::query("DELETE FROM port_channels WHERE switch_id = ?")
            .bind(switch_id)
            .execute(pool)
            .await?;

        let now = Utc::now();
        let mut inserted = 0;
        for e in entries {
            let result = sqlx::query(
                r#"
                INSERT OR REPLACE INTO port_channels
                    (switch_id, port_channel_name, port_channel_number, mode,
                     vlan_id, native_vlan_id, trunk_vlans, lacp_mode, description,
                     admin_status, oper_status, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, '', ?, ?, ?, ?)
                "#,
            )
            .bind(switch_id)
            .bind(&e.port_channel_name)
            .bind(e.port_channel_number)
            .bind(&e.mode)
            .bind(e.vlan_id)
            .bind(e.native_vlan_id)
            .bind(&e.trunk_vlans)
            .bind(&e.lacp_mode)
            .bind(&e.admin_status)
            .bind(&e.oper_status)
            .bind(now)
            .bind(now)
            .execute(pool)
            .await?;

            let pc_id = result.last_insert_rowid();
            for member in &e.members {
                sqlx::query(
                    "INSERT OR IGNORE INTO port_channel_members (port_channel_id, interface_name) VALUES (?, ?)",
                )
                .bind(pc_id)
                .bind(member)
                .execute(pool)
                .await?;
            }
            inserted += 1;
        }
        Ok(inserted)
    }
}
