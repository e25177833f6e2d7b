use anyhow::Result;
use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::models::*;

const SELECT_INTERFACE: &str = r#"
    SELECT id, switch_id, interface_name, mode, admin_status, oper_status,
           vlan_id, native_vlan_id, trunk_vlans, speed, description,
           port_type, transceiver_temp, is_port_channel_member, last_synced
    FROM interfaces
"#;

/// Cached interface database operations
pub struct InterfaceRepo;

impl InterfaceRepo {
    pub async fn list(pool: &Pool<Sqlite>, switch_id: i64) -> Result<Vec<Interface>> {
        let rows = sqlx::query_as::<_, Interface>(&format!(
            "{} WHERE switch_id = ? ORDER BY interface_name",
            SELECT_INTERFACE
        ))
        .bind(switch_id)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    pub async fn get(pool: &Pool<Sqlite>, switch_id: i64, name: &str) -> Result<Option<Interface>> {
        let row = sqlx::query_as::<_, Interface>(&format!(
            "{} WHERE switch_id = ? AND interface_name = ?",
            SELECT_INTERFACE
        ))
        .bind(switch_id)
        .bind(name)
        .fetch_optional(pool)
        .await?;
        Ok(row)
    }

    /// Full cache replace from a live read: delete-then-insert. Not
    /// wrapped in a transaction; concurrent syncs of the same switch are
    /// last-write-wins (the device is the source of truth).
    pub async fn replace_all(
        pool: &Pool<Sqlite>,
        switch_id: i64,
        entries: &[InterfaceView],
    ) -> Result<usize> {
        sqlx::query("DELETE FROM interfaces WHERE switch_id = ?")
            .bind(switch_id)
            .execute(pool)
            .await?;

        let now = Utc::now();
        let mut inserted = 0;
        for e in entries {
            sqlx::query(
                r#"
                INSERT OR REPLACE INTO interfaces
                    (switch_id, interface_name, mode, admin_status, oper_status,
                     vlan_id, native_vlan_id, trunk_vlans, speed, description,
                     port_type, transceiver_temp, is_port_channel_member, last_synced)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?)
                "#,
            )
            .bind(switch_id)
            .bind(&e.interface_name)
            .bind(&e.mode)
            .bind(&e.admin_status)
            .bind(&e.oper_status)
            .bind(e.vlan_id)
            .bind(e.native_vlan_id)
            .bind(&e.trunk_vlans)
            .bind(e.speed)
            .bind(&e.description)
            .bind(&e.port_type)
            .bind(e.transceiver_temp)
            .bind(now)
            .execute(pool)
            .await?;
            inserted += 1;
        }
        Ok(inserted)
    }

    /// Overwrite or create a single cache row (configure / VLAN-matrix apply)
    pub async fn upsert(pool: &Pool<Sqlite>, switch_id: i64, e: &InterfaceView) -> Result<()> {
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO interfaces
                (switch_id, interface_name, mode, admin_status, oper_status,
                 vlan_id, native_vlan_id, trunk_vlans, speed, description,
                 port_type, transceiver_temp, is_port_channel_member, last_synced)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?)
            ON CONFLICT (switch_id, interface_name) DO UPDATE SET
                mode = excluded.mode,
                admin_status = excluded.admin_status,
                oper_status = excluded.oper_status,
                vlan_id = excluded.vlan_id,
                native_vlan_id = excluded.native_vlan_id,
                trunk_vlans = excluded.trunk_vlans,
                speed = excluded.speed,
                description = excluded.description,
                port_type = excluded.port_type,
                transceiver_temp = excluded.transceiver_temp,
                last_synced = excluded.last_synced
            "#,
        )
        .bind(switch_id)
        .bind(&e.interface_name)
        .bind(&e.mode)
        .bind(&e.admin_status)
        .bind(&e.oper_status)
        .bind(e.vlan_id)
        .bind(e.native_vlan_id)
        .bind(&e.trunk_vlans)
        .bind(e.speed)
        .bind(&e.description)
        .bind(&e.port_type)
        .bind(e.transceiver_temp)
        .bind(now)
        .execute(pool)
        .await?;
        Ok(())
    }
}
