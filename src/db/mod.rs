mod audit;
mod backups;
mod interfaces;
mod port_channels;
mod switches;
mod users;
mod vlans;

use anyhow::{Context, Result};
use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};

use crate::models::*;

/// Typed error for "resource not found" that enables reliable downcast
/// in the API error handler instead of fragile string matching.
#[derive(Debug)]
pub struct NotFoundError {
    pub resource: String,
    pub id: String,
}

impl NotFoundError {
    pub fn new(resource: &str, id: &str) -> Self {
        Self {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }
}

impl std::fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} not found: {}", self.resource, self.id)
    }
}

impl std::error::Error for NotFoundError {}

/// Store handles all database operations, delegating to per-entity repo
/// modules.
#[derive(Clone)]
pub struct Store {
    pool: Pool<Sqlite>,
}

impl Store {
    /// Create a new database store with configurable pool size
    pub async fn new(db_path: &str) -> Result<Self> {
        Self::with_pool_size(db_path, 5).await
    }

    /// Create a new database store with a specific pool size
    pub async fn with_pool_size(db_path: &str, max_connections: u32) -> Result<Self> {
        let db_url = format!("sqlite:{}?mode=rwc", db_path);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(&db_url)
            .await
            .context("Failed to connect to database")?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Wrap an existing pool (used by tests with in-memory SQLite)
    #[cfg(test)]
    pub fn from_pool(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Run database migrations and seed the default admin user
    async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;

        self.seed_default_user().await?;
        Ok(())
    }

    async fn seed_default_user(&self) -> Result<()> {
        let count: (i32,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        if count.0 == 0 {
            let password_hash = bcrypt::hash("admin", bcrypt::DEFAULT_COST)
                .map_err(|e| anyhow::anyhow!("Failed to hash default password: {}", e))?;

            users::UserRepo::create(&self.pool, "admin", &password_hash, user_role::ADMIN).await?;
            tracing::info!("Created default admin user (username: admin, password: admin)");
        }

        Ok(())
    }

    // ========== Switch Operations ==========

    pub async fn list_switches(&self) -> Result<Vec<Switch>> {
        switches::SwitchRepo::list(&self.pool).await
    }

    pub async fn get_switch(&self, id: i64) -> Result<Option<Switch>> {
        switches::SwitchRepo::get(&self.pool, id).await
    }

    pub async fn create_switch(&self, req: &CreateSwitchRequest) -> Result<Switch> {
        switches::SwitchRepo::create(&self.pool, req).await
    }

    pub async fn update_switch(&self, id: i64, req: &UpdateSwitchRequest) -> Result<Switch> {
        switches::SwitchRepo::update(&self.pool, id, req).await
    }

    pub async fn delete_switch(&self, id: i64) -> Result<()> {
        switches::SwitchRepo::delete(&self.pool, id).await
    }

    pub async fn update_switch_facts(&self, id: i64, model: &str, eos_version: &str) -> Result<()> {
        switches::SwitchRepo::update_facts(&self.pool, id, model, eos_version).await
    }

    // ========== Interface Operations ==========

    pub async fn list_interfaces(&self, switch_id: i64) -> Result<Vec<Interface>> {
        interfaces::InterfaceRepo::list(&self.pool, switch_id).await
    }

    pub async fn get_interface(&self, switch_id: i64, name: &str) -> Result<Option<Interface>> {
        interfaces::InterfaceRepo::get(&self.pool, switch_id, name).await
    }

    pub async fn replace_interfaces(&self, switch_id: i64, entries: &[InterfaceView]) -> Result<usize> {
        interfaces::InterfaceRepo::replace_all(&self.pool, switch_id, entries).await
    }

    pub async fn upsert_interface(&self, switch_id: i64, entry: &InterfaceView) -> Result<()> {
        interfaces::InterfaceRepo::upsert(&self.pool, switch_id, entry).await
    }

    // ========== VLAN Operations ==========

    pub async fn list_vlans(&self, switch_id: i64) -> Result<Vec<Vlan>> {
        vlans::VlanRepo::list(&self.pool, switch_id).await
    }

    pub async fn upsert_vlan(&self, switch_id: i64, vlan_id: i64, name: &str, description: &str) -> Result<Vlan> {
        vlans::VlanRepo::upsert(&self.pool, switch_id, vlan_id, name, description).await
    }

    pub async fn delete_vlan(&self, switch_id: i64, vlan_id: i64) -> Result<()> {
        vlans::VlanRepo::delete(&self.pool, switch_id, vlan_id).await
    }

    pub async fn replace_vlans(&self, switch_id: i64, entries: &[(i64, String)]) -> Result<usize> {
        vlans::VlanRepo::replace_all(&self.pool, switch_id, entries).await
    }

    // ========== Port-Channel Operations ==========

    pub async fn list_port_channels(&self, switch_id: i64) -> Result<Vec<PortChannel>> {
        port_channels::PortChannelRepo::list(&self.pool, switch_id).await
    }

    pub async fn list_port_channel_members(&self, port_channel_id: i64) -> Result<Vec<String>> {
        port_channels::PortChannelRepo::list_members(&self.pool, port_channel_id).await
    }

    /// Names of every interface that is a member of some port-channel on
    /// this switch. Used by the reconciler's exclusion rule.
    pub async fn port_channel_member_set(&self, switch_id: i64) -> Result<std::collections::HashSet<String>> {
        port_channels::PortChannelRepo::member_set(&self.pool, switch_id).await
    }

    pub async fn replace_port_channels(
        &self,
        switch_id: i64,
        entries: &[port_channels::PortChannelSync],
    ) -> Result<usize> {
        port_channels::PortChannelRepo::replace_all(&self.pool, switch_id, entries).await
    }

    // ========== Config Backup Operations ==========

    pub async fn list_backups(&self, switch_id: i64) -> Result<Vec<ConfigBackup>> {
        backups::BackupRepo::list(&self.pool, switch_id).await
    }

    pub async fn get_backup(&self, id: i64) -> Result<Option<ConfigBackup>> {
        backups::BackupRepo::get(&self.pool, id).await
    }

    pub async fn find_backup_by_hash(&self, switch_id: i64, hash: &str) -> Result<Option<ConfigBackup>> {
        backups::BackupRepo::find_by_hash(&self.pool, switch_id, hash).await
    }

    pub async fn insert_backup(&self, req: &backups::NewBackup<'_>) -> Result<ConfigBackup> {
        backups::BackupRepo::insert(&self.pool, req).await
    }

    // ========== User Operations ==========

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        users::UserRepo::get_by_username(&self.pool, username).await
    }

    // ========== Audit Operations ==========

    pub async fn insert_audit_entry(
        &self,
        user_id: Option<i64>,
        action: &str,
        target_type: &str,
        target_id: Option<i64>,
        details: &str,
    ) -> Result<()> {
        audit::AuditRepo::insert(&self.pool, user_id, action, target_type, target_id, details).await
    }

    pub async fn list_audit_entries(&self, limit: i32) -> Result<Vec<AuditEntry>> {
        audit::AuditRepo::list_recent(&self.pool, limit).await
    }
}

pub use backups::NewBackup;
pub use port_channels::PortChannelSync;
