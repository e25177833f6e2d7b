//! Configuration workflow: backup with hash dedup, syntax validation,
//! apply with optional auto-backup, and restore from a stored snapshot.
//!
//! Each call is one pass through backup/validate/apply; nothing is
//! persisted between calls except the backup rows themselves.

use anyhow::Result;
use regex_lite::Regex;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::codec::{change_summary, ChangeSummary};
use crate::db::{NewBackup, Store};
use crate::eapi::{EapiClient, EapiError, FORMAT_JSON, RUNNING_CONFIG_COMMANDS};
use crate::models::*;

/// Minimum non-comment command lines for a config to be considered
/// plausibly complete
const MIN_CONFIG_LINES: usize = 3;

/// Outcome of a backup call. `changed=false` means an identical snapshot
/// already existed and its id is returned instead of a new row.
#[derive(Debug, Clone, Serialize)]
pub struct BackupOutcome {
    pub backup_id: i64,
    pub changed: bool,
    pub config_hash: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplyOutcome {
    pub success: bool,
    pub applied: bool,
    pub validation: ValidationReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre_change_backup_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<ChangeSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reloaded: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_command: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RestoreOutcome {
    pub success: bool,
    pub snapshot_backup_id: i64,
    pub replayed_lines: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_command: Option<String>,
}

pub fn config_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

/// Snapshot the switch's running configuration. The hash-dedup check is
/// mandatory before every insert: identical content for the same switch
/// is never stored twice.
pub async fn backup(
    store: &Store,
    target: &Switch,
    backup_type: &str,
    created_by: Option<i64>,
    notes: &str,
) -> Result<BackupOutcome> {
    let client = EapiClient::new(target)?;
    let config_text = client.run_first_ok_text(RUNNING_CONFIG_COMMANDS).await?;
    store_snapshot(store, target.id, &config_text, backup_type, created_by, notes, None).await
}

/// Dedup-aware insert of already-fetched configuration text
async fn store_snapshot(
    store: &Store,
    switch_id: i64,
    config_text: &str,
    backup_type: &str,
    created_by: Option<i64>,
    notes: &str,
    config_changes: Option<String>,
) -> Result<BackupOutcome> {
    let hash = config_hash(config_text);

    if let Some(existing) = store.find_backup_by_hash(switch_id, &hash).await? {
        tracing::debug!(
            "backup for switch {} unchanged, reusing backup {}",
            switch_id,
            existing.id
        );
        return Ok(BackupOutcome {
            backup_id: existing.id,
            changed: false,
            config_hash: hash,
        });
    }

    let row = store
        .insert_backup(&NewBackup {
            switch_id,
            config_text,
            config_hash: &hash,
            backup_type,
            created_by,
            notes,
            config_changes,
        })
        .await?;

    Ok(BackupOutcome {
        backup_id: row.id,
        changed: true,
        config_hash: hash,
    })
}

/// Naive syntax check for CLI configuration text. Only emptiness and
/// too-few-commands are hard errors; everything else is a warning so an
/// unusual but valid config is never blocked.
pub fn validate_syntax(text: &str) -> ValidationReport {
    let mut report = ValidationReport {
        valid: true,
        errors: Vec::new(),
        warnings: Vec::new(),
    };

    if text.trim().is_empty() {
        report.valid = false;
        report.errors.push("configuration is empty".to_string());
        return report;
    }

    // Permissive: a command starts with an alphanumeric token and uses
    // ordinary CLI characters after that
    let token = Regex::new(r#"^[A-Za-z0-9][A-Za-z0-9 \t,./:+_"'()\[\]<>=@#*&%$?\\|{}~^-]*$"#)
        .expect("static pattern");

    let mut command_lines = 0usize;
    let mut indent_stack: Vec<usize> = vec![0];

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim_end();
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('!') || trimmed.starts_with('#') {
            continue;
        }
        command_lines += 1;

        if !token.is_match(trimmed) {
            report
                .warnings
                .push(format!("line {}: unrecognized command syntax: {}", idx + 1, trimmed));
        }

        // Naive block tracking by leading whitespace
        let indent = line.len() - trimmed.len();
        let current = *indent_stack.last().unwrap_or(&0);
        if indent > current {
            indent_stack.push(indent);
        } else {
            while indent_stack.len() > 1 && indent < *indent_stack.last().unwrap_or(&0) {
                indent_stack.pop();
            }
        }
    }

    if command_lines < MIN_CONFIG_LINES {
        report.valid = false;
        report.errors.push(format!(
            "configuration has only {} command line(s), expected at least {}",
            command_lines, MIN_CONFIG_LINES
        ));
    }

    if indent_stack.len() > 1 {
        report
            .warnings
            .push("configuration ends inside an indented block".to_string());
    }

    report
}

/// Command lines to replay on the device: comments, blanks, and the
/// terminator are dropped; indentation is kept because eAPI accepts the
/// lines verbatim in configure mode.
fn config_command_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim_end)
        .filter(|l| {
            let t = l.trim_start();
            !t.is_empty() && !t.starts_with('!') && !t.starts_with('#') && t != "end"
        })
        .map(str::to_string)
        .collect()
}

pub struct ApplyOptions {
    pub auto_backup: bool,
    pub validate_only: bool,
    pub reload_on_complete: bool,
}

/// Apply full configuration text to a switch.
///
/// Order is fixed: validate, then read the current config, optional
/// `before_change` snapshot, then (unless validate-only) push the lines
/// as one `configure` batch and persist the applied text as a `manual`
/// backup. Validation failure reports before the device is ever
/// contacted. A reload failure after a successful apply degrades the
/// result but does not fail it.
pub async fn apply_config(
    store: &Store,
    target: &Switch,
    new_config: &str,
    opts: &ApplyOptions,
    created_by: Option<i64>,
) -> Result<ApplyOutcome> {
    let validation = validate_syntax(new_config);
    if !validation.valid {
        return Ok(ApplyOutcome {
            success: false,
            applied: false,
            validation,
            pre_change_backup_id: None,
            backup_id: None,
            summary: None,
            reloaded: None,
            error: Some("validation failed".to_string()),
            failed_command: None,
        });
    }

    let client = EapiClient::new(target)?;

    // The change summary and the pre-change snapshot both need the
    // current config
    let current = client.run_first_ok_text(RUNNING_CONFIG_COMMANDS).await?;

    let mut pre_change_backup_id = None;
    if opts.auto_backup {
        let snapshot = store_snapshot(
            store,
            target.id,
            &current,
            backup_type::BEFORE_CHANGE,
            created_by,
            "automatic snapshot before config apply",
            None,
        )
        .await?;
        pre_change_backup_id = Some(snapshot.backup_id);
    }

    let summary = change_summary(&current, new_config);

    if opts.validate_only {
        return Ok(ApplyOutcome {
            success: true,
            applied: false,
            validation,
            pre_change_backup_id,
            backup_id: None,
            summary: Some(summary),
            reloaded: None,
            error: None,
            failed_command: None,
        });
    }

    let lines = config_command_lines(new_config);
    let mut cmds: Vec<&str> = Vec::with_capacity(lines.len() + 1);
    cmds.push("configure");
    cmds.extend(lines.iter().map(String::as_str));

    if let Err(e) = client.run_commands(&cmds, FORMAT_JSON).await {
        let failed_command = match &e {
            EapiError::Command { failed_command, .. } => failed_command.clone(),
            _ => None,
        };
        return Ok(ApplyOutcome {
            success: false,
            applied: false,
            validation,
            pre_change_backup_id,
            backup_id: None,
            summary: Some(summary),
            reloaded: None,
            error: Some(e.to_string()),
            failed_command,
        });
    }

    let changes = serde_json::to_string(&summary).ok();
    let applied_backup = store_snapshot(
        store,
        target.id,
        new_config,
        backup_type::MANUAL,
        created_by,
        "configuration applied",
        changes,
    )
    .await?;

    let mut reloaded = None;
    if opts.reload_on_complete {
        match client.run_commands(&["reload now"], FORMAT_JSON).await {
            Ok(_) => reloaded = Some(true),
            Err(e) => {
                // Config is already applied; reload is best-effort
                tracing::warn!("reload after apply failed for {}: {}", target.hostname, e);
                reloaded = Some(false);
            }
        }
    }

    Ok(ApplyOutcome {
        success: true,
        applied: true,
        validation,
        pre_change_backup_id,
        backup_id: Some(applied_backup.backup_id),
        summary: Some(summary),
        reloaded,
        error: None,
        failed_command: None,
    })
}

/// Restore a stored backup onto the switch: snapshot current state as
/// `before_change`, then replay the backup's command lines in order.
/// The failing command, when the device rejects one, is surfaced along
/// with the snapshot id so the operator can recover manually. No
/// automatic rollback.
pub async fn restore(
    store: &Store,
    target: &Switch,
    snapshot: &ConfigBackup,
    created_by: Option<i64>,
) -> Result<RestoreOutcome> {
    let client = EapiClient::new(target)?;

    let current = client.run_first_ok_text(RUNNING_CONFIG_COMMANDS).await?;
    let pre = store_snapshot(
        store,
        target.id,
        &current,
        backup_type::BEFORE_CHANGE,
        created_by,
        &format!("automatic snapshot before restoring backup {}", snapshot.id),
        None,
    )
    .await?;

    let lines = config_command_lines(&snapshot.config_text);
    let mut cmds: Vec<&str> = Vec::with_capacity(lines.len() + 1);
    cmds.push("configure");
    cmds.extend(lines.iter().map(String::as_str));

    match client.run_commands(&cmds, FORMAT_JSON).await {
        Ok(_) => Ok(RestoreOutcome {
            success: true,
            snapshot_backup_id: pre.backup_id,
            replayed_lines: lines.len(),
            error: None,
            failed_command: None,
        }),
        Err(e) => {
            let failed_command = match &e {
                EapiError::Command { failed_command, .. } => failed_command.clone(),
                _ => None,
            };
            Ok(RestoreOutcome {
                success: false,
                snapshot_backup_id: pre.backup_id,
                replayed_lines: 0,
                error: Some(e.to_string()),
                failed_command,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    #[test]
    fn test_validate_rejects_empty() {
        let report = validate_syntax("   \n  ");
        assert!(!report.valid);
        assert_eq!(report.errors, vec!["configuration is empty"]);
    }

    #[test]
    fn test_validate_rejects_too_few_lines() {
        let report = validate_syntax("hostname sw1\n! a comment\n");
        assert!(!report.valid);
        assert!(report.errors[0].contains("at least 3"));
    }

    #[test]
    fn test_validate_accepts_plain_config() {
        let report = validate_syntax("hostname sw1\nvlan 10\n   name Servers\ninterface Ethernet1\n   switchport access vlan 10\nend\n");
        assert!(report.valid);
        assert!(report.errors.is_empty());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_validate_flags_odd_lines_as_warnings() {
        let report = validate_syntax("hostname sw1\nvlan 10\n???bogus\ninterface Ethernet1\nend\n");
        assert!(report.valid);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("line 3"));
    }

    #[test]
    fn test_validate_warns_on_unclosed_block() {
        let report = validate_syntax("hostname sw1\nvlan 10\ninterface Ethernet1\n   description up\n   switchport mode trunk");
        assert!(report.valid);
        assert!(report
            .warnings
            .iter()
            .any(|w| w.contains("indented block")));
    }

    #[test]
    fn test_validate_comments_do_not_count_as_commands() {
        let report = validate_syntax("! c1\n! c2\n! c3\nhostname sw1\nvlan 10\nvlan 20\n");
        assert!(report.valid);
    }

    #[test]
    fn test_command_lines_strip_comments_and_end() {
        let lines = config_command_lines("! header\nhostname sw1\n\nvlan 10\n   name Servers\n!\nend\n");
        assert_eq!(lines, vec!["hostname sw1", "vlan 10", "   name Servers"]);
    }

    #[test]
    fn test_config_hash_is_stable_hex() {
        let h = config_hash("hostname sw1\n");
        assert_eq!(h.len(), 64);
        assert_eq!(h, config_hash("hostname sw1\n"));
        assert_ne!(h, config_hash("hostname sw2\n"));
    }

    async fn test_store() -> Store {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        Store::from_pool(pool)
    }

    fn switch_request(hostname: &str, ip: &str) -> CreateSwitchRequest {
        CreateSwitchRequest {
            hostname: hostname.to_string(),
            ip_address: ip.to_string(),
            port: 443,
            use_https: true,
            timeout_secs: 30,
            username: "admin".to_string(),
            password: "admin".to_string(),
            model: None,
            description: None,
        }
    }

    async fn seed_switch(store: &Store) -> Switch {
        store
            .create_switch(&switch_request("sw1", "10.0.0.1"))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_store_snapshot_dedups_identical_content() {
        let store = test_store().await;
        let sw = seed_switch(&store).await;

        let first = store_snapshot(&store, sw.id, "hostname sw1\n", backup_type::MANUAL, None, "", None)
            .await
            .unwrap();
        assert!(first.changed);

        let second = store_snapshot(&store, sw.id, "hostname sw1\n", backup_type::MANUAL, None, "", None)
            .await
            .unwrap();
        assert!(!second.changed);
        assert_eq!(second.backup_id, first.backup_id);

        let all = store.list_backups(sw.id).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_store_snapshot_new_row_for_different_content() {
        let store = test_store().await;
        let sw = seed_switch(&store).await;

        let first = store_snapshot(&store, sw.id, "hostname sw1\n", backup_type::MANUAL, None, "", None)
            .await
            .unwrap();
        let second = store_snapshot(
            &store,
            sw.id,
            "hostname sw1\nvlan 10\n",
            backup_type::BEFORE_CHANGE,
            Some(1),
            "pre-change",
            None,
        )
        .await
        .unwrap();

        assert!(second.changed);
        assert_ne!(second.backup_id, first.backup_id);
        assert_eq!(store.list_backups(sw.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_dedup_is_per_switch() {
        let store = test_store().await;
        let sw1 = seed_switch(&store).await;
        let sw2 = store
            .create_switch(&switch_request("sw2", "10.0.0.2"))
            .await
            .unwrap();

        store_snapshot(&store, sw1.id, "hostname shared\n", backup_type::MANUAL, None, "", None)
            .await
            .unwrap();
        let other = store_snapshot(&store, sw2.id, "hostname shared\n", backup_type::MANUAL, None, "", None)
            .await
            .unwrap();

        // Same content on a different switch still gets its own row
        assert!(other.changed);
    }

    #[tokio::test]
    async fn test_apply_invalid_config_reports_without_device_contact() {
        let store = test_store().await;
        // Nothing listens here; any device call would surface as an Err
        let sw = store
            .create_switch(&switch_request("sw-unreachable", "127.0.0.1"))
            .await
            .unwrap();

        let opts = ApplyOptions {
            auto_backup: true,
            validate_only: false,
            reload_on_complete: false,
        };
        let outcome = apply_config(&store, &sw, "hostname only\n", &opts, None)
            .await
            .unwrap();

        assert!(!outcome.success);
        assert!(!outcome.applied);
        assert!(!outcome.validation.valid);
        assert_eq!(outcome.pre_change_backup_id, None);
        assert_eq!(outcome.backup_id, None);
        // No pre-change snapshot was taken either
        assert!(store.list_backups(sw.id).await.unwrap().is_empty());
    }
}
