//! Append-only audit trail. Recording is fire-and-forget: a failed
//! audit write is logged but never fails the operation it describes.

use crate::db::Store;

pub async fn record(
    store: &Store,
    user_id: Option<i64>,
    action: &str,
    target_type: &str,
    target_id: Option<i64>,
    details: &str,
) {
    if let Err(e) = store
        .insert_audit_entry(user_id, action, target_type, target_id, details)
        .await
    {
        tracing::warn!("audit write failed ({} {}): {}", action, target_type, e);
    }
}
