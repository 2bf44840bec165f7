//! Read-time status derivation
//!
//! The enforcement plugin keeps the `active` flag up to date only when it
//! gets around to it, so status is computed from the flag, the expiry instant
//! and the removal metadata together. Removal always wins.

use crate::models::punishment::PunishmentRecord;
use chrono::Utc;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PunishmentStatus {
    Active,
    Expired,
    Removed,
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// `expires_at <= 0` marks a punishment without an expiry instant
pub fn is_permanent(expires_at: i64) -> bool {
    expires_at <= 0
}

/// Derive the status of `record` as of `now_ms`.
pub fn derive_status(record: &PunishmentRecord, now_ms: i64) -> PunishmentStatus {
    if record.removal().is_some() {
        return PunishmentStatus::Removed;
    }

    if !record.active {
        return PunishmentStatus::Expired;
    }

    if !is_permanent(record.expires_at) && record.expires_at < now_ms {
        return PunishmentStatus::Expired;
    }

    PunishmentStatus::Active
}
