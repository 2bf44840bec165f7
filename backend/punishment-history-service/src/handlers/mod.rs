/// HTTP handlers for the read-only punishment history API
///
/// All routes share one `PunishmentLedger` and the configured paging limits.
pub mod health;
pub mod players;
pub mod punishments;
pub mod stats;

use crate::error::{HistoryError, Result};
use crate::models::{
    derive_status, is_permanent, PageRequest, PunishmentRecord, PunishmentStatus,
};
use crate::utils::identity::normalize_uuid;
use actix_web::web;
use serde::{Deserialize, Serialize};
use validator::Validate;

pub use health::{health, ready};
pub use players::{player_history, player_stats, search, staff_history, staff_stats};
pub use punishments::{get_punishment, list_punishments};
pub use stats::global_stats;

/// Page size defaults and ceiling applied to every paginated route
#[derive(Debug, Clone, Copy)]
pub struct PagingSettings {
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for PagingSettings {
    fn default() -> Self {
        Self {
            default_page_size: 15,
            max_page_size: 100,
        }
    }
}

impl PagingSettings {
    /// Oversized pages are clamped rather than rejected
    pub fn resolve(&self, page: Option<u32>, per_page: Option<u32>) -> Result<PageRequest> {
        let per_page = per_page
            .unwrap_or(self.default_page_size)
            .min(self.max_page_size.max(1));
        PageRequest::new(page.unwrap_or(1), per_page)
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct PageQuery {
    #[validate(range(min = 1))]
    pub page: Option<u32>,
    #[validate(range(min = 1))]
    pub per_page: Option<u32>,
}

impl PageQuery {
    pub fn into_request(self, settings: &PagingSettings) -> Result<PageRequest> {
        self.validate()
            .map_err(|e| HistoryError::InvalidInput(e.to_string()))?;
        settings.resolve(self.page, self.per_page)
    }
}

/// Identity path segment: UUIDs are normalised, anything else (console
/// aliases) is passed through trimmed.
pub(crate) fn identity_key(raw: &str) -> Result<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(HistoryError::InvalidInput(
            "identity must not be empty".to_string(),
        ));
    }
    Ok(normalize_uuid(raw).unwrap_or_else(|| raw.to_string()))
}

/// A record as rendered, with its read-time status attached
#[derive(Debug, Serialize)]
pub struct PunishmentView {
    #[serde(flatten)]
    pub record: PunishmentRecord,
    pub status: PunishmentStatus,
    pub permanent: bool,
    pub issuer_display_name: Option<String>,
}

impl PunishmentView {
    pub fn at(record: PunishmentRecord, now_ms: i64) -> Self {
        Self {
            status: derive_status(&record, now_ms),
            permanent: is_permanent(record.expires_at),
            issuer_display_name: record.issuer_display_name().map(str::to_string),
            record,
        }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .route("/ready", web::get().to(ready))
        .service(
            web::scope("/api")
                .route("/stats", web::get().to(global_stats))
                .route("/search", web::get().to(search))
                .route("/punishments/{kind}", web::get().to(list_punishments))
                .route("/punishments/{kind}/{id}", web::get().to(get_punishment))
                .route("/players/{uuid}/history", web::get().to(player_history))
                .route("/players/{uuid}/stats", web::get().to(player_stats))
                .route("/staff/{uuid}/history", web::get().to(staff_history))
                .route("/staff/{uuid}/stats", web::get().to(staff_stats)),
        );
}
