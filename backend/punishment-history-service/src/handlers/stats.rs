use crate::error::Result;
use crate::services::PunishmentLedger;
use actix_web::{web, HttpResponse};

/// Global counters plus their sum
pub async fn global_stats(ledger: web::Data<PunishmentLedger>) -> Result<HttpResponse> {
    let stats = ledger.global_stats().await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "total_bans": stats.total_bans,
        "active_bans": stats.active_bans,
        "total_mutes": stats.total_mutes,
        "active_mutes": stats.active_mutes,
        "total_warnings": stats.total_warnings,
        "active_warnings": stats.active_warnings,
        "total_kicks": stats.total_kicks,
        "total_punishments": stats.total_punishments(),
    })))
}
