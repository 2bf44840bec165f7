/// Player and staff handlers: unified history, stats, identity search
use super::{identity_key, PageQuery, PagingSettings};
use crate::db::HistoryDirection;
use crate::error::Result;
use crate::services::PunishmentLedger;
use actix_web::{web, HttpResponse};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

fn not_found(what: &str, key: &str) -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({
        "error": format!("{} {} not found", what, key),
        "status": 404,
    }))
}

async fn history(
    ledger: &PunishmentLedger,
    settings: &PagingSettings,
    direction: HistoryDirection,
    raw_uuid: &str,
    query: PageQuery,
) -> Result<HttpResponse> {
    let uuid = identity_key(raw_uuid)?;
    let request = query.into_request(settings)?;
    let page = ledger.unified_history(direction, &uuid, request).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// Punishments received by a player, all kinds, newest first
pub async fn player_history(
    ledger: web::Data<PunishmentLedger>,
    settings: web::Data<PagingSettings>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    history(
        &ledger,
        &settings,
        HistoryDirection::Subject,
        &path,
        query.into_inner(),
    )
    .await
}

/// Punishments issued by a staff member, all kinds, newest first
pub async fn staff_history(
    ledger: web::Data<PunishmentLedger>,
    settings: web::Data<PagingSettings>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    history(
        &ledger,
        &settings,
        HistoryDirection::Issuer,
        &path,
        query.into_inner(),
    )
    .await
}

pub async fn player_stats(
    ledger: web::Data<PunishmentLedger>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let uuid = identity_key(&path)?;
    match ledger.player_stats(&uuid).await? {
        Some(stats) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "total_punishments": stats.total_punishments(),
            "stats": stats,
        }))),
        None => Ok(not_found("player", &uuid)),
    }
}

pub async fn staff_stats(
    ledger: web::Data<PunishmentLedger>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let uuid = identity_key(&path)?;
    match ledger.staff_stats(&uuid).await? {
        Some(stats) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "total_issued": stats.total_issued(),
            "stats": stats,
        }))),
        None => Ok(not_found("staff member", &uuid)),
    }
}

/// Look a player up by name or UUID
pub async fn search(
    ledger: web::Data<PunishmentLedger>,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse> {
    let q = query.q.trim();

    let Some(entry) = ledger.search_by_name_or_uuid(q).await? else {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "found": false,
            "query": q,
        })));
    };

    let stats = match entry.uuid.as_deref() {
        Some(uuid) => ledger.player_stats(uuid).await?,
        None => None,
    };

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "found": true,
        "player": {
            "uuid": entry.uuid,
            "name": entry.display_name,
        },
        "stats": stats,
    })))
}
