/// Per-kind listing and single-record handlers
use super::{identity_key, PagingSettings, PunishmentView};
use crate::db::ListFilter;
use crate::error::{HistoryError, Result};
use crate::models::status::now_millis;
use crate::models::PunishmentKind;
use crate::services::PunishmentLedger;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Default, Deserialize, Validate)]
pub struct ListQuery {
    #[validate(range(min = 1))]
    pub page: Option<u32>,
    #[validate(range(min = 1))]
    pub per_page: Option<u32>,
    #[serde(default)]
    pub active_only: bool,
    pub uuid: Option<String>,
}

fn parse_kind(raw: &str) -> Result<PunishmentKind> {
    raw.parse().map_err(HistoryError::InvalidInput)
}

/// List one kind of punishment, newest first
pub async fn list_punishments(
    ledger: web::Data<PunishmentLedger>,
    settings: web::Data<PagingSettings>,
    path: web::Path<String>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse> {
    let kind = parse_kind(&path)?;
    let query = query.into_inner();
    query
        .validate()
        .map_err(|e| HistoryError::InvalidInput(e.to_string()))?;

    let request = settings.resolve(query.page, query.per_page)?;
    let filter = ListFilter {
        exclude_inactive: query.active_only,
        subject_uuid: query.uuid.as_deref().map(identity_key).transpose()?,
    };

    let page = ledger.paginate(kind, &filter, request).await?;
    let now_ms = now_millis();
    Ok(HttpResponse::Ok().json(page.map(|record| PunishmentView::at(record, now_ms))))
}

/// Get a single punishment by kind and id
pub async fn get_punishment(
    ledger: web::Data<PunishmentLedger>,
    path: web::Path<(String, i64)>,
) -> Result<HttpResponse> {
    let (kind, id) = path.into_inner();
    let kind = parse_kind(&kind)?;

    match ledger.record_by_id_and_kind(id, kind).await? {
        Some(record) => Ok(HttpResponse::Ok().json(PunishmentView::at(record, now_millis()))),
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "error": format!("{} {} not found", kind, id),
            "status": 404,
        }))),
    }
}
