//! Paginated listings over a single punishment table

use crate::db::executor::{RowExecutor, Statement};
use crate::db::schema::{self, ACTIVE_PREDICATE, LISTABLE_SUBJECT};
use crate::db::single_row;
use crate::error::Result;
use crate::models::status::now_millis;
use crate::models::{PageRequest, PageResult, PunishmentKind, PunishmentRecord};
use crate::utils::identity::OFFLINE_SUBJECT;
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    /// Only rows whose flag is set and whose expiry has not passed.
    /// Ignored for kicks, which are never active.
    pub exclude_inactive: bool,
    pub subject_uuid: Option<String>,
}

/// Database operations for per-kind punishment listings
#[derive(Clone)]
pub struct PunishmentsDb {
    executor: Arc<dyn RowExecutor>,
}

impl PunishmentsDb {
    pub fn new(executor: Arc<dyn RowExecutor>) -> Self {
        Self { executor }
    }

    fn where_clause(kind: PunishmentKind, filter: &ListFilter) -> String {
        let mut clauses = vec![LISTABLE_SUBJECT];
        if filter.subject_uuid.is_some() {
            clauses.push("uuid = :uuid");
        }
        if filter.exclude_inactive && schema::schema_for(kind).tracks_activity {
            clauses.push(ACTIVE_PREDICATE);
        }
        format!("WHERE {}", clauses.join(" AND "))
    }

    fn bind_filter(statement: Statement, filter: &ListFilter, now_ms: i64) -> Statement {
        let mut statement = statement.bind("offline_uuid", OFFLINE_SUBJECT);
        if let Some(uuid) = &filter.subject_uuid {
            statement = statement.bind("uuid", uuid.as_str());
        }
        if filter.exclude_inactive {
            statement = statement.bind("now", now_ms);
        }
        statement
    }

    pub fn count_statement(kind: PunishmentKind, filter: &ListFilter, now_ms: i64) -> Statement {
        let sql = format!(
            "SELECT COUNT(*) AS total FROM {} {}",
            schema::schema_for(kind).table,
            Self::where_clause(kind, filter)
        );
        Self::bind_filter(Statement::new(sql), filter, now_ms)
    }

    pub fn page_statement(
        kind: PunishmentKind,
        filter: &ListFilter,
        request: PageRequest,
        now_ms: i64,
    ) -> Statement {
        let sql = format!(
            "SELECT {} FROM {} {} ORDER BY time DESC LIMIT :limit OFFSET :offset",
            schema::select_list(kind),
            schema::schema_for(kind).table,
            Self::where_clause(kind, filter)
        );
        Self::bind_filter(Statement::new(sql), filter, now_ms)
            .bind("limit", request.limit())
            .bind("offset", request.offset())
    }

    /// Count first, then fetch the page.
    ///
    /// The two statements are separate snapshots; under concurrent writes the
    /// total and the items may disagree by what was written in between.
    pub async fn paginate(
        &self,
        kind: PunishmentKind,
        filter: &ListFilter,
        request: PageRequest,
    ) -> Result<PageResult<PunishmentRecord>> {
        let now_ms = now_millis();

        let rows = self
            .executor
            .execute(&Self::count_statement(kind, filter, now_ms))
            .await?;
        let total = single_row(&rows, "total")?.try_i64("total")?;

        let rows = self
            .executor
            .execute(&Self::page_statement(kind, filter, request, now_ms))
            .await?;
        let items = rows
            .iter()
            .map(|row| schema::decode_record(kind, row))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        tracing::debug!(
            kind = %kind,
            page = request.page(),
            per_page = request.per_page(),
            exclude_inactive = filter.exclude_inactive,
            total,
            returned = items.len(),
            "Punishment page loaded"
        );

        Ok(PageResult::new(items, total, request))
    }

    pub async fn find_by_id(&self, kind: PunishmentKind, id: i64) -> Result<Option<PunishmentRecord>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = :id",
            schema::select_list(kind),
            schema::schema_for(kind).table
        );
        let rows = self
            .executor
            .execute(&Statement::new(sql).bind("id", id))
            .await?;

        match rows.first() {
            Some(row) => Ok(Some(schema::decode_record(kind, row)?)),
            None => Ok(None),
        }
    }
}
