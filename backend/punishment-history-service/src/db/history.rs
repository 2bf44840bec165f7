//! Cross-table history feed
//!
//! Merges the four punishment tables into one feed ordered by creation time.
//! Ordering and paging happen once over the UNION ALL, never per table, so a
//! page can mix kinds freely.

use crate::db::executor::{RowExecutor, Statement};
use crate::db::schema;
use crate::db::single_row;
use crate::error::{Result, SchemaConsistencyError};
use crate::models::{PageRequest, PageResult, PunishmentKind, UnifiedHistoryRow};
use std::sync::Arc;

/// Which identity column the feed is keyed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryDirection {
    /// Punishments received by a player
    Subject,
    /// Punishments issued by a staff member
    Issuer,
}

impl HistoryDirection {
    pub fn column(&self) -> &'static str {
        match self {
            HistoryDirection::Subject => "uuid",
            HistoryDirection::Issuer => "banned_by_uuid",
        }
    }
}

#[derive(Clone)]
pub struct HistoryDb {
    executor: Arc<dyn RowExecutor>,
}

impl HistoryDb {
    /// Fails when the union branches would not line up
    pub fn new(executor: Arc<dyn RowExecutor>) -> std::result::Result<Self, SchemaConsistencyError> {
        schema::verify_union_parity()?;
        Ok(Self { executor })
    }

    pub fn count_statement(direction: HistoryDirection, uuid: &str) -> Statement {
        let counts = PunishmentKind::ALL
            .iter()
            .map(|kind| {
                format!(
                    "(SELECT COUNT(*) FROM {} WHERE {} = :uuid)",
                    schema::schema_for(*kind).table,
                    direction.column()
                )
            })
            .collect::<Vec<_>>()
            .join(" + ");

        Statement::new(format!("SELECT {} AS total", counts)).bind("uuid", uuid)
    }

    pub fn page_statement(
        direction: HistoryDirection,
        uuid: &str,
        request: PageRequest,
    ) -> Statement {
        let branches = PunishmentKind::ALL
            .iter()
            .map(|kind| {
                format!(
                    "SELECT {} FROM {} WHERE {} = :uuid",
                    schema::union_select_list(*kind),
                    schema::schema_for(*kind).table,
                    direction.column()
                )
            })
            .collect::<Vec<_>>()
            .join(" UNION ALL ");

        Statement::new(format!(
            "SELECT * FROM ({}) AS unified ORDER BY time DESC LIMIT :limit OFFSET :offset",
            branches
        ))
        .bind("uuid", uuid)
        .bind("limit", request.limit())
        .bind("offset", request.offset())
    }

    /// One summed count, then one unioned page; both must succeed.
    pub async fn unified_history(
        &self,
        direction: HistoryDirection,
        uuid: &str,
        request: PageRequest,
    ) -> Result<PageResult<UnifiedHistoryRow>> {
        let rows = self
            .executor
            .execute(&Self::count_statement(direction, uuid))
            .await?;
        let total = single_row(&rows, "total")?.try_i64("total")?;

        let rows = self
            .executor
            .execute(&Self::page_statement(direction, uuid, request))
            .await?;

        let mut items = Vec::with_capacity(rows.len());
        for row in &rows {
            let kind = schema::decode_kind_tag(row)?;
            items.push(UnifiedHistoryRow::new(schema::decode_record(kind, row)?));
        }

        tracing::debug!(
            direction = ?direction,
            uuid = %uuid,
            page = request.page(),
            total,
            returned = items.len(),
            "Unified history page loaded"
        );

        Ok(PageResult::new(items, total, request))
    }

    pub async fn player_history(
        &self,
        uuid: &str,
        request: PageRequest,
    ) -> Result<PageResult<UnifiedHistoryRow>> {
        self.unified_history(HistoryDirection::Subject, uuid, request)
            .await
    }

    pub async fn staff_history(
        &self,
        uuid: &str,
        request: PageRequest,
    ) -> Result<PageResult<UnifiedHistoryRow>> {
        self.unified_history(HistoryDirection::Issuer, uuid, request)
            .await
    }
}
