use crate::db::{HistoryDb, HistoryDirection, IdentityDb, ListFilter, PunishmentsDb, RowExecutor, StatsDb};
use crate::error::{Result, SchemaConsistencyError};
use crate::models::{
    GlobalStats, IdentityHistoryEntry, PageRequest, PageResult, PlayerStats, PunishmentKind,
    PunishmentRecord, StaffStats, UnifiedHistoryRow,
};
use std::sync::Arc;

/// Read-only punishment history over one shared executor.
///
/// Cheap to clone; every component holds the same `Arc`.
#[derive(Clone)]
pub struct PunishmentLedger {
    punishments: PunishmentsDb,
    history: HistoryDb,
    stats: StatsDb,
    identities: IdentityDb,
}

impl PunishmentLedger {
    /// Fails when the cross-table projections are inconsistent
    pub fn new(executor: Arc<dyn RowExecutor>) -> std::result::Result<Self, SchemaConsistencyError> {
        Ok(Self {
            history: HistoryDb::new(executor.clone())?,
            punishments: PunishmentsDb::new(executor.clone()),
            stats: StatsDb::new(executor.clone()),
            identities: IdentityDb::new(executor),
        })
    }

    pub async fn paginate(
        &self,
        kind: PunishmentKind,
        filter: &ListFilter,
        request: PageRequest,
    ) -> Result<PageResult<PunishmentRecord>> {
        self.punishments.paginate(kind, filter, request).await
    }

    pub async fn record_by_id_and_kind(
        &self,
        id: i64,
        kind: PunishmentKind,
    ) -> Result<Option<PunishmentRecord>> {
        self.punishments.find_by_id(kind, id).await
    }

    pub async fn unified_history(
        &self,
        direction: HistoryDirection,
        uuid: &str,
        request: PageRequest,
    ) -> Result<PageResult<UnifiedHistoryRow>> {
        self.history.unified_history(direction, uuid, request).await
    }

    pub async fn player_history(
        &self,
        uuid: &str,
        request: PageRequest,
    ) -> Result<PageResult<UnifiedHistoryRow>> {
        self.history.player_history(uuid, request).await
    }

    pub async fn staff_history(
        &self,
        uuid: &str,
        request: PageRequest,
    ) -> Result<PageResult<UnifiedHistoryRow>> {
        self.history.staff_history(uuid, request).await
    }

    pub async fn player_stats(&self, uuid: &str) -> Result<Option<PlayerStats>> {
        self.stats.player_stats(uuid).await
    }

    pub async fn staff_stats(&self, uuid: &str) -> Result<Option<StaffStats>> {
        self.stats.staff_stats(uuid).await
    }

    pub async fn global_stats(&self) -> Result<GlobalStats> {
        self.stats.global_stats().await
    }

    pub async fn display_name_for_uuid(&self, uuid: &str) -> Result<Option<String>> {
        self.identities.display_name_for_uuid(uuid).await
    }

    pub async fn search_by_name_or_uuid(&self, query: &str) -> Result<Option<IdentityHistoryEntry>> {
        self.identities.search_by_name_or_uuid(query).await
    }
}
