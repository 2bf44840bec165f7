//! Summary counters
//!
//! Each aggregate is a single statement of independent scalar subqueries, so
//! one round trip per call. Active counts use the same time-aware predicate
//! as active-only listings.

use crate::db::executor::{Row, RowExecutor, Statement};
use crate::db::identities::IdentityDb;
use crate::db::schema::{self, ACTIVE_PREDICATE, HISTORY_TABLE};
use crate::db::single_row;
use crate::error::{Result, StoreError};
use crate::models::status::now_millis;
use crate::models::{GlobalStats, PlayerStats, PunishmentKind, StaffStats};
use chrono::{DateTime, Utc};
use std::sync::Arc;

fn count_subquery(kind: PunishmentKind, conditions: &[&str], alias: String) -> String {
    let table = schema::schema_for(kind).table;
    if conditions.is_empty() {
        format!("(SELECT COUNT(*) FROM {}) AS {}", table, alias)
    } else {
        format!(
            "(SELECT COUNT(*) FROM {} WHERE {}) AS {}",
            table,
            conditions.join(" AND "),
            alias
        )
    }
}

/// `total_<plural>` for every kind, plus `active_<plural>` for kinds with activity
fn total_and_active(filter: Option<&str>) -> Vec<String> {
    let base: Vec<&str> = filter.into_iter().collect();
    let mut columns = Vec::new();

    for kind in PunishmentKind::ALL {
        let schema = schema::schema_for(kind);
        columns.push(count_subquery(kind, &base, format!("total_{}", schema.plural)));
        if schema.tracks_activity {
            let mut active = base.clone();
            active.push(ACTIVE_PREDICATE);
            columns.push(count_subquery(kind, &active, format!("active_{}", schema.plural)));
        }
    }
    columns
}

fn seen_at(row: &Row, column: &str) -> std::result::Result<Option<DateTime<Utc>>, StoreError> {
    Ok(row
        .try_opt_i64(column)?
        .and_then(DateTime::<Utc>::from_timestamp_millis))
}

/// Database operations for summary statistics
#[derive(Clone)]
pub struct StatsDb {
    executor: Arc<dyn RowExecutor>,
    identities: IdentityDb,
}

impl StatsDb {
    pub fn new(executor: Arc<dyn RowExecutor>) -> Self {
        Self {
            identities: IdentityDb::new(executor.clone()),
            executor,
        }
    }

    pub fn player_statement(uuid: &str, now_ms: i64) -> Statement {
        let mut columns = total_and_active(Some("uuid = :uuid"));
        for (aggregate, alias) in [("MIN", "first_seen"), ("MAX", "last_seen")] {
            columns.push(format!(
                "CAST(EXTRACT(EPOCH FROM (SELECT {}(date) FROM {} WHERE uuid = :uuid)) * 1000 AS BIGINT) AS {}",
                aggregate, HISTORY_TABLE, alias
            ));
        }

        Statement::new(format!("SELECT {}", columns.join(", ")))
            .bind("uuid", uuid)
            .bind("now", now_ms)
    }

    pub fn staff_statement(uuid: &str) -> Statement {
        let columns = PunishmentKind::ALL
            .iter()
            .map(|kind| {
                count_subquery(
                    *kind,
                    &["banned_by_uuid = :uuid"],
                    format!("{}_issued", schema::schema_for(*kind).plural),
                )
            })
            .collect::<Vec<_>>();

        Statement::new(format!("SELECT {}", columns.join(", "))).bind("uuid", uuid)
    }

    pub fn global_statement(now_ms: i64) -> Statement {
        Statement::new(format!("SELECT {}", total_and_active(None).join(", "))).bind("now", now_ms)
    }

    /// `None` when the UUID has never been seen under any name
    pub async fn player_stats(&self, uuid: &str) -> Result<Option<PlayerStats>> {
        let Some(name) = self.identities.display_name_for_uuid(uuid).await? else {
            return Ok(None);
        };

        let rows = self
            .executor
            .execute(&Self::player_statement(uuid, now_millis()))
            .await?;
        let row = single_row(&rows, "player stats")?;

        let stats = PlayerStats {
            uuid: uuid.to_string(),
            name,
            total_bans: row.try_i64("total_bans")?,
            total_mutes: row.try_i64("total_mutes")?,
            total_warnings: row.try_i64("total_warnings")?,
            total_kicks: row.try_i64("total_kicks")?,
            active_bans: row.try_i64("active_bans")?,
            active_mutes: row.try_i64("active_mutes")?,
            active_warnings: row.try_i64("active_warnings")?,
            first_seen: seen_at(row, "first_seen")?,
            last_seen: seen_at(row, "last_seen")?,
        };

        tracing::debug!(uuid = %uuid, total = stats.total_punishments(), "Player stats loaded");
        Ok(Some(stats))
    }

    /// `None` when the UUID has never been seen under any name
    pub async fn staff_stats(&self, uuid: &str) -> Result<Option<StaffStats>> {
        let Some(name) = self.identities.display_name_for_uuid(uuid).await? else {
            return Ok(None);
        };

        let rows = self.executor.execute(&Self::staff_statement(uuid)).await?;
        let row = single_row(&rows, "staff stats")?;

        let stats = StaffStats {
            uuid: uuid.to_string(),
            name,
            bans_issued: row.try_i64("bans_issued")?,
            mutes_issued: row.try_i64("mutes_issued")?,
            warnings_issued: row.try_i64("warnings_issued")?,
            kicks_issued: row.try_i64("kicks_issued")?,
        };

        tracing::debug!(uuid = %uuid, issued = stats.total_issued(), "Staff stats loaded");
        Ok(Some(stats))
    }

    pub async fn global_stats(&self) -> Result<GlobalStats> {
        let rows = self
            .executor
            .execute(&Self::global_statement(now_millis()))
            .await?;
        let row = single_row(&rows, "global stats")?;

        Ok(GlobalStats {
            total_bans: row.try_i64("total_bans")?,
            active_bans: row.try_i64("active_bans")?,
            total_mutes: row.try_i64("total_mutes")?,
            active_mutes: row.try_i64("active_mutes")?,
            total_warnings: row.try_i64("total_warnings")?,
            active_warnings: row.try_i64("active_warnings")?,
            total_kicks: row.try_i64("total_kicks")?,
        })
    }
}
