//! Identity history lookups (names seen per UUID over time)

use crate::db::executor::{RowExecutor, Statement};
use crate::db::schema::{self, HISTORY_TABLE};
use crate::error::{HistoryError, Result};
use crate::models::IdentityHistoryEntry;
use crate::utils::identity::{looks_like_uuid, normalize_uuid};
use std::sync::Arc;

#[derive(Clone)]
pub struct IdentityDb {
    executor: Arc<dyn RowExecutor>,
}

impl IdentityDb {
    pub fn new(executor: Arc<dyn RowExecutor>) -> Self {
        Self { executor }
    }

    /// Most recent entry matching `predicate`
    fn latest_statement(predicate: &str) -> Statement {
        Statement::new(format!(
            "SELECT {} FROM {} WHERE {} ORDER BY date DESC LIMIT 1",
            schema::identity_select_list(),
            HISTORY_TABLE,
            predicate
        ))
    }

    async fn latest(&self, statement: Statement) -> Result<Option<IdentityHistoryEntry>> {
        let rows = self.executor.execute(&statement).await?;
        match rows.first() {
            Some(row) => Ok(Some(schema::decode_identity(row)?)),
            None => Ok(None),
        }
    }

    /// Name from the most recent identity entry for `uuid`
    pub async fn display_name_for_uuid(&self, uuid: &str) -> Result<Option<String>> {
        let statement = Statement::new(format!(
            "SELECT CAST(name AS TEXT) AS name FROM {} WHERE uuid = :uuid ORDER BY date DESC LIMIT 1",
            HISTORY_TABLE
        ))
        .bind("uuid", uuid);

        let rows = self.executor.execute(&statement).await?;
        match rows.first() {
            Some(row) => Ok(row.try_opt_string("name")?.filter(|name| !name.is_empty())),
            None => Ok(None),
        }
    }

    pub async fn find_by_uuid(&self, uuid: &str) -> Result<Option<IdentityHistoryEntry>> {
        self.latest(Self::latest_statement("uuid = :uuid").bind("uuid", uuid))
            .await
    }

    /// Exact name match first, case-insensitive match only if that finds nothing
    pub async fn find_by_name(&self, name: &str) -> Result<Option<IdentityHistoryEntry>> {
        let exact = self
            .latest(Self::latest_statement("name = :name").bind("name", name))
            .await?;
        if exact.is_some() {
            return Ok(exact);
        }

        self.latest(Self::latest_statement("LOWER(name) = LOWER(:name)").bind("name", name))
            .await
    }

    /// Resolve free-form search input to an identity entry
    pub async fn search_by_name_or_uuid(&self, query: &str) -> Result<Option<IdentityHistoryEntry>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(HistoryError::InvalidInput(
                "search query must not be empty".to_string(),
            ));
        }

        let found = if looks_like_uuid(query) {
            match normalize_uuid(query) {
                Some(uuid) => self.find_by_uuid(&uuid).await?,
                None => None,
            }
        } else {
            self.find_by_name(query).await?
        };

        tracing::debug!(query = %query, found = found.is_some(), "Identity search");
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_statement_shape() {
        let stmt = IdentityDb::latest_statement("LOWER(name) = LOWER(:name)").bind("name", "notch");
        assert!(stmt.sql().starts_with("SELECT CAST(id AS BIGINT) AS id"));
        assert!(stmt
            .sql()
            .ends_with("FROM litebans_history WHERE LOWER(name) = LOWER(:name) ORDER BY date DESC LIMIT 1"));
    }
}
