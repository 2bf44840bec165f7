mod common;

use common::{ScriptedExecutor, PLAYER_UUID, STAFF_UUID};
use punishment_history_service::db::{Row, SqlValue};
use punishment_history_service::PunishmentLedger;
use std::sync::Arc;

fn ledger(executor: &ScriptedExecutor) -> PunishmentLedger {
    PunishmentLedger::new(Arc::new(executor.clone())).unwrap()
}

#[tokio::test]
async fn test_player_stats_in_one_round_trip_after_name_lookup() {
    let stats_row = Row::new()
        .with("total_bans", 2_i64)
        .with("active_bans", 1_i64)
        .with("total_mutes", 1_i64)
        .with("active_mutes", 0_i64)
        .with("total_warnings", 0_i64)
        .with("active_warnings", 0_i64)
        .with("total_kicks", 3_i64)
        .with("first_seen", 1_600_000_000_000_i64)
        .with("last_seen", SqlValue::Null);
    let executor = ScriptedExecutor::new()
        .then_rows(vec![Row::new().with("name", "Notch")])
        .then_rows(vec![stats_row]);

    let stats = ledger(&executor)
        .player_stats(PLAYER_UUID)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(stats.name, "Notch");
    assert_eq!(stats.total_punishments(), 6);
    assert_eq!(stats.active_bans, 1);
    assert_eq!(
        stats.first_seen.map(|t| t.timestamp_millis()),
        Some(1_600_000_000_000)
    );
    assert!(stats.last_seen.is_none());

    let issued = executor.issued();
    assert_eq!(issued.len(), 2);
    assert!(issued[0].sql().contains("FROM litebans_history"));
    assert!(issued[1].param("now").is_some());
}

#[tokio::test]
async fn test_unknown_player_is_absent_not_error() {
    let executor = ScriptedExecutor::new().then_rows(vec![]);

    let stats = ledger(&executor).player_stats(PLAYER_UUID).await.unwrap();

    assert!(stats.is_none());
    assert_eq!(executor.issued_count(), 1);
}

#[tokio::test]
async fn test_staff_stats() {
    let executor = ScriptedExecutor::new()
        .then_rows(vec![Row::new().with("name", "jeb_")])
        .then_rows(vec![Row::new()
            .with("bans_issued", 4_i64)
            .with("mutes_issued", 3_i64)
            .with("warnings_issued", 2_i64)
            .with("kicks_issued", 1_i64)]);

    let stats = ledger(&executor)
        .staff_stats(STAFF_UUID)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(stats.total_issued(), 10);
    assert!(executor.issued()[1].sql().contains("banned_by_uuid = :uuid"));
}

#[tokio::test]
async fn test_global_stats() {
    let executor = ScriptedExecutor::new().then_rows(vec![Row::new()
        .with("total_bans", 10_i64)
        .with("active_bans", 4_i64)
        .with("total_mutes", 5_i64)
        .with("active_mutes", 1_i64)
        .with("total_warnings", 7_i64)
        .with("active_warnings", 7_i64)
        .with("total_kicks", 8_i64)]);

    let stats = ledger(&executor).global_stats().await.unwrap();

    assert_eq!(stats.total_punishments(), 30);
    assert_eq!(stats.active_bans, 4);
    assert_eq!(executor.issued_count(), 1);
}

#[tokio::test]
async fn test_global_stats_rejects_missing_row() {
    let executor = ScriptedExecutor::new().then_rows(vec![]);
    assert!(ledger(&executor).global_stats().await.is_err());
}
