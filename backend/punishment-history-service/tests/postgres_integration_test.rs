//! End-to-end tests against a real PostgreSQL instance
//!
//! Run with: DATABASE_URL=postgres://... cargo test -- --ignored
//! The tests recreate the enforcement tables in the target database.

use db_pool::{DbConfig, LazyPool};
use punishment_history_service::db::PgRowExecutor;
use punishment_history_service::{
    HistoryError, ListFilter, PageRequest, PunishmentKind, PunishmentLedger, PunishmentStatus,
    StoreError,
};
use serial_test::serial;
use sqlx::PgPool;
use std::sync::Arc;

const PLAYER: &str = "069a79f4-44e9-4726-a5be-fca90e38aaf5";
const STAFF: &str = "853c80ef-3c37-49fd-aa49-938b674adae6";

const PUNISHMENT_COLUMNS: &str = "
    id BIGSERIAL PRIMARY KEY,
    uuid VARCHAR(36),
    ip VARCHAR(45),
    reason VARCHAR(2048),
    banned_by_uuid VARCHAR(36),
    banned_by_name VARCHAR(128),
    time BIGINT NOT NULL,
    until BIGINT NOT NULL,
    server_scope VARCHAR(32),
    server_origin VARCHAR(32),
    silent BOOLEAN NOT NULL DEFAULT FALSE,
    ipban BOOLEAN NOT NULL DEFAULT FALSE,
    active BOOLEAN NOT NULL DEFAULT TRUE";

const REMOVAL_COLUMNS: &str = ",
    removed_by_uuid VARCHAR(36),
    removed_by_name VARCHAR(128),
    removed_by_reason VARCHAR(2048),
    removed_by_date TIMESTAMP";

struct TestStore {
    setup: PgPool,
    pool: Arc<LazyPool>,
    ledger: PunishmentLedger,
}

async fn store() -> TestStore {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let setup = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to PostgreSQL");

    let tables = [
        ("litebans_bans", REMOVAL_COLUMNS),
        ("litebans_mutes", REMOVAL_COLUMNS),
        ("litebans_kicks", ""),
    ];
    for (table, extra) in tables {
        sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
            .execute(&setup)
            .await
            .unwrap();
        sqlx::query(&format!("CREATE TABLE {} ({}{})", table, PUNISHMENT_COLUMNS, extra))
            .execute(&setup)
            .await
            .unwrap();
    }

    sqlx::query("DROP TABLE IF EXISTS litebans_warnings")
        .execute(&setup)
        .await
        .unwrap();
    sqlx::query(&format!(
        "CREATE TABLE litebans_warnings ({}{}, warned BOOLEAN NOT NULL DEFAULT FALSE)",
        PUNISHMENT_COLUMNS, REMOVAL_COLUMNS
    ))
    .execute(&setup)
    .await
    .unwrap();

    sqlx::query("DROP TABLE IF EXISTS litebans_history")
        .execute(&setup)
        .await
        .unwrap();
    sqlx::query(
        "CREATE TABLE litebans_history (
            id BIGSERIAL PRIMARY KEY,
            date TIMESTAMP NOT NULL,
            name VARCHAR(16),
            uuid VARCHAR(36),
            ip VARCHAR(45))",
    )
    .execute(&setup)
    .await
    .unwrap();

    let pool = Arc::new(LazyPool::new(DbConfig {
        service_name: "punishment-history-test".to_string(),
        database_url,
        max_connections: 2,
        ..DbConfig::default()
    }));
    let ledger = PunishmentLedger::new(Arc::new(PgRowExecutor::new(pool.clone()))).unwrap();

    TestStore {
        setup,
        pool,
        ledger,
    }
}

async fn insert(
    pool: &PgPool,
    kind: PunishmentKind,
    subject: &str,
    time: i64,
    until: i64,
    active: bool,
) {
    let table = format!("litebans_{}s", kind.as_str());
    sqlx::query(&format!(
        "INSERT INTO {} (uuid, reason, banned_by_uuid, banned_by_name, time, until, server_scope, active)
         VALUES ($1, 'test', $2, 'jeb_', $3, $4, '*', $5)",
        table
    ))
    .bind(subject)
    .bind(STAFF)
    .bind(time)
    .bind(until)
    .bind(active)
    .execute(pool)
    .await
    .unwrap();
}

async fn seen(pool: &PgPool, name: &str, uuid: &str, at: &str) {
    sqlx::query(&format!(
        "INSERT INTO litebans_history (date, name, uuid) VALUES (TIMESTAMP '{}', $1, $2)",
        at
    ))
    .bind(name)
    .bind(uuid)
    .execute(pool)
    .await
    .unwrap();
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_thirty_seven_bans_in_pages_of_fifteen() {
    let store = store().await;
    for i in 0..37 {
        insert(&store.setup, PunishmentKind::Ban, PLAYER, 1_000 + i, -1, true).await;
    }
    // never listed
    insert(&store.setup, PunishmentKind::Ban, "#offline#", 5_000, -1, true).await;

    let filter = ListFilter::default();
    let mut sizes = Vec::new();
    for page in 1..=4 {
        let result = store
            .ledger
            .paginate(PunishmentKind::Ban, &filter, PageRequest::new(page, 15).unwrap())
            .await
            .unwrap();
        assert_eq!(result.total_count, 37);
        assert_eq!(result.total_pages, 3);
        sizes.push(result.items.len());

        if page == 1 {
            assert_eq!(result.items[0].created_at, 1_036);
        }
    }
    assert_eq!(sizes, vec![15, 15, 7, 0]);

    store.pool.close().await;
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_unified_history_interleaves_across_tables() {
    let store = store().await;
    insert(&store.setup, PunishmentKind::Ban, PLAYER, 100, -1, true).await;
    insert(&store.setup, PunishmentKind::Kick, PLAYER, 200, 0, false).await;
    insert(&store.setup, PunishmentKind::Mute, PLAYER, 300, -1, true).await;
    insert(&store.setup, PunishmentKind::Kick, PLAYER, 400, 0, false).await;
    insert(&store.setup, PunishmentKind::Ban, PLAYER, 500, -1, true).await;
    insert(&store.setup, PunishmentKind::Kick, PLAYER, 600, 0, false).await;

    let page = store
        .ledger
        .player_history(PLAYER, PageRequest::new(2, 4).unwrap())
        .await
        .unwrap();

    assert_eq!(page.total_count, 6);
    assert_eq!(page.items.len(), 2);
    let seen: Vec<_> = page
        .items
        .iter()
        .map(|row| (row.kind(), row.record().created_at))
        .collect();
    assert_eq!(
        seen,
        vec![(PunishmentKind::Kick, 200), (PunishmentKind::Ban, 100)]
    );

    let staff = store
        .ledger
        .staff_history(STAFF, PageRequest::new(1, 15).unwrap())
        .await
        .unwrap();
    assert_eq!(staff.total_count, 6);

    store.pool.close().await;
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_active_only_listing_and_status() {
    let store = store().await;
    insert(&store.setup, PunishmentKind::Ban, PLAYER, 1_000, -1, true).await;
    insert(&store.setup, PunishmentKind::Mute, PLAYER, 2_000, 1_500, true).await;
    insert(&store.setup, PunishmentKind::Mute, PLAYER, 3_000, -1, false).await;

    let active_only = ListFilter {
        exclude_inactive: true,
        subject_uuid: None,
    };
    let mutes = store
        .ledger
        .paginate(PunishmentKind::Mute, &active_only, PageRequest::new(1, 15).unwrap())
        .await
        .unwrap();
    assert_eq!(mutes.total_count, 0);

    let all_mutes = store
        .ledger
        .paginate(PunishmentKind::Mute, &ListFilter::default(), PageRequest::new(1, 15).unwrap())
        .await
        .unwrap();
    assert!(all_mutes
        .items
        .iter()
        .all(|m| m.status() == PunishmentStatus::Expired));

    let ban = store
        .ledger
        .record_by_id_and_kind(1, PunishmentKind::Ban)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(ban.status(), PunishmentStatus::Active);
    assert!(ban.is_permanent());

    let global = store.ledger.global_stats().await.unwrap();
    assert_eq!(global.total_mutes, 2);
    assert_eq!(global.active_mutes, 0);
    assert_eq!(global.active_bans, 1);

    store.pool.close().await;
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_identity_lookups_and_player_stats() {
    let store = store().await;
    seen(&store.setup, "Notch_old", PLAYER, "2020-01-01 00:00:00").await;
    seen(&store.setup, "Notch", PLAYER, "2021-01-01 00:00:00").await;
    insert(&store.setup, PunishmentKind::Kick, PLAYER, 100, 0, false).await;

    assert_eq!(
        store.ledger.display_name_for_uuid(PLAYER).await.unwrap().as_deref(),
        Some("Notch")
    );

    let found = store
        .ledger
        .search_by_name_or_uuid("NOTCH")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.uuid.as_deref(), Some(PLAYER));

    let stats = store.ledger.player_stats(PLAYER).await.unwrap().unwrap();
    assert_eq!(stats.total_kicks, 1);
    assert_eq!(stats.total_punishments(), 1);
    assert!(stats.first_seen < stats.last_seen);

    assert!(store.ledger.player_stats(STAFF).await.unwrap().is_none());

    store.pool.close().await;
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_closed_pool_is_not_recreated() {
    let store = store().await;
    store.ledger.global_stats().await.unwrap();
    assert!(store.pool.is_initialized());

    store.pool.close().await;

    let result = store.ledger.global_stats().await;
    assert!(matches!(
        result,
        Err(HistoryError::Store(StoreError::Database(sqlx::Error::PoolClosed)))
    ));
}
