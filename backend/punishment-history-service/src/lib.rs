pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use db::{HistoryDirection, ListFilter, PgRowExecutor, RowExecutor};
pub use error::{HistoryError, Result, SchemaConsistencyError, StoreError};
pub use models::{
    GlobalStats, IdentityHistoryEntry, PageRequest, PageResult, PlayerStats, PunishmentKind,
    PunishmentRecord, PunishmentStatus, StaffStats, UnifiedHistoryRow,
};
pub use services::PunishmentLedger;
