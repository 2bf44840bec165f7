pub mod executor;
pub mod history;
pub mod identities;
pub mod punishments;
pub mod schema;
pub mod stats;

pub use executor::{PgRowExecutor, Row, RowExecutor, SqlValue, Statement};
pub use history::{HistoryDb, HistoryDirection};
pub use identities::IdentityDb;
pub use punishments::{ListFilter, PunishmentsDb};
pub use stats::StatsDb;

use crate::error::StoreError;

/// The single row an aggregate statement returns
pub(crate) fn single_row<'a>(rows: &'a [Row], what: &str) -> Result<&'a Row, StoreError> {
    match rows {
        [row] => Ok(row),
        _ => Err(StoreError::decode(
            what,
            format!("expected exactly one row, got {}", rows.len()),
        )),
    }
}
