//! Scripted RowExecutor for integration tests
//!
//! Records every statement it is handed and answers with the next scripted
//! response, so tests can assert on round trips without a database.

#![allow(dead_code)]

use async_trait::async_trait;
use punishment_history_service::db::{Row, RowExecutor, SqlValue, Statement};
use punishment_history_service::{PunishmentKind, StoreError};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const PLAYER_UUID: &str = "069a79f4-44e9-4726-a5be-fca90e38aaf5";
pub const STAFF_UUID: &str = "853c80ef-3c37-49fd-aa49-938b674adae6";

pub enum Scripted {
    Rows(Vec<Row>),
    Timeout,
}

#[derive(Clone, Default)]
pub struct ScriptedExecutor {
    responses: Arc<Mutex<VecDeque<Scripted>>>,
    issued: Arc<Mutex<Vec<Statement>>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then_rows(self, rows: Vec<Row>) -> Self {
        self.responses.lock().unwrap().push_back(Scripted::Rows(rows));
        self
    }

    pub fn then_timeout(self) -> Self {
        self.responses.lock().unwrap().push_back(Scripted::Timeout);
        self
    }

    pub fn issued(&self) -> Vec<Statement> {
        self.issued.lock().unwrap().clone()
    }

    pub fn issued_count(&self) -> usize {
        self.issued.lock().unwrap().len()
    }
}

#[async_trait]
impl RowExecutor for ScriptedExecutor {
    async fn execute(&self, statement: &Statement) -> Result<Vec<Row>, StoreError> {
        self.issued.lock().unwrap().push(statement.clone());

        match self.responses.lock().unwrap().pop_front() {
            Some(Scripted::Rows(rows)) => Ok(rows),
            Some(Scripted::Timeout) => Err(StoreError::Timeout(Duration::from_millis(50))),
            None => Ok(Vec::new()),
        }
    }
}

pub fn count_row(total: i64) -> Row {
    Row::new().with("total", total)
}

/// A row shaped like a single-kind projection; `tagged` adds the union columns
pub fn punishment_row(kind: PunishmentKind, id: i64, time: i64, tagged: bool) -> Row {
    let mut row = Row::new()
        .with("id", id)
        .with("uuid", PLAYER_UUID)
        .with("ip", "127.0.0.1")
        .with("reason", "testing")
        .with("banned_by_uuid", STAFF_UUID)
        .with("banned_by_name", "jeb_")
        .with("time", time)
        .with("until", -1_i64)
        .with("server_scope", "*")
        .with("server_origin", "survival")
        .with("active", 1_i64)
        .with("ipban", 0_i64)
        .with("silent", 0_i64);

    let has_removal = kind != PunishmentKind::Kick;
    if has_removal || tagged {
        for column in [
            "removed_by_uuid",
            "removed_by_name",
            "removed_by_reason",
            "removed_by_date",
        ] {
            row.push(column, SqlValue::Null);
        }
    }
    if kind == PunishmentKind::Warning {
        row.push("warned", 0_i64);
    } else if tagged {
        row.push("warned", SqlValue::Null);
    }
    if tagged {
        row.push("punishment_type", kind.as_str());
    }
    row
}
