//! Row executor seam
//!
//! Statements are written with named placeholders (`:uuid`) and run through a
//! [`RowExecutor`]. The PostgreSQL implementation rewrites them to positional
//! `$n` parameters, runs them on a pooled connection and hands back rows of
//! plain [`SqlValue`]s so the layers above never touch driver types.

use crate::error::StoreError;
use async_trait::async_trait;
use db_pool::LazyPool;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{Column, Postgres, Row as _, TypeInfo, ValueRef};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    Null,
    Int(i64),
    Text(String),
    Bool(bool),
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

/// SQL text with named placeholders plus the values bound to them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    sql: String,
    params: Vec<(String, SqlValue)>,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Bind `value` to `:name`, replacing any earlier binding
    pub fn bind(mut self, name: &str, value: impl Into<SqlValue>) -> Self {
        let value = value.into();
        match self.params.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => self.params.push((name.to_string(), value)),
        }
        self
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn param(&self, name: &str) -> Option<&SqlValue> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value)
    }
}

/// A statement rewritten for a positional-parameter driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledStatement {
    pub sql: String,
    pub binds: Vec<SqlValue>,
}

/// Rewrite `:name` placeholders to `$1..$n`.
///
/// Each distinct name gets one position; repeated uses share it. Quoted
/// literals and `::type` casts are left alone.
pub fn compile(statement: &Statement) -> Result<CompiledStatement, StoreError> {
    let mut sql = String::with_capacity(statement.sql.len());
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut binds = Vec::new();
    let mut chars = statement.sql.chars().peekable();
    let mut in_literal = false;

    while let Some(c) = chars.next() {
        if in_literal {
            sql.push(c);
            if c == '\'' {
                in_literal = false;
            }
            continue;
        }

        match c {
            '\'' => {
                in_literal = true;
                sql.push(c);
            }
            ':' if chars.peek() == Some(&':') => {
                chars.next();
                sql.push_str("::");
            }
            ':' if chars
                .peek()
                .is_some_and(|n| n.is_ascii_alphabetic() || *n == '_') =>
            {
                let mut name = String::new();
                while let Some(&n) = chars.peek() {
                    if n.is_ascii_alphanumeric() || n == '_' {
                        name.push(n);
                        chars.next();
                    } else {
                        break;
                    }
                }

                let position = match positions.get(&name) {
                    Some(&position) => position,
                    None => {
                        let value = statement
                            .param(&name)
                            .ok_or_else(|| StoreError::UnboundParameter(name.clone()))?;
                        binds.push(value.clone());
                        positions.insert(name, binds.len());
                        binds.len()
                    }
                };
                sql.push('$');
                sql.push_str(&position.to_string());
            }
            _ => sql.push(c),
        }
    }

    Ok(CompiledStatement { sql, binds })
}

/// One result row, columns in projection order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    columns: Vec<(String, SqlValue)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<SqlValue>) -> Self {
        self.push(name, value);
        self
    }

    pub fn push(&mut self, name: &str, value: impl Into<SqlValue>) {
        self.columns.push((name.to_string(), value.into()));
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, column: &str) -> Result<&SqlValue, StoreError> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
            .ok_or_else(|| StoreError::decode(column, "column missing from result"))
    }

    pub fn try_opt_i64(&self, column: &str) -> Result<Option<i64>, StoreError> {
        match self.get(column)? {
            SqlValue::Null => Ok(None),
            SqlValue::Int(value) => Ok(Some(*value)),
            other => Err(StoreError::decode(
                column,
                format!("expected integer, found {:?}", other),
            )),
        }
    }

    pub fn try_i64(&self, column: &str) -> Result<i64, StoreError> {
        self.try_opt_i64(column)?
            .ok_or_else(|| StoreError::decode(column, "unexpected NULL"))
    }

    pub fn try_opt_string(&self, column: &str) -> Result<Option<String>, StoreError> {
        match self.get(column)? {
            SqlValue::Null => Ok(None),
            SqlValue::Text(value) => Ok(Some(value.clone())),
            other => Err(StoreError::decode(
                column,
                format!("expected text, found {:?}", other),
            )),
        }
    }

    /// Bit, integer or boolean flag normalised to `bool`
    pub fn try_opt_flag(&self, column: &str) -> Result<Option<bool>, StoreError> {
        match self.get(column)? {
            SqlValue::Null => Ok(None),
            SqlValue::Int(value) => Ok(Some(*value != 0)),
            SqlValue::Bool(value) => Ok(Some(*value)),
            other => Err(StoreError::decode(
                column,
                format!("expected flag, found {:?}", other),
            )),
        }
    }

    pub fn try_flag(&self, column: &str) -> Result<bool, StoreError> {
        self.try_opt_flag(column)?
            .ok_or_else(|| StoreError::decode(column, "unexpected NULL"))
    }
}

/// Execute a parameterized statement and return its rows.
///
/// Exactly one logical execution per call; implementations never retry.
#[async_trait]
pub trait RowExecutor: Send + Sync {
    async fn execute(&self, statement: &Statement) -> Result<Vec<Row>, StoreError>;
}

/// Executes statements on the shared PostgreSQL pool
pub struct PgRowExecutor {
    pool: Arc<LazyPool>,
    statement_timeout: Option<Duration>,
}

impl PgRowExecutor {
    pub fn new(pool: Arc<LazyPool>) -> Self {
        Self {
            pool,
            statement_timeout: None,
        }
    }

    pub fn with_statement_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.statement_timeout = timeout;
        self
    }

    async fn run(&self, compiled: &CompiledStatement) -> Result<Vec<Row>, StoreError> {
        let pool = self.pool.get().await?;
        // Dropping the connection, including on timeout, returns it to the pool
        let mut conn = db_pool::acquire_with_metrics(pool, self.pool.service_name()).await?;

        let mut query = sqlx::query(&compiled.sql);
        for value in &compiled.binds {
            query = bind_value(query, value);
        }

        let rows = query.fetch_all(&mut *conn).await?;
        rows.iter().map(decode_pg_row).collect()
    }
}

#[async_trait]
impl RowExecutor for PgRowExecutor {
    async fn execute(&self, statement: &Statement) -> Result<Vec<Row>, StoreError> {
        let compiled = compile(statement)?;

        match self.statement_timeout {
            Some(limit) => tokio::time::timeout(limit, self.run(&compiled))
                .await
                .map_err(|_| StoreError::Timeout(limit))?,
            None => self.run(&compiled).await,
        }
    }
}

fn bind_value<'q>(
    query: Query<'q, Postgres, PgArguments>,
    value: &'q SqlValue,
) -> Query<'q, Postgres, PgArguments> {
    match value {
        SqlValue::Null => query.bind(Option::<String>::None),
        SqlValue::Int(v) => query.bind(*v),
        SqlValue::Text(v) => query.bind(v.as_str()),
        SqlValue::Bool(v) => query.bind(*v),
    }
}

fn decode_pg_row(row: &PgRow) -> Result<Row, StoreError> {
    let mut out = Row::new();

    for (index, column) in row.columns().iter().enumerate() {
        let name = column.name();
        if row.try_get_raw(index)?.is_null() {
            out.push(name, SqlValue::Null);
            continue;
        }

        let value = match column.type_info().name() {
            "INT2" => SqlValue::Int(i64::from(row.try_get::<i16, _>(index)?)),
            "INT4" => SqlValue::Int(i64::from(row.try_get::<i32, _>(index)?)),
            "INT8" => SqlValue::Int(row.try_get::<i64, _>(index)?),
            "BOOL" => SqlValue::Bool(row.try_get::<bool, _>(index)?),
            "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => {
                SqlValue::Text(row.try_get::<String, _>(index)?)
            }
            other => {
                return Err(StoreError::UnsupportedColumnType {
                    column: name.to_string(),
                    type_name: other.to_string(),
                })
            }
        };
        out.push(name, value);
    }

    Ok(out)
}
