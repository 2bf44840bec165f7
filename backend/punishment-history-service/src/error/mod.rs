use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use std::time::Duration;
use thiserror::Error;

/// Failures raised while executing a statement against the store.
///
/// None of these are recovered locally; they always reach the caller.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Statement timed out after {0:?}")]
    Timeout(Duration),

    #[error("Statement references unbound parameter :{0}")]
    UnboundParameter(String),

    #[error("Column {column}: {detail}")]
    Decode { column: String, detail: String },

    #[error("Column {column} has unsupported type {type_name}")]
    UnsupportedColumnType { column: String, type_name: String },
}

impl StoreError {
    pub fn decode(column: impl Into<String>, detail: impl Into<String>) -> Self {
        StoreError::Decode {
            column: column.into(),
            detail: detail.into(),
        }
    }
}

/// Union branches disagree on column count, order or type.
///
/// Raised while the ledger is constructed; it means the projection tables
/// in `db::schema` are wrong, not that a request went bad.
#[derive(Debug, Error)]
#[error("Schema consistency violation: {0}")]
pub struct SchemaConsistencyError(pub String);

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Schema(#[from] SchemaConsistencyError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for HistoryError {
    fn from(err: sqlx::Error) -> Self {
        HistoryError::Store(StoreError::Database(err))
    }
}

impl ResponseError for HistoryError {
    fn status_code(&self) -> StatusCode {
        match self {
            HistoryError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            HistoryError::Store(StoreError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            HistoryError::Store(_) | HistoryError::Schema(_) | HistoryError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = match self {
            HistoryError::InvalidInput(msg) => msg.clone(),
            HistoryError::Store(e) => {
                tracing::error!("Store error: {:?}", e);
                "Internal server error".to_string()
            }
            HistoryError::Schema(e) => {
                tracing::error!("Schema error: {}", e);
                "Internal server error".to_string()
            }
            HistoryError::Config(e) => {
                tracing::error!("Configuration error: {}", e);
                "Internal server error".to_string()
            }
        };

        HttpResponse::build(status).json(serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        }))
    }
}

pub type Result<T> = std::result::Result<T, HistoryError>;
