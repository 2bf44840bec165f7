use chrono::{DateTime, Utc};
use serde::Serialize;

/// One observed association between a display name, identity and address
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityHistoryEntry {
    pub id: i64,
    pub recorded_at: Option<DateTime<Utc>>,
    pub display_name: Option<String>,
    pub uuid: Option<String>,
    pub ip: Option<String>,
}
