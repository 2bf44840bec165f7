//! Schema adapter for the enforcement plugin's tables
//!
//! Owns every column projection the queries use. Single-kind queries project
//! only what the kind stores; union branches project the full unified column
//! list, substituting typed NULLs for columns a kind lacks, so every branch has
//! the same width, order and types. All projections are cast explicitly so the
//! executor only ever sees BIGINT, INTEGER and TEXT columns.

use crate::db::executor::Row;
use crate::error::{SchemaConsistencyError, StoreError};
use crate::models::{IdentityHistoryEntry, KindDetails, PunishmentKind, PunishmentRecord, Removal};
use chrono::{DateTime, Utc};

pub const HISTORY_TABLE: &str = "litebans_history";

/// Alias carrying the branch's kind literal in union queries
pub const KIND_TAG_COLUMN: &str = "punishment_type";

/// Rows a listing may show: known, online-seen subjects only
pub const LISTABLE_SUBJECT: &str = "uuid IS NOT NULL AND uuid <> :offline_uuid";

/// Stored flag still set and expiry not yet reached as of `:now`
pub const ACTIVE_PREDICATE: &str = "CAST(active AS INTEGER) = 1 AND (until <= 0 OR until > :now)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    BigInt,
    Integer,
    Text,
}

impl SqlType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SqlType::BigInt => "BIGINT",
            SqlType::Integer => "INTEGER",
            SqlType::Text => "TEXT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Stored(&'static str),
    /// TIMESTAMP column rendered as epoch milliseconds
    EpochMillis(&'static str),
    Null,
    KindTag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Projected {
    alias: &'static str,
    ty: SqlType,
    source: Source,
}

const fn stored(alias: &'static str, ty: SqlType) -> Projected {
    Projected {
        alias,
        ty,
        source: Source::Stored(alias),
    }
}

const BASE_COLUMNS: [Projected; 13] = [
    stored("id", SqlType::BigInt),
    stored("uuid", SqlType::Text),
    stored("ip", SqlType::Text),
    stored("reason", SqlType::Text),
    stored("banned_by_uuid", SqlType::Text),
    stored("banned_by_name", SqlType::Text),
    stored("time", SqlType::BigInt),
    stored("until", SqlType::BigInt),
    stored("server_scope", SqlType::Text),
    stored("server_origin", SqlType::Text),
    stored("active", SqlType::Integer),
    stored("ipban", SqlType::Integer),
    stored("silent", SqlType::Integer),
];

const REMOVAL_COLUMNS: [Projected; 4] = [
    stored("removed_by_uuid", SqlType::Text),
    stored("removed_by_name", SqlType::Text),
    stored("removed_by_reason", SqlType::Text),
    Projected {
        alias: "removed_by_date",
        ty: SqlType::BigInt,
        source: Source::EpochMillis("removed_by_date"),
    },
];

const ACKNOWLEDGEMENT_COLUMN: Projected = stored("warned", SqlType::Integer);

const KIND_TAG: Projected = Projected {
    alias: KIND_TAG_COLUMN,
    ty: SqlType::Text,
    source: Source::KindTag,
};

/// Static facts about one kind's table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindSchema {
    pub kind: PunishmentKind,
    pub table: &'static str,
    pub plural: &'static str,
    pub has_removal: bool,
    pub has_acknowledgement: bool,
    /// Kicks are instantaneous and never "active"
    pub tracks_activity: bool,
}

pub fn schema_for(kind: PunishmentKind) -> KindSchema {
    match kind {
        PunishmentKind::Ban => KindSchema {
            kind,
            table: "litebans_bans",
            plural: "bans",
            has_removal: true,
            has_acknowledgement: false,
            tracks_activity: true,
        },
        PunishmentKind::Mute => KindSchema {
            kind,
            table: "litebans_mutes",
            plural: "mutes",
            has_removal: true,
            has_acknowledgement: false,
            tracks_activity: true,
        },
        PunishmentKind::Warning => KindSchema {
            kind,
            table: "litebans_warnings",
            plural: "warnings",
            has_removal: true,
            has_acknowledgement: true,
            tracks_activity: true,
        },
        PunishmentKind::Kick => KindSchema {
            kind,
            table: "litebans_kicks",
            plural: "kicks",
            has_removal: false,
            has_acknowledgement: false,
            tracks_activity: false,
        },
    }
}

fn kind_columns(kind: PunishmentKind) -> Vec<Projected> {
    let schema = schema_for(kind);
    let mut columns = BASE_COLUMNS.to_vec();
    if schema.has_removal {
        columns.extend(REMOVAL_COLUMNS);
    }
    if schema.has_acknowledgement {
        columns.push(ACKNOWLEDGEMENT_COLUMN);
    }
    columns
}

fn union_columns(kind: PunishmentKind) -> Vec<Projected> {
    let schema = schema_for(kind);
    let null_unless = |present: bool, column: Projected| {
        if present {
            column
        } else {
            Projected {
                source: Source::Null,
                ..column
            }
        }
    };

    let mut columns = BASE_COLUMNS.to_vec();
    columns.extend(
        REMOVAL_COLUMNS
            .iter()
            .map(|column| null_unless(schema.has_removal, *column)),
    );
    columns.push(null_unless(schema.has_acknowledgement, ACKNOWLEDGEMENT_COLUMN));
    columns.push(KIND_TAG);
    columns
}

fn render(column: &Projected, kind: PunishmentKind) -> String {
    let ty = column.ty.as_sql();
    match column.source {
        Source::Stored(name) => format!("CAST({} AS {}) AS {}", name, ty, column.alias),
        Source::EpochMillis(name) => format!(
            "CAST(EXTRACT(EPOCH FROM {}) * 1000 AS {}) AS {}",
            name, ty, column.alias
        ),
        Source::Null => format!("CAST(NULL AS {}) AS {}", ty, column.alias),
        Source::KindTag => format!("CAST('{}' AS {}) AS {}", kind.as_str(), ty, column.alias),
    }
}

fn render_all(columns: &[Projected], kind: PunishmentKind) -> String {
    columns
        .iter()
        .map(|column| render(column, kind))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Projection for queries against a single kind's table
pub fn select_list(kind: PunishmentKind) -> String {
    render_all(&kind_columns(kind), kind)
}

/// Projection for one branch of a cross-kind UNION ALL
pub fn union_select_list(kind: PunishmentKind) -> String {
    render_all(&union_columns(kind), kind)
}

/// `(alias, type)` sequence a union branch produces
pub fn union_signature(kind: PunishmentKind) -> Vec<(&'static str, SqlType)> {
    union_columns(kind)
        .iter()
        .map(|column| (column.alias, column.ty))
        .collect()
}

/// Check every union branch projects the same columns in the same order
/// with the same types, ending with the kind tag.
pub fn verify_union_parity() -> Result<(), SchemaConsistencyError> {
    let reference = union_signature(PunishmentKind::ALL[0]);

    let mut seen = std::collections::HashSet::new();
    if let Some((alias, _)) = reference.iter().find(|(alias, _)| !seen.insert(*alias)) {
        return Err(SchemaConsistencyError(format!(
            "duplicate union column alias {}",
            alias
        )));
    }

    for kind in PunishmentKind::ALL {
        let signature = union_signature(kind);
        if signature.len() != reference.len() {
            return Err(SchemaConsistencyError(format!(
                "{} branch projects {} columns, expected {}",
                kind,
                signature.len(),
                reference.len()
            )));
        }
        if let Some(position) = signature.iter().zip(&reference).position(|(a, b)| a != b) {
            return Err(SchemaConsistencyError(format!(
                "{} branch column {} is {:?}, expected {:?}",
                kind, position, signature[position], reference[position]
            )));
        }
        if signature.last().map(|(alias, _)| *alias) != Some(KIND_TAG_COLUMN) {
            return Err(SchemaConsistencyError(format!(
                "{} branch does not end with the {} tag",
                kind, KIND_TAG_COLUMN
            )));
        }
        // every stored column of the kind must survive into its branch
        let branch = union_columns(kind);
        for column in kind_columns(kind) {
            if !branch.contains(&column) {
                return Err(SchemaConsistencyError(format!(
                    "{} branch drops stored column {}",
                    kind, column.alias
                )));
            }
        }
    }

    Ok(())
}

/// Projection for the identity history table
pub fn identity_select_list() -> &'static str {
    "CAST(id AS BIGINT) AS id, \
     CAST(EXTRACT(EPOCH FROM date) * 1000 AS BIGINT) AS date, \
     CAST(name AS TEXT) AS name, \
     CAST(uuid AS TEXT) AS uuid, \
     CAST(ip AS TEXT) AS ip"
}

/// Decode a row produced by [`select_list`] or [`union_select_list`]
pub fn decode_record(kind: PunishmentKind, row: &Row) -> Result<PunishmentRecord, StoreError> {
    let schema = schema_for(kind);

    let removal = if schema.has_removal {
        match row.try_opt_string("removed_by_uuid")? {
            Some(removed_by_uuid) => Some(Removal {
                removed_by_uuid,
                removed_by_name: row.try_opt_string("removed_by_name")?,
                reason: row.try_opt_string("removed_by_reason")?,
                removed_at: row.try_opt_i64("removed_by_date")?,
            }),
            None => None,
        }
    } else {
        None
    };

    let details = match kind {
        PunishmentKind::Ban => KindDetails::Ban { removal },
        PunishmentKind::Mute => KindDetails::Mute { removal },
        PunishmentKind::Warning => KindDetails::Warning {
            removal,
            acknowledged: row.try_opt_flag("warned")?.unwrap_or(false),
        },
        PunishmentKind::Kick => KindDetails::Kick,
    };

    Ok(PunishmentRecord {
        id: row.try_i64("id")?,
        subject_uuid: row.try_opt_string("uuid")?,
        subject_ip: row.try_opt_string("ip")?,
        reason: row.try_opt_string("reason")?,
        issuer_uuid: row.try_opt_string("banned_by_uuid")?,
        issuer_name: row.try_opt_string("banned_by_name")?,
        created_at: row.try_i64("time")?,
        expires_at: row.try_i64("until")?,
        scope: row.try_opt_string("server_scope")?,
        origin: row.try_opt_string("server_origin")?,
        silent: row.try_flag("silent")?,
        ip_based: row.try_flag("ipban")?,
        active: row.try_flag("active")?,
        details,
    })
}

/// Kind carried by a union row's tag column
pub fn decode_kind_tag(row: &Row) -> Result<PunishmentKind, StoreError> {
    let tag = row
        .try_opt_string(KIND_TAG_COLUMN)?
        .ok_or_else(|| StoreError::decode(KIND_TAG_COLUMN, "unexpected NULL"))?;
    tag.parse()
        .map_err(|e: String| StoreError::decode(KIND_TAG_COLUMN, e))
}

pub fn decode_identity(row: &Row) -> Result<IdentityHistoryEntry, StoreError> {
    Ok(IdentityHistoryEntry {
        id: row.try_i64("id")?,
        recorded_at: row
            .try_opt_i64("date")?
            .and_then(DateTime::<Utc>::from_timestamp_millis),
        display_name: row.try_opt_string("name")?,
        uuid: row.try_opt_string("uuid")?,
        ip: row.try_opt_string("ip")?,
    })
}
