//! Punishment records as read from the four enforcement tables

use crate::models::status::{self, PunishmentStatus};
use crate::utils::identity::is_console_issuer;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category of moderation action; each kind has its own table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PunishmentKind {
    Ban,
    Mute,
    Warning,
    Kick,
}

impl PunishmentKind {
    /// Union order used by the cross-table aggregator
    pub const ALL: [PunishmentKind; 4] = [
        PunishmentKind::Ban,
        PunishmentKind::Mute,
        PunishmentKind::Warning,
        PunishmentKind::Kick,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PunishmentKind::Ban => "ban",
            PunishmentKind::Mute => "mute",
            PunishmentKind::Warning => "warning",
            PunishmentKind::Kick => "kick",
        }
    }
}

impl fmt::Display for PunishmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PunishmentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ban" | "bans" => Ok(PunishmentKind::Ban),
            "mute" | "mutes" => Ok(PunishmentKind::Mute),
            "warning" | "warnings" | "warn" => Ok(PunishmentKind::Warning),
            "kick" | "kicks" => Ok(PunishmentKind::Kick),
            other => Err(format!("Unknown punishment kind: {}", other)),
        }
    }
}

/// Metadata written when staff reverse a punishment before it expires
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Removal {
    pub removed_by_uuid: String,
    pub removed_by_name: Option<String>,
    pub reason: Option<String>,
    /// Milliseconds since epoch
    pub removed_at: Option<i64>,
}

/// Fields only some kinds carry. The variant is the record's kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum KindDetails {
    Ban {
        removal: Option<Removal>,
    },
    Mute {
        removal: Option<Removal>,
    },
    Warning {
        removal: Option<Removal>,
        acknowledged: bool,
    },
    Kick,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PunishmentRecord {
    pub id: i64,
    pub subject_uuid: Option<String>,
    pub subject_ip: Option<String>,
    /// May still contain in-game colour codes
    pub reason: Option<String>,
    pub issuer_uuid: Option<String>,
    pub issuer_name: Option<String>,
    /// Milliseconds since epoch; the ordering key of every listing
    pub created_at: i64,
    /// Milliseconds since epoch, `<= 0` for permanent punishments
    pub expires_at: i64,
    pub scope: Option<String>,
    pub origin: Option<String>,
    pub silent: bool,
    pub ip_based: bool,
    pub active: bool,
    #[serde(flatten)]
    pub details: KindDetails,
}

impl PunishmentRecord {
    pub fn kind(&self) -> PunishmentKind {
        match self.details {
            KindDetails::Ban { .. } => PunishmentKind::Ban,
            KindDetails::Mute { .. } => PunishmentKind::Mute,
            KindDetails::Warning { .. } => PunishmentKind::Warning,
            KindDetails::Kick => PunishmentKind::Kick,
        }
    }

    pub fn removal(&self) -> Option<&Removal> {
        match &self.details {
            KindDetails::Ban { removal }
            | KindDetails::Mute { removal }
            | KindDetails::Warning { removal, .. } => removal.as_ref(),
            KindDetails::Kick => None,
        }
    }

    /// Whether the subject has seen the warning; `None` for other kinds
    pub fn acknowledged(&self) -> Option<bool> {
        match self.details {
            KindDetails::Warning { acknowledged, .. } => Some(acknowledged),
            _ => None,
        }
    }

    pub fn is_permanent(&self) -> bool {
        status::is_permanent(self.expires_at)
    }

    /// Status as of the current wall clock, read once per call
    pub fn status(&self) -> PunishmentStatus {
        status::derive_status(self, status::now_millis())
    }

    /// Staff name to show, or `None` when the console issued it
    pub fn issuer_display_name(&self) -> Option<&str> {
        if is_console_issuer(self.issuer_uuid.as_deref(), self.issuer_name.as_deref()) {
            None
        } else {
            self.issuer_name.as_deref()
        }
    }
}

/// One entry of a cross-table feed, tagged with the table it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnifiedHistoryRow {
    #[serde(rename = "type")]
    kind: PunishmentKind,
    #[serde(rename = "data")]
    record: PunishmentRecord,
}

impl UnifiedHistoryRow {
    pub fn new(record: PunishmentRecord) -> Self {
        Self {
            kind: record.kind(),
            record,
        }
    }

    pub fn kind(&self) -> PunishmentKind {
        self.kind
    }

    pub fn record(&self) -> &PunishmentRecord {
        &self.record
    }

    pub fn into_record(self) -> PunishmentRecord {
        self.record
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn record(details: KindDetails) -> PunishmentRecord {
        PunishmentRecord {
            id: 1,
            subject_uuid: Some("069a79f4-44e9-4726-a5be-fca90e38aaf5".to_string()),
            subject_ip: None,
            reason: Some("griefing".to_string()),
            issuer_uuid: Some("853c80ef-3c37-49fd-aa49-938b674adae6".to_string()),
            issuer_name: Some("jeb_".to_string()),
            created_at: 1_000,
            expires_at: -1,
            scope: Some("*".to_string()),
            origin: None,
            silent: false,
            ip_based: false,
            active: true,
            details,
        }
    }

    pub fn removal() -> Removal {
        Removal {
            removed_by_uuid: "853c80ef-3c37-49fd-aa49-938b674adae6".to_string(),
            removed_by_name: Some("jeb_".to_string()),
            reason: Some("appeal accepted".to_string()),
            removed_at: Some(5_000),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_kind_parsing_accepts_plurals() {
        assert_eq!("bans".parse::<PunishmentKind>().unwrap(), PunishmentKind::Ban);
        assert_eq!("Mute".parse::<PunishmentKind>().unwrap(), PunishmentKind::Mute);
        assert_eq!("warn".parse::<PunishmentKind>().unwrap(), PunishmentKind::Warning);
        assert_eq!("kicks".parse::<PunishmentKind>().unwrap(), PunishmentKind::Kick);
        assert!("jail".parse::<PunishmentKind>().is_err());
    }

    #[test]
    fn test_kind_follows_details() {
        assert_eq!(record(KindDetails::Kick).kind(), PunishmentKind::Kick);
        let warning = record(KindDetails::Warning {
            removal: None,
            acknowledged: true,
        });
        assert_eq!(warning.kind(), PunishmentKind::Warning);
        assert_eq!(warning.acknowledged(), Some(true));
        assert_eq!(record(KindDetails::Ban { removal: None }).acknowledged(), None);
    }

    #[test]
    fn test_unified_row_tag_matches_record() {
        let row = UnifiedHistoryRow::new(record(KindDetails::Mute {
            removal: Some(removal()),
        }));
        assert_eq!(row.kind(), PunishmentKind::Mute);
        assert!(row.record().removal().is_some());
    }

    #[test]
    fn test_serialized_shape() {
        let row = UnifiedHistoryRow::new(record(KindDetails::Warning {
            removal: None,
            acknowledged: false,
        }));
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["type"], "warning");
        assert_eq!(json["data"]["kind"], "warning");
        assert_eq!(json["data"]["acknowledged"], false);
        assert_eq!(json["data"]["created_at"], 1_000);
    }

    #[test]
    fn test_console_issuer_has_no_display_name() {
        let mut rec = record(KindDetails::Kick);
        assert_eq!(rec.issuer_display_name(), Some("jeb_"));

        rec.issuer_uuid = Some("CONSOLE".to_string());
        rec.issuer_name = Some("Console".to_string());
        assert_eq!(rec.issuer_display_name(), None);
    }
}
