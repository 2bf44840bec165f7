//! Summary counters returned by the statistics aggregator

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerStats {
    pub uuid: String,
    pub name: String,
    pub total_bans: i64,
    pub total_mutes: i64,
    pub total_warnings: i64,
    pub total_kicks: i64,
    pub active_bans: i64,
    pub active_mutes: i64,
    pub active_warnings: i64,
    pub first_seen: Option<DateTime<Utc>>,
    pub last_seen: Option<DateTime<Utc>>,
}

impl PlayerStats {
    pub fn total_punishments(&self) -> i64 {
        self.total_bans + self.total_mutes + self.total_warnings + self.total_kicks
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaffStats {
    pub uuid: String,
    pub name: String,
    pub bans_issued: i64,
    pub mutes_issued: i64,
    pub warnings_issued: i64,
    pub kicks_issued: i64,
}

impl StaffStats {
    pub fn total_issued(&self) -> i64 {
        self.bans_issued + self.mutes_issued + self.warnings_issued + self.kicks_issued
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GlobalStats {
    pub total_bans: i64,
    pub active_bans: i64,
    pub total_mutes: i64,
    pub active_mutes: i64,
    pub total_warnings: i64,
    pub active_warnings: i64,
    pub total_kicks: i64,
}

impl GlobalStats {
    pub fn total_punishments(&self) -> i64 {
        self.total_bans + self.total_mutes + self.total_warnings + self.total_kicks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals() {
        let global = GlobalStats {
            total_bans: 2,
            active_bans: 1,
            total_mutes: 1,
            active_mutes: 0,
            total_warnings: 0,
            active_warnings: 0,
            total_kicks: 3,
        };
        assert_eq!(global.total_punishments(), 6);

        let staff = StaffStats {
            uuid: "u".into(),
            name: "Notch".into(),
            bans_issued: 4,
            mutes_issued: 3,
            warnings_issued: 2,
            kicks_issued: 1,
        };
        assert_eq!(staff.total_issued(), 10);
    }
}
