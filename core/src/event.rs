//! Audit events — what each committed mutation did.
//!
//! RULE: Events are persisted alongside the state they describe.
//! The engine never pushes them to listeners; callers act on
//! return values and may read the log afterwards.

use crate::{
    catalog::PrizeKind,
    types::{EntryId, Points},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Variants are appended — never removed or reordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LoyaltyEvent {
    PointsCredited {
        entry_id: EntryId,
        amount: Points,
        reason: String,
        balance: Points,
    },
    PointsDebited {
        entry_id: EntryId,
        amount: Points,
        reason: String,
        balance: Points,
    },
    CheckInClaimed {
        day: u64,
        reward: Points,
        streak: u64,
    },
    WheelSpun {
        label: String,
        kind: PrizeKind,
        value: Points,
    },
    PointsRedeemed {
        code: String,
        amount: Points,
    },
    TierChanged {
        from: String,
        to: String,
        balance: Points,
    },
}

impl LoyaltyEvent {
    /// Stable name for the event_type column.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::PointsCredited { .. } => "points_credited",
            Self::PointsDebited { .. }  => "points_debited",
            Self::CheckInClaimed { .. } => "check_in_claimed",
            Self::WheelSpun { .. }      => "wheel_spun",
            Self::PointsRedeemed { .. } => "points_redeemed",
            Self::TierChanged { .. }    => "tier_changed",
        }
    }
}

/// The event log entry as persisted to SQLite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id: Option<i64>,
    pub account_id: String,
    pub event_type: String,
    pub payload: String, // JSON-serialized LoyaltyEvent
    pub created_at: DateTime<Utc>,
}
