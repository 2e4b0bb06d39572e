//! Account state — the root aggregate persisted per account.
//!
//! Serialized to JSON as a single document. A round trip through
//! serde must reproduce the value exactly.

use crate::types::{EntryId, PointDelta, Points};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountState {
    pub balance: Points,
    /// Newest first, capped on every write.
    pub history: Vec<LedgerEntry>,
    pub last_check_in: Option<DateTime<Utc>>,
    pub check_in_streak: u64,
    pub last_spin: Option<DateTime<Utc>>,
    /// Newest first, unbounded.
    pub redemptions: Vec<RedemptionRecord>,
    /// Id assigned to the next ledger entry. Survives history truncation.
    #[serde(default = "first_entry_id")]
    pub next_entry_id: EntryId,
}

fn first_entry_id() -> EntryId {
    1
}

/// Zero balance and streak, empty history. The state of a new account.
impl Default for AccountState {
    fn default() -> Self {
        Self {
            balance: 0,
            history: Vec::new(),
            last_check_in: None,
            check_in_streak: 0,
            last_spin: None,
            redemptions: Vec::new(),
            next_entry_id: first_entry_id(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: EntryId,
    /// Positive for earn, negative for redeem.
    pub amount: PointDelta,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
    pub kind: EntryKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Earn,
    Redeem,
}

impl AccountState {
    /// Raise `next_entry_id` past every id already in history.
    ///
    /// Documents written before the counter was persisted carry history
    /// but no counter; without this the next write would reuse ids.
    pub fn reconcile_entry_ids(&mut self) {
        if let Some(max_id) = self.history.iter().map(|e| e.id).max() {
            self.next_entry_id = self.next_entry_id.max(max_id + 1);
        }
    }
}

impl LedgerEntry {
    /// `amount` sign agrees with `kind`.
    pub fn is_consistent(&self) -> bool {
        match self.kind {
            EntryKind::Earn => self.amount > 0,
            EntryKind::Redeem => self.amount < 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedemptionRecord {
    pub code: String,
    pub amount: Points,
    pub timestamp: DateTime<Utc>,
}
