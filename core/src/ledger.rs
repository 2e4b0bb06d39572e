//! Points ledger — the only code that writes `balance` and `history`.
//!
//! Every change prepends one LedgerEntry, newest first, and trims
//! history to the configured cap. Balance keeps the contribution of
//! entries that have been trimmed away.

use crate::{
    error::{LoyaltyError, LoyaltyResult},
    event::LoyaltyEvent,
    state::{AccountState, EntryKind, LedgerEntry},
    types::{EntryId, Points},
};
use chrono::{DateTime, Utc};

pub struct PointsLedger {
    history_cap: usize,
}

impl PointsLedger {
    pub fn new(history_cap: usize) -> Self {
        Self { history_cap }
    }

    /// Add `amount` points. Rejects non-positive amounts before mutating.
    pub fn credit(
        &self,
        state: &mut AccountState,
        amount: i64,
        reason: &str,
        now: DateTime<Utc>,
        events: &mut Vec<LoyaltyEvent>,
    ) -> LoyaltyResult<EntryId> {
        let points = require_positive(amount)?;
        state.balance = state.balance.saturating_add(points);
        let entry_id = self.record(state, amount, EntryKind::Earn, reason, now);

        events.push(LoyaltyEvent::PointsCredited {
            entry_id,
            amount: points,
            reason: reason.to_string(),
            balance: state.balance,
        });
        Ok(entry_id)
    }

    /// Remove `amount` points, clamping the balance at zero.
    /// The entry records the full requested amount.
    pub fn debit(
        &self,
        state: &mut AccountState,
        amount: i64,
        reason: &str,
        now: DateTime<Utc>,
        events: &mut Vec<LoyaltyEvent>,
    ) -> LoyaltyResult<EntryId> {
        let points = require_positive(amount)?;
        state.balance = state.balance.saturating_sub(points);
        let entry_id = self.record(state, -amount, EntryKind::Redeem, reason, now);

        events.push(LoyaltyEvent::PointsDebited {
            entry_id,
            amount: points,
            reason: reason.to_string(),
            balance: state.balance,
        });
        Ok(entry_id)
    }

    fn record(
        &self,
        state: &mut AccountState,
        amount: i64,
        kind: EntryKind,
        reason: &str,
        now: DateTime<Utc>,
    ) -> EntryId {
        let id = state.next_entry_id;
        state.next_entry_id += 1;
        state.history.insert(
            0,
            LedgerEntry {
                id,
                amount,
                reason: reason.to_string(),
                timestamp: now,
                kind,
            },
        );
        state.history.truncate(self.history_cap);
        id
    }
}

/// Point amounts enter the engine signed so that zero and negative
/// requests can be rejected with InvalidAmount.
pub fn require_positive(amount: i64) -> LoyaltyResult<Points> {
    if amount <= 0 {
        return Err(LoyaltyError::InvalidAmount { amount });
    }
    Ok(amount as Points)
}
