//! Daily check-in — a 7-day cyclic reward streak.
//!
//! The streak counts successful claims and is never reset; the day in
//! the cycle is `streak mod 7`. Missed calendar days do not break it.

use crate::{
    catalog::check_in_reward,
    error::LoyaltyResult,
    event::LoyaltyEvent,
    gate::DailyGate,
    ledger::PointsLedger,
    state::AccountState,
    types::Points,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInReward {
    /// 1-based day in the cycle.
    pub day: u64,
    pub points: Points,
    /// Streak after this claim.
    pub streak: u64,
}

pub struct CheckInEngine {
    gate: DailyGate,
}

impl CheckInEngine {
    pub fn new(gate: DailyGate) -> Self {
        Self { gate }
    }

    pub fn can_check_in(&self, state: &AccountState, now: DateTime<Utc>) -> bool {
        self.gate.is_available(state.last_check_in, now)
    }

    /// Claim today's reward. Returns None, untouched, if already claimed today.
    pub fn claim(
        &self,
        state: &mut AccountState,
        ledger: &PointsLedger,
        now: DateTime<Utc>,
        events: &mut Vec<LoyaltyEvent>,
    ) -> LoyaltyResult<Option<CheckInReward>> {
        if !self.can_check_in(state, now) {
            return Ok(None);
        }

        let (day, points) = check_in_reward(state.check_in_streak);
        state.check_in_streak += 1;
        self.gate.advance(&mut state.last_check_in, now);
        ledger.credit(state, points as i64, &format!("Day {} Check-in", day + 1), now, events)?;

        events.push(LoyaltyEvent::CheckInClaimed {
            day: day + 1,
            reward: points,
            streak: state.check_in_streak,
        });
        Ok(Some(CheckInReward {
            day: day + 1,
            points,
            streak: state.check_in_streak,
        }))
    }
}
