//! Spin-the-wheel — one uniformly drawn prize per calendar day.
//!
//! Coin prizes are credited to the ledger. Discount and shipping
//! prizes are returned for the checkout collaborator to apply; the
//! engine records only that the spin happened.

use crate::{
    catalog::{PrizeKind, WheelPrize, WHEEL_PRIZES},
    error::LoyaltyResult,
    event::LoyaltyEvent,
    gate::DailyGate,
    ledger::PointsLedger,
    rng::RewardRng,
    state::AccountState,
};
use chrono::{DateTime, Utc};

pub struct SpinEngine {
    gate: DailyGate,
}

impl SpinEngine {
    pub fn new(gate: DailyGate) -> Self {
        Self { gate }
    }

    pub fn can_spin(&self, state: &AccountState, now: DateTime<Utc>) -> bool {
        self.gate.is_available(state.last_spin, now)
    }

    /// Uniform over the 8 wheel slots.
    pub fn draw(rng: &mut RewardRng) -> &'static WheelPrize {
        rng.pick(&WHEEL_PRIZES)
    }

    /// Spin once. Returns None, untouched, if already spun today.
    pub fn spin(
        &self,
        state: &mut AccountState,
        ledger: &PointsLedger,
        rng: &mut RewardRng,
        now: DateTime<Utc>,
        events: &mut Vec<LoyaltyEvent>,
    ) -> LoyaltyResult<Option<WheelPrize>> {
        if !self.can_spin(state, now) {
            return Ok(None);
        }

        let prize = Self::draw(rng);
        self.gate.advance(&mut state.last_spin, now);
        Self::award(state, ledger, prize, now, events)?;
        Ok(Some(prize.clone()))
    }

    /// Apply a drawn prize to the account. Only coins touch the ledger.
    pub fn award(
        state: &mut AccountState,
        ledger: &PointsLedger,
        prize: &WheelPrize,
        now: DateTime<Utc>,
        events: &mut Vec<LoyaltyEvent>,
    ) -> LoyaltyResult<()> {
        if prize.kind == PrizeKind::Coins {
            ledger.credit(
                state,
                prize.value as i64,
                &format!("Spin Wheel: {}", prize.label),
                now,
                events,
            )?;
        }
        events.push(LoyaltyEvent::WheelSpun {
            label: prize.label.to_string(),
            kind: prize.kind,
            value: prize.value,
        });
        Ok(())
    }
}
