//! The loyalty engine — one instance per account.
//!
//! MUTATION PROTOCOL (every write goes through `commit`):
//!   1. Clone the current AccountState.
//!   2. Run the component operation against the clone, collecting events.
//!   3. Append TierChanged if the balance crossed a tier boundary.
//!   4. Save clone + events through the StateStore.
//!   5. Only on success replace the in-memory state.
//!
//! RULES:
//!   - Components never touch the store; the engine never touches SQL.
//!   - A failed save leaves the in-memory state exactly as it was.
//!   - Gate-denied actions return None and write nothing.
//!   - The engine is single-writer; LoyaltyService serialises callers.

use crate::{
    catalog::{check_in_reward, WheelPrize},
    checkin::{CheckInEngine, CheckInReward},
    clock::Clock,
    config::LoyaltyConfig,
    error::{LoyaltyError, LoyaltyResult},
    event::LoyaltyEvent,
    gate::DailyGate,
    ledger::PointsLedger,
    redemption::RedemptionEngine,
    rng::{RewardRng, RewardSlot, RngBank},
    spin::SpinEngine,
    state::{AccountState, LedgerEntry, RedemptionRecord},
    store::StateStore,
    tiers::{self, Tier},
    types::{AccountId, Points},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

pub struct LoyaltyEngine {
    account_id: AccountId,
    state:      AccountState,
    ledger:     PointsLedger,
    check_in:   CheckInEngine,
    spinner:    SpinEngine,
    redemption: RedemptionEngine,
    spin_rng:   RewardRng,
    code_rng:   RewardRng,
    clock:      Arc<dyn Clock>,
    store:      Arc<dyn StateStore>,
}

/// Everything a display collaborator needs in one read.
#[derive(Debug, Clone, Serialize)]
pub struct AccountSummary {
    pub account_id: AccountId,
    pub balance: Points,
    pub tier: &'static str,
    pub next_tier: Option<&'static str>,
    pub points_to_next_tier: Option<Points>,
    pub progress_percent: u8,
    pub check_in_streak: u64,
    pub can_check_in: bool,
    pub next_check_in_reward: Points,
    pub can_spin: bool,
    pub redemption_count: usize,
}

impl LoyaltyEngine {
    /// Load the account from the store, or start it fresh.
    ///
    /// Unknown and unparseable accounts both begin from the default
    /// state; corruption is logged, not surfaced.
    pub fn open(
        account_id: impl Into<AccountId>,
        config: &LoyaltyConfig,
        rng_bank: &RngBank,
        clock: Arc<dyn Clock>,
        store: Arc<dyn StateStore>,
    ) -> LoyaltyResult<Self> {
        let account_id = account_id.into();
        let state = match store.load(&account_id) {
            Ok(Some(mut state)) => {
                state.reconcile_entry_ids();
                log::info!(
                    "account={account_id} loaded: balance={} streak={}",
                    state.balance,
                    state.check_in_streak
                );
                state
            }
            Ok(None) => {
                log::info!("account={account_id} not found, starting fresh");
                AccountState::default()
            }
            Err(LoyaltyError::CorruptState { reason, .. }) => {
                log::warn!(
                    "account={account_id} stored state unreadable ({reason}), starting fresh"
                );
                AccountState::default()
            }
            Err(e) => return Err(e),
        };

        Self::with_state(account_id, state, config, rng_bank, clock, store)
    }

    /// Build an engine around an already-loaded state.
    pub fn with_state(
        account_id: AccountId,
        state: AccountState,
        config: &LoyaltyConfig,
        rng_bank: &RngBank,
        clock: Arc<dyn Clock>,
        store: Arc<dyn StateStore>,
    ) -> LoyaltyResult<Self> {
        config.validate()?;
        let gate = DailyGate::new(config.local_offset()?);
        Ok(Self {
            spin_rng:   rng_bank.for_account(&account_id, RewardSlot::Spin),
            code_rng:   rng_bank.for_account(&account_id, RewardSlot::RedemptionCode),
            ledger:     PointsLedger::new(config.history_cap),
            check_in:   CheckInEngine::new(gate),
            spinner:    SpinEngine::new(gate),
            redemption: RedemptionEngine::new(config.code_prefix.clone(), config.strict_redemption),
            account_id,
            state,
            clock,
            store,
        })
    }

    // ── Reads ──────────────────────────────────────────────────

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn state(&self) -> &AccountState {
        &self.state
    }

    pub fn balance(&self) -> Points {
        self.state.balance
    }

    pub fn history(&self) -> &[LedgerEntry] {
        &self.state.history
    }

    pub fn redemptions(&self) -> &[RedemptionRecord] {
        &self.state.redemptions
    }

    pub fn check_in_streak(&self) -> u64 {
        self.state.check_in_streak
    }

    pub fn tier(&self) -> &'static Tier {
        tiers::tier_for(self.state.balance)
    }

    pub fn next_tier(&self) -> Option<&'static Tier> {
        tiers::next_tier(self.state.balance)
    }

    pub fn progress_percent(&self) -> u8 {
        tiers::progress_percent(self.state.balance)
    }

    pub fn can_check_in(&self) -> bool {
        self.check_in.can_check_in(&self.state, self.clock.now())
    }

    pub fn can_spin(&self) -> bool {
        self.spinner.can_spin(&self.state, self.clock.now())
    }

    /// Points the next successful check-in will grant.
    pub fn next_check_in_reward(&self) -> Points {
        check_in_reward(self.state.check_in_streak).1
    }

    pub fn summary(&self) -> AccountSummary {
        let next = self.next_tier();
        AccountSummary {
            account_id: self.account_id.clone(),
            balance: self.state.balance,
            tier: self.tier().name,
            next_tier: next.map(|t| t.name),
            points_to_next_tier: next.map(|t| t.min_points - self.state.balance),
            progress_percent: self.progress_percent(),
            check_in_streak: self.state.check_in_streak,
            can_check_in: self.can_check_in(),
            next_check_in_reward: self.next_check_in_reward(),
            can_spin: self.can_spin(),
            redemption_count: self.state.redemptions.len(),
        }
    }

    // ── Mutations ──────────────────────────────────────────────

    /// Grant points. The hook checkout, reviews and referrals call.
    /// Returns the new balance.
    pub fn add_points(&mut self, amount: i64, reason: &str) -> LoyaltyResult<Points> {
        let now = self.clock.now();
        let Self { account_id, state, ledger, store, .. } = self;
        commit(account_id, state, store.as_ref(), now, |next, events| {
            ledger.credit(next, amount, reason, now, events)?;
            Ok(next.balance)
        })
    }

    /// Claim today's check-in reward, or None if already claimed today.
    pub fn claim_check_in(&mut self) -> LoyaltyResult<Option<CheckInReward>> {
        let now = self.clock.now();
        if !self.check_in.can_check_in(&self.state, now) {
            log::debug!("account={} check-in already claimed today", self.account_id);
            return Ok(None);
        }
        let Self { account_id, state, ledger, check_in, store, .. } = self;
        commit(account_id, state, store.as_ref(), now, |next, events| {
            check_in.claim(next, ledger, now, events)
        })
    }

    /// Spin the wheel, or None if already spun today.
    pub fn spin(&mut self) -> LoyaltyResult<Option<WheelPrize>> {
        let now = self.clock.now();
        if !self.spinner.can_spin(&self.state, now) {
            log::debug!("account={} wheel already spun today", self.account_id);
            return Ok(None);
        }
        let Self { account_id, state, ledger, spinner, spin_rng, store, .. } = self;
        commit(account_id, state, store.as_ref(), now, |next, events| {
            spinner.spin(next, ledger, spin_rng, now, events)
        })
    }

    /// Exchange points for a redemption code.
    pub fn redeem_points(&mut self, point_cost: i64, reason: &str) -> LoyaltyResult<String> {
        let now = self.clock.now();
        let Self { account_id, state, ledger, redemption, code_rng, store, .. } = self;
        commit(account_id, state, store.as_ref(), now, |next, events| {
            redemption.redeem(next, ledger, point_cost, reason, code_rng, now, events)
        })
    }
}

/// Run `op` against a copy of `state`, persist, then swap it in.
fn commit<T>(
    account_id: &str,
    state: &mut AccountState,
    store: &dyn StateStore,
    now: DateTime<Utc>,
    op: impl FnOnce(&mut AccountState, &mut Vec<LoyaltyEvent>) -> LoyaltyResult<T>,
) -> LoyaltyResult<T> {
    let mut next = state.clone();
    let mut events = Vec::new();
    let out = op(&mut next, &mut events)?;

    let before = tiers::tier_for(state.balance);
    let after = tiers::tier_for(next.balance);
    if before.name != after.name {
        log::info!("account={account_id} tier {} -> {}", before.name, after.name);
        events.push(LoyaltyEvent::TierChanged {
            from: before.name.to_string(),
            to: after.name.to_string(),
            balance: next.balance,
        });
    }

    store
        .save(account_id, &next, &events, now)
        .map_err(|e| {
            log::warn!("account={account_id} save failed, mutation discarded: {e}");
            LoyaltyError::Persistence(Box::new(e))
        })?;

    log::debug!(
        "account={account_id} committed {} event(s), balance={}",
        events.len(),
        next.balance
    );
    *state = next;
    Ok(out)
}
