//! Redemption — exchange points for a code.
//!
//! Codes are the program prefix plus 6 upper-case base-36 characters.
//! They are not checked for collisions against earlier codes.

use crate::{
    error::{LoyaltyError, LoyaltyResult},
    event::LoyaltyEvent,
    ledger::{require_positive, PointsLedger},
    rng::RewardRng,
    state::{AccountState, RedemptionRecord},
};
use chrono::{DateTime, Utc};

pub const CODE_LENGTH: usize = 6;
const CODE_ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

pub struct RedemptionEngine {
    code_prefix: String,
    strict: bool,
}

impl RedemptionEngine {
    pub fn new(code_prefix: impl Into<String>, strict: bool) -> Self {
        Self {
            code_prefix: code_prefix.into(),
            strict,
        }
    }

    /// Debit `point_cost` and mint a code.
    ///
    /// In lenient mode the debit clamps at zero, so an over-balance
    /// redemption still succeeds. In strict mode it fails with
    /// InsufficientBalance before anything changes.
    #[allow(clippy::too_many_arguments)]
    pub fn redeem(
        &self,
        state: &mut AccountState,
        ledger: &PointsLedger,
        point_cost: i64,
        reason: &str,
        rng: &mut RewardRng,
        now: DateTime<Utc>,
        events: &mut Vec<LoyaltyEvent>,
    ) -> LoyaltyResult<String> {
        let amount = require_positive(point_cost)?;
        if self.strict && amount > state.balance {
            return Err(LoyaltyError::InsufficientBalance {
                requested: amount,
                available: state.balance,
            });
        }

        ledger.debit(state, point_cost, reason, now, events)?;
        let code = self.generate_code(rng);
        state.redemptions.insert(
            0,
            RedemptionRecord {
                code: code.clone(),
                amount,
                timestamp: now,
            },
        );

        events.push(LoyaltyEvent::PointsRedeemed {
            code: code.clone(),
            amount,
        });
        Ok(code)
    }

    pub fn generate_code(&self, rng: &mut RewardRng) -> String {
        let suffix: String = (0..CODE_LENGTH)
            .map(|_| char::from(*rng.pick(CODE_ALPHABET)))
            .collect();
        format!("{}{}", self.code_prefix, suffix)
    }

    /// Prefix followed by exactly 6 characters from [0-9A-Z].
    pub fn is_well_formed(&self, code: &str) -> bool {
        code.strip_prefix(self.code_prefix.as_str())
            .map(|rest| {
                rest.len() == CODE_LENGTH
                    && rest.bytes().all(|b| b.is_ascii_digit() || b.is_ascii_uppercase())
            })
            .unwrap_or(false)
    }
}
