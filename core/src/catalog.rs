//! Static reward catalogs: the 7-day check-in schedule and the spin wheel.
//!
//! Both are immutable at runtime. Order matters: schedule index is the
//! day-in-cycle, and wheel slots are drawn uniformly by position.

use crate::types::Points;
use serde::{Deserialize, Serialize};

/// Points granted per day of the check-in cycle (index = streak mod 7).
pub const CHECK_IN_REWARDS: [Points; 7] = [50, 75, 100, 125, 150, 175, 300];

pub const CHECK_IN_CYCLE_DAYS: u64 = CHECK_IN_REWARDS.len() as u64;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PrizeKind {
    /// Credited to the ledger as points.
    Coins,
    /// Percent off; applied by the checkout collaborator.
    Discount,
    /// Free shipping; applied by the checkout collaborator.
    Shipping,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WheelPrize {
    pub label: &'static str,
    pub value: Points,
    pub kind: PrizeKind,
}

pub static WHEEL_PRIZES: [WheelPrize; 8] = [
    WheelPrize { label: "10 Coins",      value: 10,  kind: PrizeKind::Coins },
    WheelPrize { label: "5% Off",        value: 5,   kind: PrizeKind::Discount },
    WheelPrize { label: "25 Coins",      value: 25,  kind: PrizeKind::Coins },
    WheelPrize { label: "Free Shipping", value: 0,   kind: PrizeKind::Shipping },
    WheelPrize { label: "50 Coins",      value: 50,  kind: PrizeKind::Coins },
    WheelPrize { label: "10% Off",       value: 10,  kind: PrizeKind::Discount },
    WheelPrize { label: "100 Coins",     value: 100, kind: PrizeKind::Coins },
    WheelPrize { label: "250 Coins",     value: 250, kind: PrizeKind::Coins },
];

/// Reward for a claim made with `streak` prior successful claims.
pub fn check_in_reward(streak: u64) -> (u64, Points) {
    let day = streak % CHECK_IN_CYCLE_DAYS;
    (day, CHECK_IN_REWARDS[day as usize])
}
