//! Tier table — status bands derived from the point balance.
//!
//! Pure functions over a fixed, ordered table. The first tier starts at
//! zero, so `tier_for` always resolves.

use crate::types::Points;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tier {
    pub name: &'static str,
    pub min_points: Points,
    pub meta: TierMeta,
}

/// Display metadata. The engine never reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierMeta {
    pub color: &'static str,
    pub perks: &'static [&'static str],
}

/// Ordered by strictly increasing `min_points`.
pub static TIERS: [Tier; 4] = [
    Tier {
        name: "Bronze",
        min_points: 0,
        meta: TierMeta { color: "#cd7f32", perks: &["Member pricing"] },
    },
    Tier {
        name: "Silver",
        min_points: 500,
        meta: TierMeta { color: "#c0c0c0", perks: &["Member pricing", "Free shipping over $50"] },
    },
    Tier {
        name: "Gold",
        min_points: 1500,
        meta: TierMeta {
            color: "#ffd700",
            perks: &["Member pricing", "Free shipping", "Early access to sales"],
        },
    },
    Tier {
        name: "Platinum",
        min_points: 5000,
        meta: TierMeta {
            color: "#e5e4e2",
            perks: &[
                "Member pricing",
                "Free shipping",
                "Early access to sales",
                "Priority support",
            ],
        },
    },
];

/// The tier with the greatest `min_points <= balance`.
pub fn tier_for(balance: Points) -> &'static Tier {
    TIERS
        .iter()
        .rev()
        .find(|t| t.min_points <= balance)
        .unwrap_or(&TIERS[0])
}

/// The tier with the smallest `min_points > balance`, if any.
pub fn next_tier(balance: Points) -> Option<&'static Tier> {
    TIERS.iter().find(|t| t.min_points > balance)
}

/// Progress from the current tier's floor to the next tier's, in [0, 100].
pub fn progress_percent(balance: Points) -> u8 {
    let Some(next) = next_tier(balance) else {
        return 100;
    };
    let current = tier_for(balance);
    let span = (next.min_points - current.min_points) as f64;
    let done = (balance - current.min_points) as f64;
    (100.0 * done / span).round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_strictly_increase_from_zero() {
        assert_eq!(TIERS[0].min_points, 0);
        assert!(TIERS.windows(2).all(|w| w[0].min_points < w[1].min_points));
    }

    #[test]
    fn progress_rounds_to_nearest() {
        // Bronze -> Silver spans 500 points.
        assert_eq!(progress_percent(0), 0);
        assert_eq!(progress_percent(2), 0);
        assert_eq!(progress_percent(3), 1);
        assert_eq!(progress_percent(250), 50);
        assert_eq!(progress_percent(499), 100);
    }
}
