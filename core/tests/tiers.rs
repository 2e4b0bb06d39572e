//! Tier table tests — boundary resolution and progress.

use loyalty_core::tiers::{next_tier, progress_percent, tier_for, TIERS};

#[test]
fn zero_balance_is_lowest_tier() {
    assert_eq!(tier_for(0).name, TIERS[0].name);
}

#[test]
fn thresholds_resolve_inclusively() {
    for (i, tier) in TIERS.iter().enumerate() {
        assert_eq!(tier_for(tier.min_points).name, tier.name);
        if i > 0 {
            assert_eq!(tier_for(tier.min_points - 1).name, TIERS[i - 1].name);
        }
    }
}

#[test]
fn top_tier_has_no_next_and_full_progress() {
    let top = TIERS.last().unwrap();
    assert_eq!(tier_for(top.min_points).name, top.name);
    assert!(next_tier(top.min_points).is_none());
    assert!(next_tier(top.min_points + 10_000).is_none());
    assert_eq!(progress_percent(top.min_points), 100);
}

#[test]
fn next_tier_is_smallest_threshold_above_balance() {
    assert_eq!(next_tier(0).map(|t| t.name), Some("Silver"));
    assert_eq!(next_tier(499).map(|t| t.name), Some("Silver"));
    assert_eq!(next_tier(500).map(|t| t.name), Some("Gold"));
}

#[test]
fn progress_is_relative_to_current_band() {
    // Silver (500) -> Gold (1500): 1000-point band.
    assert_eq!(progress_percent(500), 0);
    assert_eq!(progress_percent(1000), 50);
    assert_eq!(progress_percent(1499), 100);
    for balance in (0..6000).step_by(37) {
        assert!(progress_percent(balance) <= 100);
    }
}
