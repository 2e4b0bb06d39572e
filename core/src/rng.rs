//! Random number generation for prize draws and redemption codes.
//!
//! RULE: Nothing in the engine calls a platform RNG directly.
//! All randomness flows through RewardRng instances derived
//! from a single master seed.
//!
//! Each account gets its own stream per purpose, seeded from
//! (master_seed, account_id, slot). This means:
//!   - Spinning the wheel never shifts the redemption-code stream.
//!   - A seeded run is fully reproducible per account.

use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

/// A named, seeded RNG stream for one purpose.
pub struct RewardRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl RewardRng {
    pub fn new(seed: u64) -> Self {
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Roll a u64 uniformly in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        use rand::Rng;
        assert!(n > 0, "n must be > 0");
        self.inner.gen_range(0..n)
    }

    /// Pick one element of a non-empty slice uniformly.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        let idx = self.next_u64_below(items.len() as u64) as usize;
        &items[idx]
    }
}

/// Derives every RewardRng stream from one master seed.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    /// Master seed from OS entropy. Used when no seed is configured.
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    pub fn for_account(&self, account_id: &str, slot: RewardSlot) -> RewardRng {
        let account_hash = fnv1a(account_id.as_bytes());
        let derived = self.master_seed
            ^ account_hash
            ^ (slot as u64).wrapping_add(1).wrapping_mul(0x9e37_79b9_7f4a_7c15);
        RewardRng::new(derived).with_name(slot.name())
    }
}

/// Stable slot assignments.
/// NEVER reorder or remove entries — only append.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum RewardSlot {
    Spin = 0,
    RedemptionCode = 1,
}

impl RewardSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Spin => "spin",
            Self::RedemptionCode => "redemption_code",
        }
    }
}

// 64-bit FNV-1a. Stable across toolchains, unlike std's DefaultHasher.
fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    bytes
        .iter()
        .fold(OFFSET, |hash, b| (hash ^ u64::from(*b)).wrapping_mul(PRIME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_account_same_stream() {
        let bank = RngBank::new(12345);
        let mut a = bank.for_account("acct-1", RewardSlot::Spin);
        let mut b = bank.for_account("acct-1", RewardSlot::Spin);
        for _ in 0..20 {
            assert_eq!(a.next_u64_below(1000), b.next_u64_below(1000));
        }
    }

    #[test]
    fn slots_and_accounts_get_distinct_streams() {
        let bank = RngBank::new(12345);
        let draw = |account: &str, slot| {
            let mut rng = bank.for_account(account, slot);
            (0..8).map(|_| rng.next_u64_below(1 << 32)).collect::<Vec<_>>()
        };
        assert_ne!(draw("acct-1", RewardSlot::Spin), draw("acct-1", RewardSlot::RedemptionCode));
        assert_ne!(draw("acct-1", RewardSlot::Spin), draw("acct-2", RewardSlot::Spin));
    }

    #[test]
    fn next_u64_below_respects_bound() {
        let mut rng = RewardRng::new(7);
        for _ in 0..1000 {
            assert!(rng.next_u64_below(36) < 36);
        }
    }
}
