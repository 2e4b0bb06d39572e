//! Shared primitive types used across the engine.

/// A point amount. Balances and costs are never negative.
pub type Points = u64;

/// Signed point delta as recorded in the ledger history.
pub type PointDelta = i64;

/// Stable identifier for a loyalty account.
pub type AccountId = String;

/// Monotonic ledger entry identifier, unique per account.
pub type EntryId = u64;
