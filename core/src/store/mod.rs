//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database.
//! The engine hands it a complete AccountState plus the events that
//! produced it; both are written in one transaction or not at all.

use crate::{error::LoyaltyResult, event::LoyaltyEvent, state::AccountState};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use std::sync::{Mutex, MutexGuard};

mod account_state;
mod event_log;

/// The durable home of every account's state.
///
/// `load` returns Ok(None) for an unknown account and
/// Err(CorruptState) when stored data cannot be parsed; the engine
/// recovers from both by starting from the default state.
pub trait StateStore: Send + Sync {
    fn load(&self, account_id: &str) -> LoyaltyResult<Option<AccountState>>;

    fn save(
        &self,
        account_id: &str,
        state: &AccountState,
        events: &[LoyaltyEvent],
        at: DateTime<Utc>,
    ) -> LoyaltyResult<()>;
}

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &str) -> LoyaltyResult<Self> {
        let conn = Connection::open(path)?;
        // WAL mode only for real files; :memory: ignores it.
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> LoyaltyResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> LoyaltyResult<()> {
        self.conn()
            .execute_batch(include_str!("../../../migrations/001_loyalty.sql"))?;
        Ok(())
    }

    // A panic while holding the connection leaves SQLite itself consistent.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl StateStore for SqliteStore {
    fn load(&self, account_id: &str) -> LoyaltyResult<Option<AccountState>> {
        self.load_state(account_id)
    }

    fn save(
        &self,
        account_id: &str,
        state: &AccountState,
        events: &[LoyaltyEvent],
        at: DateTime<Utc>,
    ) -> LoyaltyResult<()> {
        self.commit_state(account_id, state, events, at)
    }
}
