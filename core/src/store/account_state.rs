use super::SqliteStore;
use crate::{
    error::{LoyaltyError, LoyaltyResult},
    event::LoyaltyEvent,
    state::AccountState,
};
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

impl SqliteStore {
    // ── Account state ─────────────────────────────────────────────

    pub fn load_state(&self, account_id: &str) -> LoyaltyResult<Option<AccountState>> {
        let raw: Option<String> = self
            .conn()
            .query_row(
                "SELECT state_json FROM account_state WHERE account_id = ?1",
                params![account_id],
                |row| row.get(0),
            )
            .optional()?;

        let Some(raw) = raw else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| LoyaltyError::CorruptState {
                account_id: account_id.to_string(),
                reason: e.to_string(),
            })
    }

    /// Upsert the state document and append its events atomically.
    pub fn commit_state(
        &self,
        account_id: &str,
        state: &AccountState,
        events: &[LoyaltyEvent],
        at: DateTime<Utc>,
    ) -> LoyaltyResult<()> {
        let state_json = serde_json::to_string(state)?;
        let at = at.to_rfc3339();

        let mut conn = self.conn();
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO account_state (account_id, state_json, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(account_id) DO UPDATE
             SET state_json = excluded.state_json, updated_at = excluded.updated_at",
            params![account_id, state_json, at],
        )?;
        for event in events {
            tx.execute(
                "INSERT INTO event_log (account_id, event_type, payload, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![account_id, event.type_name(), serde_json::to_string(event)?, at],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Overwrite the stored document verbatim. Tooling and tests only;
    /// the engine always goes through `commit_state`.
    pub fn write_raw_state(&self, account_id: &str, raw: &str) -> LoyaltyResult<()> {
        self.conn().execute(
            "INSERT INTO account_state (account_id, state_json, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(account_id) DO UPDATE
             SET state_json = excluded.state_json, updated_at = excluded.updated_at",
            params![account_id, raw, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Every account with stored state, sorted. Backs the runner's `accounts` command.
    pub fn account_ids(&self) -> LoyaltyResult<Vec<String>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT account_id FROM account_state ORDER BY account_id")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(ids)
    }
}
