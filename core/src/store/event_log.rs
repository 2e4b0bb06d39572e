use super::SqliteStore;
use crate::{error::LoyaltyResult, event::EventLogEntry};
use chrono::{DateTime, Utc};
use rusqlite::params;

impl SqliteStore {
    // ── Event log ──────────────────────────────────────────────

    /// Most recent events for an account, newest first.
    pub fn events_for_account(
        &self,
        account_id: &str,
        limit: usize,
    ) -> LoyaltyResult<Vec<EventLogEntry>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, account_id, event_type, payload, created_at
             FROM event_log WHERE account_id = ?1
             ORDER BY id DESC LIMIT ?2",
        )?;
        let entries = stmt
            .query_map(params![account_id, limit as i64], |row| {
                let created_at: String = row.get(4)?;
                let created_at = DateTime::parse_from_rfc3339(&created_at)
                    .map(|t| t.with_timezone(&Utc))
                    .map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(
                            4,
                            rusqlite::types::Type::Text,
                            Box::new(e),
                        )
                    })?;
                Ok(EventLogEntry {
                    id: Some(row.get(0)?),
                    account_id: row.get(1)?,
                    event_type: row.get(2)?,
                    payload: row.get(3)?,
                    created_at,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn event_count(&self, account_id: &str) -> LoyaltyResult<i64> {
        let count = self.conn().query_row(
            "SELECT COUNT(*) FROM event_log WHERE account_id = ?1",
            params![account_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
