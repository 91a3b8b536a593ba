mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use uuid::Uuid;

use crate::models::*;
use crate::session::HistorySink;

/// Append-only store of practiced maneuvers.
///
/// Records are only ever inserted; there is no update or delete.
pub struct HistoryStore {
    conn: Arc<Mutex<Connection>>,
}

impl HistoryStore {
    pub fn open(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let conn = Connection::open(&path)
            .with_context(|| format!("Failed to open history database {}", path.display()))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open `history.db` in the platform data directory.
    pub fn open_default() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "chair-flying")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        Self::open(dirs.data_dir().join("history.db"))
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        schema::run_migrations(&conn)
    }

    pub fn record(&self, record: &HistoryRecord) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        conn.execute(
            "INSERT INTO maneuver_history (id, recorded_at, maneuver, phase, maneuver_type, outcome)
             VALUES (?, ?, ?, ?, ?, ?)",
            (
                record.id.to_string(),
                record.timestamp.to_rfc3339(),
                &record.maneuver,
                &record.phase,
                &record.maneuver_type,
                record.outcome.as_str(),
            ),
        )
        .context("Failed to append history record")?;

        tracing::info!(
            "Recorded {} as {}",
            record.display_name(),
            record.outcome.as_str()
        );
        Ok(())
    }

    /// Every record, in append order.
    pub fn get_history(&self) -> Result<Vec<HistoryRecord>> {
        self.query(
            "SELECT id, recorded_at, maneuver, phase, maneuver_type, outcome
             FROM maneuver_history ORDER BY rowid",
            rusqlite::params![],
        )
    }

    /// Records marked for follow-up, in append order.
    pub fn get_follow_ups(&self) -> Result<Vec<HistoryRecord>> {
        self.query(
            "SELECT id, recorded_at, maneuver, phase, maneuver_type, outcome
             FROM maneuver_history WHERE outcome = ? ORDER BY rowid",
            rusqlite::params![Outcome::FollowUp.as_str()],
        )
    }

    /// Records written at or after `since`, in append order.
    pub fn get_since(&self, since: DateTime<Utc>) -> Result<Vec<HistoryRecord>> {
        let all = self.get_history()?;
        Ok(all.into_iter().filter(|r| r.timestamp >= since).collect())
    }

    pub fn count(&self) -> Result<usize> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM maneuver_history", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn query(&self, sql: &str, params: &[&dyn rusqlite::ToSql]) -> Result<Vec<HistoryRecord>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(sql)?;

        let records = stmt
            .query_map(params, |row| {
                Ok(HistoryRecord {
                    id: parse_uuid(row.get::<_, String>(0)?),
                    timestamp: parse_datetime(row.get::<_, String>(1)?),
                    maneuver: row.get(2)?,
                    phase: row.get(3)?,
                    maneuver_type: row.get(4)?,
                    outcome: parse_outcome(&row.get::<_, String>(5)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }
}

impl Clone for HistoryStore {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

impl HistorySink for HistoryStore {
    fn append(&mut self, record: &HistoryRecord) -> crate::Result<()> {
        self.record(record).map_err(crate::Error::History)
    }
}

fn parse_outcome(s: &str) -> Outcome {
    Outcome::from_str(s).unwrap_or_else(|| {
        tracing::warn!("Unknown outcome {:?} in history, reading it as completed", s);
        Outcome::Completed
    })
}

fn parse_uuid(s: String) -> Uuid {
    Uuid::parse_str(&s).unwrap_or_else(|_| Uuid::nil())
}

fn parse_datetime(s: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_outcome_reads_as_completed() {
        let store = HistoryStore::open_memory().unwrap();
        store.migrate().unwrap();
        {
            let conn = store.conn.lock().unwrap();
            conn.execute(
                "INSERT INTO maneuver_history (id, recorded_at, maneuver, phase, maneuver_type, outcome)
                 VALUES (?, ?, 'Stall', NULL, 'maneuver', 'aced')",
                (Uuid::new_v4().to_string(), Utc::now().to_rfc3339()),
            )
            .unwrap();
        }

        let history = store.get_history().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].outcome, Outcome::Completed);
        assert!(store.get_follow_ups().unwrap().is_empty());
    }

    #[test]
    fn test_known_outcomes_parse() {
        assert_eq!(parse_outcome("follow_up"), Outcome::FollowUp);
        assert_eq!(parse_outcome("skipped"), Outcome::Skipped);
        assert_eq!(parse_outcome("completed"), Outcome::Completed);
    }
}
