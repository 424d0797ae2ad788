use chrono::{DateTime, Local};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("failed to create history directory {path:?}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("corrupt timestamp {0:?} in history")]
    Timestamp(String),
}

pub type Result<T> = std::result::Result<T, HistoryError>;

/// Sink for concluded sessions. Called once per session; never for cancels.
pub trait OutcomeRecorder {
    fn record(&mut self, duration_minutes: u64, succeeded: bool) -> Result<()>;
}

/// One concluded focus session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOutcome {
    pub length: u64,
    pub date: DateTime<Local>,
    pub done: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistorySummary {
    pub sessions: u64,
    pub succeeded: u64,
    pub failed: u64,
    /// Minutes across all sessions, killed ones included.
    pub focused_minutes: u64,
}

/// SQLite-backed session history
#[derive(Debug)]
pub struct SessionHistory {
    conn: Connection,
}

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS focus_sessions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        length INTEGER NOT NULL,
        date TEXT NOT NULL,
        done BOOLEAN NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_focus_sessions_date ON focus_sessions(date);
"#;

impl SessionHistory {
    /// Open (creating if needed) the history database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| HistoryError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    pub fn insert(&self, outcome: &SessionOutcome) -> Result<()> {
        self.conn.execute(
            "INSERT INTO focus_sessions (length, date, done) VALUES (?1, ?2, ?3)",
            params![outcome.length as i64, outcome.date.to_rfc3339(), outcome.done],
        )?;
        Ok(())
    }

    /// Most recent sessions first.
    pub fn recent(&self, limit: usize) -> Result<Vec<SessionOutcome>> {
        let mut stmt = self.conn.prepare(
            "SELECT length, date, done FROM focus_sessions ORDER BY id DESC LIMIT ?1",
        )?;

        let rows = stmt.query_map([limit as i64], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, bool>(2)?,
            ))
        })?;

        let mut outcomes = Vec::new();
        for row in rows {
            let (length, date, done) = row?;
            let date = DateTime::parse_from_rfc3339(&date)
                .map_err(|_| HistoryError::Timestamp(date.clone()))?
                .with_timezone(&Local);
            outcomes.push(SessionOutcome {
                length: length.max(0) as u64,
                date,
                done,
            });
        }
        Ok(outcomes)
    }

    pub fn summary(&self) -> Result<HistorySummary> {
        let (sessions, succeeded, minutes): (i64, i64, i64) = self.conn.query_row(
            r#"
            SELECT
                COUNT(*),
                COALESCE(SUM(CASE WHEN done = 1 THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(length), 0)
            FROM focus_sessions
            "#,
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;

        Ok(HistorySummary {
            sessions: sessions as u64,
            succeeded: succeeded as u64,
            failed: (sessions - succeeded) as u64,
            focused_minutes: minutes as u64,
        })
    }

    pub fn clear(&self) -> Result<()> {
        self.conn.execute("DELETE FROM focus_sessions", [])?;
        Ok(())
    }
}

impl OutcomeRecorder for SessionHistory {
    fn record(&mut self, duration_minutes: u64, succeeded: bool) -> Result<()> {
        self.insert(&SessionOutcome {
            length: duration_minutes,
            date: Local::now(),
            done: succeeded,
        })
    }
}

/// In-memory recorder for headless runs and tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryRecorder {
    pub outcomes: Vec<(u64, bool)>,
}

impl OutcomeRecorder for MemoryRecorder {
    fn record(&mut self, duration_minutes: u64, succeeded: bool) -> Result<()> {
        self.outcomes.push((duration_minutes, succeeded));
        Ok(())
    }
}
