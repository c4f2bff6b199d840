//! SQLite storage for match recordings
//!
//! One row per recording, one row per sampled frame and one row per bus
//! event. Frame and event payloads are stored as JSON text.

use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;

use super::{FrameSample, RecordedEvent, Recording};
use crate::events::TankEvent;

/// Row from the recordings table, without frames or events
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingSummary {
    pub id: String,
    pub created_at: String,
    pub level: u32,
    pub level_name: String,
    pub winner: String,
    pub duration_ms: u32,
    pub frame_count: u32,
}

pub struct RecordingStore {
    conn: Connection,
}

impl RecordingStore {
    /// Open (or create) a recordings database
    pub fn open(path: impl AsRef<Path>) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Store a finished recording and return its id
    pub fn save(&self, recording: &Recording) -> Result<String, rusqlite::Error> {
        let id = uuid::Uuid::new_v4().to_string();
        let created_at = chrono::Utc::now().to_rfc3339();

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            r#"INSERT INTO recordings
               (id, created_at, level, level_name, winner, duration_ms, frame_count)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"#,
            params![
                id,
                created_at,
                recording.level,
                recording.level_name,
                recording.winner,
                recording.duration_ms,
                recording.frames.len() as u32,
            ],
        )?;

        {
            let mut insert_frame =
                tx.prepare("INSERT INTO frames (recording_id, time_ms, data) VALUES (?1, ?2, ?3)")?;
            for frame in &recording.frames {
                let data = serde_json::to_string(frame).map_err(to_sql_error)?;
                insert_frame.execute(params![id, frame.time_ms, data])?;
            }

            let mut insert_event = tx.prepare(
                "INSERT INTO events (recording_id, time_ms, kind, data) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for recorded in &recording.events {
                let data = serde_json::to_string(&recorded.event).map_err(to_sql_error)?;
                insert_event.execute(params![id, recorded.time_ms, recorded.event.kind(), data])?;
            }
        }

        tx.commit()?;
        Ok(id)
    }

    /// All recordings, newest first
    pub fn list(&self) -> Result<Vec<RecordingSummary>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            r#"SELECT id, created_at, level, level_name, winner, duration_ms, frame_count
               FROM recordings ORDER BY created_at DESC, rowid DESC"#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(RecordingSummary {
                id: row.get(0)?,
                created_at: row.get(1)?,
                level: row.get(2)?,
                level_name: row.get(3)?,
                winner: row.get(4)?,
                duration_ms: row.get(5)?,
                frame_count: row.get(6)?,
            })
        })?;
        rows.collect()
    }

    pub fn latest_id(&self) -> Result<Option<String>, rusqlite::Error> {
        self.conn
            .query_row(
                "SELECT id FROM recordings ORDER BY created_at DESC, rowid DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()
    }

    /// Load a full recording; None if the id is unknown
    pub fn load(&self, id: &str) -> Result<Option<Recording>, rusqlite::Error> {
        let header = self
            .conn
            .query_row(
                "SELECT level, level_name, winner, duration_ms FROM recordings WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Recording {
                        level: row.get(0)?,
                        level_name: row.get(1)?,
                        winner: row.get(2)?,
                        duration_ms: row.get(3)?,
                        ..Default::default()
                    })
                },
            )
            .optional()?;
        let Some(mut recording) = header else {
            return Ok(None);
        };

        let mut stmt = self
            .conn
            .prepare("SELECT data FROM frames WHERE recording_id = ?1 ORDER BY time_ms, rowid")?;
        recording.frames = stmt
            .query_map(params![id], |row| {
                let data: String = row.get(0)?;
                serde_json::from_str::<FrameSample>(&data).map_err(|e| from_sql_error(0, e))
            })?
            .collect::<Result<_, _>>()?;

        let mut stmt = self
            .conn
            .prepare("SELECT time_ms, data FROM events WHERE recording_id = ?1 ORDER BY time_ms, rowid")?;
        recording.events = stmt
            .query_map(params![id], |row| {
                let time_ms: u32 = row.get(0)?;
                let data: String = row.get(1)?;
                let event = serde_json::from_str::<TankEvent>(&data).map_err(|e| from_sql_error(1, e))?;
                Ok(RecordedEvent { time_ms, event })
            })?
            .collect::<Result<_, _>>()?;

        Ok(Some(recording))
    }
}

fn to_sql_error(e: serde_json::Error) -> rusqlite::Error {
    rusqlite::Error::ToSqlConversionFailure(Box::new(e))
}

fn from_sql_error(column: usize, e: serde_json::Error) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e))
}

fn init_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS recordings (
            id TEXT PRIMARY KEY,
            created_at TEXT NOT NULL,
            level INTEGER NOT NULL,
            level_name TEXT NOT NULL,
            winner TEXT NOT NULL,
            duration_ms INTEGER NOT NULL,
            frame_count INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS frames (
            id INTEGER PRIMARY KEY,
            recording_id TEXT NOT NULL REFERENCES recordings(id),
            time_ms INTEGER NOT NULL,
            data TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY,
            recording_id TEXT NOT NULL REFERENCES recordings(id),
            time_ms INTEGER NOT NULL,
            kind TEXT NOT NULL,
            data TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_frames_recording ON frames(recording_id, time_ms);
        CREATE INDEX IF NOT EXISTS idx_events_recording ON events(recording_id, time_ms);
        CREATE INDEX IF NOT EXISTS idx_events_kind ON events(kind);
        "#,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::TankFrame;
    use crate::tank::Team;

    fn sample_recording() -> Recording {
        let tank = |x: f32| TankFrame {
            tank: 0,
            team: Team::Player,
            x,
            y: -100.0,
            heading: 0.5,
            cannon: 1.0,
            health: 100.0,
        };
        Recording {
            level: 1,
            level_name: "Pincer".to_string(),
            winner: "player".to_string(),
            duration_ms: 100,
            frames: vec![
                FrameSample {
                    time_ms: 0,
                    tanks: vec![tank(0.0)],
                    bullets: vec![],
                },
                FrameSample {
                    time_ms: 50,
                    tanks: vec![tank(5.0)],
                    bullets: vec![(10.0, 20.0)],
                },
            ],
            events: vec![RecordedEvent {
                time_ms: 50,
                event: TankEvent::Fired {
                    tank: 0,
                    team: Team::Player,
                    pos: (0.0, 40.0),
                    angle: 1.0,
                    ammo_left: 9,
                },
            }],
        }
    }

    #[test]
    fn test_save_and_load() {
        let store = RecordingStore::open_in_memory().unwrap();
        let recording = sample_recording();
        let id = store.save(&recording).unwrap();

        let loaded = store.load(&id).unwrap().unwrap();
        assert_eq!(loaded, recording);
        assert_eq!(store.latest_id().unwrap(), Some(id.clone()));

        let summaries = store.list().unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].id, id);
        assert_eq!(summaries[0].frame_count, 2);
        assert_eq!(summaries[0].winner, "player");
    }

    #[test]
    fn test_unknown_id() {
        let store = RecordingStore::open_in_memory().unwrap();
        assert!(store.load("missing").unwrap().is_none());
        assert!(store.latest_id().unwrap().is_none());
        assert!(store.list().unwrap().is_empty());
    }
}
