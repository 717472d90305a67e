//! SQLite storage for medicine reminders.

use medicine_reminder_types::*;
use rusqlite::Result as SqliteResult;
use std::sync::{Mutex, MutexGuard};

pub struct Db {
    conn: Mutex<rusqlite::Connection>,
}

impl Db {
    pub fn open(path: &str) -> SqliteResult<Self> {
        let conn = if path == ":memory:" {
            rusqlite::Connection::open_in_memory()?
        } else {
            rusqlite::Connection::open(path)?
        };
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        create_tables(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, rusqlite::Connection>, String> {
        self.conn
            .lock()
            .map_err(|_| "Database lock poisoned".to_string())
    }

    /// All reminders in insertion order.
    pub fn list_reminders(&self) -> Result<Vec<Reminder>, String> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, medicine_name, time, notes, taken
                 FROM reminders
                 ORDER BY rowid ASC",
            )
            .map_err(|e| format!("Failed to prepare query: {}", e))?;

        let reminders = stmt
            .query_map([], row_to_reminder)
            .map_err(|e| format!("Failed to query: {}", e))?
            .collect::<SqliteResult<Vec<_>>>()
            .map_err(|e| format!("Failed to read reminder: {}", e))?;
        Ok(reminders)
    }

    pub fn get_reminder(&self, id: &str) -> Result<Option<Reminder>, String> {
        let conn = self.conn()?;
        get_reminder_impl(&conn, id)
    }

    pub fn insert_reminder(&self, new: &NewReminder) -> Result<Reminder, String> {
        let conn = self.conn()?;
        let id = uuid::Uuid::new_v4().to_string();

        conn.execute(
            "INSERT INTO reminders (id, medicine_name, time, notes, taken)
             VALUES (?1, ?2, ?3, ?4, 0)",
            rusqlite::params![id, new.medicine_name, new.time.to_string(), new.notes],
        )
        .map_err(|e| format!("Failed to insert reminder: {}", e))?;

        log::info!(
            "[REMINDER_STORE] Created reminder {} ({} at {})",
            id,
            new.medicine_name,
            new.time
        );

        get_reminder_impl(&conn, &id)?
            .ok_or_else(|| format!("Reminder {} vanished after insert", id))
    }

    /// Returns `None` when no reminder has this id.
    pub fn set_taken(&self, id: &str, taken: bool) -> Result<Option<Reminder>, String> {
        let conn = self.conn()?;
        let changed = conn
            .execute(
                "UPDATE reminders
                 SET taken = ?1,
                     updated_at = datetime('now')
                 WHERE id = ?2",
                rusqlite::params![taken, id],
            )
            .map_err(|e| format!("Failed to update reminder: {}", e))?;

        if changed == 0 {
            return Ok(None);
        }
        log::debug!("[REMINDER_STORE] Reminder {} taken={}", id, taken);
        get_reminder_impl(&conn, id)
    }

    /// Returns `false` when no reminder has this id.
    pub fn delete_reminder(&self, id: &str) -> Result<bool, String> {
        let conn = self.conn()?;
        let deleted = conn
            .execute("DELETE FROM reminders WHERE id = ?1", rusqlite::params![id])
            .map_err(|e| format!("Failed to delete reminder: {}", e))?;
        if deleted > 0 {
            log::info!("[REMINDER_STORE] Deleted reminder {}", id);
        }
        Ok(deleted > 0)
    }

    pub fn get_stats(&self) -> Result<ReminderStats, String> {
        let conn = self.conn()?;
        let (total, taken): (i64, i64) = conn
            .query_row(
                "SELECT COUNT(*), COALESCE(SUM(taken), 0) FROM reminders",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .map_err(|e| format!("Failed to count reminders: {}", e))?;
        Ok(ReminderStats {
            total,
            taken,
            pending: total - taken,
        })
    }
}

fn create_tables(conn: &rusqlite::Connection) -> SqliteResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS reminders (
            id TEXT PRIMARY KEY NOT NULL,
            medicine_name TEXT NOT NULL,
            time TEXT NOT NULL,
            notes TEXT,
            taken INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_reminders_time ON reminders(time)",
        [],
    )?;
    Ok(())
}

fn get_reminder_impl(conn: &rusqlite::Connection, id: &str) -> Result<Option<Reminder>, String> {
    let result = conn.query_row(
        "SELECT id, medicine_name, time, notes, taken
         FROM reminders
         WHERE id = ?1",
        rusqlite::params![id],
        row_to_reminder,
    );
    match result {
        Ok(reminder) => Ok(Some(reminder)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(format!("Database error: {}", e)),
    }
}

fn row_to_reminder(row: &rusqlite::Row) -> rusqlite::Result<Reminder> {
    let time: String = row.get(2)?;
    let time = time.parse::<TimeOfDay>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, e.into())
    })?;
    Ok(Reminder {
        id: row.get(0)?,
        medicine_name: row.get(1)?,
        time,
        notes: row.get(3)?,
        taken: row.get(4)?,
    })
}
