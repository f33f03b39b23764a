//! SQLite-based record store.
//!
//! Provides persistent storage for:
//! - The user profile and streak state
//! - Conversation flows and chat history
//! - Daily check-ins
//! - Medications and their intake logs
//!
//! All timestamps are stored as RFC 3339 text, day-granularity dates as
//! `YYYY-MM-DD` text so SQLite string comparison orders them correctly.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::{data_dir, migrations};
use crate::calendar::{build_calendar, CalendarView};
use crate::checkin::{Answer, DailyCheckIn};
use crate::error::{DatabaseError, Result};
use crate::flow::{ChatMessage, ConversationFlow, ConversationStep, FlowType, MessageSender, MessageType};
use crate::medication::{Medication, MedicationLog, MedicationLogEntry, MedicationStatus};
use crate::streak::StreakUpdate;
use crate::user::UserProfile;

const DAY_FMT: &str = "%Y-%m-%d";

/// SQLite database for all persisted records.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/pulsecor/pulsecor.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("pulsecor.db");
        let conn = Connection::open(&path).map_err(|source| DatabaseError::OpenFailed {
            path: path.clone(),
            source,
        })?;
        let db = Self { conn };
        migrations::migrate(&db.conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    #[cfg(test)]
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(DatabaseError::from)?;
        let db = Self { conn };
        migrations::migrate(&db.conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(db)
    }

    // ---- Users ----

    /// Fetch the user profile, inserting the default row on first access.
    pub fn get_or_seed_user(&self) -> Result<UserProfile> {
        if let Some(user) = self.first_user()? {
            return Ok(user);
        }
        self.conn.execute(
            "INSERT INTO users (name, created_at) VALUES ('User', ?1)",
            params![Utc::now().to_rfc3339()],
        )?;
        self.first_user()?
            .ok_or_else(|| DatabaseError::QueryFailed("user row vanished after seed".into()).into())
    }

    fn first_user(&self) -> Result<Option<UserProfile>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, name, created_at, last_check_in_date, current_streak, longest_streak
                 FROM users ORDER BY id LIMIT 1",
                [],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, Option<String>>(3)?,
                        row.get::<_, u32>(4)?,
                        row.get::<_, u32>(5)?,
                    ))
                },
            )
            .optional()?;

        let Some((id, name, created_at, last_day, current, longest)) = row else {
            return Ok(None);
        };
        Ok(Some(UserProfile {
            id,
            name,
            created_at: parse_ts(&created_at)?,
            last_check_in_date: last_day.as_deref().map(parse_day).transpose()?,
            current_streak: current,
            longest_streak: longest,
        }))
    }

    /// Rename the user (onboarding name capture, `user set-name`).
    pub fn set_user_name(&self, user_id: i64, name: &str) -> Result<()> {
        self.conn.execute(
            "UPDATE users SET name = ?1 WHERE id = ?2",
            params![name, user_id],
        )?;
        Ok(())
    }

    /// Overwrite the stored streak fields, used by the retrospective repair.
    /// A `None` last check-in clears the date, which zeroes out counters
    /// that drifted without any backing check-in rows.
    pub fn set_user_streak(
        &self,
        user_id: i64,
        current_streak: u32,
        longest_streak: u32,
        last_check_in: Option<NaiveDate>,
    ) -> Result<()> {
        self.conn.execute(
            "UPDATE users
             SET current_streak = ?1, longest_streak = ?2, last_check_in_date = ?3
             WHERE id = ?4",
            params![
                current_streak,
                longest_streak,
                last_check_in.map(|d| d.format(DAY_FMT).to_string()),
                user_id
            ],
        )?;
        Ok(())
    }

    // ---- Conversation flows ----

    /// The user's incomplete flow, if any. At most one exists at a time.
    pub fn active_flow(&self, user_id: i64) -> Result<Option<ConversationFlow>> {
        let row = self
            .conn
            .query_row(
                "SELECT session_id, user_id, flow_type, current_step, is_complete,
                        started_at, completed_at, temp_data
                 FROM conversation_flows
                 WHERE user_id = ?1 AND is_complete = 0
                 ORDER BY started_at DESC LIMIT 1",
                params![user_id],
                flow_columns,
            )
            .optional()?;
        row.map(flow_from_columns).transpose()
    }

    /// Insert or update a flow keyed on its session id.
    pub fn save_flow(&self, flow: &ConversationFlow) -> Result<()> {
        let temp_data = serde_json::to_string(&flow.temp_data)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO conversation_flows
             (session_id, user_id, flow_type, current_step, is_complete,
              started_at, completed_at, temp_data)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                flow.session_id,
                flow.user_id,
                flow.flow_type.as_str(),
                flow.current_step.as_str(),
                flow.is_complete,
                flow.started_at.to_rfc3339(),
                flow.completed_at.map(|t| t.to_rfc3339()),
                temp_data,
            ],
        )?;
        Ok(())
    }

    // ---- Chat messages ----

    /// Append a message to a session's history.
    pub fn append_message(&self, message: &ChatMessage) -> Result<i64> {
        let quick_replies = serde_json::to_string(&message.quick_replies)?;
        self.conn.execute(
            "INSERT INTO chat_messages (session_id, sender, content, timestamp, message_type, quick_replies)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                message.session_id,
                message.sender.as_str(),
                message.content,
                message.timestamp.to_rfc3339(),
                message.message_type.as_str(),
                quick_replies,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// A session's full history, oldest first.
    pub fn messages_for_session(&self, session_id: &str) -> Result<Vec<ChatMessage>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, session_id, sender, content, timestamp, message_type, quick_replies
             FROM chat_messages
             WHERE session_id = ?1
             ORDER BY timestamp ASC, id ASC",
        )?;
        let rows = stmt.query_map(params![session_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
            ))
        })?;

        let mut messages = Vec::new();
        for row in rows {
            let (id, session_id, sender, content, timestamp, message_type, quick_replies) = row?;
            messages.push(ChatMessage {
                id: Some(id),
                session_id,
                sender: MessageSender::parse(&sender),
                content,
                timestamp: parse_ts(&timestamp)?,
                message_type: MessageType::parse(&message_type),
                quick_replies: serde_json::from_str(&quick_replies)?,
            });
        }
        Ok(messages)
    }

    // ---- Daily check-ins ----

    /// Persist a completed check-in and its streak update atomically.
    ///
    /// The `UNIQUE(user_id, date)` constraint makes a second call for the
    /// same day insert nothing; the streak recurrence is likewise a no-op
    /// for a same-day repeat, so double invocation leaves both rows as the
    /// first call wrote them.
    pub fn complete_check_in(&self, check_in: &DailyCheckIn, update: &StreakUpdate) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;

        tx.execute(
            "INSERT INTO daily_check_ins
             (user_id, date, sleep_quality, sleep_hours, water_glasses,
              stress_level, energy_level, activity_level, created_at, completed_at, is_complete)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
             ON CONFLICT(user_id, date) DO NOTHING",
            params![
                check_in.user_id,
                check_in.date.format(DAY_FMT).to_string(),
                check_in.sleep_quality.raw(),
                check_in.sleep_hours.raw(),
                check_in.water_glasses.raw(),
                check_in.stress_level.raw(),
                check_in.energy_level.raw(),
                check_in.activity_level.raw(),
                check_in.created_at.to_rfc3339(),
                check_in.completed_at.map(|t| t.to_rfc3339()),
                check_in.is_complete,
            ],
        )?;

        tx.execute(
            "UPDATE users
             SET current_streak = ?1, longest_streak = ?2, last_check_in_date = ?3
             WHERE id = ?4",
            params![
                update.current_streak,
                update.longest_streak,
                update.last_check_in.format(DAY_FMT).to_string(),
                check_in.user_id
            ],
        )?;

        tx.commit()?;
        Ok(())
    }

    /// Whether a completed check-in exists for `day`.
    pub fn has_checked_in(&self, user_id: i64, day: NaiveDate) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM daily_check_ins
             WHERE user_id = ?1 AND date = ?2 AND is_complete = 1",
            params![user_id, day.format(DAY_FMT).to_string()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Completed check-ins in the 7-day window ending on `today`.
    pub fn weekly_check_in_count(&self, user_id: i64, today: NaiveDate) -> Result<u32> {
        let since = today - chrono::Days::new(6);
        let count: u32 = self.conn.query_row(
            "SELECT COUNT(*) FROM daily_check_ins
             WHERE user_id = ?1 AND is_complete = 1 AND date >= ?2 AND date <= ?3",
            params![
                user_id,
                since.format(DAY_FMT).to_string(),
                today.format(DAY_FMT).to_string()
            ],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Every day with a completed check-in, ascending.
    pub fn check_in_days(&self, user_id: i64) -> Result<Vec<NaiveDate>> {
        let mut stmt = self.conn.prepare(
            "SELECT date FROM daily_check_ins
             WHERE user_id = ?1 AND is_complete = 1
             ORDER BY date ASC",
        )?;
        let rows = stmt.query_map(params![user_id], |row| row.get::<_, String>(0))?;

        let mut days = Vec::new();
        for row in rows {
            days.push(parse_day(&row?)?);
        }
        Ok(days)
    }

    /// The most recent check-ins, newest first.
    pub fn recent_check_ins(&self, user_id: i64, limit: u32) -> Result<Vec<DailyCheckIn>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, date, sleep_quality, sleep_hours, water_glasses,
                    stress_level, energy_level, activity_level, created_at, completed_at, is_complete
             FROM daily_check_ins
             WHERE user_id = ?1
             ORDER BY date DESC LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![user_id, limit], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, Option<String>>(5)?,
                row.get::<_, Option<String>>(6)?,
                row.get::<_, Option<String>>(7)?,
                row.get::<_, Option<String>>(8)?,
                row.get::<_, String>(9)?,
                row.get::<_, Option<String>>(10)?,
                row.get::<_, bool>(11)?,
            ))
        })?;

        let mut check_ins = Vec::new();
        for row in rows {
            let (
                id,
                user_id,
                date,
                sleep_quality,
                sleep_hours,
                water_glasses,
                stress_level,
                energy_level,
                activity_level,
                created_at,
                completed_at,
                is_complete,
            ) = row?;
            check_ins.push(DailyCheckIn {
                id: Some(id),
                user_id,
                date: parse_day(&date)?,
                sleep_quality: Answer::from_raw(sleep_quality.as_deref()),
                sleep_hours: Answer::from_raw(sleep_hours.as_deref()),
                water_glasses: Answer::from_raw(water_glasses.as_deref()),
                stress_level: Answer::from_raw(stress_level.as_deref()),
                energy_level: Answer::from_raw(energy_level.as_deref()),
                activity_level: Answer::from_raw(activity_level.as_deref()),
                created_at: parse_ts(&created_at)?,
                completed_at: completed_at.as_deref().map(parse_ts).transpose()?,
                is_complete,
            });
        }
        Ok(check_ins)
    }

    // ---- Medications ----

    /// Insert a medication, returning its row id.
    pub fn create_medication(&self, medication: &Medication) -> Result<i64> {
        let times = serde_json::to_string(&medication.reminder_times)?;
        self.conn.execute(
            "INSERT INTO medications (user_id, name, dosage, frequency, reminder_times, is_active, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                medication.user_id,
                medication.name,
                medication.dosage,
                medication.frequency,
                times,
                medication.is_active,
                medication.created_at.to_rfc3339(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// The user's active medications.
    pub fn medications(&self, user_id: i64) -> Result<Vec<Medication>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, name, dosage, frequency, reminder_times, is_active, created_at
             FROM medications
             WHERE user_id = ?1 AND is_active = 1
             ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![user_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, bool>(6)?,
                row.get::<_, String>(7)?,
            ))
        })?;

        let mut medications = Vec::new();
        for row in rows {
            let (id, user_id, name, dosage, frequency, times, is_active, created_at) = row?;
            medications.push(Medication {
                id: Some(id),
                user_id,
                name,
                dosage,
                frequency,
                reminder_times: serde_json::from_str(&times)?,
                is_active,
                created_at: parse_ts(&created_at)?,
            });
        }
        Ok(medications)
    }

    /// Soft-delete a medication. Its log history stays on the calendar.
    pub fn deactivate_medication(&self, medication_id: i64) -> Result<()> {
        self.conn.execute(
            "UPDATE medications SET is_active = 0 WHERE id = ?1",
            params![medication_id],
        )?;
        Ok(())
    }

    /// Record a medication intake event.
    pub fn log_medication(&self, log: &MedicationLog) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO medication_logs (medication_id, status, timestamp, scheduled_time)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                log.medication_id,
                log.status.label(),
                log.timestamp.to_rfc3339(),
                log.scheduled_time,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Medication log entries since `since`, grouped by day.
    ///
    /// Joins through `medications` for display fields. Inactive medications
    /// are included: a removed medication's past doses still happened.
    pub fn medication_logs_since(
        &self,
        user_id: i64,
        since: NaiveDate,
    ) -> Result<HashMap<NaiveDate, Vec<MedicationLogEntry>>> {
        let mut stmt = self.conn.prepare(
            "SELECT l.medication_id, m.name, m.dosage, l.status, l.timestamp
             FROM medication_logs l
             JOIN medications m ON m.id = l.medication_id
             WHERE m.user_id = ?1 AND l.timestamp >= ?2
             ORDER BY l.timestamp ASC",
        )?;
        let rows = stmt.query_map(
            params![user_id, format!("{}T00:00:00+00:00", since.format(DAY_FMT))],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            },
        )?;

        let mut by_day: HashMap<NaiveDate, Vec<MedicationLogEntry>> = HashMap::new();
        for row in rows {
            let (medication_id, name, dosage, status, timestamp) = row?;
            let timestamp = parse_ts(&timestamp)?;
            let status = MedicationStatus::from_label(&status).ok_or_else(|| {
                DatabaseError::QueryFailed(format!("unknown medication status '{status}'"))
            })?;
            by_day
                .entry(timestamp.date_naive())
                .or_default()
                .push(MedicationLogEntry {
                    medication_id,
                    name,
                    dosage,
                    status,
                    timestamp,
                });
        }
        Ok(by_day)
    }

    // ---- Calendar ----

    /// Assemble the month-grouped calendar view for the user.
    pub fn calendar_view(
        &self,
        user_id: i64,
        app_start: NaiveDate,
        today: NaiveDate,
    ) -> Result<CalendarView> {
        let check_in_days: HashSet<NaiveDate> = self.check_in_days(user_id)?.into_iter().collect();
        let med_logs = self.medication_logs_since(user_id, app_start)?;
        Ok(build_calendar(app_start, today, &check_in_days, &med_logs))
    }
}

type FlowColumns = (
    String,
    i64,
    String,
    String,
    bool,
    String,
    Option<String>,
    String,
);

fn flow_columns(row: &rusqlite::Row<'_>) -> rusqlite::Result<FlowColumns> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
    ))
}

fn flow_from_columns(cols: FlowColumns) -> Result<ConversationFlow> {
    let (session_id, user_id, flow_type, current_step, is_complete, started_at, completed_at, temp) =
        cols;
    Ok(ConversationFlow {
        session_id,
        user_id,
        flow_type: FlowType::parse(&flow_type),
        current_step: ConversationStep::parse(&current_step),
        is_complete,
        started_at: parse_ts(&started_at)?,
        completed_at: completed_at.as_deref().map(parse_ts).transpose()?,
        temp_data: serde_json::from_str(&temp)?,
    })
}

fn parse_ts(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| DatabaseError::QueryFailed(format!("bad timestamp '{s}': {e}")).into())
}

fn parse_day(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, DAY_FMT)
        .map_err(|e| DatabaseError::QueryFailed(format!("bad date '{s}': {e}")).into())
}
