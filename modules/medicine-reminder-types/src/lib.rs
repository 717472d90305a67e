//! Shared types for the medicine reminder service and its clients.

use chrono::Timelike;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// =====================================================
// Time of day
// =====================================================

/// A wall-clock time of day with minute precision, written `HH:MM` (24-hour).
///
/// There is no date and no timezone: a reminder due at `08:00` is due whenever
/// the local clock reads `08:00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    pub fn new(hour: u8, minute: u8) -> Result<Self, String> {
        if hour > 23 {
            return Err(format!("Hour {} is out of range (00-23)", hour));
        }
        if minute > 59 {
            return Err(format!("Minute {} is out of range (00-59)", minute));
        }
        Ok(Self { hour, minute })
    }

    /// Truncates any chrono time value to its hour and minute.
    pub fn from_timelike(t: &impl Timelike) -> Self {
        Self {
            hour: t.hour() as u8,
            minute: t.minute() as u8,
        }
    }

    /// The current local time of day.
    pub fn now_local() -> Self {
        Self::from_timelike(&chrono::Local::now())
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }
}

impl FromStr for TimeOfDay {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("Invalid time '{}': expected HH:MM (24-hour)", s);

        let bytes = s.as_bytes();
        if bytes.len() != 5 || bytes[2] != b':' {
            return Err(invalid());
        }
        let digits = [bytes[0], bytes[1], bytes[3], bytes[4]];
        if !digits.iter().all(u8::is_ascii_digit) {
            return Err(invalid());
        }

        let hour = (digits[0] - b'0') * 10 + (digits[1] - b'0');
        let minute = (digits[2] - b'0') * 10 + (digits[3] - b'0');
        Self::new(hour, minute).map_err(|_| invalid())
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// =====================================================
// Domain Types
// =====================================================

/// One scheduled medicine dose, as persisted by the reminder store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: String,
    pub medicine_name: String,
    pub time: TimeOfDay,
    pub notes: Option<String>,
    #[serde(default)]
    pub taken: bool,
}

impl Reminder {
    /// Due means scheduled for exactly this minute and not yet taken.
    pub fn is_due_at(&self, now: &TimeOfDay) -> bool {
        !self.taken && self.time == *now
    }

    pub fn status_at(&self, now: &TimeOfDay) -> ReminderStatus {
        if self.taken {
            ReminderStatus::Taken
        } else if self.time == *now {
            ReminderStatus::DueNow
        } else {
            ReminderStatus::Pending
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderStatus {
    Taken,
    DueNow,
    Pending,
}

impl ReminderStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ReminderStatus::Taken => "Taken",
            ReminderStatus::DueNow => "Due Now!",
            ReminderStatus::Pending => "Pending",
        }
    }
}

/// A validated reminder that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReminder {
    pub medicine_name: String,
    pub time: TimeOfDay,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderStats {
    pub total: i64,
    pub taken: i64,
    pub pending: i64,
}

// =====================================================
// Request Types
// =====================================================

/// Body of `POST /api/reminders`.
///
/// Fields default to empty so a missing field surfaces as a validation
/// message instead of a deserialization error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReminderRequest {
    #[serde(default)]
    pub medicine_name: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub notes: Option<String>,
}

impl CreateReminderRequest {
    pub fn new(medicine_name: impl Into<String>, time: impl Into<String>, notes: Option<String>) -> Self {
        Self {
            medicine_name: medicine_name.into(),
            time: time.into(),
            notes,
        }
    }

    /// Checks required fields and the time format. Blank notes become `None`.
    pub fn validate(&self) -> Result<NewReminder, String> {
        let medicine_name = self.medicine_name.trim();
        if medicine_name.is_empty() {
            return Err("medicineName is required".to_string());
        }
        if self.time.trim().is_empty() {
            return Err("time is required".to_string());
        }
        let time = self.time.trim().parse::<TimeOfDay>()?;
        let notes = self
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);

        Ok(NewReminder {
            medicine_name: medicine_name.to_string(),
            time,
            notes,
        })
    }
}

/// Body of `PATCH /api/reminders/{id}`. An absent `taken` leaves the flag alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateReminderRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taken: Option<bool>,
}

// =====================================================
// Response Types
// =====================================================

/// `{ "message": ... }`, used for delete confirmations and every failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// =====================================================
// Service Status
// =====================================================

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    pub running: bool,
    pub uptime_secs: u64,
    pub total_reminders: i64,
    pub taken_count: i64,
    pub pending_count: i64,
}
