//! Alarm session: the set of reminders currently ringing.
//!
//! Audio follows set emptiness. It starts when the first reminder enters and
//! stops when the last one leaves. Due reminders are only added here, by
//! `on_due_detected`; every user action only removes.

use crate::notifier::{Notification, NotificationPermission, Notifier};
use crate::sound::AlarmSound;
use medicine_reminder_types::{Reminder, TimeOfDay};
use std::collections::HashSet;

pub struct AlarmSession {
    /// Ringing reminder ids in the order they started ringing.
    ringing: Vec<String>,
    /// Ids already raised during `raised_minute`. Keeps a dismissed alarm from
    /// coming back on the next tick of the same minute.
    raised: HashSet<String>,
    raised_minute: Option<TimeOfDay>,
    sound: Box<dyn AlarmSound>,
    notifier: Box<dyn Notifier>,
}

impl AlarmSession {
    pub fn new(sound: Box<dyn AlarmSound>, notifier: Box<dyn Notifier>) -> Self {
        Self {
            ringing: Vec::new(),
            raised: HashSet::new(),
            raised_minute: None,
            sound,
            notifier,
        }
    }

    /// Raises every due reminder not yet raised this minute. Returns the ids
    /// that started ringing.
    pub fn on_due_detected(&mut self, now: &TimeOfDay, due: &[&Reminder]) -> Vec<String> {
        if self.raised_minute != Some(*now) {
            self.raised.clear();
            self.raised_minute = Some(*now);
        }

        let mut started = Vec::new();
        for reminder in due {
            if self.is_ringing(&reminder.id) || self.raised.contains(&reminder.id) {
                continue;
            }
            self.ringing.push(reminder.id.clone());
            self.raised.insert(reminder.id.clone());
            started.push(reminder.id.clone());

            log::info!(
                "[ALARM] {} is due at {} ({} ringing)",
                reminder.medicine_name,
                now,
                self.ringing.len()
            );

            if self.notifier.permission() == NotificationPermission::Granted {
                self.notifier.notify(&Notification::for_reminder(reminder));
            }
            if !self.sound.is_playing() {
                self.sound.play();
            }
        }
        started
    }

    pub fn on_mark_taken(&mut self, id: &str) -> bool {
        self.remove(id)
    }

    pub fn on_delete(&mut self, id: &str) -> bool {
        self.raised.remove(id);
        self.remove(id)
    }

    /// The reminder stays untaken; only its alarm is silenced.
    pub fn on_notification_dismissed(&mut self, id: &str) -> bool {
        self.remove(id)
    }

    pub fn on_stop_all(&mut self) {
        if !self.ringing.is_empty() {
            log::info!("[ALARM] Stopping {} alarm(s)", self.ringing.len());
        }
        self.ringing.clear();
        self.sound.stop();
    }

    pub fn is_ringing(&self, id: &str) -> bool {
        self.ringing.iter().any(|r| r == id)
    }

    pub fn ringing(&self) -> &[String] {
        &self.ringing
    }

    pub fn is_empty(&self) -> bool {
        self.ringing.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ringing.len()
    }

    pub fn is_sound_playing(&self) -> bool {
        self.sound.is_playing()
    }

    fn remove(&mut self, id: &str) -> bool {
        let Some(pos) = self.ringing.iter().position(|r| r == id) else {
            return false;
        };
        self.ringing.remove(pos);
        if self.ringing.is_empty() && self.sound.is_playing() {
            self.sound.stop();
        }
        true
    }
}
