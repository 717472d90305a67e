//! System-notification side channel.

use medicine_reminder_types::Reminder;
use std::io::Write;
use std::str::FromStr;

pub const NOTIFICATION_TITLE: &str = "Medicine Reminder";

/// Whether the user allowed notifications. `Default` means they were never asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationPermission {
    Granted,
    Denied,
    Default,
}

impl FromStr for NotificationPermission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "granted" => Ok(Self::Granted),
            "denied" => Ok(Self::Denied),
            "default" | "" => Ok(Self::Default),
            other => Err(format!(
                "Unknown notification permission '{}' (expected granted, denied or default)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub reminder_id: String,
    pub title: String,
    pub body: String,
}

impl Notification {
    pub fn for_reminder(reminder: &Reminder) -> Self {
        let body = match reminder.notes.as_deref().filter(|n| !n.is_empty()) {
            Some(notes) => format!("Time to take {} - {}", reminder.medicine_name, notes),
            None => format!("Time to take {}", reminder.medicine_name),
        };
        Self {
            reminder_id: reminder.id.clone(),
            title: NOTIFICATION_TITLE.to_string(),
            body,
        }
    }
}

pub trait Notifier: Send {
    fn permission(&self) -> NotificationPermission;

    /// Only called when `permission()` is `Granted`.
    fn notify(&mut self, notification: &Notification);
}

/// Prints notifications as a boxed banner on stdout.
pub struct TerminalNotifier {
    permission: NotificationPermission,
}

impl TerminalNotifier {
    pub fn new(permission: NotificationPermission) -> Self {
        Self { permission }
    }
}

impl Notifier for TerminalNotifier {
    fn permission(&self) -> NotificationPermission {
        self.permission
    }

    fn notify(&mut self, notification: &Notification) {
        log::info!(
            "[ALARM] Notification for {}: {}",
            notification.reminder_id,
            notification.body
        );
        let width = notification.body.chars().count().max(notification.title.len()) + 2;
        let rule = "=".repeat(width);
        let mut out = std::io::stdout();
        let _ = writeln!(
            out,
            "\n{rule}\n {}\n {}\n{rule}\n(type `dismiss {}` to close)",
            notification.title,
            notification.body,
            short_id(&notification.reminder_id),
        );
        let _ = out.flush();
    }
}

/// First 8 characters of a store id, enough to type back as a prefix.
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}
