//! Due-reminder detection.

use medicine_reminder_types::{Reminder, TimeOfDay};

/// Reminders scheduled for exactly `now` that have not been taken, in input order.
pub fn due_reminders<'a>(now: &TimeOfDay, reminders: &'a [Reminder]) -> Vec<&'a Reminder> {
    reminders.iter().filter(|r| r.is_due_at(now)).collect()
}
