//! Wall-clock source for the once-per-second tick.

use medicine_reminder_types::TimeOfDay;

pub trait Clock: Send {
    fn now(&self) -> TimeOfDay;
}

/// Reads the local wall clock on every call. There is no drift correction and
/// no catch-up: a minute that passes while the process is suspended is missed.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> TimeOfDay {
        TimeOfDay::now_local()
    }
}
