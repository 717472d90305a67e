//! Looping alarm audio.

use std::io::Write;
use std::time::Duration;
use tokio::task::JoinHandle;

/// A single global alarm loop. `play` while already playing is a no-op.
pub trait AlarmSound: Send {
    fn play(&mut self);
    fn stop(&mut self);
    fn is_playing(&self) -> bool;
}

/// Rings the terminal bell on a fixed period until stopped.
///
/// `play` must be called from within a tokio runtime.
pub struct TerminalBell {
    period: Duration,
    task: Option<JoinHandle<()>>,
}

impl TerminalBell {
    pub fn new(period: Duration) -> Self {
        Self { period, task: None }
    }
}

impl AlarmSound for TerminalBell {
    fn play(&mut self) {
        if self.task.is_some() {
            return;
        }
        let period = self.period;
        self.task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                let mut out = std::io::stdout();
                let _ = out.write_all(b"\x07");
                let _ = out.flush();
            }
        }));
        log::info!("[ALARM] Alarm sound started");
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            log::info!("[ALARM] Alarm sound stopped");
        }
    }

    fn is_playing(&self) -> bool {
        self.task.is_some()
    }
}

impl Drop for TerminalBell {
    fn drop(&mut self) {
        self.stop();
    }
}
