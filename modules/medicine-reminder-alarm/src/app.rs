//! Client event loop: clock ticks, user commands and the reminder list.

use crate::client::ReminderApi;
use crate::clock::Clock;
use crate::command::{Command, HELP};
use crate::detector;
use crate::notifier::short_id;
use crate::session::AlarmSession;
use medicine_reminder_types::{CreateReminderRequest, Reminder, ReminderStatus, TimeOfDay};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

pub const LOAD_FAILED: &str = "Failed to load reminders";
pub const ADD_FAILED: &str = "Failed to add reminder";
pub const UPDATE_FAILED: &str = "Failed to update reminder";
pub const DELETE_FAILED: &str = "Failed to delete reminder";

pub struct ReminderApp<A: ReminderApi, C: Clock> {
    api: A,
    clock: C,
    session: AlarmSession,
    reminders: Vec<Reminder>,
    current_time: TimeOfDay,
    error: Option<String>,
}

impl<A: ReminderApi, C: Clock> ReminderApp<A, C> {
    pub fn new(api: A, clock: C, session: AlarmSession) -> Self {
        let current_time = clock.now();
        Self {
            api,
            clock,
            session,
            reminders: Vec::new(),
            current_time,
            error: None,
        }
    }

    pub fn reminders(&self) -> &[Reminder] {
        &self.reminders
    }

    pub fn session(&self) -> &AlarmSession {
        &self.session
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn current_time(&self) -> TimeOfDay {
        self.current_time
    }

    /// Reads the clock and checks for due reminders. Returns true when the
    /// displayed state changed (new minute or new alarms).
    pub fn tick(&mut self) -> bool {
        let now = self.clock.now();
        let minute_changed = now != self.current_time;
        self.current_time = now;
        let started = self.check_reminders();
        minute_changed || !started.is_empty()
    }

    fn check_reminders(&mut self) -> Vec<String> {
        let due = detector::due_reminders(&self.current_time, &self.reminders);
        self.session.on_due_detected(&self.current_time, &due)
    }

    /// Replaces the list with the server's. On failure the old list stays.
    pub async fn load_reminders(&mut self) {
        match self.api.fetch_reminders().await {
            Ok(reminders) => {
                self.reminders = reminders;
                self.error = None;
                self.check_reminders();
            }
            Err(e) => {
                log::error!("[ALARM] {}: {}", LOAD_FAILED, e);
                self.error = Some(LOAD_FAILED.to_string());
            }
        }
    }

    /// Returns true once the server has stored the reminder.
    pub async fn add_reminder(&mut self, req: CreateReminderRequest) -> bool {
        match self.api.add_reminder(&req).await {
            Ok(created) => {
                log::info!("[ALARM] Added {} at {}", created.medicine_name, created.time);
                self.load_reminders().await;
                true
            }
            Err(e) => {
                log::error!("[ALARM] {}: {}", ADD_FAILED, e);
                self.error = Some(ADD_FAILED.to_string());
                false
            }
        }
    }

    /// Flips `taken`. Marking taken silences the reminder's alarm once the
    /// server confirms.
    pub async fn toggle_taken(&mut self, id: &str) {
        let Some(taken) = self.reminders.iter().find(|r| r.id == id).map(|r| r.taken) else {
            self.error = Some(UPDATE_FAILED.to_string());
            return;
        };

        match self.api.set_taken(id, !taken).await {
            Ok(_) => {
                if !taken {
                    self.session.on_mark_taken(id);
                }
                self.load_reminders().await;
            }
            Err(e) => {
                log::error!("[ALARM] {}: {}", UPDATE_FAILED, e);
                self.error = Some(UPDATE_FAILED.to_string());
            }
        }
    }

    pub async fn delete_reminder(&mut self, id: &str) {
        match self.api.delete_reminder(id).await {
            Ok(_) => {
                self.session.on_delete(id);
                self.load_reminders().await;
            }
            Err(e) => {
                log::error!("[ALARM] {}: {}", DELETE_FAILED, e);
                self.error = Some(DELETE_FAILED.to_string());
            }
        }
    }

    pub fn dismiss(&mut self, id: &str) {
        self.session.on_notification_dismissed(id);
    }

    pub fn stop_all(&mut self) {
        self.session.on_stop_all();
    }

    /// Expands a unique id prefix against the loaded list. Ringing ids match
    /// too, so a deleted-elsewhere reminder can still be dismissed.
    pub fn resolve_id(&self, prefix: &str) -> Result<String, String> {
        let mut matches: Vec<&str> = self
            .reminders
            .iter()
            .map(|r| r.id.as_str())
            .chain(self.session.ringing().iter().map(String::as_str))
            .filter(|id| id.starts_with(prefix))
            .collect();
        matches.sort_unstable();
        matches.dedup();

        match matches.as_slice() {
            [id] => Ok(id.to_string()),
            [] => Err(format!("No reminder matches '{}'", prefix)),
            _ => Err(format!("'{}' matches {} reminders; type more of the id", prefix, matches.len())),
        }
    }

    /// Applies one user command. Returns text to print, if any.
    pub async fn apply(&mut self, command: Command) -> Option<String> {
        match command {
            Command::List => self.load_reminders().await,
            Command::Add(req) => {
                self.add_reminder(req).await;
            }
            Command::ToggleTaken(prefix) => match self.resolve_id(&prefix) {
                Ok(id) => self.toggle_taken(&id).await,
                Err(e) => return Some(e),
            },
            Command::Delete(prefix) => match self.resolve_id(&prefix) {
                Ok(id) => self.delete_reminder(&id).await,
                Err(e) => return Some(e),
            },
            Command::Dismiss(prefix) => match self.resolve_id(&prefix) {
                Ok(id) => self.dismiss(&id),
                Err(e) => return Some(e),
            },
            Command::StopAll => self.stop_all(),
            Command::Help => return Some(HELP.to_string()),
            Command::Quit => {}
        }
        Some(self.render())
    }

    pub fn render(&self) -> String {
        let mut out = format!("\nMedicine Reminder    Current Time: {}\n", self.current_time);
        if let Some(error) = &self.error {
            out.push_str(&format!("Error: {}\n", error));
        }

        if self.reminders.is_empty() {
            out.push_str("No medicine reminders yet. Add your first medicine with `add`.\n");
        } else {
            out.push_str(&format!("Your Medicines ({})\n", self.reminders.len()));
            let mut sorted: Vec<&Reminder> = self.reminders.iter().collect();
            sorted.sort_by_key(|r| r.time);
            for r in sorted {
                let status = r.status_at(&self.current_time);
                let marker = if status == ReminderStatus::DueNow { "*" } else { " " };
                out.push_str(&format!(
                    "{} [{:<8}] {}  {}  ({})\n",
                    marker,
                    status.label(),
                    r.time,
                    r.medicine_name,
                    short_id(&r.id),
                ));
                if let Some(notes) = r.notes.as_deref().filter(|n| !n.is_empty()) {
                    out.push_str(&format!("      {}\n", notes));
                }
            }
        }

        if !self.session.is_empty() {
            out.push_str(&format!("Stop Alarms ({}): type `stop`\n", self.session.len()));
        }
        out
    }
}

/// Drives the app until `Quit` arrives or the command channel closes.
pub async fn run<A: ReminderApi, C: Clock>(
    mut app: ReminderApp<A, C>,
    mut commands: mpsc::Receiver<Command>,
    tick: Duration,
) {
    app.load_reminders().await;
    println!("{}", app.render());

    let mut interval = tokio::time::interval(tick);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if app.tick() {
                    println!("{}", app.render());
                }
            }
            command = commands.recv() => {
                let Some(command) = command else { break };
                if command == Command::Quit {
                    break;
                }
                if let Some(output) = app.apply(command).await {
                    println!("{}", output);
                }
            }
        }
    }

    app.stop_all();
    log::info!("[ALARM] Client stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifier::NotificationPermission;
    use crate::session::tests::{fake_session, Recorded};
    use async_trait::async_trait;
    use medicine_reminder_types::MessageBody;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// In-memory stand-in for the reminder service.
    #[derive(Default)]
    struct FakeApi {
        reminders: Mutex<Vec<Reminder>>,
        next_id: AtomicUsize,
        fail: AtomicBool,
    }

    impl FakeApi {
        fn check(&self) -> Result<(), String> {
            if self.fail.load(Ordering::SeqCst) {
                Err("connection refused".to_string())
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl ReminderApi for Arc<FakeApi> {
        async fn fetch_reminders(&self) -> Result<Vec<Reminder>, String> {
            self.check()?;
            Ok(self.reminders.lock().unwrap().clone())
        }

        async fn add_reminder(&self, req: &CreateReminderRequest) -> Result<Reminder, String> {
            self.check()?;
            let new = req.validate()?;
            let id = format!("id-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
            let reminder = Reminder {
                id,
                medicine_name: new.medicine_name,
                time: new.time,
                notes: new.notes,
                taken: false,
            };
            self.reminders.lock().unwrap().push(reminder.clone());
            Ok(reminder)
        }

        async fn set_taken(&self, id: &str, taken: bool) -> Result<Reminder, String> {
            self.check()?;
            let mut reminders = self.reminders.lock().unwrap();
            let reminder = reminders
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or("Reminder not found")?;
            reminder.taken = taken;
            Ok(reminder.clone())
        }

        async fn delete_reminder(&self, id: &str) -> Result<MessageBody, String> {
            self.check()?;
            let mut reminders = self.reminders.lock().unwrap();
            let before = reminders.len();
            reminders.retain(|r| r.id != id);
            if reminders.len() == before {
                return Err("Reminder not found".to_string());
            }
            Ok(MessageBody::new("Reminder deleted"))
        }
    }

    #[derive(Clone)]
    struct FakeClock(Arc<Mutex<TimeOfDay>>);

    impl FakeClock {
        fn at(s: &str) -> Self {
            Self(Arc::new(Mutex::new(s.parse().unwrap())))
        }

        fn set(&self, s: &str) {
            *self.0.lock().unwrap() = s.parse().unwrap();
        }
    }

    impl Clock for FakeClock {
        fn now(&self) -> TimeOfDay {
            *self.0.lock().unwrap()
        }
    }

    struct Harness {
        app: ReminderApp<Arc<FakeApi>, FakeClock>,
        api: Arc<FakeApi>,
        clock: FakeClock,
        recorded: Arc<Mutex<Recorded>>,
    }

    fn harness(time: &str) -> Harness {
        let api = Arc::new(FakeApi::default());
        let clock = FakeClock::at(time);
        let (session, recorded) = fake_session(NotificationPermission::Granted);
        let app = ReminderApp::new(api.clone(), clock.clone(), session);
        Harness {
            app,
            api,
            clock,
            recorded,
        }
    }

    fn assert_audio_follows_session(app: &ReminderApp<Arc<FakeApi>, FakeClock>) {
        assert_eq!(app.session().is_sound_playing(), !app.session().is_empty());
    }

    #[tokio::test]
    async fn test_aspirin_due_at_eight() {
        let mut h = harness("08:00");
        assert!(h.app.add_reminder(CreateReminderRequest::new("Aspirin", "08:00", None)).await);

        let id = h.app.reminders()[0].id.clone();
        assert!(h.app.session().is_ringing(&id));
        assert_audio_follows_session(&h.app);

        let rec = h.recorded.lock().unwrap();
        assert_eq!(rec.starts, 1);
        assert_eq!(rec.notifications.len(), 1);
        assert_eq!(rec.notifications[0].body, "Time to take Aspirin");
    }

    #[tokio::test]
    async fn test_mark_taken_silences_and_stays_silent() {
        let mut h = harness("08:00");
        h.app.add_reminder(CreateReminderRequest::new("Aspirin", "08:00", None)).await;
        let id = h.app.reminders()[0].id.clone();

        h.app.toggle_taken(&id).await;
        assert!(h.app.reminders()[0].taken);
        assert!(h.app.session().is_empty());
        assert_audio_follows_session(&h.app);

        for _ in 0..30 {
            h.app.tick();
        }
        assert!(h.app.session().is_empty());
        assert_eq!(h.recorded.lock().unwrap().starts, 1);
    }

    #[tokio::test]
    async fn test_two_due_then_stop_all() {
        let mut h = harness("08:59");
        h.app.add_reminder(CreateReminderRequest::new("Aspirin", "09:00", None)).await;
        h.app.add_reminder(CreateReminderRequest::new("Vitamin D", "09:00", None)).await;
        assert!(h.app.session().is_empty());

        h.clock.set("09:00");
        assert!(h.app.tick());
        assert_eq!(h.app.session().len(), 2);
        assert_eq!(h.recorded.lock().unwrap().starts, 1);
        assert_eq!(h.recorded.lock().unwrap().notifications.len(), 2);

        h.app.apply(Command::StopAll).await;
        assert!(h.app.session().is_empty());
        assert_audio_follows_session(&h.app);
    }

    #[tokio::test]
    async fn test_delete_ringing_reminder() {
        let mut h = harness("08:00");
        h.app.add_reminder(CreateReminderRequest::new("Aspirin", "08:00", None)).await;
        let id = h.app.reminders()[0].id.clone();
        assert!(h.app.session().is_ringing(&id));

        h.app.delete_reminder(&id).await;
        assert!(h.app.reminders().is_empty());
        assert!(h.api.reminders.lock().unwrap().is_empty());
        assert!(!h.app.session().is_ringing(&id));
        assert_audio_follows_session(&h.app);

        h.app.tick();
        assert_eq!(h.recorded.lock().unwrap().notifications.len(), 1);
    }

    #[tokio::test]
    async fn test_unchanged_ticks_are_idempotent() {
        let mut h = harness("08:00");
        h.app.add_reminder(CreateReminderRequest::new("Aspirin", "08:00", None)).await;

        for _ in 0..59 {
            assert!(!h.app.tick());
        }
        let rec = h.recorded.lock().unwrap();
        assert_eq!(rec.starts, 1);
        assert_eq!(rec.stops, 0);
    }

    #[tokio::test]
    async fn test_failed_update_keeps_alarm_and_shows_banner() {
        let mut h = harness("08:00");
        h.app.add_reminder(CreateReminderRequest::new("Aspirin", "08:00", None)).await;
        let id = h.app.reminders()[0].id.clone();

        h.api.fail.store(true, Ordering::SeqCst);
        h.app.toggle_taken(&id).await;
        assert_eq!(h.app.error(), Some(UPDATE_FAILED));
        assert!(h.app.session().is_ringing(&id));
        assert!(!h.app.reminders()[0].taken);

        h.app.delete_reminder(&id).await;
        assert_eq!(h.app.error(), Some(DELETE_FAILED));
        assert!(h.app.session().is_ringing(&id));
        assert_eq!(h.app.reminders().len(), 1);

        h.api.fail.store(false, Ordering::SeqCst);
        h.app.load_reminders().await;
        assert_eq!(h.app.error(), None);
    }

    #[tokio::test]
    async fn test_failed_add_and_load_leave_state_alone() {
        let mut h = harness("10:00");
        h.app.add_reminder(CreateReminderRequest::new("Aspirin", "08:00", None)).await;

        h.api.fail.store(true, Ordering::SeqCst);
        assert!(!h.app.add_reminder(CreateReminderRequest::new("Statin", "21:00", None)).await);
        assert_eq!(h.app.error(), Some(ADD_FAILED));

        h.app.load_reminders().await;
        assert_eq!(h.app.error(), Some(LOAD_FAILED));
        assert_eq!(h.app.reminders().len(), 1);
    }

    #[tokio::test]
    async fn test_undo_taken_does_not_ring_again_same_minute() {
        let mut h = harness("08:00");
        h.app.add_reminder(CreateReminderRequest::new("Aspirin", "08:00", None)).await;
        let id = h.app.reminders()[0].id.clone();

        h.app.toggle_taken(&id).await;
        h.app.toggle_taken(&id).await;
        assert!(!h.app.reminders()[0].taken);
        assert!(h.app.session().is_empty());
        assert_eq!(h.recorded.lock().unwrap().notifications.len(), 1);
    }

    #[tokio::test]
    async fn test_dismiss_via_command_prefix() {
        let mut h = harness("08:00");
        h.app.add_reminder(CreateReminderRequest::new("Aspirin", "08:00", None)).await;
        let id = h.app.reminders()[0].id.clone();

        let output = h.app.apply(Command::Dismiss("id-".to_string())).await.unwrap();
        assert!(output.contains("Aspirin"));
        assert!(!h.app.session().is_ringing(&id));
        assert!(!h.app.reminders()[0].taken);

        let output = h.app.apply(Command::Dismiss("zzz".to_string())).await.unwrap();
        assert_eq!(output, "No reminder matches 'zzz'");
    }

    #[tokio::test]
    async fn test_ambiguous_prefix() {
        let mut h = harness("07:00");
        h.app.add_reminder(CreateReminderRequest::new("Aspirin", "08:00", None)).await;
        h.app.add_reminder(CreateReminderRequest::new("Statin", "21:00", None)).await;
        assert!(h.app.resolve_id("id-").unwrap_err().contains("matches 2"));
        assert_eq!(h.app.resolve_id("id-1").unwrap(), "id-1");
    }

    #[tokio::test]
    async fn test_render_sorted_with_badges() {
        let mut h = harness("08:00");
        h.app.add_reminder(CreateReminderRequest::new("Statin", "21:00", None)).await;
        h.app.add_reminder(CreateReminderRequest::new("Aspirin", "08:00", Some("with food".to_string()))).await;

        let out = h.app.render();
        assert!(out.contains("Current Time: 08:00"));
        assert!(out.contains("Your Medicines (2)"));
        assert!(out.contains("Stop Alarms (1)"));
        let aspirin = out.find("Aspirin").unwrap();
        let statin = out.find("Statin").unwrap();
        assert!(aspirin < statin);
        assert!(out.contains("[Due Now!] 08:00  Aspirin"));
        assert!(out.contains("[Pending ] 21:00  Statin"));
        assert!(out.contains("with food"));
    }

    #[tokio::test]
    async fn test_render_empty() {
        let h = harness("08:00");
        assert!(h.app.render().contains("No medicine reminders yet"));
    }
}
