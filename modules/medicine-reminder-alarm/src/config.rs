use crate::notifier::NotificationPermission;
use std::env;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Config {
    pub api_url: String,
    pub tick: Duration,
    pub beep_period: Duration,
    pub notifications: NotificationPermission,
}

impl Config {
    pub fn from_env() -> Self {
        let notifications = match env::var("MEDICINE_REMINDER_NOTIFICATIONS") {
            Ok(value) => value.parse().unwrap_or_else(|e| {
                log::warn!("{}; asking at startup instead", e);
                NotificationPermission::Default
            }),
            Err(_) => NotificationPermission::Default,
        };

        Self {
            api_url: env::var("MEDICINE_REMINDER_API_URL")
                .unwrap_or_else(|_| "http://localhost:5000/api".to_string()),
            tick: Duration::from_millis(millis_var("MEDICINE_REMINDER_TICK_MS", 1000)),
            beep_period: Duration::from_millis(millis_var("MEDICINE_REMINDER_BEEP_MS", 1500)),
            notifications,
        }
    }
}

fn millis_var(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|ms| *ms > 0)
        .unwrap_or(default)
}
