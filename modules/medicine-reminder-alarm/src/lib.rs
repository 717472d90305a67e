//! Medicine reminder client: polls the clock, detects due reminders and
//! rings an alarm until the user reacts.

pub mod app;
pub mod client;
pub mod clock;
pub mod command;
pub mod config;
pub mod detector;
pub mod notifier;
pub mod session;
pub mod sound;
