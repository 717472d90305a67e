//! Terminal client for the reminder service.
//!
//! Checks the clock every second, rings the terminal bell and prints a
//! notification when a medicine is due. Commands are read from stdin.

use medicine_reminder_alarm::app::{self, ReminderApp};
use medicine_reminder_alarm::client::HttpReminderApi;
use medicine_reminder_alarm::clock::SystemClock;
use medicine_reminder_alarm::command::{Command, HELP};
use medicine_reminder_alarm::config::Config;
use medicine_reminder_alarm::notifier::{NotificationPermission, TerminalNotifier};
use medicine_reminder_alarm::session::AlarmSession;
use medicine_reminder_alarm::sound::TerminalBell;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    log::info!("Using reminder service at {}", config.api_url);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let permission = match config.notifications {
        NotificationPermission::Default => request_permission(&mut lines).await,
        decided => decided,
    };
    log::info!("Notification permission: {:?}", permission);

    let session = AlarmSession::new(
        Box::new(TerminalBell::new(config.beep_period)),
        Box::new(TerminalNotifier::new(permission)),
    );
    let app = ReminderApp::new(HttpReminderApi::new(&config.api_url), SystemClock, session);

    let (tx, rx) = mpsc::channel::<Command>(16);
    tokio::spawn(async move {
        while let Ok(Some(line)) = lines.next_line().await {
            match Command::parse(&line) {
                Ok(command) => {
                    let quit = command == Command::Quit;
                    if tx.send(command).await.is_err() || quit {
                        break;
                    }
                }
                Err(e) => println!("{}", e),
            }
        }
    });

    println!("{}", HELP);
    app::run(app, rx, config.tick).await;
}

/// Asks once at startup. Anything but an explicit yes counts as denied.
async fn request_permission<R>(lines: &mut tokio::io::Lines<R>) -> NotificationPermission
where
    R: tokio::io::AsyncBufRead + Unpin,
{
    println!("Allow medicine reminder notifications? [y/N]");
    match lines.next_line().await {
        Ok(Some(answer)) if matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes") => {
            NotificationPermission::Granted
        }
        _ => NotificationPermission::Denied,
    }
}
