//! Parsing of the terminal commands typed by the user.

use medicine_reminder_types::{CreateReminderRequest, TimeOfDay};

pub const HELP: &str = "\
Commands:
  list                         show reminders
  add <HH:MM> <name> [| notes] add a reminder, e.g. `add 08:00 Aspirin | 2 tablets with food`
  taken <id>                   mark taken (or undo when already taken)
  delete <id>                  delete a reminder
  dismiss <id>                 silence one alarm without marking it taken
  stop                         stop all alarms
  help                         show this help
  quit                         exit
Ids may be shortened to any unique prefix.";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    List,
    Add(CreateReminderRequest),
    ToggleTaken(String),
    Delete(String),
    Dismiss(String),
    StopAll,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word.to_ascii_lowercase().as_str() {
            "list" | "ls" | "" => Ok(Command::List),
            "add" => parse_add(rest),
            "taken" | "undo" => required_id(rest, "taken").map(Command::ToggleTaken),
            "delete" | "rm" => required_id(rest, "delete").map(Command::Delete),
            "dismiss" => required_id(rest, "dismiss").map(Command::Dismiss),
            "stop" => Ok(Command::StopAll),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(format!("Unknown command '{}'. Type `help` for commands.", other)),
        }
    }
}

fn required_id(rest: &str, command: &str) -> Result<String, String> {
    match rest.split_whitespace().next() {
        Some(id) => Ok(id.to_string()),
        None => Err(format!("Usage: {} <id>", command)),
    }
}

fn parse_add(rest: &str) -> Result<Command, String> {
    let usage = "Usage: add <HH:MM> <name> [| notes]";
    let (time, rest) = rest.split_once(char::is_whitespace).ok_or(usage)?;
    time.parse::<TimeOfDay>()?;

    let (name, notes) = match rest.split_once('|') {
        Some((name, notes)) => (name.trim(), Some(notes.trim().to_string())),
        None => (rest.trim(), None),
    };
    if name.is_empty() {
        return Err(usage.to_string());
    }

    Ok(Command::Add(CreateReminderRequest::new(name, time, notes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add() {
        let cmd = Command::parse("add 08:00 Aspirin | 2 tablets with food").unwrap();
        assert_eq!(
            cmd,
            Command::Add(CreateReminderRequest::new(
                "Aspirin",
                "08:00",
                Some("2 tablets with food".to_string())
            ))
        );

        let cmd = Command::parse("add 21:30 Vitamin D").unwrap();
        assert_eq!(cmd, Command::Add(CreateReminderRequest::new("Vitamin D", "21:30", None)));
    }

    #[test]
    fn test_parse_add_errors() {
        assert!(Command::parse("add").unwrap_err().starts_with("Usage"));
        assert!(Command::parse("add 08:00").unwrap_err().starts_with("Usage"));
        assert!(Command::parse("add 8am Aspirin").unwrap_err().contains("HH:MM"));
        assert!(Command::parse("add 08:00 | notes only").unwrap_err().starts_with("Usage"));
    }

    #[test]
    fn test_parse_id_commands() {
        assert_eq!(Command::parse("taken 1a2b").unwrap(), Command::ToggleTaken("1a2b".to_string()));
        assert_eq!(Command::parse("undo 1a2b").unwrap(), Command::ToggleTaken("1a2b".to_string()));
        assert_eq!(Command::parse("delete 1a2b").unwrap(), Command::Delete("1a2b".to_string()));
        assert_eq!(Command::parse("dismiss 1a2b").unwrap(), Command::Dismiss("1a2b".to_string()));
        assert_eq!(Command::parse("taken").unwrap_err(), "Usage: taken <id>");
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(Command::parse("").unwrap(), Command::List);
        assert_eq!(Command::parse("  STOP ").unwrap(), Command::StopAll);
        assert_eq!(Command::parse("quit").unwrap(), Command::Quit);
        assert_eq!(Command::parse("help").unwrap(), Command::Help);
        assert!(Command::parse("snooze").is_err());
    }
}
