use std::str::FromStr;

use thiserror::Error;

use crate::{engine::StatusFilter, reminder::ReminderDraft};

const ADD_USAGE: &str = "add <name> | <dosage> | <HH:MM> | <once|daily>";
const EDIT_USAGE: &str = "edit <n> | <name> | <dosage> | <HH:MM> | <once|daily>";
const FILTER_USAGE: &str = "filter <all|upcoming|taken|missed>";

/// One line typed at the console. Positions are 1-based indexes into the
/// list currently on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    Add(ReminderDraft),
    Edit(usize, ReminderDraft),
    Delete(usize),
    Take(usize),
    Filter(StatusFilter),
    List,
    Theme,
    Resume,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum CommandError {
    #[error("unknown command {0:?}, try add, edit, delete, take, filter, list, theme, resume or quit")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("{0:?} is not a list position")]
    Position(String),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        match verb {
            "add" => {
                let fields: Vec<&str> = rest.split('|').map(str::trim).collect();
                match fields.as_slice() {
                    [name, dosage, time, frequency] => {
                        Ok(Command::Add(draft(name, dosage, time, frequency)))
                    }
                    _ => Err(CommandError::Usage(ADD_USAGE)),
                }
            }
            "edit" => {
                let fields: Vec<&str> = rest.split('|').map(str::trim).collect();
                match fields.as_slice() {
                    [position, name, dosage, time, frequency] => Ok(Command::Edit(
                        parse_position(position)?,
                        draft(name, dosage, time, frequency),
                    )),
                    _ => Err(CommandError::Usage(EDIT_USAGE)),
                }
            }
            "delete" => Ok(Command::Delete(parse_position(rest)?)),
            "take" => Ok(Command::Take(parse_position(rest)?)),
            "filter" => rest
                .parse()
                .map(Command::Filter)
                .map_err(|_| CommandError::Usage(FILTER_USAGE)),
            "list" => Ok(Command::List),
            "theme" => Ok(Command::Theme),
            "resume" => Ok(Command::Resume),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_owned())),
        }
    }
}

fn draft(name: &str, dosage: &str, time: &str, frequency: &str) -> ReminderDraft {
    ReminderDraft {
        medicine_name: name.to_owned(),
        dosage: dosage.to_owned(),
        time: time.to_owned(),
        frequency: frequency.to_owned(),
    }
}

fn parse_position(s: &str) -> Result<usize, CommandError> {
    match s.trim().parse::<usize>() {
        Ok(position) if position > 0 => Ok(position),
        _ => Err(CommandError::Position(s.trim().to_owned())),
    }
}
