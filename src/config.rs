use std::{env, path::PathBuf, time::Duration};

use anyhow::{ensure, Context, Result};

const DB_PATH_VAR: &str = "PILLMINDER_DB";
const TICK_SECONDS_VAR: &str = "PILLMINDER_TICK_SECONDS";
const POLL_MILLIS_VAR: &str = "PILLMINDER_POLL_MILLIS";
const NOTIFY_COMMAND_VAR: &str = "PILLMINDER_NOTIFY_COMMAND";

const DEFAULT_DB_PATH: &str = "./pillminder.db";
const DEFAULT_TICK_SECONDS: u64 = 60;
const DEFAULT_POLL_MILLIS: u64 = 500;
const DEFAULT_NOTIFY_COMMAND: &str = "notify-send";

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Config {
    pub(crate) db_path: PathBuf,
    pub(crate) tick_interval: Duration,
    pub(crate) poll_interval: Duration,
    /// `None` means desktop notifications are off and only the console alert
    /// is used.
    pub(crate) notify_command: Option<String>,
}

impl Config {
    pub(crate) fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_path = lookup(DB_PATH_VAR).map_or_else(|| PathBuf::from(DEFAULT_DB_PATH), PathBuf::from);
        let tick_seconds = positive_number(&lookup, TICK_SECONDS_VAR, DEFAULT_TICK_SECONDS)?;
        let poll_millis = positive_number(&lookup, POLL_MILLIS_VAR, DEFAULT_POLL_MILLIS)?;
        let notify_command = match lookup(NOTIFY_COMMAND_VAR) {
            Some(command) if command.trim().is_empty() => None,
            Some(command) => Some(command.trim().to_owned()),
            None => Some(DEFAULT_NOTIFY_COMMAND.to_owned()),
        };

        Ok(Self {
            db_path,
            tick_interval: Duration::from_secs(tick_seconds),
            poll_interval: Duration::from_millis(poll_millis),
            notify_command,
        })
    }
}

fn positive_number<F>(lookup: &F, key: &str, default: u64) -> Result<u64>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    let value: u64 = raw
        .trim()
        .parse()
        .with_context(|| format!("{key} must be a whole number, got {raw:?}"))?;
    ensure!(value > 0, "{} must be greater than zero", key);
    Ok(value)
}
