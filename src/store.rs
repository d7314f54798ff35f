use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};
use rusqlite::OptionalExtension;

use crate::{
    db::{Db, Migration},
    reminder::Reminder,
    theme::Theme,
};

pub(crate) const MIGRATIONS: &[Migration] = &[Migration {
    id: "001",
    sql: "CREATE TABLE settings (
              key          TEXT PRIMARY KEY
            , value        TEXT NOT NULL
            , updated_on   DEFAULT CURRENT_TIMESTAMP
        )",
}];

const REMINDERS_KEY: &str = "medicine-reminders";
const THEME_KEY: &str = "medicine-reminder-theme";

/// Whole-collection persistence for reminders plus the theme preference,
/// kept as values in a key-value table.
pub(crate) struct ReminderStore {
    db: Db,
}

impl ReminderStore {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let mut db = Db::open(path)?;
        db.upgrade(MIGRATIONS)
            .context("Failed to run migrations")?;
        Ok(Self { db })
    }

    /// Unreadable stored data is logged and treated as an empty collection.
    pub(crate) fn load_reminders(&self) -> Result<Vec<Reminder>> {
        let Some(encoded) = self.get(REMINDERS_KEY)? else {
            info!("No stored reminders");
            return Ok(Vec::new());
        };

        match serde_json::from_str::<Vec<Reminder>>(&encoded) {
            Ok(reminders) => Ok(reminders),
            Err(err) => {
                warn!("Stored reminders are unreadable, starting empty: {}", err);
                Ok(Vec::new())
            }
        }
    }

    pub(crate) fn save_reminders(&self, reminders: &[Reminder]) -> Result<()> {
        let encoded = serde_json::to_string(reminders).context("Failed to encode reminders")?;
        self.put(REMINDERS_KEY, &encoded)
            .context("Failed to save reminders")
    }

    pub(crate) fn load_theme(&self) -> Result<Theme> {
        let theme = match self.get(THEME_KEY)? {
            Some(encoded) => encoded.parse::<Theme>().unwrap_or_else(|err| {
                warn!("{}, using the default theme", err);
                Theme::default()
            }),
            None => Theme::default(),
        };
        Ok(theme)
    }

    pub(crate) fn save_theme(&self, theme: Theme) -> Result<()> {
        self.put(THEME_KEY, theme.as_str())
            .context("Failed to save theme")
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        self.db
            .conn()
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                [key],
                |row| row.get::<usize, String>(0),
            )
            .optional()
            .with_context(|| format!("Failed to read setting {key}"))
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.db.conn().execute(
            "
                INSERT INTO settings (key, value)
                VALUES (?1, ?2)
                ON CONFLICT (key) DO UPDATE
                SET value = excluded.value
                  , updated_on = CURRENT_TIMESTAMP
            ",
            [key, value],
        )?;
        Ok(())
    }
}
