use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use rusqlite::{Connection, OptionalExtension};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("migration ID {0} in database doesn't appear in migration history")]
pub(crate) struct UnknownMigrationError(pub(crate) String);

pub(crate) struct Migration<'a> {
    pub(crate) id: &'a str,
    pub(crate) sql: &'a str,
}

pub(crate) struct Db {
    conn: Connection,
}

impl Db {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open sqlite database {}", path.display()))?;
        Ok(Self { conn })
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Applies every migration after the last one recorded in the database,
    /// all inside one transaction.
    pub(crate) fn upgrade(&mut self, migrations: &[Migration]) -> Result<()> {
        let tx = self
            .conn
            .transaction()
            .context("Failed to start migration transaction")?;

        let current = current_migration(&tx)?;
        let pending = match current {
            Some(current_migration_id) => {
                info!("Current DB migration: {}", current_migration_id);
                let idx = migrations
                    .iter()
                    .position(|m| m.id == current_migration_id)
                    .ok_or(UnknownMigrationError(current_migration_id))?;
                &migrations[idx + 1..]
            }
            None => {
                info!("Current DB migration: None");
                migrations
            }
        };

        for migration in pending {
            info!("Running migration {}", migration.id);
            tx.execute_batch(migration.sql)?;
            tx.execute(
                "INSERT INTO migrations (migration_id) VALUES (?1)",
                [migration.id],
            )?;
        }

        tx.commit().context("Failed to commit migrations")?;
        Ok(())
    }
}

fn current_migration(conn: &Connection) -> Result<Option<String>> {
    conn.execute(
        "
            CREATE TABLE IF NOT EXISTS migrations (
                id             INTEGER PRIMARY KEY
                , migration_id TEXT NOT NULL
                , created_on   DEFAULT CURRENT_TIMESTAMP
            )
        ",
        (),
    )?;

    let current = conn
        .query_row(
            "
                SELECT migration_id
                FROM migrations
                ORDER BY id DESC
                LIMIT 1
            ",
            (),
            |row| row.get::<usize, String>(0),
        )
        .optional()?;

    Ok(current)
}
