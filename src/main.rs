#![deny(clippy::all)]
#![deny(clippy::pedantic)]

mod actor;
mod clock;
mod command;
mod config;
mod db;
mod engine;
mod error;
mod notify;
mod reminder;
mod schedule;
mod scheduler;
mod store;
mod supervisor;
mod theme;
mod view;

use std::io::{self, BufReader};

use anyhow::{Context, Result};
use log::{debug, info};

use crate::{
    actor::{
        console_input_actor::ConsoleInputActor,
        engine_actor::{EngineActor, EngineActorMessage},
        tick_actor::TickActor,
    },
    clock::LocalClock,
    config::Config,
    engine::ReminderEngine,
    notify::CommandNotifier,
    scheduler::{ClokwerkScheduler, Scheduler},
    store::ReminderStore,
    supervisor::supervisor::Supervisor,
    view::ConsoleView,
};

fn main() {
    env_logger::init();
    info!("Initialising");
    let (config, store) = initialise().expect("Initialisation error");
    info!("Running actors");
    run_actors(&config, store).expect("Abnormal shutdown");
}

fn initialise() -> Result<(Config, ReminderStore)> {
    let config = Config::from_env().context("Invalid configuration")?;
    info!("Loaded config {:?}", config);

    let store = ReminderStore::open(&config.db_path)
        .with_context(|| format!("Failed to open {}", config.db_path.display()))?;

    Ok((config, store))
}

fn run_actors(config: &Config, store: ReminderStore) -> Result<()> {
    let reminders = store
        .load_reminders()
        .context("Failed to load reminders")?;
    info!("Loaded {} reminder(s)", reminders.len());
    let theme = store.load_theme().context("Failed to load theme")?;

    let mut supervisor = Supervisor::new();
    let (tx_shutdown, rx_shutdown) = crossbeam_channel::bounded(1);

    let tx_engine = supervisor
        .start(
            EngineActor::new(
                ReminderEngine::new(reminders),
                store,
                theme,
                CommandNotifier::new(config.notify_command.clone()),
                ConsoleView::new(io::stdout()),
                Box::new(LocalClock),
                tx_shutdown,
            ),
            "EngineActor".to_owned(),
        )
        .context("Failed to start Engine Actor")?;

    let mut scheduler = ClokwerkScheduler::new();
    let tx_tick = tx_engine.clone();
    scheduler.every(
        config.tick_interval,
        Box::new(move || {
            if tx_tick.send(EngineActorMessage::Tick).is_err() {
                debug!("Engine actor gone, dropping tick");
            }
        }),
    );
    supervisor
        .start_message_source(
            TickActor::new(scheduler, config.poll_interval, rx_shutdown),
            "Tick Actor".to_owned(),
        )
        .context("Failed to start Tick Actor")?;

    supervisor
        .start_message_source(
            ConsoleInputActor::new(Box::new(BufReader::new(io::stdin())), tx_engine),
            "Console Input Actor".to_owned(),
        )
        .context("Failed to start Console Input Actor")?;

    supervisor.supervise();

    Ok(())
}
