use anyhow::Result;
use chrono::NaiveDateTime;
use crossbeam_channel::Sender;
use log::{debug, error, info, warn};

use crate::{
    clock::Clock,
    command::Command,
    engine::{ReminderEngine, StatusFilter},
    error::EngineError,
    notify::{deliver, ensure_permission, Notifier},
    reminder::ReminderId,
    store::ReminderStore,
    theme::Theme,
    view::ReminderView,
};

use super::actor::Actor;

#[derive(Debug)]
pub(crate) enum EngineActorMessage {
    Tick,
    Command(Command),
    /// A console line that could not be parsed, with the reason.
    Rejected(String),
}

/// Single owner of the reminder collection. Every mutation, tick and render
/// happens on this actor's thread, one message at a time.
pub(crate) struct EngineActor<TNotifier, TView>
where
    TNotifier: Notifier,
    TView: ReminderView,
{
    engine: ReminderEngine,
    store: ReminderStore,
    notifier: TNotifier,
    view: TView,
    clock: Box<dyn Clock>,
    filter: StatusFilter,
    theme: Theme,
    // Ids in the order they were last shown, so console positions resolve
    // against what the user actually saw.
    shown: Vec<ReminderId>,
    // Dropped with the actor, which tells the tick driver to stop.
    _shutdown: Sender<()>,
}

impl<TNotifier, TView> EngineActor<TNotifier, TView>
where
    TNotifier: Notifier,
    TView: ReminderView,
{
    pub(crate) fn new(
        engine: ReminderEngine,
        store: ReminderStore,
        theme: Theme,
        notifier: TNotifier,
        view: TView,
        clock: Box<dyn Clock>,
        shutdown: Sender<()>,
    ) -> Self {
        Self {
            engine,
            store,
            notifier,
            view,
            clock,
            filter: StatusFilter::All,
            theme,
            shown: Vec::new(),
            _shutdown: shutdown,
        }
    }

    fn tick(&mut self) {
        let now = self.clock.now();
        for reminder in self.engine.due_notifications(now) {
            deliver(&mut self.notifier, &mut self.view, &reminder);
        }

        let changed = self.engine.tick(now);
        if changed.is_empty() {
            return;
        }
        debug!("Tick at {} changed {} reminder(s)", now, changed.len());
        self.save();
        self.render();
    }

    fn handle_command(&mut self, command: Command) -> bool {
        let now = self.clock.now();
        let outcome = match command {
            Command::Add(draft) => self
                .engine
                .create(&draft, now)
                .map(|_| Some("Reminder added successfully!".to_owned())),
            Command::Edit(position, draft) => self.resolve(position).and_then(|id| {
                self.engine
                    .update(id, &draft, now)
                    .map(|_| Some("Reminder updated successfully!".to_owned()))
            }),
            Command::Delete(position) => self.resolve(position).and_then(|id| {
                self.engine
                    .delete(id)
                    .map(|_| Some("Reminder deleted successfully!".to_owned()))
            }),
            Command::Take(position) => self.resolve(position).and_then(|id| self.take(id, now)),
            Command::Filter(filter) => {
                self.filter = filter;
                self.render();
                return false;
            }
            Command::List => {
                self.render();
                return false;
            }
            Command::Theme => {
                self.theme = self.theme.toggled();
                if let Err(err) = self.store.save_theme(self.theme) {
                    error!("Failed to save theme: {:?}", err);
                }
                self.view.on_theme_changed(self.theme);
                return false;
            }
            Command::Resume => {
                info!("Resumed, catching up");
                self.tick();
                return false;
            }
            Command::Quit => {
                info!("Quit requested");
                return true;
            }
        };

        match outcome {
            Ok(Some(message)) => {
                self.save();
                self.render();
                self.view.show_success(&message);
            }
            Ok(None) => {}
            Err(err) => {
                warn!("Command failed: {}", err);
                self.view.show_error(&err.to_string());
            }
        }
        false
    }

    fn take(
        &mut self,
        id: ReminderId,
        now: NaiveDateTime,
    ) -> Result<Option<String>, EngineError> {
        if self.engine.mark_taken(id, now)? {
            let name = self
                .engine
                .get(id)
                .map(|r| r.medicine_name.clone())
                .unwrap_or_default();
            return Ok(Some(format!("{name} marked as taken!")));
        }
        if let Some(reminder) = self.engine.get(id) {
            self.view.show_error(&format!(
                "{} is already {}",
                reminder.medicine_name, reminder.status
            ));
        }
        Ok(None)
    }

    fn resolve(&self, position: usize) -> Result<ReminderId, EngineError> {
        position
            .checked_sub(1)
            .and_then(|idx| self.shown.get(idx))
            .copied()
            .ok_or_else(|| {
                EngineError::validation(
                    "position",
                    format!("{position} is not in the list shown, try list"),
                )
            })
    }

    fn save(&self) {
        if let Err(err) = self.store.save_reminders(self.engine.reminders()) {
            error!("Failed to save reminders: {:?}", err);
        }
    }

    fn render(&mut self) {
        let reminders = self.engine.filter_by_status(self.filter);
        self.shown = reminders.iter().map(|r| r.id).collect();
        self.view.on_reminder_list_changed(self.filter, &reminders);
        self.view.on_counts_changed(self.engine.counts());
    }
}

impl<TNotifier, TView> Actor<EngineActorMessage> for EngineActor<TNotifier, TView>
where
    TNotifier: Notifier,
    TView: ReminderView,
{
    fn startup(&mut self) -> Result<()> {
        ensure_permission(&mut self.notifier);
        self.view.on_theme_changed(self.theme);
        self.render();
        self.tick();
        Ok(())
    }

    fn handle_message(&mut self, msg: EngineActorMessage) -> Result<bool> {
        match msg {
            EngineActorMessage::Tick => {
                self.tick();
                Ok(false)
            }
            EngineActorMessage::Command(command) => Ok(self.handle_command(command)),
            EngineActorMessage::Rejected(reason) => {
                warn!("Rejected console input: {}", reason);
                self.view.show_error(&reason);
                Ok(false)
            }
        }
    }
}
