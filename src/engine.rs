use std::{collections::HashSet, str::FromStr};

use chrono::{Duration, NaiveDateTime};
use log::{debug, info};

use crate::{
    error::EngineError,
    reminder::{Frequency, Reminder, ReminderDraft, ReminderId, Status},
    schedule::compute_next_due,
};

/// How long after `next_due` an untaken dose is still considered on time.
const GRACE_PERIOD_MINUTES: i64 = 15;

/// How far ahead of `next_due` a notification may fire.
const NOTIFY_WINDOW_SECONDS: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StatusFilter {
    All,
    Only(Status),
}

impl StatusFilter {
    fn matches(self, status: Status) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => wanted == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "all" => Ok(StatusFilter::All),
            "upcoming" => Ok(StatusFilter::Only(Status::Upcoming)),
            "taken" => Ok(StatusFilter::Only(Status::Taken)),
            "missed" => Ok(StatusFilter::Only(Status::Missed)),
            other => Err(EngineError::validation(
                "filter",
                format!("expected all, upcoming, taken or missed, got {other:?}"),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct StatusCounts {
    pub(crate) all: usize,
    pub(crate) upcoming: usize,
    pub(crate) taken: usize,
    pub(crate) missed: usize,
}

/// True while `now` sits in the minute leading up to (and including) the
/// reminder's due instant.
pub(crate) fn should_notify(reminder: &Reminder, now: NaiveDateTime) -> bool {
    reminder.status == Status::Upcoming
        && reminder.next_due.is_some_and(|next_due| {
            let remaining = next_due - now;
            remaining > Duration::zero() && remaining <= Duration::seconds(NOTIFY_WINDOW_SECONDS)
        })
}

/// Owns the reminder collection and every time-driven transition on it.
pub(crate) struct ReminderEngine {
    reminders: Vec<Reminder>,
    // (reminder, due instant) pairs a notification has already gone out for
    notified: HashSet<(ReminderId, NaiveDateTime)>,
}

impl ReminderEngine {
    pub(crate) fn new(reminders: Vec<Reminder>) -> Self {
        Self {
            reminders,
            notified: HashSet::new(),
        }
    }

    pub(crate) fn reminders(&self) -> &[Reminder] {
        &self.reminders
    }

    pub(crate) fn get(&self, id: ReminderId) -> Option<&Reminder> {
        self.reminders.iter().find(|r| r.id == id)
    }

    fn get_mut(&mut self, id: ReminderId) -> Result<&mut Reminder, EngineError> {
        self.reminders
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(EngineError::NotFound(id))
    }

    pub(crate) fn create(
        &mut self,
        draft: &ReminderDraft,
        now: NaiveDateTime,
    ) -> Result<ReminderId, EngineError> {
        let reminder = Reminder::new(draft.validate()?, now);
        let id = reminder.id;
        info!(
            "Created reminder {} for {} ({:?})",
            id, reminder.medicine_name, reminder.frequency
        );
        self.reminders.push(reminder);
        Ok(id)
    }

    pub(crate) fn update(
        &mut self,
        id: ReminderId,
        draft: &ReminderDraft,
        now: NaiveDateTime,
    ) -> Result<&Reminder, EngineError> {
        let fields = draft.validate()?;
        let reminder = self.get_mut(id)?;
        reminder.apply(fields, now);
        info!("Updated reminder {}", id);
        Ok(reminder)
    }

    pub(crate) fn delete(&mut self, id: ReminderId) -> Result<Reminder, EngineError> {
        let idx = self
            .reminders
            .iter()
            .position(|r| r.id == id)
            .ok_or(EngineError::NotFound(id))?;
        self.notified.retain(|(notified_id, _)| *notified_id != id);
        info!("Deleted reminder {}", id);
        Ok(self.reminders.remove(idx))
    }

    /// Returns whether anything changed: a one-off reminder that is already
    /// taken or missed stays as it is.
    pub(crate) fn mark_taken(
        &mut self,
        id: ReminderId,
        now: NaiveDateTime,
    ) -> Result<bool, EngineError> {
        let reminder = self.get_mut(id)?;
        let changed = reminder.mark_taken(now);
        if changed {
            info!("Reminder {} taken, next due {:?}", id, reminder.next_due);
        } else {
            debug!("Reminder {} is already {}", id, reminder.status);
        }
        Ok(changed)
    }

    /// Advances every reminder whose grace window has run out and returns the
    /// ids of those that changed.
    pub(crate) fn tick(&mut self, now: NaiveDateTime) -> Vec<ReminderId> {
        let grace = Duration::minutes(GRACE_PERIOD_MINUTES);
        let mut changed = Vec::new();

        for reminder in &mut self.reminders {
            if reminder.status != Status::Upcoming {
                continue;
            }
            let Some(next_due) = reminder.next_due else {
                continue;
            };
            // No end to the grace window past the last representable instant
            let Some(grace_end) = next_due.checked_add_signed(grace) else {
                continue;
            };
            if now <= grace_end {
                continue;
            }

            match reminder.frequency {
                Frequency::Once => {
                    info!("Reminder {} missed (was due {})", reminder.id, next_due);
                    reminder.status = Status::Missed;
                }
                Frequency::Daily => {
                    reminder.next_due = compute_next_due(reminder.time, Frequency::Daily, now);
                    info!(
                        "Reminder {} skipped the dose due {}, next due {:?}",
                        reminder.id, next_due, reminder.next_due
                    );
                }
            }
            changed.push(reminder.id);
        }

        let reminders = &self.reminders;
        self.notified.retain(|(id, due)| {
            reminders
                .iter()
                .any(|r| r.id == *id && r.next_due == Some(*due))
        });

        changed
    }

    /// Reminders a notification should go out for right now. Each due
    /// occurrence is only ever returned once, however often this is called
    /// inside its window.
    pub(crate) fn due_notifications(&mut self, now: NaiveDateTime) -> Vec<Reminder> {
        let mut due = Vec::new();
        for reminder in &self.reminders {
            if !should_notify(reminder, now) {
                continue;
            }
            let Some(next_due) = reminder.next_due else {
                continue;
            };
            if self.notified.insert((reminder.id, next_due)) {
                due.push(reminder.clone());
            } else {
                debug!(
                    "Already notified {} for {}, not notifying again",
                    reminder.id, next_due
                );
            }
        }
        due
    }

    pub(crate) fn filter_by_status(&self, filter: StatusFilter) -> Vec<&Reminder> {
        self.reminders
            .iter()
            .filter(|r| filter.matches(r.status))
            .collect()
    }

    pub(crate) fn counts(&self) -> StatusCounts {
        self.reminders
            .iter()
            .fold(StatusCounts::default(), |mut counts, reminder| {
                counts.all += 1;
                match reminder.status {
                    Status::Upcoming => counts.upcoming += 1,
                    Status::Taken => counts.taken += 1,
                    Status::Missed => counts.missed += 1,
                }
                counts
            })
    }
}
