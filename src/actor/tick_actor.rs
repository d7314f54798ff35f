use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};
use log::info;

use crate::{actor::message_source::MessageSource, scheduler::Scheduler};

/// Drives a [`Scheduler`] from its own thread, checking for due jobs every
/// `poll` until the shutdown channel fires or is dropped.
pub(crate) struct TickActor<S> {
    scheduler: S,
    poll: Duration,
    shutdown: Receiver<()>,
}

impl<S> TickActor<S>
where
    S: Scheduler,
{
    pub(crate) fn new(scheduler: S, poll: Duration, shutdown: Receiver<()>) -> Self {
        Self {
            scheduler,
            poll,
            shutdown,
        }
    }
}

impl<S> MessageSource for TickActor<S>
where
    S: Scheduler,
{
    fn run(&mut self) -> anyhow::Result<bool> {
        match self.shutdown.recv_timeout(self.poll) {
            Err(RecvTimeoutError::Timeout) => {
                self.scheduler.run_pending();
                Ok(false)
            }
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                info!("Tick driver shutting down");
                Ok(true)
            }
        }
    }
}
