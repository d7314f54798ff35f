use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, Sender};
use log::{debug, info, warn};

use crate::actor::{actor::Actor, message_source::MessageSource};

/// Sends `actor_id` to the supervisor when it goes out of scope, whether the
/// thread finished cleanly, failed or panicked.
pub(super) struct Runner {
    completed: Sender<u32>,
    actor_id: u32,
}

impl Runner {
    pub(super) fn new(completed: Sender<u32>, actor_id: u32) -> Self {
        Self {
            completed,
            actor_id,
        }
    }

    pub(super) fn run_actor<T, U>(&self, receiver: &Receiver<T>, mut actor: U) -> Result<()>
    where
        U: Actor<T>,
    {
        debug!("Running Actor: {}", self.actor_id);
        actor.startup().context("Error in actor startup")?;
        while let Ok(msg) = receiver.recv() {
            let should_terminate = actor
                .handle_message(msg)
                .context("Error handling actor message")?;

            if should_terminate {
                return Ok(());
            }
        }

        Ok(())
    }

    pub(super) fn run_message_source<T>(&self, mut message_source: T) -> Result<()>
    where
        T: MessageSource,
    {
        debug!("Running MsgSource: {}", self.actor_id);
        loop {
            let should_terminate = message_source
                .run()
                .context("Error on MessageSource `run`")?;

            if should_terminate {
                return Ok(());
            }
        }
    }
}

impl Drop for Runner {
    fn drop(&mut self) {
        info!("Drop Actor: {}", self.actor_id);
        if self.completed.send(self.actor_id).is_err() {
            warn!("Supervisor gone before actor {} completed", self.actor_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::{bail, Result};

    use crate::actor::{actor::Actor, message_source::MessageSource};

    use super::Runner;

    struct CountDown(u32);

    impl Actor<u32> for CountDown {
        fn startup(&mut self) -> Result<()> {
            Ok(())
        }

        fn handle_message(&mut self, msg: u32) -> Result<bool> {
            if msg > self.0 {
                bail!("{} is more than {}", msg, self.0);
            }
            self.0 -= msg;
            Ok(self.0 == 0)
        }
    }

    impl MessageSource for CountDown {
        fn run(&mut self) -> Result<bool> {
            self.0 -= 1;
            Ok(self.0 == 0)
        }
    }

    #[test]
    fn actor_stops_when_asked_and_reports_on_drop() {
        let (tx_completed, rx_completed) = crossbeam_channel::unbounded();
        let (tx, rx) = crossbeam_channel::unbounded();
        tx.send(1).unwrap();
        tx.send(2).unwrap();
        tx.send(5).unwrap();

        let runner = Runner::new(tx_completed, 7);
        runner.run_actor(&rx, CountDown(3)).unwrap();
        assert!(rx_completed.try_recv().is_err());
        drop(runner);

        assert_eq!(rx_completed.try_recv(), Ok(7));
        // The message after the stop was never handled
        assert_eq!(rx.try_recv(), Ok(5));
    }

    #[test]
    fn actor_error_is_returned() {
        let (tx_completed, _rx_completed) = crossbeam_channel::unbounded();
        let (tx, rx) = crossbeam_channel::unbounded();
        tx.send(4).unwrap();

        let runner = Runner::new(tx_completed, 0);
        assert!(runner.run_actor(&rx, CountDown(3)).is_err());
    }

    #[test]
    fn message_source_runs_until_done() {
        let (tx_completed, _rx_completed) = crossbeam_channel::unbounded();
        let runner = Runner::new(tx_completed, 0);
        runner.run_message_source(CountDown(3)).unwrap();
    }
}
