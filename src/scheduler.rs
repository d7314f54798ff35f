use std::time::Duration;

use log::debug;

pub(crate) type Job = Box<dyn FnMut() + Send>;

/// Runs jobs on a fixed interval. Nothing runs until `run_pending` is called,
/// so whoever owns the scheduler decides which thread the jobs run on.
pub(crate) trait Scheduler {
    fn every(&mut self, interval: Duration, job: Job);
    fn run_pending(&mut self);
}

/// Wall-clock scheduler backed by clokwerk.
pub(crate) struct ClokwerkScheduler {
    clokwerk: clokwerk::Scheduler,
}

impl ClokwerkScheduler {
    pub(crate) fn new() -> Self {
        Self {
            clokwerk: clokwerk::Scheduler::new(),
        }
    }
}

impl Scheduler for ClokwerkScheduler {
    fn every(&mut self, interval: Duration, mut job: Job) {
        // clokwerk counts in whole seconds
        let seconds = u32::try_from(interval.as_secs().max(1)).unwrap_or(u32::MAX);
        debug!("Scheduling job every {}s", seconds);
        self.clokwerk
            .every(clokwerk::Interval::Seconds(seconds))
            .run(move || job());
    }

    fn run_pending(&mut self) {
        self.clokwerk.run_pending();
    }
}
