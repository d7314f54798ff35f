use chrono::{Local, NaiveDateTime};

/// Source of local wall-clock time.
pub(crate) trait Clock: Send {
    fn now(&self) -> NaiveDateTime;
}

pub(crate) struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

#[cfg(test)]
pub(crate) mod testhelper {
    use std::sync::{Arc, Mutex};

    use chrono::{Duration, NaiveDateTime};

    use super::Clock;

    /// A clock that only moves when told to. Clones share the same time.
    #[derive(Clone)]
    pub(crate) struct VirtualClock {
        now: Arc<Mutex<NaiveDateTime>>,
    }

    impl VirtualClock {
        pub(crate) fn new(start: NaiveDateTime) -> Self {
            Self {
                now: Arc::new(Mutex::new(start)),
            }
        }

        pub(crate) fn set(&self, now: NaiveDateTime) {
            *self.now.lock().unwrap() = now;
        }

        pub(crate) fn advance(&self, by: Duration) {
            let mut now = self.now.lock().unwrap();
            *now += by;
        }
    }

    impl Clock for VirtualClock {
        fn now(&self) -> NaiveDateTime {
            *self.now.lock().unwrap()
        }
    }
}
