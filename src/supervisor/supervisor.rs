use std::{collections::HashMap, thread::JoinHandle};

use anyhow::Result;
use crossbeam_channel::{Receiver, Sender};
use log::{debug, error, info, warn};

use crate::actor::{actor::Actor, message_source::MessageSource};

use super::{
    actor_handle::ActorHandle, message_source_handle::MessageSourceHandle, runner::Runner,
};

struct Entry {
    name: String,
    join_handle: JoinHandle<Result<()>>,
    // The process has no reason to keep running once this one is gone
    essential: bool,
}

/// Owns every actor thread. Actors are essential: `supervise` returns once
/// any of them stops. Message sources may finish on their own without
/// bringing the rest down, unless they fail.
pub(crate) struct Supervisor {
    next_actor_id: u32,
    entries: HashMap<u32, Entry>,
    tx_completed: Sender<u32>,
    rx_completed: Receiver<u32>,
}

impl Supervisor {
    pub(crate) fn new() -> Self {
        let (tx_completed, rx_completed) = crossbeam_channel::unbounded();
        Self {
            next_actor_id: 0,
            entries: HashMap::new(),
            tx_completed,
            rx_completed,
        }
    }

    pub(crate) fn start<T, U>(&mut self, actor: T, name: String) -> Result<Sender<U>>
    where
        T: Actor<U> + Send + 'static,
        U: Send + 'static,
    {
        let actor_id = self.get_next_actor_id();
        let runner = Runner::new(self.tx_completed.clone(), actor_id);
        let handle = ActorHandle::new(actor, name.clone(), runner)?;
        self.entries.insert(
            actor_id,
            Entry {
                name,
                join_handle: handle.join_handle,
                essential: true,
            },
        );

        Ok(handle.sender)
    }

    pub(crate) fn start_message_source<T>(&mut self, message_source: T, name: String) -> Result<()>
    where
        T: MessageSource + Send + 'static,
    {
        let actor_id = self.get_next_actor_id();
        let runner = Runner::new(self.tx_completed.clone(), actor_id);
        let handle = MessageSourceHandle::new(message_source, name.clone(), runner)?;
        self.entries.insert(
            actor_id,
            Entry {
                name,
                join_handle: handle.join_handle,
                essential: false,
            },
        );

        Ok(())
    }

    pub(crate) fn supervise(&mut self) {
        while let Ok(actor_id) = self.rx_completed.recv() {
            if self.handle_completed_actor(actor_id) {
                return;
            }
        }
    }

    fn handle_completed_actor(&mut self, actor_id: u32) -> bool {
        debug!("Actor ID completed {:?}", actor_id);
        let Some(entry) = self.entries.remove(&actor_id) else {
            warn!(
                "Got actor completed notification for already completed actor {:?}",
                actor_id
            );
            return false;
        };

        match entry.join_handle.join() {
            Ok(Ok(())) => {
                info!("Actor clean shutdown: {}", entry.name);
                entry.essential
            }
            Ok(Err(err)) => {
                error!("Error in actor {}: {:?}", entry.name, err);
                true
            }
            Err(err) => {
                error!("Error joining actor {}: {:?}", entry.name, err);
                true
            }
        }
    }

    fn get_next_actor_id(&mut self) -> u32 {
        let actor_id = self.next_actor_id;
        self.next_actor_id += 1;
        actor_id
    }
}
