use std::io::BufRead;

use anyhow::{Context, Result};
use crossbeam_channel::Sender;
use log::{debug, info};

use crate::{actor::message_source::MessageSource, command::Command};

use super::engine_actor::EngineActorMessage;

/// Reads commands from the console, one per line, and hands them to the
/// engine actor.
pub(crate) struct ConsoleInputActor {
    input: Box<dyn BufRead + Send>,
    tx: Sender<EngineActorMessage>,
}

impl ConsoleInputActor {
    pub(crate) fn new(input: Box<dyn BufRead + Send>, tx: Sender<EngineActorMessage>) -> Self {
        Self { input, tx }
    }
}

impl MessageSource for ConsoleInputActor {
    fn run(&mut self) -> Result<bool> {
        let mut line = String::new();
        let bytes_read = self
            .input
            .read_line(&mut line)
            .context("Console input actor failed to read a line")?;

        if bytes_read == 0 {
            info!("Console input closed");
            self.tx
                .send(EngineActorMessage::Command(Command::Quit))
                .context("Console input actor failed to send to tx")?;
            return Ok(true);
        }
        if line.trim().is_empty() {
            return Ok(false);
        }

        let msg = match line.parse::<Command>() {
            Ok(command) => {
                debug!("Sending: {:?}", command);
                EngineActorMessage::Command(command)
            }
            Err(err) => EngineActorMessage::Rejected(err.to_string()),
        };
        self.tx
            .send(msg)
            .context("Console input actor failed to send to tx")?;

        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use crate::{
        actor::{engine_actor::EngineActorMessage, message_source::MessageSource},
        command::Command,
    };

    use super::ConsoleInputActor;

    #[test]
    fn forwards_commands_then_quits_at_eof() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let input = Cursor::new(b"list\n\nsnooze 2\n".to_vec());
        let mut actor = ConsoleInputActor::new(Box::new(input), tx);

        assert!(!actor.run().unwrap());
        assert!(!actor.run().unwrap());
        assert!(!actor.run().unwrap());
        assert!(actor.run().unwrap());

        let received: Vec<EngineActorMessage> = rx.try_iter().collect();
        assert_eq!(received.len(), 3);
        assert!(matches!(
            received[0],
            EngineActorMessage::Command(Command::List)
        ));
        assert!(matches!(received[1], EngineActorMessage::Rejected(_)));
        assert!(matches!(
            received[2],
            EngineActorMessage::Command(Command::Quit)
        ));
    }
}
