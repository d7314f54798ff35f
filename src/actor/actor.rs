use anyhow::Result;

/// Something that owns its state on a dedicated thread and is only ever
/// reached through messages, one at a time.
pub(crate) trait Actor<T> {
    fn startup(&mut self) -> Result<()>;

    /// Returns `true` once the actor is finished and its thread should end.
    fn handle_message(&mut self, msg: T) -> Result<bool>;
}
