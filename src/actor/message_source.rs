use anyhow::Result;

/// Produces messages for actors. `run` is called in a loop on the source's
/// own thread until it returns `true`.
pub(crate) trait MessageSource {
    fn run(&mut self) -> Result<bool>;
}
