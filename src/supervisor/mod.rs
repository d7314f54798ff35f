mod actor_handle;
mod message_source_handle;
mod runner;
#[allow(clippy::module_inception)]
pub(crate) mod supervisor;
