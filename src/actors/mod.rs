mod generation;
mod messages;
mod sync_actor;

pub use generation::Generation;
pub use messages::Command;
pub use sync_actor::SyncActor;
