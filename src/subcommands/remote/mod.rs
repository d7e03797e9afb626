//! Subcommands that reconcile the stack with the remote.

mod push;
pub use push::PushCmd;

mod sync;
pub use sync::SyncCmd;

mod status;
pub use status::StatusCmd;

mod cleanup;
pub use cleanup::CleanupCmd;
