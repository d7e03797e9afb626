//! Subcommands that only read the local workspace.

mod list;
pub use list::ListCmd;
