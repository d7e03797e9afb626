//! The version-control backend consumed by the reconciler.

use crate::{errors::JstResult, stack::{Change, ChangeId}};

mod jj;
pub use jj::JjCli;

/// Operations `jst` needs from the version-control system.
///
/// Every call is a blocking round trip; implementations hold no state between calls.
pub trait Vcs {
    /// Resolves a revset to the single change it names.
    ///
    /// ## Returns
    /// - `Ok(ChangeId)` - The change the revset points at.
    /// - `Err(JstError::RefResolution)` - If the revset is undefined.
    fn resolve(&self, revset: &str) -> JstResult<ChangeId>;

    /// Lists the changes in `from..to`, ancestors first.
    fn list_changes(&self, from: &str, to: &str) -> JstResult<Vec<Change>>;

    /// Lists every bookmark known locally or on the configured remote.
    fn branches(&self) -> JstResult<Vec<BranchRef>>;

    /// Creates a new branch pointing at `at`.
    fn create_branch(&self, name: &str, at: &ChangeId) -> JstResult<()>;

    /// Points an existing branch at `at`, even if that moves it sideways or backwards.
    fn move_branch(&self, name: &str, at: &ChangeId) -> JstResult<()>;

    /// Pushes a branch to the remote, creating it there if needed.
    fn push_branch(&self, name: &str) -> JstResult<()>;

    /// Deletes a local branch. The deletion reaches the remote on [Vcs::push_deletions].
    fn delete_branch(&self, name: &str) -> JstResult<()>;

    /// Pushes every pending branch deletion to the remote.
    fn push_deletions(&self) -> JstResult<()>;

    /// Fetches the remote.
    fn fetch_remote(&self) -> JstResult<()>;

    /// Rebases the stack ending at `head` onto `onto`.
    fn rebase(&self, onto: &str, head: &str) -> JstResult<RebaseOutcome>;
}

/// A bookmark, as seen locally and on the configured remote.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct BranchRef {
    /// The branch name.
    pub name: String,
    /// Commit id the local bookmark points at, if it exists locally.
    pub local_target: Option<String>,
    /// Commit id the remote bookmark points at, if it was pushed.
    pub remote_target: Option<String>,
}

impl BranchRef {
    /// Returns `true` if the branch exists locally.
    pub fn is_local(&self) -> bool {
        self.local_target.is_some()
    }

    /// Returns `true` if the branch exists locally and the remote points at the same commit.
    pub fn is_pushed(&self) -> bool {
        self.local_target.is_some() && self.local_target == self.remote_target
    }
}

/// Outcome of [Vcs::rebase].
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum RebaseOutcome {
    /// Every change was rebased without conflicts.
    Clean,
    /// The listed changes are conflicted after the rebase.
    Conflicted(Vec<ChangeId>),
}
