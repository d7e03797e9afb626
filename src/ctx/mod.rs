//! The per-invocation context of the `jst` application.

use crate::{
    config::JstConfig,
    errors::JstResult,
    forge::Forge,
    naming,
    stack::Stack,
    vcs::{BranchRef, Vcs},
};
use chrono::NaiveDate;
use tracing::debug;

mod actions;

/// Values read once per invocation and threaded through every phase of a command, along with the
/// backends they were read from.
pub struct JstContext<'a, V, F> {
    /// The version-control backend.
    pub vcs: &'a V,
    /// The code-hosting backend.
    pub forge: F,
    /// Login of the acting user. Prefix of every branch `jst` manages.
    pub actor: String,
    /// Revset delimiting the bottom of the stack.
    pub baseline: String,
    /// Revset of the top of the stack.
    pub head: String,
    /// Branch the bottom pull request of the stack is based on.
    pub base_branch: String,
    /// Date stamped into the names of branches created during this invocation.
    pub today: NaiveDate,
}

impl<'a, V: Vcs, F: Forge> JstContext<'a, V, F> {
    /// Establishes the context, asking the forge for the acting user and, unless configured, the
    /// base branch.
    pub async fn establish(
        vcs: &'a V,
        forge: F,
        config: &JstConfig,
        today: NaiveDate,
    ) -> JstResult<Self> {
        let actor = forge.current_user().await?;
        let base_branch = match &config.base_branch {
            Some(branch) => branch.clone(),
            None => forge.default_branch().await?,
        };
        debug!(%actor, %base_branch, baseline = %config.baseline, "established context");

        Ok(Self {
            vcs,
            forge,
            actor,
            baseline: config.baseline.clone(),
            head: config.head.clone(),
            base_branch,
            today,
        })
    }

    /// Reads the current stack.
    pub fn read_stack(&self) -> JstResult<Stack> {
        Stack::read(self.vcs, &self.baseline, &self.head)
    }

    /// Returns every branch in the acting user's namespace.
    pub fn owned_branches(&self) -> JstResult<Vec<BranchRef>> {
        Ok(self
            .vcs
            .branches()?
            .into_iter()
            .filter(|b| naming::is_owned_by(&b.name, &self.actor))
            .collect())
    }
}
