//! `sync` subcommand.

use super::PushCmd;
use crate::{
    ctx::JstContext,
    errors::{JstError, JstResult},
    forge::Forge,
    vcs::{RebaseOutcome, Vcs},
};
use clap::Args;
use nu_ansi_term::Color;
use tracing::info;

/// CLI arguments for the `sync` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct SyncCmd;

impl SyncCmd {
    /// Run the `sync` subcommand.
    pub async fn run<V: Vcs, F: Forge>(self, ctx: &JstContext<'_, V, F>) -> JstResult<()> {
        // Refuse before rewriting anything.
        ctx.ensure_described(&ctx.read_stack()?)?;
        Self::rebase(ctx)?;
        let report = PushCmd::execute(ctx).await?;
        report.print_push_summary();
        report.finish()
    }

    /// Fetches the remote and rebases the stack onto the refreshed baseline.
    ///
    /// ## Returns
    /// - `Ok(())` - The stack was rebased cleanly.
    /// - `Err(JstError::RebaseConflict)` - If any change is conflicted after the rebase. Nothing on
    ///   the remote has been touched.
    fn rebase<V: Vcs, F: Forge>(ctx: &JstContext<'_, V, F>) -> JstResult<()> {
        ctx.vcs.fetch_remote()?;
        match ctx.vcs.rebase(&ctx.baseline, &ctx.head)? {
            RebaseOutcome::Clean => {
                info!(baseline = %ctx.baseline, "rebased stack");
                println!(
                    "Rebased stack onto `{}`",
                    Color::Blue.paint(&ctx.baseline)
                );
                Ok(())
            }
            RebaseOutcome::Conflicted(changes) => Err(JstError::RebaseConflict(
                changes.iter().map(ToString::to_string).collect(),
            )),
        }
    }
}
