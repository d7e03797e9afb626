//! `cleanup` subcommand.

use crate::{
    ctx::JstContext,
    errors::JstResult,
    forge::{Forge, PrFilter, PrState},
    mapping, naming,
    report::Report,
    vcs::{BranchRef, Vcs},
};
use clap::Args;
use nu_ansi_term::Color;
use tracing::{debug, info};

/// CLI arguments for the `cleanup` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct CleanupCmd {
    /// Print the branches that would be deleted without deleting them.
    #[arg(long)]
    pub dry_run: bool,
}

impl CleanupCmd {
    /// Run the `cleanup` subcommand.
    pub async fn run<V: Vcs, F: Forge>(self, ctx: &JstContext<'_, V, F>) -> JstResult<()> {
        let report = self.execute(ctx).await?;
        report.print_cleanup_summary();
        if self.dry_run {
            println!("{}", Color::DarkGray.paint("Dry run; nothing was deleted."));
        }
        report.finish()
    }

    /// Deletes every local branch of the acting user whose pull request was merged or closed.
    ///
    /// A branch is only deleted when every pull request for its change is terminal. Branches with
    /// no pull request at all are left alone. Deletions reach the remote in a single push at the
    /// end.
    pub(crate) async fn execute<V: Vcs, F: Forge>(
        &self,
        ctx: &JstContext<'_, V, F>,
    ) -> JstResult<Report> {
        let mut report = Report::default();

        let branches = ctx
            .owned_branches()?
            .into_iter()
            .filter(BranchRef::is_local)
            .collect::<Vec<_>>();
        if branches.is_empty() {
            println!("No branches to clean up.");
            return Ok(report);
        }

        let pulls = mapping::owned_by(
            ctx.forge.list_pull_requests(PrFilter::All).await?,
            &ctx.actor,
        );

        for branch in &branches {
            let Some(suffix) = naming::suffix_of(&branch.name) else {
                continue;
            };
            let matching = pulls
                .iter()
                .filter(|pr| naming::suffix_of(&pr.head_branch) == Some(suffix))
                .collect::<Vec<_>>();

            let Some(latest) = matching.iter().map(|pr| pr.number).max() else {
                debug!(branch = %branch.name, "no pull request, leaving branch alone");
                continue;
            };
            if matching.iter().any(|pr| pr.state == PrState::Open) {
                report.branches_kept += 1;
                debug!(branch = %branch.name, "pull request still open");
                continue;
            }

            // The listing may be stale; confirm against the latest state of the newest one.
            let pull = match ctx.forge.get_pull_request(latest).await {
                Ok(pull) => pull,
                Err(err) => {
                    report.failure(format_args!("Pull request #{latest}"), &err);
                    continue;
                }
            };
            if !pull.state.is_terminal() {
                report.branches_kept += 1;
                continue;
            }

            if self.dry_run {
                report.branches_deleted += 1;
                println!(
                    "Would delete `{}` (#{} {})",
                    Color::Green.paint(&branch.name),
                    pull.number,
                    pull.state
                );
                continue;
            }
            match ctx.vcs.delete_branch(&branch.name) {
                Ok(()) => {
                    report.branches_deleted += 1;
                    info!(branch = %branch.name, number = pull.number, "deleted branch");
                    println!(
                        "Deleted `{}` (#{} {})",
                        Color::Green.paint(&branch.name),
                        pull.number,
                        pull.state
                    );
                }
                Err(err) => report.failure(format_args!("Branch `{}`", branch.name), &err),
            }
        }

        if !self.dry_run && report.branches_deleted > 0 {
            if let Err(err) = ctx.vcs.push_deletions() {
                report.failure("Pushing deleted branches", &err);
            }
        }
        Ok(report)
    }
}
