//! `status` subcommand.

use crate::{
    constants::{COLORS, DIAMOND, EMPTY_CIRCLE, FILLED_CIRCLE, VERTICAL_BOX},
    ctx::JstContext,
    errors::JstResult,
    forge::{Forge, PrFilter, PrState, PullRequest},
    mapping::{self, Mapping},
    naming,
    stack::{Change, Stack},
    vcs::{BranchRef, Vcs},
};
use clap::Args;
use itertools::Itertools;
use nu_ansi_term::Color;
use std::fmt::{self, Write};

/// CLI arguments for the `status` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct StatusCmd;

impl StatusCmd {
    /// Run the `status` subcommand.
    pub async fn run<V: Vcs, F: Forge>(self, ctx: &JstContext<'_, V, F>) -> JstResult<()> {
        let mut buf = String::new();
        Self::render(ctx, &mut buf).await?;
        print!("{buf}");
        Ok(())
    }

    /// Renders the status of every change in the stack into `buf`.
    async fn render<V: Vcs, F: Forge>(ctx: &JstContext<'_, V, F>, buf: &mut String) -> JstResult<()> {
        let stack = ctx.read_stack()?;
        if stack.is_empty() {
            writeln!(
                buf,
                "No changes between `{}` and `{}`.",
                Color::Blue.paint(&ctx.baseline),
                Color::Blue.paint(&ctx.head)
            )?;
            return Ok(());
        }

        // One listing serves both the open mapping and the terminal fallback.
        let pulls = mapping::owned_by(
            ctx.forge.list_pull_requests(PrFilter::All).await?,
            &ctx.actor,
        );
        let open = pulls
            .iter()
            .filter(|pr| pr.state == PrState::Open)
            .cloned()
            .collect::<Vec<_>>();
        let mapping = mapping::resolve(&stack, &open)?;
        let branches = ctx.owned_branches()?;

        write_status(buf, &stack, &mapping, &pulls, &branches, &ctx.base_branch)?;
        Ok(())
    }
}

/// Writes one entry per change, newest first, followed by the base branch.
///
/// ## Takes
/// - `w` - The writer to write the status to.
/// - `stack` - The current stack.
/// - `mapping` - Changes mapped to their open pull requests.
/// - `pulls` - Every pull request of the acting user, in any state.
/// - `branches` - The acting user's branches.
/// - `base_branch` - Branch the bottom of the stack merges into.
fn write_status<W: Write>(
    w: &mut W,
    stack: &Stack,
    mapping: &Mapping,
    pulls: &[PullRequest],
    branches: &[BranchRef],
    base_branch: &str,
) -> fmt::Result {
    let n = stack.len();
    for (i, change) in stack.iter().enumerate().rev() {
        let icon = (i + 1 == n).then_some(FILLED_CIRCLE).unwrap_or(EMPTY_CIRCLE);
        writeln!(
            w,
            "{} {} {}",
            COLORS[i % COLORS.len()].paint(format!("{icon} {}/{n}", i + 1)),
            Color::Purple.paint(change.change_id.short()),
            change.title()
        )?;

        let branch = branches
            .iter()
            .filter(|b| naming::matches_change(&b.name, &change.change_id))
            .map(|b| b.name.as_str())
            .join(", ");
        if branch.is_empty() {
            writeln!(w, "{VERTICAL_BOX}   branch: {}", Color::DarkGray.paint("none"))?;
        } else {
            writeln!(w, "{VERTICAL_BOX}   branch: {}", Color::Green.paint(branch))?;
        }

        match pull_for(change, mapping, pulls) {
            Some(pr) => writeln!(
                w,
                "{VERTICAL_BOX}   pull request: #{} ({}) {}",
                pr.number,
                pr.state,
                Color::Blue.paint(&pr.url)
            )?,
            None => writeln!(
                w,
                "{VERTICAL_BOX}   pull request: {}",
                Color::DarkGray.paint("none")
            )?,
        }
    }
    writeln!(w, "{} {}", DIAMOND, Color::Blue.paint(base_branch))
}

/// The open pull request of a change or, failing that, its most recent merged or closed one.
fn pull_for<'a>(
    change: &Change,
    mapping: &'a Mapping,
    pulls: &'a [PullRequest],
) -> Option<&'a PullRequest> {
    mapping.get(&change.change_id).or_else(|| {
        pulls
            .iter()
            .filter(|pr| pr.state.is_terminal())
            .filter(|pr| naming::matches_change(&pr.head_branch, &change.change_id))
            .max_by_key(|pr| pr.number)
    })
}

#[cfg(test)]
mod test {
    use super::StatusCmd;
    use crate::{
        config::JstConfig,
        ctx::JstContext,
        forge::{PrState, PullRequest},
        testing::{linear_changes, pull, FakeForge, FakeVcs},
    };
    use chrono::NaiveDate;

    const A: &str = "aaa111111111qqqq";
    const B: &str = "bbb222222222rrrr";
    const BRANCH_A: &str = "user/2026-02-18/a-aaa111111111";
    const BRANCH_B: &str = "user/2026-02-18/b-bbb222222222";

    fn closed(number: u64, head: &str, state: PrState) -> PullRequest {
        PullRequest {
            state,
            ..pull(number, head, "trunk")
        }
    }

    async fn render(vcs: &FakeVcs, forge: FakeForge) -> String {
        let ctx = JstContext::establish(
            vcs,
            forge,
            &JstConfig::default(),
            NaiveDate::from_ymd_opt(2026, 2, 18).unwrap(),
        )
        .await
        .unwrap();
        let mut buf = String::new();
        StatusCmd::render(&ctx, &mut buf).await.unwrap();
        buf
    }

    #[tokio::test]
    async fn shows_branches_and_open_pull_requests() {
        let vcs = FakeVcs::new(linear_changes(&[(A, "First"), (B, "Second")]))
            .with_branch(BRANCH_A, Some("commit-a"), Some("commit-a"));
        let forge = FakeForge::new("user").with_pull(pull(3, BRANCH_A, "trunk"));

        let out = render(&vcs, forge).await;

        assert!(out.contains("First"));
        assert!(out.contains(BRANCH_A));
        assert!(!out.contains(BRANCH_B));
        assert!(out.contains("#3"));
        assert!(out.contains("https://github.com/octo/repo/pull/3"));
        // Newest change first.
        assert!(out.find("Second").unwrap() < out.find("First").unwrap());
        assert_eq!(out.matches("none").count(), 2);
    }

    #[tokio::test]
    async fn falls_back_to_the_latest_terminal_pull_request() {
        let vcs = FakeVcs::new(linear_changes(&[(A, "First")]));
        let forge = FakeForge::new("user")
            .with_pull(closed(4, BRANCH_A, PrState::Closed))
            .with_pull(closed(9, "user/2026-02-10/first-aaa111111111", PrState::Merged));

        let out = render(&vcs, forge).await;

        assert!(out.contains("#9"));
        assert!(out.contains("merged"));
        assert!(!out.contains("#4"));
    }

    #[tokio::test]
    async fn open_pull_request_wins_over_terminal_ones() {
        let vcs = FakeVcs::new(linear_changes(&[(A, "First")]));
        let forge = FakeForge::new("user")
            .with_pull(pull(2, BRANCH_A, "trunk"))
            .with_pull(closed(8, BRANCH_A, PrState::Merged));

        let out = render(&vcs, forge).await;

        assert!(out.contains("#2"));
        assert!(!out.contains("#8"));
    }

    #[tokio::test]
    async fn makes_no_mutating_calls() {
        let vcs = FakeVcs::new(linear_changes(&[(A, "First")]));
        let ctx = JstContext::establish(
            &vcs,
            FakeForge::new("user"),
            &JstConfig::default(),
            NaiveDate::from_ymd_opt(2026, 2, 18).unwrap(),
        )
        .await
        .unwrap();

        StatusCmd.run(&ctx).await.unwrap();

        assert!(vcs.calls.borrow().is_empty());
        assert!(ctx.forge.calls.borrow().is_empty());
    }
}
