//! `push` subcommand.

use crate::{ctx::JstContext, errors::JstResult, forge::Forge, report::Report, vcs::Vcs};
use clap::Args;
use nu_ansi_term::Color;

/// CLI arguments for the `push` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct PushCmd;

impl PushCmd {
    /// Run the `push` subcommand.
    pub async fn run<V: Vcs, F: Forge>(self, ctx: &JstContext<'_, V, F>) -> JstResult<()> {
        let report = Self::execute(ctx).await?;
        report.print_push_summary();
        report.finish()
    }

    /// Pushes the current stack and reconciles its pull requests.
    ///
    /// ## Returns
    /// - `Ok(Report)` - What was done, including per-item failures.
    /// - `Err(_)` - If the stack could not be read, or is not fit to be pushed.
    pub(crate) async fn execute<V: Vcs, F: Forge>(ctx: &JstContext<'_, V, F>) -> JstResult<Report> {
        let mut report = Report::default();

        let stack = ctx.read_stack()?;
        if stack.is_empty() {
            println!(
                "No changes between `{}` and `{}`. Nothing to push.",
                Color::Blue.paint(&ctx.baseline),
                Color::Blue.paint(&ctx.head)
            );
            return Ok(report);
        }
        ctx.ensure_described(&stack)?;

        ctx.submit(&stack, &mut report).await?;
        Ok(report)
    }
}
