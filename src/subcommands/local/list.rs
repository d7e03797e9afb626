//! `list` subcommand.

use crate::{config::JstConfig, errors::JstResult, stack::Stack, vcs::Vcs};
use clap::Args;
use nu_ansi_term::Color;
use std::fmt::Write;

/// CLI arguments for the `list` subcommand.
#[derive(Default, Debug, Clone, Eq, PartialEq, Args)]
pub struct ListCmd;

impl ListCmd {
    /// Run the `list` subcommand. Needs neither credentials nor the network.
    pub fn run<V: Vcs>(self, vcs: &V, config: &JstConfig) -> JstResult<()> {
        let mut buf = String::new();
        Self::render(vcs, config, &mut buf)?;
        print!("{buf}");
        Ok(())
    }

    fn render<V: Vcs>(vcs: &V, config: &JstConfig, buf: &mut String) -> JstResult<()> {
        let stack = Stack::read(vcs, &config.baseline, &config.head)?;
        if stack.is_empty() {
            writeln!(
                buf,
                "No changes between `{}` and `{}`.",
                Color::Blue.paint(&config.baseline),
                Color::Blue.paint(&config.head)
            )?;
            return Ok(());
        }
        stack.write_stack(buf, &config.baseline)?;
        Ok(())
    }
}
