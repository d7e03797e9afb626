//! The CLI for `jst`.

use crate::{config::JstConfig, subcommands::Subcommands, vcs::JjCli};
use anyhow::{anyhow, Result};
use clap::{
    builder::styling::{AnsiColor, Color, Style},
    ArgAction, Parser,
};
use tracing::Level;

const ABOUT: &str = "jst turns a stack of jj changes into a chain of GitHub pull requests.";

/// The CLI application for `jst`.
#[derive(Parser, Debug, Clone, Eq, PartialEq)]
#[command(about = ABOUT, version, styles = cli_styles())]
pub struct Cli {
    /// Verbosity level (0-4)
    #[arg(short, action = ArgAction::Count, global = true)]
    pub v: u8,
    /// Revset delimiting the bottom of the stack
    #[arg(long, global = true)]
    pub baseline: Option<String>,
    /// Revset of the top of the stack
    #[arg(long, global = true)]
    pub head: Option<String>,
    /// Git remote to push branches to
    #[arg(long, global = true)]
    pub remote: Option<String>,
    /// Branch the bottom pull request of the stack is based on
    #[arg(long, global = true)]
    pub base_branch: Option<String>,
    /// The subcommand to run. Defaults to `list`.
    #[clap(subcommand)]
    pub subcommand: Option<Subcommands>,
}

impl Cli {
    /// Run the CLI application with the given arguments.
    pub async fn run(self) -> Result<()> {
        let config = self.config()?;
        let vcs = JjCli::discover(config.remote.clone())?;

        let subcommand = self
            .subcommand
            .unwrap_or_else(|| Subcommands::List(Default::default()));
        subcommand.run(&vcs, &config).await
    }

    /// Loads the configuration file and applies the command line overrides on top of it.
    fn config(&self) -> Result<JstConfig> {
        let mut config = JstConfig::load()?;
        if let Some(baseline) = &self.baseline {
            config.baseline = baseline.clone();
        }
        if let Some(head) = &self.head {
            config.head = head.clone();
        }
        if let Some(remote) = &self.remote {
            config.remote = remote.clone();
        }
        if let Some(base_branch) = &self.base_branch {
            config.base_branch = Some(base_branch.clone());
        }
        Ok(config)
    }

    /// Initializes the tracing subscriber
    ///
    /// # Returns
    /// - `Result<()>` - Ok if successful, Err otherwise.
    pub(crate) fn init_tracing_subscriber(self) -> Result<Self> {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_max_level(match self.v {
                0 => Level::ERROR,
                1 => Level::WARN,
                2 => Level::INFO,
                3 => Level::DEBUG,
                _ => Level::TRACE,
            })
            .finish();

        tracing::subscriber::set_global_default(subscriber).map_err(|e| anyhow!(e))?;

        Ok(self)
    }
}

/// Styles for the CLI application.
const fn cli_styles() -> clap::builder::Styles {
    clap::builder::Styles::styled()
        .usage(
            Style::new()
                .bold()
                .underline()
                .fg_color(Some(Color::Ansi(AnsiColor::Yellow))),
        )
        .header(
            Style::new()
                .bold()
                .underline()
                .fg_color(Some(Color::Ansi(AnsiColor::Yellow))),
        )
        .literal(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))))
        .invalid(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Red))),
        )
        .error(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Red))),
        )
        .valid(
            Style::new()
                .bold()
                .underline()
                .fg_color(Some(Color::Ansi(AnsiColor::Green))),
        )
        .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::White))))
}
