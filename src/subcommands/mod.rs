//! The subcommands for the `jst` application.

use crate::{
    config::JstConfig,
    ctx::JstContext,
    errors::JstResult,
    forge::GitHub,
    git,
    vcs::JjCli,
};
use anyhow::Result;
use clap::Subcommand;
use tracing::debug;

mod local;
use local::ListCmd;

mod remote;
use remote::{CleanupCmd, PushCmd, StatusCmd, SyncCmd};

#[derive(Debug, Clone, Eq, PartialEq, Subcommand)]
pub enum Subcommands {
    /// Push every change of the stack to its own branch and open or update a pull request for each.
    #[clap(alias = "p")]
    Push(PushCmd),
    /// Fetch the remote, rebase the stack onto the baseline, then push.
    Sync(SyncCmd),
    /// Print every change of the stack with its branch and pull request.
    #[clap(alias = "st")]
    Status(StatusCmd),
    /// Print the stack. Works offline.
    #[clap(aliases = ["ls", "l"])]
    List(ListCmd),
    /// Delete branches whose pull requests were merged or closed.
    #[clap(alias = "clean")]
    Cleanup(CleanupCmd),
}

impl Subcommands {
    /// Run the subcommand in the given workspace.
    pub async fn run(self, vcs: &JjCli, config: &JstConfig) -> Result<()> {
        match self {
            Self::List(args) => args.run(vcs, config)?,
            Self::Push(args) => args.run(&connect(vcs, config).await?).await?,
            Self::Sync(args) => args.run(&connect(vcs, config).await?).await?,
            Self::Status(args) => args.run(&connect(vcs, config).await?).await?,
            Self::Cleanup(args) => args.run(&connect(vcs, config).await?).await?,
        }
        Ok(())
    }
}

/// Connects to the GitHub repository behind the workspace's remote and establishes the context.
async fn connect<'a>(
    vcs: &'a JjCli,
    config: &JstConfig,
) -> JstResult<JstContext<'a, JjCli, GitHub>> {
    let repository = git::backing_repository(vcs.root())?;
    let (owner, repo) = git::owner_and_repository(&repository, vcs.remote())?;
    debug!(%owner, %repo, "resolved GitHub repository");

    let forge = GitHub::new(config.token()?.to_string(), owner, repo)?;
    JstContext::establish(vcs, forge, config, chrono::Local::now().date_naive()).await
}
