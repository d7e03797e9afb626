//! Error types for the `jst` application.

use itertools::Itertools;
use nu_ansi_term::Color;
use thiserror::Error;

/// Errors that can occur while reconciling a stack with its pull requests.
#[derive(Error, Debug)]
pub enum JstError {
    /// The current directory is not inside a jj workspace.
    #[error("Not in a jj workspace. Run `jst` from inside a repository initialized with `jj git init --colocate`.")]
    NotInWorkspace,
    /// The baseline revset could not be resolved.
    #[error(
        "Could not resolve baseline `{}`: {}\nConfigure it with `jj config set --repo 'revset-aliases.\"trunk()\"' main@origin`, or pass `--baseline`.",
        Color::Blue.paint(.revset),
        .reason
    )]
    RefResolution {
        /// The revset that failed to resolve.
        revset: String,
        /// The reason reported by the backend.
        reason: String,
    },
    /// The stack contains a merge or a fork.
    #[error("Change `{}` does not form a linear chain on top of the baseline. Flatten the stack before submitting it.", Color::Blue.paint(.0))]
    NonLinearHistory(String),
    /// A change in the stack has no description to derive a title from.
    #[error("Change `{}` has no description. Describe it first with `jj describe -r {}`.", Color::Blue.paint(.0), .0)]
    MissingDescription(String),
    /// Rebasing the stack produced conflicts.
    #[error("Rebase produced conflicts in {}. Resolve them and run `jst sync` again.", join(.0))]
    RebaseConflict(Vec<String>),
    /// More than one pull request matches the suffix of a single change.
    #[error("Change `{}` matches multiple pull requests: {}", Color::Blue.paint(.change), pr_list(.numbers))]
    AmbiguousPullRequests {
        /// The change id.
        change: String,
        /// The matching pull request numbers.
        numbers: Vec<u64>,
    },
    /// A single pull request matches more than one change.
    #[error("Pull request #{number} matches multiple changes: {}", join(.changes))]
    SharedPullRequest {
        /// The pull request number.
        number: u64,
        /// The change ids matching it.
        changes: Vec<String>,
    },
    /// More than one branch carries the suffix of a single change.
    #[error("Change `{}` is tracked by multiple branches: {}. Delete all but one with `jj bookmark delete`.", Color::Blue.paint(.change), join(.names))]
    DuplicateBranches {
        /// The change id.
        change: String,
        /// The branch names.
        names: Vec<String>,
    },
    /// No GitHub token was configured.
    #[error("No GitHub token configured. Set `GITHUB_TOKEN` or add `github-token` to {0}.")]
    MissingToken(String),
    /// The configured git remote does not exist.
    #[error("Git remote `{0}` not found. Add it with `jj git remote add {0} <url>` or pass `--remote`.")]
    RemoteNotFound(String),
    /// The configured git remote does not point at GitHub.
    #[error("Remote URL `{0}` is not a GitHub repository.")]
    UnsupportedRemote(String),
    /// A `jj` invocation failed.
    #[error("`jj {command}` failed: {stderr}")]
    Vcs {
        /// The arguments passed to `jj`.
        command: String,
        /// The captured standard error.
        stderr: String,
    },
    /// The forge returned an unexpected response.
    #[error("GitHub error: {0}")]
    Forge(String),
    /// Some items of a command failed.
    #[error("{0} operation(s) failed. Re-run the command to retry.")]
    PartialFailure(usize),
    /// A [std::io::Error] occurred.
    #[error("io error: {}", .0)]
    Io(#[from] std::io::Error),
    /// A [git2::Error] occurred.
    #[error("libgit2 error: {}", .0)]
    Git2(#[from] git2::Error),
    /// An [octocrab::Error] occurred.
    #[error("GitHub API error: {}", .0)]
    GitHub(#[from] octocrab::Error),
    /// Rendering output failed.
    #[error("formatting error: {}", .0)]
    Fmt(#[from] std::fmt::Error),
    /// A [toml::de::Error] occurred.
    #[error("invalid configuration: {}", .0)]
    Config(#[from] toml::de::Error),
}

/// A [Result] alias where the error is [JstError].
pub type JstResult<T> = Result<T, JstError>;

fn join(items: &[String]) -> String {
    items.join(", ")
}

fn pr_list(numbers: &[u64]) -> String {
    numbers.iter().map(|n| format!("#{n}")).join(", ")
}
