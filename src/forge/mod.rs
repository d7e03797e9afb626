//! The code-hosting backend consumed by the reconciler.

use crate::errors::JstResult;
use nu_ansi_term::Color;
use std::fmt::Display;

mod github;
pub use github::GitHub;

/// Operations `jst` needs from the code-hosting service.
///
/// Calls are awaited one at a time; the reconciler never issues them concurrently.
#[allow(async_fn_in_trait)]
pub trait Forge {
    /// Returns the login of the authenticated user.
    async fn current_user(&self) -> JstResult<String>;

    /// Returns the name of the repository's default branch.
    async fn default_branch(&self) -> JstResult<String>;

    /// Lists every pull request in the repository matching `filter`.
    async fn list_pull_requests(&self, filter: PrFilter) -> JstResult<Vec<PullRequest>>;

    /// Opens a new pull request.
    async fn create_pull_request(&self, new: &NewPullRequest) -> JstResult<PullRequest>;

    /// Edits the fields of an existing pull request that are set in `edit`.
    async fn edit_pull_request(&self, number: u64, edit: &PullRequestEdit) -> JstResult<()>;

    /// Fetches a single pull request.
    async fn get_pull_request(&self, number: u64) -> JstResult<PullRequest>;
}

/// Which pull requests to list.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PrFilter {
    /// Open pull requests only.
    Open,
    /// Open, closed, and merged pull requests.
    All,
}

/// The state of a pull request.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PrState {
    Open,
    Closed,
    Merged,
}

impl PrState {
    /// Returns `true` if the pull request can no longer change state on its own.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Open)
    }
}

impl Display for PrState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "{}", Color::Green.paint("open")),
            Self::Closed => write!(f, "{}", Color::Red.paint("closed")),
            Self::Merged => write!(f, "{}", Color::Purple.paint("merged")),
        }
    }
}

/// A pull request on the remote.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub body: String,
    pub state: PrState,
    /// Branch the pull request merges from.
    pub head_branch: String,
    /// Branch the pull request merges into.
    pub base_branch: String,
    pub url: String,
}

/// A pull request to open.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct NewPullRequest {
    pub base: String,
    pub head: String,
    pub title: String,
    pub body: String,
}

/// Fields to change on an existing pull request. [None] leaves the field untouched.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct PullRequestEdit {
    pub title: Option<String>,
    pub base: Option<String>,
    pub body: Option<String>,
}
