//! [Forge] implementation backed by the GitHub REST API.

use super::{Forge, NewPullRequest, PrFilter, PrState, PullRequest, PullRequestEdit};
use crate::errors::{JstError, JstResult};
use octocrab::{
    models::{pulls::PullRequest as GhPullRequest, IssueState},
    params, Octocrab,
};
use tracing::{debug, info};

/// A GitHub repository, accessed with a personal access token.
pub struct GitHub {
    client: Octocrab,
    owner: String,
    repo: String,
}

impl GitHub {
    /// Creates a new [GitHub] client for `owner/repo`.
    pub fn new(token: String, owner: String, repo: String) -> JstResult<Self> {
        let client = Octocrab::builder().personal_token(token).build()?;
        Ok(Self {
            client,
            owner,
            repo,
        })
    }
}

impl Forge for GitHub {
    async fn current_user(&self) -> JstResult<String> {
        let user = self.client.current().user().await?;
        debug!(login = %user.login, "authenticated");
        Ok(user.login)
    }

    async fn default_branch(&self) -> JstResult<String> {
        self.client
            .repos(&self.owner, &self.repo)
            .get()
            .await?
            .default_branch
            .ok_or_else(|| {
                JstError::Forge(format!("{}/{} has no default branch", self.owner, self.repo))
            })
    }

    async fn list_pull_requests(&self, filter: PrFilter) -> JstResult<Vec<PullRequest>> {
        let state = match filter {
            PrFilter::Open => params::State::Open,
            PrFilter::All => params::State::All,
        };
        let first_page = self
            .client
            .pulls(&self.owner, &self.repo)
            .list()
            .state(state)
            .per_page(100u8)
            .send()
            .await?;
        let pulls = self.client.all_pages(first_page).await?;
        debug!(count = pulls.len(), ?filter, "listed pull requests");

        Ok(pulls.into_iter().map(convert).collect())
    }

    async fn create_pull_request(&self, new: &NewPullRequest) -> JstResult<PullRequest> {
        info!(head = %new.head, base = %new.base, "creating pull request");
        let created = self
            .client
            .pulls(&self.owner, &self.repo)
            .create(new.title.as_str(), new.head.as_str(), new.base.as_str())
            .body(new.body.as_str())
            .send()
            .await?;
        Ok(convert(created))
    }

    async fn edit_pull_request(&self, number: u64, edit: &PullRequestEdit) -> JstResult<()> {
        info!(number, "editing pull request");
        let pulls = self.client.pulls(&self.owner, &self.repo);
        let mut update = pulls.update(number);
        if let Some(title) = &edit.title {
            update = update.title(title.as_str());
        }
        if let Some(body) = &edit.body {
            update = update.body(body.as_str());
        }
        if let Some(base) = &edit.base {
            update = update.base(base.as_str());
        }
        update.send().await?;
        Ok(())
    }

    async fn get_pull_request(&self, number: u64) -> JstResult<PullRequest> {
        let pull = self
            .client
            .pulls(&self.owner, &self.repo)
            .get(number)
            .await?;
        Ok(convert(pull))
    }
}

/// Converts an [octocrab] pull request into a [PullRequest]. GitHub reports merged pull requests as
/// closed, so merged state comes from `merged_at`.
fn convert(pull: GhPullRequest) -> PullRequest {
    let state = match (pull.merged_at, pull.state) {
        (Some(_), _) => PrState::Merged,
        (None, Some(IssueState::Open)) => PrState::Open,
        (None, _) => PrState::Closed,
    };

    PullRequest {
        number: pull.number,
        title: pull.title.unwrap_or_default(),
        body: pull.body.unwrap_or_default(),
        state,
        head_branch: pull.head.ref_field.clone(),
        base_branch: pull.base.ref_field.clone(),
        url: pull.html_url.map(|u| u.to_string()).unwrap_or_default(),
    }
}
