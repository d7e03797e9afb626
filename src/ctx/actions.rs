//! The phases shared by `push` and `sync`.

use super::JstContext;
use crate::{
    body,
    errors::{JstError, JstResult},
    forge::{Forge, NewPullRequest, PrFilter, PullRequestEdit},
    mapping,
    naming,
    report::Report,
    stack::{Change, ChangeId, Stack},
    vcs::{BranchRef, Vcs},
};
use nu_ansi_term::Color;
use std::collections::HashMap;
use tracing::{debug, info};

/// The branch of a change once [JstContext::realize_branches] ran.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Realized {
    /// The remote branch points at the change's current commit.
    Current(String),
    /// Updating the branch failed, but an earlier push of it is still on the remote.
    Stale(String),
    /// The branch never reached the remote.
    Missing,
}

impl Realized {
    /// The branch to open or edit the change's pull request from, if it is up to date.
    fn head(&self) -> Option<&str> {
        match self {
            Self::Current(name) => Some(name),
            Self::Stale(_) | Self::Missing => None,
        }
    }

    /// The branch dependents of the change are based on, if it exists on the remote.
    fn base(&self) -> Option<&str> {
        match self {
            Self::Current(name) | Self::Stale(name) => Some(name),
            Self::Missing => None,
        }
    }
}

/// What happened to the branch of a change while it was realized.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum BranchOutcome {
    Created,
    Updated,
    UpToDate,
}

impl<'a, V: Vcs, F: Forge> JstContext<'a, V, F> {
    /// Fails if any change in the stack has no description to title its pull request with.
    pub fn ensure_described(&self, stack: &Stack) -> JstResult<()> {
        match stack.iter().find(|c| c.is_undescribed()) {
            Some(change) => Err(JstError::MissingDescription(change.change_id.to_string())),
            None => Ok(()),
        }
    }

    /// Pushes every branch of the stack, then creates or updates every pull request.
    ///
    /// Branches for the whole stack are realized before any pull request is touched, since the
    /// base of each pull request is the branch of the change below it.
    pub async fn submit(&self, stack: &Stack, report: &mut Report) -> JstResult<()> {
        let branches = self.realize_branches(stack, report)?;
        self.reconcile_pull_requests(stack, &branches, report).await
    }

    /// Makes sure every change in the stack has a branch on the remote pointing at its current
    /// commit.
    ///
    /// ## Returns
    /// - `Ok(Vec<Realized>)` - The branch of each change in stack order. Changes whose branch is not
    ///   [Realized::Current] are skipped when reconciling pull requests.
    /// - `Err(JstError::DuplicateBranches)` - If a change is tracked by more than one branch.
    ///   Checked before any branch is touched.
    pub fn realize_branches(
        &self,
        stack: &Stack,
        report: &mut Report,
    ) -> JstResult<Vec<Realized>> {
        let owned = self.owned_branches()?;

        // Resolve every change to its existing branch up front so consistency errors abort
        // before anything is mutated.
        let existing = stack
            .iter()
            .map(|change| {
                let matching = owned
                    .iter()
                    .filter(|b| naming::matches_change(&b.name, &change.change_id))
                    .collect::<Vec<_>>();
                match matching.as_slice() {
                    [] => Ok(None),
                    [branch] => Ok(Some(*branch)),
                    _ => Err(JstError::DuplicateBranches {
                        change: change.change_id.to_string(),
                        names: matching.iter().map(|b| b.name.clone()).collect(),
                    }),
                }
            })
            .collect::<JstResult<Vec<_>>>()?;

        let mut realized = Vec::with_capacity(stack.len());
        for (change, branch) in stack.iter().zip(existing) {
            let name = match branch {
                Some(branch) => branch.name.clone(),
                None => naming::branch_name(
                    &self.actor,
                    self.today,
                    &change.description,
                    &change.change_id,
                ),
            };

            let outcome = match branch {
                Some(branch) => self.refresh_branch(branch, change),
                None => self.create_branch(&name, change),
            };
            match outcome {
                Ok(outcome) => {
                    match outcome {
                        BranchOutcome::Created => {
                            report.branches_created += 1;
                            println!("Created branch `{}`", Color::Green.paint(&name));
                        }
                        BranchOutcome::Updated => {
                            report.branches_updated += 1;
                            println!("Pushed branch `{}`", Color::Green.paint(&name));
                        }
                        BranchOutcome::UpToDate => {
                            report.branches_up_to_date += 1;
                            debug!(branch = %name, "branch up to date");
                        }
                    }
                    realized.push(Realized::Current(name));
                }
                Err(err) => {
                    report.failure(format_args!("Branch `{name}`"), &err);
                    let on_remote = branch.is_some_and(|b| b.remote_target.is_some());
                    realized.push(if on_remote {
                        Realized::Stale(name)
                    } else {
                        Realized::Missing
                    });
                }
            }
        }

        Ok(realized)
    }

    /// Creates and pushes the branch of a change that has none.
    fn create_branch(&self, name: &str, change: &Change) -> JstResult<BranchOutcome> {
        self.vcs.create_branch(name, &change.change_id)?;
        self.vcs.push_branch(name)?;
        Ok(BranchOutcome::Created)
    }

    /// Points an existing branch at the change's current commit and pushes it, if either is stale.
    fn refresh_branch(&self, branch: &BranchRef, change: &Change) -> JstResult<BranchOutcome> {
        if branch.local_target.as_deref() != Some(change.commit_id.as_str()) {
            self.vcs.move_branch(&branch.name, &change.change_id)?;
            self.vcs.push_branch(&branch.name)?;
            Ok(BranchOutcome::Updated)
        } else if !branch.is_pushed() {
            self.vcs.push_branch(&branch.name)?;
            Ok(BranchOutcome::Updated)
        } else {
            Ok(BranchOutcome::UpToDate)
        }
    }

    /// Returns the base branch for the pull request of the change at the 0-based `index`.
    ///
    /// A parent whose refresh failed still serves as the base as long as its branch is on the
    /// remote. Only a parent branch that never got pushed falls back to the base branch.
    fn base_for(&self, index: usize, branches: &[Realized], report: &mut Report) -> String {
        match index.checked_sub(1).map(|i| branches[i].base()) {
            None => self.base_branch.clone(),
            Some(Some(parent)) => parent.to_string(),
            Some(None) => {
                report.warning(format_args!(
                    "The branch below change {} failed to push; basing its pull request on `{}` until the next push.",
                    index + 1,
                    self.base_branch
                ));
                self.base_branch.clone()
            }
        }
    }

    /// Creates a pull request for every change that has none and updates the rest.
    ///
    /// Pull requests are created first, bottom up, so the final bodies can reference every
    /// neighbor. The body of a freshly created pull request is rewritten only if a neighbor
    /// created after it changed its cross references.
    pub async fn reconcile_pull_requests(
        &self,
        stack: &Stack,
        branches: &[Realized],
        report: &mut Report,
    ) -> JstResult<()> {
        let open = mapping::owned_by(
            self.forge.list_pull_requests(PrFilter::Open).await?,
            &self.actor,
        );
        let mut mapping = mapping::resolve(stack, &open)?;
        let mut created: HashMap<ChangeId, String> = HashMap::new();

        for (i, change) in stack.iter().enumerate() {
            let Some(head) = branches[i].head() else {
                continue;
            };
            if mapping.is_mapped(&change.change_id) {
                continue;
            }

            let new = NewPullRequest {
                base: self.base_for(i, branches, report),
                head: head.to_string(),
                title: body::title(change),
                body: body::format_body(change, stack, &mapping),
            };
            match self.forge.create_pull_request(&new).await {
                Ok(pull) => {
                    info!(number = pull.number, head = %head, "created pull request");
                    println!(
                        "Created pull request #{} for `{}` @ {}",
                        pull.number,
                        Color::Green.paint(head),
                        Color::Blue.paint(&pull.url)
                    );
                    report.pulls_created += 1;
                    created.insert(change.change_id.clone(), new.body);
                    mapping.insert(change.change_id.clone(), pull);
                }
                Err(err) => report.failure(format_args!("Pull request for `{head}`"), &err),
            }
        }

        for (i, change) in stack.iter().enumerate() {
            if branches[i].head().is_none() {
                continue;
            }
            let Some(number) = mapping.number(&change.change_id) else {
                continue;
            };
            let body = body::format_body(change, stack, &mapping);

            if let Some(initial) = created.get(&change.change_id) {
                if *initial != body {
                    let edit = PullRequestEdit {
                        body: Some(body),
                        ..Default::default()
                    };
                    if let Err(err) = self.forge.edit_pull_request(number, &edit).await {
                        report.failure(format_args!("Pull request #{number}"), &err);
                    }
                }
                continue;
            }

            let edit = PullRequestEdit {
                title: Some(body::title(change)),
                base: Some(self.base_for(i, branches, report)),
                body: Some(body),
            };
            match self.forge.edit_pull_request(number, &edit).await {
                Ok(()) => {
                    report.pulls_updated += 1;
                    println!("Updated pull request #{number}");
                }
                Err(err) => report.failure(format_args!("Pull request #{number}"), &err),
            }
        }

        Ok(())
    }
}
