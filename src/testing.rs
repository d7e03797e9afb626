//! In-memory [Vcs] and [Forge] backends for tests.

use crate::{
    errors::{JstError, JstResult},
    forge::{Forge, NewPullRequest, PrFilter, PrState, PullRequest, PullRequestEdit},
    stack::{Change, ChangeId},
    vcs::{BranchRef, RebaseOutcome, Vcs},
};
use std::{
    cell::RefCell,
    collections::{BTreeMap, HashSet},
};

/// The only revset [FakeVcs] resolves.
pub(crate) const BASELINE: &str = "trunk()";

/// Change id of the baseline the first change of a test stack sits on.
pub(crate) const BASELINE_ID: &str = "zzzzzzzzzzzz";

/// Creates a change with a commit id derived from its change id.
pub(crate) fn change(id: &str, description: &str, parent: Option<&str>) -> Change {
    Change {
        change_id: ChangeId::new(id),
        commit_id: format!("commit-{id}"),
        description: description.to_string(),
        parents: vec![ChangeId::new(parent.unwrap_or(BASELINE_ID))],
        is_empty: false,
    }
}

/// Creates a linear chain of changes from `(change id, description)` pairs.
pub(crate) fn linear_changes(specs: &[(&str, &str)]) -> Vec<Change> {
    let mut parent = None;
    specs
        .iter()
        .map(|&(id, description)| {
            let c = change(id, description, parent);
            parent = Some(id);
            c
        })
        .collect()
}

/// Creates an open pull request.
pub(crate) fn pull(number: u64, head: &str, base: &str) -> PullRequest {
    PullRequest {
        number,
        title: format!("PR {number}"),
        body: String::new(),
        state: PrState::Open,
        head_branch: head.to_string(),
        base_branch: base.to_string(),
        url: format!("https://github.com/octo/repo/pull/{number}"),
    }
}

#[derive(Default)]
pub(crate) struct FakeVcs {
    pub(crate) changes: RefCell<Vec<Change>>,
    pub(crate) branches: RefCell<BTreeMap<String, BranchRef>>,
    pub(crate) failing_pushes: RefCell<HashSet<String>>,
    pub(crate) conflicts: RefCell<Vec<ChangeId>>,
    /// Every mutating call, in order, e.g. `push user/2026-02-18/a-aaa111111111`.
    pub(crate) calls: RefCell<Vec<String>>,
}

impl FakeVcs {
    pub(crate) fn new(changes: Vec<Change>) -> Self {
        Self {
            changes: RefCell::new(changes),
            ..Default::default()
        }
    }

    /// Adds a bookmark with the given local and remote targets.
    pub(crate) fn with_branch(self, name: &str, local: Option<&str>, remote: Option<&str>) -> Self {
        self.branches.borrow_mut().insert(
            name.to_string(),
            BranchRef {
                name: name.to_string(),
                local_target: local.map(ToOwned::to_owned),
                remote_target: remote.map(ToOwned::to_owned),
            },
        );
        self
    }

    pub(crate) fn branch(&self, name: &str) -> Option<BranchRef> {
        self.branches.borrow().get(name).cloned()
    }

    /// Number of recorded calls starting with `prefix`.
    pub(crate) fn count(&self, prefix: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn commit_of(&self, at: &ChangeId) -> JstResult<String> {
        self.changes
            .borrow()
            .iter()
            .find(|c| &c.change_id == at)
            .map(|c| c.commit_id.clone())
            .ok_or_else(|| vcs_error(format!("no change {at}")))
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }
}

fn vcs_error(stderr: String) -> JstError {
    JstError::Vcs {
        command: "fake".to_string(),
        stderr,
    }
}

impl Vcs for FakeVcs {
    fn resolve(&self, revset: &str) -> JstResult<ChangeId> {
        if revset == BASELINE {
            Ok(ChangeId::new(BASELINE_ID))
        } else {
            Err(JstError::RefResolution {
                revset: revset.to_string(),
                reason: "revision doesn't exist".to_string(),
            })
        }
    }

    fn list_changes(&self, _from: &str, _to: &str) -> JstResult<Vec<Change>> {
        Ok(self.changes.borrow().clone())
    }

    fn branches(&self) -> JstResult<Vec<BranchRef>> {
        Ok(self.branches.borrow().values().cloned().collect())
    }

    fn create_branch(&self, name: &str, at: &ChangeId) -> JstResult<()> {
        self.record(format!("create {name}"));
        let commit = self.commit_of(at)?;
        let mut branches = self.branches.borrow_mut();
        if branches.contains_key(name) {
            return Err(vcs_error(format!("bookmark {name} already exists")));
        }
        branches.insert(
            name.to_string(),
            BranchRef {
                name: name.to_string(),
                local_target: Some(commit),
                remote_target: None,
            },
        );
        Ok(())
    }

    fn move_branch(&self, name: &str, at: &ChangeId) -> JstResult<()> {
        self.record(format!("move {name}"));
        let commit = self.commit_of(at)?;
        self.branches
            .borrow_mut()
            .entry(name.to_string())
            .or_insert_with(|| BranchRef {
                name: name.to_string(),
                ..Default::default()
            })
            .local_target = Some(commit);
        Ok(())
    }

    fn push_branch(&self, name: &str) -> JstResult<()> {
        self.record(format!("push {name}"));
        if self.failing_pushes.borrow().contains(name) {
            return Err(vcs_error(format!("failed to push {name}")));
        }
        let mut branches = self.branches.borrow_mut();
        let branch = branches
            .get_mut(name)
            .ok_or_else(|| vcs_error(format!("no bookmark {name}")))?;
        branch.remote_target = branch.local_target.clone();
        Ok(())
    }

    fn delete_branch(&self, name: &str) -> JstResult<()> {
        self.record(format!("delete {name}"));
        let mut branches = self.branches.borrow_mut();
        let branch = branches
            .get_mut(name)
            .ok_or_else(|| vcs_error(format!("no bookmark {name}")))?;
        branch.local_target = None;
        Ok(())
    }

    fn push_deletions(&self) -> JstResult<()> {
        self.record("push-deletions".to_string());
        self.branches
            .borrow_mut()
            .retain(|_, branch| branch.local_target.is_some());
        Ok(())
    }

    fn fetch_remote(&self) -> JstResult<()> {
        self.record("fetch".to_string());
        Ok(())
    }

    fn rebase(&self, _onto: &str, _head: &str) -> JstResult<RebaseOutcome> {
        self.record("rebase".to_string());
        let conflicts = self.conflicts.borrow().clone();
        if !conflicts.is_empty() {
            return Ok(RebaseOutcome::Conflicted(conflicts));
        }
        for change in self.changes.borrow_mut().iter_mut() {
            change.commit_id.push_str("-rebased");
        }
        Ok(RebaseOutcome::Clean)
    }
}

pub(crate) struct FakeForge {
    pub(crate) user: String,
    pub(crate) pulls: RefCell<Vec<PullRequest>>,
    /// Head branches whose pull request creation fails.
    pub(crate) failing_creates: RefCell<HashSet<String>>,
    /// Every mutating call, in order, e.g. `create 1` or `edit 1`.
    pub(crate) calls: RefCell<Vec<String>>,
}

impl FakeForge {
    pub(crate) fn new(user: &str) -> Self {
        Self {
            user: user.to_string(),
            pulls: RefCell::new(Vec::new()),
            failing_creates: RefCell::new(HashSet::new()),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn with_pull(self, pull: PullRequest) -> Self {
        self.pulls.borrow_mut().push(pull);
        self
    }

    pub(crate) fn pull(&self, number: u64) -> Option<PullRequest> {
        self.pulls
            .borrow()
            .iter()
            .find(|pr| pr.number == number)
            .cloned()
    }

    pub(crate) fn count(&self, prefix: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }
}

impl Forge for FakeForge {
    async fn current_user(&self) -> JstResult<String> {
        Ok(self.user.clone())
    }

    async fn default_branch(&self) -> JstResult<String> {
        Ok("trunk".to_string())
    }

    async fn list_pull_requests(&self, filter: PrFilter) -> JstResult<Vec<PullRequest>> {
        Ok(self
            .pulls
            .borrow()
            .iter()
            .filter(|pr| filter == PrFilter::All || pr.state == PrState::Open)
            .cloned()
            .collect())
    }

    async fn create_pull_request(&self, new: &NewPullRequest) -> JstResult<PullRequest> {
        if self.failing_creates.borrow().contains(&new.head) {
            return Err(JstError::Forge(format!("cannot open {}", new.head)));
        }
        let mut pulls = self.pulls.borrow_mut();
        let number = pulls.iter().map(|pr| pr.number).max().unwrap_or_default() + 1;
        self.calls.borrow_mut().push(format!("create {number}"));

        let created = PullRequest {
            title: new.title.clone(),
            body: new.body.clone(),
            ..pull(number, &new.head, &new.base)
        };
        pulls.push(created.clone());
        Ok(created)
    }

    async fn edit_pull_request(&self, number: u64, edit: &PullRequestEdit) -> JstResult<()> {
        self.calls.borrow_mut().push(format!("edit {number}"));
        let mut pulls = self.pulls.borrow_mut();
        let pr = pulls
            .iter_mut()
            .find(|pr| pr.number == number)
            .ok_or_else(|| JstError::Forge(format!("no pull request #{number}")))?;
        if let Some(title) = &edit.title {
            pr.title = title.clone();
        }
        if let Some(base) = &edit.base {
            pr.base_branch = base.clone();
        }
        if let Some(body) = &edit.body {
            pr.body = body.clone();
        }
        Ok(())
    }

    async fn get_pull_request(&self, number: u64) -> JstResult<PullRequest> {
        self.calls.borrow_mut().push(format!("get {number}"));
        self.pull(number)
            .ok_or_else(|| JstError::Forge(format!("no pull request #{number}")))
    }
}
