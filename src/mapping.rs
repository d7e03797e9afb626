//! Resolution of changes to pull requests.
//!
//! Nothing is persisted between runs: a change is linked to a pull request only because the pull
//! request's head branch ends with the change id suffix. The mapping is recomputed from fresh
//! remote state by every command.

use crate::{
    errors::{JstError, JstResult},
    forge::PullRequest,
    naming,
    stack::{ChangeId, Stack},
};
use std::collections::HashMap;

/// A partial map of changes to the pull requests opened for them.
#[derive(Default, Debug, Clone)]
pub struct Mapping {
    pulls: HashMap<ChangeId, PullRequest>,
}

impl Mapping {
    /// Returns the pull request mapped to a change.
    pub fn get(&self, change_id: &ChangeId) -> Option<&PullRequest> {
        self.pulls.get(change_id)
    }

    /// Returns the number of the pull request mapped to a change.
    pub fn number(&self, change_id: &ChangeId) -> Option<u64> {
        self.get(change_id).map(|pr| pr.number)
    }

    /// Returns `true` if the change has a pull request.
    pub fn is_mapped(&self, change_id: &ChangeId) -> bool {
        self.pulls.contains_key(change_id)
    }

    /// Records a pull request opened for a change during the current run.
    pub fn insert(&mut self, change_id: ChangeId, pull: PullRequest) {
        self.pulls.insert(change_id, pull);
    }
}

/// Keeps the pull requests whose head branch lives in the namespace of `actor`.
pub fn owned_by(pulls: Vec<PullRequest>, actor: &str) -> Vec<PullRequest> {
    pulls
        .into_iter()
        .filter(|pr| naming::is_owned_by(&pr.head_branch, actor))
        .collect()
}

/// Maps every change in the stack to the pull request whose head branch carries its suffix.
///
/// ## Takes
/// - `stack` - The stack to map.
/// - `pulls` - Candidate pull requests, already narrowed to the acting user's branches.
///
/// ## Returns
/// - `Ok(Mapping)` - The mapping. Changes without a match are left unmapped.
/// - `Err(JstError::AmbiguousPullRequests)` - If a change matches more than one pull request.
/// - `Err(JstError::SharedPullRequest)` - If a pull request matches more than one change.
pub fn resolve(stack: &Stack, pulls: &[PullRequest]) -> JstResult<Mapping> {
    let mut mapping = Mapping::default();
    let mut claimed: HashMap<u64, &ChangeId> = HashMap::new();

    for change in stack {
        let matches = pulls
            .iter()
            .filter(|pr| naming::matches_change(&pr.head_branch, &change.change_id))
            .collect::<Vec<_>>();

        let pull = match matches.as_slice() {
            [] => continue,
            [pull] => *pull,
            _ => {
                return Err(JstError::AmbiguousPullRequests {
                    change: change.change_id.to_string(),
                    numbers: matches.iter().map(|pr| pr.number).collect(),
                })
            }
        };

        if let Some(other) = claimed.insert(pull.number, &change.change_id) {
            return Err(JstError::SharedPullRequest {
                number: pull.number,
                changes: vec![other.to_string(), change.change_id.to_string()],
            });
        }
        mapping.insert(change.change_id.clone(), pull.clone());
    }

    Ok(mapping)
}
