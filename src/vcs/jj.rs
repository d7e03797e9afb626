//! [Vcs] implementation backed by the `jj` command line.

use super::{BranchRef, RebaseOutcome, Vcs};
use crate::{
    errors::{JstError, JstResult},
    stack::{Change, ChangeId},
};
use itertools::Itertools;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    process::Command,
};
use tracing::{debug, info};

/// Fields of a change, each terminated by a NUL byte. Descriptions cannot contain NUL.
const CHANGE_TEMPLATE: &str = r#"change_id ++ "\0" ++ commit_id ++ "\0" ++ parents.map(|p| p.change_id()).join(",") ++ "\0" ++ if(empty, "1", "0") ++ "\0" ++ description ++ "\0""#;

/// Fields of a bookmark entry, each terminated by a NUL byte.
const BOOKMARK_TEMPLATE: &str = r#"name ++ "\0" ++ remote ++ "\0" ++ if(normal_target, normal_target.commit_id(), "") ++ "\0""#;

/// Drives the `jj` binary inside a workspace.
#[derive(Debug, Clone)]
pub struct JjCli {
    /// Root of the jj workspace.
    root: PathBuf,
    /// Name of the git remote branches are pushed to.
    remote: String,
}

impl JjCli {
    /// Locates the workspace containing the current directory.
    ///
    /// ## Returns
    /// - `Ok(JjCli)` - A backend rooted at the workspace.
    /// - `Err(JstError::NotInWorkspace)` - If the current directory is not in a jj workspace.
    pub fn discover(remote: impl Into<String>) -> JstResult<Self> {
        let output = Command::new("jj")
            .args(["root", "--color", "never", "--no-pager"])
            .output()
            .map_err(|_| JstError::NotInWorkspace)?;
        if !output.status.success() {
            return Err(JstError::NotInWorkspace);
        }

        Ok(Self {
            root: PathBuf::from(String::from_utf8_lossy(&output.stdout).trim()),
            remote: remote.into(),
        })
    }

    /// Returns the root of the workspace.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the name of the remote branches are pushed to.
    pub fn remote(&self) -> &str {
        &self.remote
    }

    /// Runs `jj` with the given arguments and returns its standard output.
    fn run(&self, args: &[&str]) -> JstResult<String> {
        debug!(target: "jst::jj", args = %args.join(" "), "running jj");
        let output = Command::new("jj")
            .args(args)
            .args(["--color", "never", "--no-pager"])
            .current_dir(&self.root)
            .output()?;

        if !output.status.success() {
            return Err(JstError::Vcs {
                command: args.join(" "),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Lists the change ids in a revset.
    fn change_ids(&self, revset: &str) -> JstResult<Vec<ChangeId>> {
        let out = self.run(&["log", "--no-graph", "-r", revset, "-T", r#"change_id ++ "\n""#])?;
        Ok(out
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(ChangeId::new)
            .collect())
    }
}

impl Vcs for JjCli {
    fn resolve(&self, revset: &str) -> JstResult<ChangeId> {
        let ids = self.change_ids(revset).map_err(|e| match e {
            JstError::Vcs { stderr, .. } => JstError::RefResolution {
                revset: revset.to_string(),
                reason: stderr,
            },
            other => other,
        })?;

        match ids.as_slice() {
            [id] => Ok(id.clone()),
            [] => Err(JstError::RefResolution {
                revset: revset.to_string(),
                reason: "revset is empty".to_string(),
            }),
            _ => Err(JstError::RefResolution {
                revset: revset.to_string(),
                reason: format!("revset resolves to {} changes", ids.len()),
            }),
        }
    }

    fn list_changes(&self, from: &str, to: &str) -> JstResult<Vec<Change>> {
        let revset = format!("({from})..({to})");
        let out = self.run(&["log", "--no-graph", "--reverse", "-r", &revset, "-T", CHANGE_TEMPLATE])?;
        parse_changes(&out)
    }

    fn branches(&self) -> JstResult<Vec<BranchRef>> {
        let out = self.run(&["bookmark", "list", "--all-remotes", "-T", BOOKMARK_TEMPLATE])?;
        Ok(parse_branches(&out, &self.remote))
    }

    fn create_branch(&self, name: &str, at: &ChangeId) -> JstResult<()> {
        info!(target: "jst::jj", branch = name, change = %at, "creating branch");
        self.run(&["bookmark", "create", name, "-r", at.as_str()]).map(drop)
    }

    fn move_branch(&self, name: &str, at: &ChangeId) -> JstResult<()> {
        info!(target: "jst::jj", branch = name, change = %at, "moving branch");
        self.run(&["bookmark", "set", name, "-r", at.as_str(), "--allow-backwards"])
            .map(drop)
    }

    fn push_branch(&self, name: &str) -> JstResult<()> {
        info!(target: "jst::jj", branch = name, remote = %self.remote, "pushing branch");
        self.run(&["git", "push", "--remote", &self.remote, "--bookmark", name, "--allow-new"])
            .map(drop)
    }

    fn delete_branch(&self, name: &str) -> JstResult<()> {
        info!(target: "jst::jj", branch = name, "deleting branch");
        self.run(&["bookmark", "delete", name]).map(drop)
    }

    fn push_deletions(&self) -> JstResult<()> {
        info!(target: "jst::jj", remote = %self.remote, "pushing branch deletions");
        self.run(&["git", "push", "--remote", &self.remote, "--deleted"])
            .map(drop)
    }

    fn fetch_remote(&self) -> JstResult<()> {
        info!(target: "jst::jj", remote = %self.remote, "fetching");
        self.run(&["git", "fetch", "--remote", &self.remote]).map(drop)
    }

    fn rebase(&self, onto: &str, head: &str) -> JstResult<RebaseOutcome> {
        info!(target: "jst::jj", onto, head, "rebasing stack");
        self.run(&["rebase", "-b", head, "-d", onto])?;

        // jj records conflicts in the rebased changes instead of failing.
        let conflicted = self.change_ids(&format!("(({onto})..({head})) & conflicts()"))?;
        if conflicted.is_empty() {
            Ok(RebaseOutcome::Clean)
        } else {
            Ok(RebaseOutcome::Conflicted(conflicted))
        }
    }
}

/// Parses the output of `jj log` rendered with [CHANGE_TEMPLATE].
fn parse_changes(out: &str) -> JstResult<Vec<Change>> {
    let fields = out.split('\0').collect::<Vec<_>>();
    if fields.len() % 5 != 1 || fields.last().is_some_and(|tail| !tail.trim().is_empty()) {
        return Err(JstError::Vcs {
            command: "log".to_string(),
            stderr: "unexpected template output".to_string(),
        });
    }

    let changes = fields
        .into_iter()
        .tuples()
        .map(|(change_id, commit_id, parents, empty, description)| Change {
            change_id: ChangeId::new(change_id.trim()),
            commit_id: commit_id.to_string(),
            description: description.to_string(),
            parents: parents
                .split(',')
                .filter(|p| !p.is_empty())
                .map(ChangeId::new)
                .collect(),
            is_empty: empty == "1",
        })
        .collect();
    Ok(changes)
}

/// Parses the output of `jj bookmark list --all-remotes` rendered with [BOOKMARK_TEMPLATE], keeping
/// local bookmarks and those on `remote`.
fn parse_branches(out: &str, remote: &str) -> Vec<BranchRef> {
    let mut branches: BTreeMap<String, BranchRef> = BTreeMap::new();

    for (name, entry_remote, target) in out.split('\0').tuples() {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        let target = (!target.is_empty()).then(|| target.to_string());

        let branch = branches
            .entry(name.to_string())
            .or_insert_with(|| BranchRef {
                name: name.to_string(),
                ..Default::default()
            });
        match entry_remote {
            "" => branch.local_target = target,
            r if r == remote => branch.remote_target = target,
            _ => {}
        }
    }

    branches
        .into_values()
        .filter(|b| b.local_target.is_some() || b.remote_target.is_some())
        .collect()
}
