//! Utilities for interacting with the git repository backing a jj workspace.

use crate::errors::{JstError, JstResult};
use git2::Repository;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Opens the git repository that stores the commits of the jj workspace at `workspace_root`.
///
/// Colocated workspaces keep it in `.git`; otherwise its location is recorded in
/// `.jj/repo/store/git_target`. Secondary workspaces point at the shared `.jj/repo` through a file.
pub fn backing_repository(workspace_root: &Path) -> JstResult<Repository> {
    let jj_repo = workspace_root.join(".jj").join("repo");
    let jj_repo = if jj_repo.is_file() {
        resolve_relative(&workspace_root.join(".jj"), &fs::read_to_string(&jj_repo)?)
    } else {
        jj_repo
    };

    let store = jj_repo.join("store");
    match fs::read_to_string(store.join("git_target")) {
        Ok(target) => Ok(Repository::open(resolve_relative(&store, &target))?),
        Err(_) => Ok(Repository::discover(workspace_root)?),
    }
}

/// Returns the `(owner, repository)` pair of the GitHub repository behind `remote`.
pub fn owner_and_repository(repository: &Repository, remote: &str) -> JstResult<(String, String)> {
    let remote_handle = repository
        .find_remote(remote)
        .map_err(|_| JstError::RemoteNotFound(remote.to_string()))?;
    let url = remote_handle
        .url()
        .ok_or_else(|| JstError::RemoteNotFound(remote.to_string()))?;

    parse_github_url(url).ok_or_else(|| JstError::UnsupportedRemote(url.to_string()))
}

/// Parses `https://github.com/o/r(.git)`, `git@github.com:o/r(.git)`, and
/// `ssh://git@github.com/o/r(.git)` into `(o, r)`.
fn parse_github_url(url: &str) -> Option<(String, String)> {
    let url = url.trim().trim_end_matches('/');
    let path = if let Some(rest) = url.strip_prefix("git@github.com:") {
        rest
    } else {
        let (_, rest) = url.split_once("github.com/")?;
        rest
    };

    let mut segments = path.trim_end_matches(".git").split('/');
    let owner = segments.next().filter(|s| !s.is_empty())?;
    let repo = segments.next().filter(|s| !s.is_empty())?;
    segments
        .next()
        .is_none()
        .then(|| (owner.to_string(), repo.to_string()))
}

/// Joins a path read from a jj pointer file onto `base`, unless it is already absolute.
fn resolve_relative(base: &Path, target: &str) -> PathBuf {
    let target = Path::new(target.trim());
    if target.is_absolute() {
        target.to_path_buf()
    } else {
        base.join(target)
    }
}

#[cfg(test)]
mod test {
    use super::{parse_github_url, resolve_relative};
    use std::path::Path;

    #[test]
    fn parses_github_urls() {
        let expected = Some(("octo".to_string(), "jst".to_string()));
        assert_eq!(parse_github_url("https://github.com/octo/jst.git"), expected);
        assert_eq!(parse_github_url("https://github.com/octo/jst"), expected);
        assert_eq!(parse_github_url("git@github.com:octo/jst.git"), expected);
        assert_eq!(parse_github_url("ssh://git@github.com/octo/jst.git"), expected);
        assert_eq!(parse_github_url("https://github.com/octo/jst/\n"), expected);
    }

    #[test]
    fn rejects_other_hosts() {
        assert_eq!(parse_github_url("https://gitlab.com/octo/jst.git"), None);
        assert_eq!(parse_github_url("https://github.com/octo"), None);
        assert_eq!(parse_github_url("https://github.com/octo/jst/pulls"), None);
    }

    #[test]
    fn resolves_git_target() {
        let store = Path::new("/work/.jj/repo/store");
        assert_eq!(
            resolve_relative(store, "../../../.git\n"),
            Path::new("/work/.jj/repo/store/../../../.git")
        );
        assert_eq!(resolve_relative(store, "/elsewhere/git"), Path::new("/elsewhere/git"));
    }
}
