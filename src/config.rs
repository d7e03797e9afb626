//! User configuration for `jst`, read from `~/.jst.toml`.

use crate::{
    constants::{DEFAULT_BASELINE, DEFAULT_HEAD, DEFAULT_REMOTE, JST_CFG_FILE_NAME},
    errors::{JstError, JstResult},
};
use serde::{Deserialize, Serialize};
use std::{io::ErrorKind, path::PathBuf};
use tracing::debug;

/// The `jst` configuration. Every key is optional.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct JstConfig {
    /// Personal access token for GitHub. Overridden by `GITHUB_TOKEN`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_token: Option<String>,
    /// Git remote branches are pushed to.
    pub remote: String,
    /// Revset delimiting the bottom of the stack.
    pub baseline: String,
    /// Revset of the top of the stack.
    pub head: String,
    /// Branch the first pull request of a stack is based on. Defaults to the repository's default
    /// branch on GitHub.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_branch: Option<String>,
}

impl Default for JstConfig {
    fn default() -> Self {
        Self {
            github_token: None,
            remote: DEFAULT_REMOTE.to_string(),
            baseline: DEFAULT_BASELINE.to_string(),
            head: DEFAULT_HEAD.to_string(),
            base_branch: None,
        }
    }
}

impl JstConfig {
    /// Loads the configuration file, falling back to defaults if it does not exist. A token in
    /// `GITHUB_TOKEN` takes precedence over the one in the file.
    pub fn load() -> JstResult<Self> {
        let mut config = match config_path() {
            Some(path) => match std::fs::read_to_string(&path) {
                Ok(raw) => {
                    debug!(path = %path.display(), "loaded configuration");
                    Self::parse(&raw)?
                }
                Err(e) if e.kind() == ErrorKind::NotFound => Self::default(),
                Err(e) => return Err(e.into()),
            },
            None => Self::default(),
        };

        if let Some(token) = std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty()) {
            config.github_token = Some(token);
        }
        Ok(config)
    }

    /// Parses a configuration from TOML.
    pub fn parse(raw: &str) -> JstResult<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Returns the GitHub token.
    ///
    /// ## Returns
    /// - `Ok(&str)` - The configured token.
    /// - `Err(JstError::MissingToken)` - If neither the file nor the environment provides one.
    pub fn token(&self) -> JstResult<&str> {
        self.github_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                JstError::MissingToken(
                    config_path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| format!("~/{JST_CFG_FILE_NAME}")),
                )
            })
    }
}

/// Returns the path of the configuration file, if the home directory is known.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(JST_CFG_FILE_NAME))
}

#[cfg(test)]
mod test {
    use super::JstConfig;
    use crate::errors::JstError;

    #[test]
    fn empty_file_uses_defaults() {
        let config = JstConfig::parse("").unwrap();
        assert_eq!(config, JstConfig::default());
        assert_eq!(config.baseline, "trunk()");
        assert_eq!(config.remote, "origin");
        assert_eq!(config.head, "@");
    }

    #[test]
    fn reads_kebab_case_keys() {
        let config = JstConfig::parse(
            r#"
            github-token = "ghp_test"
            remote = "upstream"
            baseline = "main@upstream"
            base-branch = "develop"
            "#,
        )
        .unwrap();

        assert_eq!(config.token().unwrap(), "ghp_test");
        assert_eq!(config.remote, "upstream");
        assert_eq!(config.baseline, "main@upstream");
        assert_eq!(config.base_branch.as_deref(), Some("develop"));
        assert_eq!(config.head, "@");
    }

    #[test]
    fn missing_token_names_the_remedy() {
        let err = JstConfig::default().token().unwrap_err();
        assert!(matches!(err, JstError::MissingToken(_)));
        assert!(err.to_string().contains("GITHUB_TOKEN"));
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(matches!(
            JstConfig::parse("remote = ").unwrap_err(),
            JstError::Config(_)
        ));
    }
}
