//! Branch naming. A branch name embeds the change id it was created for, which is the only link
//! between a change and its pull request across runs.
//!
//! Grammar: `actor/YYYY-MM-DD/slug-<first 12 characters of the change id>`.

use crate::{
    constants::{FALLBACK_SLUG, SLUG_MAX_WORDS},
    stack::ChangeId,
};
use chrono::NaiveDate;
use itertools::Itertools;

/// Derives the branch name for a change that does not have one yet.
///
/// ## Takes
/// - `actor` - Login of the acting user.
/// - `date` - The date the branch is created on. Never recomputed for an existing branch.
/// - `description` - The change description; only its first line is used.
/// - `change_id` - The change the branch is created for.
pub fn branch_name(actor: &str, date: NaiveDate, description: &str, change_id: &ChangeId) -> String {
    let title = description.lines().next().unwrap_or_default();
    let slug = slugify(title);
    let slug = if slug.is_empty() { FALLBACK_SLUG } else { slug.as_str() };

    format!(
        "{}{}/{}-{}",
        owner_prefix(actor),
        date.format("%Y-%m-%d"),
        slug,
        change_id.short()
    )
}

/// Turns a title into a short, branch-safe slug of at most [SLUG_MAX_WORDS] words.
pub fn slugify(title: &str) -> String {
    let cleaned = title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == ' ' || *c == '-')
        .collect::<String>();

    cleaned
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|word| !word.is_empty())
        .take(SLUG_MAX_WORDS)
        .join("-")
}

/// Returns the namespace prefix of every branch owned by `actor`.
pub fn owner_prefix(actor: &str) -> String {
    format!("{actor}/")
}

/// Returns `true` if the branch lives in the namespace of `actor`.
pub fn is_owned_by(branch: &str, actor: &str) -> bool {
    branch
        .strip_prefix(actor)
        .is_some_and(|rest| rest.starts_with('/'))
}

/// Returns `true` if the branch was created for `change_id`.
pub fn matches_change(branch: &str, change_id: &ChangeId) -> bool {
    suffix_of(branch) == Some(change_id.short())
}

/// Returns the change id suffix of a branch name: the text after its last hyphen.
pub fn suffix_of(branch: &str) -> Option<&str> {
    branch
        .rsplit_once('-')
        .map(|(_, suffix)| suffix)
        .filter(|suffix| !suffix.is_empty() && !suffix.contains('/'))
}
