//! In-memory model of the stack of changes between the baseline and the current position.

use crate::{
    constants::CHANGE_ID_SUFFIX_LEN,
    errors::{JstError, JstResult},
    vcs::Vcs,
};
use std::fmt::Display;
use tracing::debug;

mod fmt;

/// A stable change identifier. Survives rebases and amendments, unlike the commit id.
#[derive(Default, Debug, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ChangeId(String);

impl ChangeId {
    /// Creates a new [ChangeId].
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the full identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the fixed-length prefix embedded in branch names.
    pub fn short(&self) -> &str {
        self.0.get(..CHANGE_ID_SUFFIX_LEN).unwrap_or(&self.0)
    }
}

impl Display for ChangeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single change, as reported by the version-control backend.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct Change {
    /// The durable identifier of the change.
    pub change_id: ChangeId,
    /// The identifier of the change's current snapshot.
    pub commit_id: String,
    /// The full description. The first line is the title.
    pub description: String,
    /// The parents of the change.
    pub parents: Vec<ChangeId>,
    /// Whether the change has no diff.
    pub is_empty: bool,
}

impl Change {
    /// Returns the first line of the description, trimmed.
    pub fn title(&self) -> &str {
        self.description.lines().next().unwrap_or_default().trim()
    }

    /// Returns `true` if the description has no text.
    pub fn is_undescribed(&self) -> bool {
        self.description.trim().is_empty()
    }
}

/// An ordered, linear sequence of changes on top of the baseline. Index `0` sits directly on the
/// baseline.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct Stack {
    changes: Vec<Change>,
}

impl Stack {
    /// Creates a [Stack] from changes ordered ancestors first.
    pub fn new(changes: Vec<Change>) -> Self {
        Self { changes }
    }

    /// Reads the stack in `baseline..head` from the backend.
    ///
    /// The baseline is resolved first, so a missing baseline fails before any change is listed.
    /// An empty, undescribed change at the top of the stack (a fresh working copy) is dropped.
    ///
    /// ## Takes
    /// - `vcs` - The version-control backend.
    /// - `baseline` - Revset delimiting the bottom of the stack.
    /// - `head` - Revset of the current position.
    ///
    /// ## Returns
    /// - `Ok(Stack)` - The linear stack.
    /// - `Err(JstError::RefResolution)` - If the baseline cannot be resolved.
    /// - `Err(JstError::NonLinearHistory)` - If the changes do not form a single chain.
    pub fn read<V: Vcs>(vcs: &V, baseline: &str, head: &str) -> JstResult<Self> {
        let baseline_id = vcs.resolve(baseline)?;
        debug!(baseline, %baseline_id, "resolved baseline");

        let mut changes = vcs.list_changes(baseline, head)?;
        if changes
            .last()
            .is_some_and(|c| c.is_empty && c.is_undescribed())
        {
            changes.pop();
        }

        let stack = Self::new(changes);
        stack.ensure_linear()?;
        debug!(len = stack.len(), "read stack");
        Ok(stack)
    }

    /// Rejects any stack that is not a single parent chain rooted outside of the stack.
    fn ensure_linear(&self) -> JstResult<()> {
        for (i, change) in self.changes.iter().enumerate() {
            let [parent] = change.parents.as_slice() else {
                return Err(JstError::NonLinearHistory(change.change_id.to_string()));
            };

            let linked = match i {
                0 => !self.contains(parent),
                _ => *parent == self.changes[i - 1].change_id,
            };
            if !linked {
                return Err(JstError::NonLinearHistory(change.change_id.to_string()));
            }
        }
        Ok(())
    }

    /// Returns the number of changes in the stack.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Returns `true` if the stack has no changes.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Iterates over the changes, baseline side first.
    pub fn iter(&self) -> std::slice::Iter<'_, Change> {
        self.changes.iter()
    }

    /// Returns `true` if the change is part of the stack.
    pub fn contains(&self, change_id: &ChangeId) -> bool {
        self.changes.iter().any(|c| &c.change_id == change_id)
    }

    /// Returns the 1-based position of a change in the stack.
    pub fn position(&self, change_id: &ChangeId) -> Option<usize> {
        self.changes
            .iter()
            .position(|c| &c.change_id == change_id)
            .map(|i| i + 1)
    }

    /// Returns the parent of a change within the stack.
    ///
    /// ## Returns
    /// - `Some(&ChangeId)` - The parent change.
    /// - `None` - The change sits on the baseline, or is not part of the stack.
    pub fn parent_of(&self, change_id: &ChangeId) -> Option<&ChangeId> {
        self.changes
            .iter()
            .find(|c| &c.change_id == change_id)?
            .parents
            .iter()
            .find(|p| self.contains(p))
    }

    /// Returns the changes in the stack whose parent is `change_id`, in stack order.
    pub fn children_of(&self, change_id: &ChangeId) -> Vec<&ChangeId> {
        self.changes
            .iter()
            .filter(|c| c.parents.contains(change_id))
            .map(|c| &c.change_id)
            .collect()
    }
}

impl<'a> IntoIterator for &'a Stack {
    type Item = &'a Change;
    type IntoIter = std::slice::Iter<'a, Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod test {
    use super::{ChangeId, Stack};
    use crate::{
        errors::JstError,
        testing::{change, linear_changes, FakeVcs, BASELINE},
    };

    #[test]
    fn short_id_is_a_fixed_length_prefix() {
        let id = ChangeId::new("kxqzvmrtwoylnpsuqrxy");
        assert_eq!(id.short(), "kxqzvmrtwoyl");
        assert_eq!(ChangeId::new("abc").short(), "abc");
    }

    #[test]
    fn title_is_the_trimmed_first_line() {
        let c = change("aaa111111111", "  Fix parser  \n\nDetails", None);
        assert_eq!(c.title(), "Fix parser");
        assert_eq!(change("aaa111111111", "", None).title(), "");
    }

    #[test]
    fn reads_stack_in_order() {
        let vcs = FakeVcs::new(linear_changes(&[
            ("aaa111111111", "A"),
            ("bbb222222222", "B"),
        ]));
        let stack = Stack::read(&vcs, BASELINE, "@").unwrap();

        assert_eq!(stack.len(), 2);
        assert_eq!(stack.position(&ChangeId::new("bbb222222222")), Some(2));
    }

    #[test]
    fn drops_pristine_working_copy() {
        let mut changes = linear_changes(&[("aaa111111111", "A"), ("ccc333333333", "")]);
        changes[1].is_empty = true;
        let stack = Stack::read(&FakeVcs::new(changes), BASELINE, "@").unwrap();

        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn keeps_empty_described_change() {
        let mut changes = linear_changes(&[("aaa111111111", "A"), ("ccc333333333", "WIP")]);
        changes[1].is_empty = true;
        let stack = Stack::read(&FakeVcs::new(changes), BASELINE, "@").unwrap();

        assert_eq!(stack.len(), 2);
    }

    #[test]
    fn unresolvable_baseline_is_fatal() {
        let vcs = FakeVcs::new(linear_changes(&[("aaa111111111", "A")]));
        let err = Stack::read(&vcs, "nope()", "@").unwrap_err();

        assert!(matches!(err, JstError::RefResolution { .. }));
    }

    #[test]
    fn rejects_merges() {
        let mut changes = linear_changes(&[("aaa111111111", "A"), ("bbb222222222", "B")]);
        changes[1].parents.push(ChangeId::new("xxx999999999"));
        let err = Stack::read(&FakeVcs::new(changes), BASELINE, "@").unwrap_err();

        assert!(matches!(err, JstError::NonLinearHistory(id) if id == "bbb222222222"));
    }

    #[test]
    fn rejects_forks() {
        let changes = vec![
            change("aaa111111111", "A", None),
            change("bbb222222222", "B", Some("aaa111111111")),
            change("ccc333333333", "C", Some("aaa111111111")),
        ];
        let err = Stack::read(&FakeVcs::new(changes), BASELINE, "@").unwrap_err();

        assert!(matches!(err, JstError::NonLinearHistory(id) if id == "ccc333333333"));
    }

    #[test]
    fn parent_and_children() {
        let stack = Stack::new(linear_changes(&[
            ("aaa111111111", "A"),
            ("bbb222222222", "B"),
            ("ccc333333333", "C"),
        ]));
        let a = ChangeId::new("aaa111111111");
        let b = ChangeId::new("bbb222222222");

        assert_eq!(stack.parent_of(&a), None);
        assert_eq!(stack.parent_of(&b), Some(&a));
        assert_eq!(
            stack.children_of(&b),
            vec![&ChangeId::new("ccc333333333")]
        );
    }

    #[test]
    fn children_of_a_fork() {
        let stack = Stack::new(vec![
            change("aaa111111111", "A", None),
            change("bbb222222222", "B", Some("aaa111111111")),
            change("ccc333333333", "C", Some("aaa111111111")),
        ]);

        assert_eq!(stack.children_of(&ChangeId::new("aaa111111111")).len(), 2);
    }
}
