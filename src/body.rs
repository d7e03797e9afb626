//! Rendering of pull request titles and bodies.
//!
//! The body is the change description followed by a block linking the pull request to its
//! neighbors in the stack:
//!
//! ```text
//! <description>
//!
//! ---
//! - Stack Position: 2 of 3
//! - Parent: #1
//! - Children: #3
//! - Change ID: `<change id>`
//! ```
//!
//! The `Parent` line is omitted for a pull request based on the baseline, the `Children` line when
//! no child has a pull request yet. The body is regenerated in full on every push, so manual edits
//! to it do not survive.

use crate::{
    constants::STACK_BLOCK_SEPARATOR,
    mapping::Mapping,
    stack::{Change, Stack},
};
use itertools::Itertools;

/// Returns the pull request title for a change: the first line of its description.
pub fn title(change: &Change) -> String {
    change.title().to_string()
}

/// Renders the pull request body for `change`.
///
/// ## Takes
/// - `change` - The change the pull request was opened for.
/// - `stack` - The stack containing the change.
/// - `mapping` - Pull requests known for the stack so far.
pub fn format_body(change: &Change, stack: &Stack, mapping: &Mapping) -> String {
    let id = &change.change_id;
    let position = stack.position(id).unwrap_or_default();

    let mut body = String::new();
    let description = change.description.trim_end();
    if !description.is_empty() {
        body.push_str(description);
        body.push_str("\n\n");
    }

    body.push_str(STACK_BLOCK_SEPARATOR);
    body.push('\n');
    body.push_str(&format!("- Stack Position: {} of {}\n", position, stack.len()));

    if let Some(parent) = stack.parent_of(id).and_then(|p| mapping.number(p)) {
        body.push_str(&format!("- Parent: #{parent}\n"));
    }

    let children = stack
        .children_of(id)
        .into_iter()
        .filter_map(|c| mapping.number(c))
        .map(|n| format!("#{n}"))
        .join(", ");
    if !children.is_empty() {
        body.push_str(&format!("- Children: {children}\n"));
    }

    body.push_str(&format!("- Change ID: `{id}`"));
    body
}
