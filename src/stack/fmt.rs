//! Formatting for the [Stack] type.

use super::Stack;
use crate::constants::{COLORS, DIAMOND, EMPTY_CIRCLE, FILLED_CIRCLE, VERTICAL_BOX};
use nu_ansi_term::Color;
use std::fmt::{self, Write};

impl Stack {
    /// Writes a pretty-printed representation of the [Stack] to the passed [Write]r, newest change
    /// first and the baseline last, like `jj log`.
    ///
    /// ## Takes
    /// - `w` - The writer to write the stack to.
    /// - `baseline` - Label of the baseline the stack sits on.
    ///
    /// ## Returns
    /// - `Ok(_)` - Stack successfully written.
    /// - `Err(_)` - If an error occurs while writing the stack.
    pub fn write_stack<W: Write>(&self, w: &mut W, baseline: &str) -> fmt::Result {
        let n = self.len();
        for (i, change) in self.iter().enumerate().rev() {
            let icon = (i + 1 == n).then_some(FILLED_CIRCLE).unwrap_or(EMPTY_CIRCLE);
            let title = if change.is_undescribed() {
                Color::DarkGray.italic().paint("(no description set)").to_string()
            } else {
                change.title().to_string()
            };
            let empty = change
                .is_empty
                .then(|| Color::DarkGray.paint(" (empty)").to_string())
                .unwrap_or_default();

            writeln!(
                w,
                "{} {} {}{}",
                COLORS[i % COLORS.len()].paint(format!("{icon} {}/{n}", i + 1)),
                Color::Purple.paint(change.change_id.short()),
                title,
                empty
            )?;
            writeln!(w, "{}", VERTICAL_BOX)?;
        }
        writeln!(w, "{} {}", DIAMOND, Color::Blue.paint(baseline))
    }
}
