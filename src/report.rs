//! Summary of the work a command performed.

use crate::errors::{JstError, JstResult};
use nu_ansi_term::Color;
use std::fmt::Display;
use tracing::warn;

/// Counters of the mutations a command performed, and the items that failed.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct Report {
    pub branches_created: usize,
    pub branches_updated: usize,
    pub branches_up_to_date: usize,
    pub branches_deleted: usize,
    pub branches_kept: usize,
    pub pulls_created: usize,
    pub pulls_updated: usize,
    pub warnings: usize,
    /// One line per failed item.
    pub failures: Vec<String>,
}

impl Report {
    /// Records a per-item failure. Processing continues with the next item.
    pub fn failure(&mut self, what: impl Display, err: &JstError) {
        warn!(%what, %err, "operation failed");
        println!("{} {}: {}", Color::Red.bold().paint("✗"), what, err);
        self.failures.push(format!("{what}: {err}"));
    }

    /// Records a warning that does not count as a failure.
    pub fn warning(&mut self, message: impl Display) {
        warn!("{message}");
        self.warnings += 1;
        println!("{} {}", Color::Yellow.bold().paint("!"), message);
    }

    /// Prints the summary line of a push or sync.
    pub fn print_push_summary(&self) {
        println!(
            "Branches: {} created, {} updated, {} up to date. Pull requests: {} created, {} updated.{}",
            self.branches_created,
            self.branches_updated,
            self.branches_up_to_date,
            self.pulls_created,
            self.pulls_updated,
            self.failure_suffix()
        );
    }

    /// Prints the summary line of a cleanup.
    pub fn print_cleanup_summary(&self) {
        println!(
            "Branches: {} deleted, {} kept.{}",
            self.branches_deleted,
            self.branches_kept,
            self.failure_suffix()
        );
    }

    fn failure_suffix(&self) -> String {
        match self.failures.len() {
            0 => String::new(),
            n => format!(" {}", Color::Red.paint(format!("{n} failed."))),
        }
    }

    /// Turns the report into the command's result: an error if any item failed.
    pub fn finish(self) -> JstResult<()> {
        match self.failures.len() {
            0 => Ok(()),
            n => Err(JstError::PartialFailure(n)),
        }
    }
}
