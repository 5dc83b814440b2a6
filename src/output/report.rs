//! Report generation
//!
//! Aggregates finished test units into counts and a colorized summary.
//! Built once from a frozen unit list; rendering is pure and
//! deterministic.

use std::fmt;
use std::path::Path;

use crate::config::Options;
use crate::executor::TestUnit;
use crate::models::{parse_stack, MethodOutcome, Outcome};
use crate::output::style;

pub struct Report {
    fail_fast: bool,
    expand_all: bool,
    stack_limit: usize,
    tests: Vec<TestUnit>,
    succeeded: usize,
    failed: usize,
    skipped: usize,
}

impl Report {
    pub fn new(options: &Options, tests: Vec<TestUnit>) -> Self {
        let mut succeeded = 0;
        let mut failed = 0;
        let mut skipped = 0;
        for unit in &tests {
            match unit.outcome() {
                Outcome::Succeeded => succeeded += 1,
                Outcome::Failed => failed += 1,
                Outcome::Skipped => skipped += 1,
            }
        }
        Self {
            fail_fast: options.fail_fast,
            expand_all: options.expand_all,
            stack_limit: options.stack_limit,
            tests,
            succeeded,
            failed,
            skipped,
        }
    }

    pub fn tests(&self) -> &[TestUnit] {
        &self.tests
    }

    pub fn succeeded(&self) -> usize {
        self.succeeded
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// Write the formatted report plus a trailing newline to stdout
    pub fn print(&self) {
        println!("{self}");
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.tests.len();

        let color = if self.succeeded == total {
            style::SUCCESS
        // at least 80% green reads as "mixed", which is not as harsh as
        // "failed" - unless fail-fast is on, in which case we don't know
        // how many skipped tests might otherwise have succeeded
        } else if self.fail_fast || (self.succeeded as f64) / (total as f64) < 0.8 {
            style::FAILED
        } else {
            style::MIXED
        };

        let mut stats = Vec::new();
        if self.succeeded > 0 {
            stats.push(format!("{} succeeded", self.succeeded));
        }
        if self.failed > 0 {
            stats.push(format!("{}{} failed{color}", style::FAILED, self.failed));
        }
        if self.skipped > 0 {
            stats.push(format!(
                "{} {} skipped",
                self.skipped,
                if self.skipped == 1 { "was" } else { "were" }
            ));
        }

        write!(
            f,
            "{color}{total} test{} processed: {}",
            if total == 1 { "" } else { "s" },
            stats.join(", ")
        )?;

        for test in &self.tests {
            if test.outcome() == Outcome::Skipped {
                if self.expand_all {
                    write!(f, "\n{}{} > skipped", style::SKIPPED, test.name())?;
                }
            } else {
                for (method, outcome) in test.methods() {
                    match outcome {
                        MethodOutcome::Succeeded => {
                            if self.expand_all {
                                write!(
                                    f,
                                    "\n{}{} - {} > succeeded",
                                    style::SUCCESS,
                                    test.name(),
                                    method
                                )?;
                            }
                        }
                        MethodOutcome::Skipped => {
                            if self.expand_all {
                                write!(
                                    f,
                                    "\n{}{} - {} > skipped",
                                    style::SKIPPED,
                                    test.name(),
                                    method
                                )?;
                            }
                        }
                        // failures are always shown
                        MethodOutcome::Failed(error) => {
                            write!(f, "\n{}{} - {} > ", style::FAILED, test.name(), method)?;
                            match error.stack() {
                                Some(stack) => f.write_str(&trim_stack(
                                    stack,
                                    test.file(),
                                    self.stack_limit,
                                ))?,
                                None => write!(f, "{error}")?,
                            }
                        }
                    }
                }
            }
        }

        f.write_str(style::RESET)
    }
}

/// Keep frames up to and including the one referencing the unit's own
/// file, bounded by `stack_limit + 1` frames overall
fn trim_stack(stack: &str, file: &Path, stack_limit: usize) -> String {
    let frames = parse_stack(stack);
    let file = file.to_string_lossy();
    let cut = frames
        .iter()
        .rposition(|frame| frame.file() == Some(file.as_ref()))
        .map(|index| index + 1)
        .unwrap_or(frames.len());
    frames[..cut.min(stack_limit + 1)]
        .iter()
        .map(|frame| frame.display_text())
        .collect::<Vec<_>>()
        .join("\n")
}
