//! Live progress rendering
//!
//! Renders aggregate counts as a single colorized bar on stderr, redrawn
//! in place after every completion. On a non-interactive sink the bar
//! degrades to a one-time announcement and updates are suppressed.

use std::io::Write;

use crate::executor::TestUnit;
use crate::models::Outcome;
use crate::output::style;

pub struct Progress {
    total: usize,
    size: usize,
    header: String,
    succeeded: usize,
    failed: usize,
    skipped: usize,
    completed: usize,
    interactive: bool,
}

impl Progress {
    pub(crate) fn new(total: usize, size: usize) -> Self {
        let header = format!("running {total} test{}", if total == 1 { "" } else { "s" });
        let interactive = atty::is(atty::Stream::Stderr);
        let progress = Self {
            total,
            size,
            header,
            succeeded: 0,
            failed: 0,
            skipped: 0,
            completed: 0,
            interactive,
        };
        if progress.interactive {
            progress.render();
        } else {
            eprintln!("{}...", progress.header);
        }
        progress
    }

    /// Recount from the completed snapshot and redraw
    pub(crate) fn update(&mut self, completed: &[TestUnit]) {
        self.succeeded = 0;
        self.failed = 0;
        self.skipped = 0;
        for unit in completed {
            match unit.outcome() {
                Outcome::Succeeded => self.succeeded += 1,
                Outcome::Failed => self.failed += 1,
                Outcome::Skipped => self.skipped += 1,
            }
        }
        self.completed = completed.len();
        if self.interactive {
            self.render();
        }
    }

    /// Terminate the in-place line before the report prints
    pub(crate) fn finish(&mut self) {
        if self.interactive {
            eprintln!();
        }
    }

    fn render(&self) {
        let mut err = std::io::stderr();
        let _ = write!(err, "\r{}", self.line());
        let _ = err.flush();
    }

    fn line(&self) -> String {
        let mut rest = self.size;
        let mut blocks = String::new();
        for (count, color) in [
            (self.succeeded, style::SUCCESS),
            (self.failed, style::FAILED),
            (self.skipped, style::SKIPPED),
        ] {
            let num = ((self.size * count) as f64 / self.total as f64).round() as usize;
            rest = rest.saturating_sub(num);
            blocks.push_str(color);
            blocks.push_str(&"■".repeat(num));
        }

        let pct = 100 * self.completed / self.total;

        format!(
            "{} {}{}{} {}%",
            self.header,
            blocks,
            style::RESET,
            "·".repeat(rest),
            pct
        )
    }
}
