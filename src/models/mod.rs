//! Data models for test execution
//!
//! Outcome taxonomy, captured check errors, and stack-trace parsing.

mod outcome;
mod stack;

pub use outcome::{CheckError, MethodOutcome, Outcome};
pub use stack::{parse_stack, FrameKind, StackFrame};

/// Bail out of the process on a harness-internal error.
///
/// Used for errors outside the bounds of a test method's execution, such as
/// a runner stack discipline violation. Exit status 2 distinguishes a
/// harness crash from ordinary test failures.
pub fn crash(error: &dyn std::fmt::Display) -> ! {
    eprintln!("{error}");
    std::process::exit(2);
}
