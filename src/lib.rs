//! slimtest - minimal async test harness
//!
//! Discovers test files, runs them with bounded cooperative concurrency,
//! aggregates pass/fail/skip outcomes, and renders a live progress bar
//! plus a colorized final report.
//!
//! ## Features
//!
//! - Windowed launching: at most `max_concur` test files in flight,
//!   regardless of how many files a run covers
//! - Fail-fast: files not yet launched are skipped once any unit fails;
//!   work already started still runs to completion
//! - Nested runs: a check method can trigger a sub-run of its own without
//!   touching the enclosing run's bookkeeping
//! - Deterministic, colorized reports with failure stacks trimmed to the
//!   frames that matter
//!
//! ## Usage
//!
//! Specs are registered programmatically; a runner binary hands its
//! registry to the CLI entry point:
//!
//! ```no_run
//! use slimtest::{cli, SpecRegistry, TestSpec};
//! use std::process::ExitCode;
//!
//! fn main() -> ExitCode {
//!     let registry = SpecRegistry::new().spec("test/math.rs", || {
//!         TestSpec::new().method("adds", |ctx| async move {
//!             ctx.ensure_eq(2 + 2, 4)?;
//!             Ok(())
//!         })
//!     });
//!     cli::run_main(registry)
//! }
//! ```
//!
//! Options come from a `slimtest.yaml` (or `.json`) found by walking up
//! from the working directory, overridden by CLI flags; the shell exit
//! status is 0 for a green run, 1 when any test failed, and 2 on a
//! harness-internal error.

pub mod cli;
pub mod config;
pub mod discovery;
pub mod executor;
pub mod models;
pub mod output;
pub mod spec;
pub mod utils;

pub use config::{Options, RawOptions};
pub use executor::{Harness, RunnerId, RunnerStack, TestUnit};
pub use models::{CheckError, MethodOutcome, Outcome};
pub use output::Report;
pub use spec::{CheckContext, CheckMethod, ModuleLoader, SpecRegistry, SubjectHandle, TestSpec};
