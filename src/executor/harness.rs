//! Harness handle
//!
//! Ties the resolved options, the module-loading collaborator, and the
//! runner stack together. Cheap to clone; every clone shares the same
//! runner stack, so nested runs started from inside a check method nest
//! against the enclosing run.

use anyhow::Result;
use std::path::PathBuf;
use std::rc::Rc;

use crate::config::Options;
use crate::executor::runner::Runner;
use crate::executor::stack::RunnerStack;
use crate::executor::unit::TestUnit;
use crate::output::Report;
use crate::spec::ModuleLoader;

#[derive(Clone)]
pub struct Harness {
    options: Rc<Options>,
    loader: Rc<dyn ModuleLoader>,
    stack: RunnerStack,
}

impl Harness {
    pub fn new(options: Options, loader: impl ModuleLoader + 'static) -> Self {
        Self {
            options: Rc::new(options),
            loader: Rc::new(loader),
            stack: RunnerStack::new(),
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub(crate) fn loader(&self) -> &dyn ModuleLoader {
        self.loader.as_ref()
    }

    pub fn stack(&self) -> &RunnerStack {
        &self.stack
    }

    /// Run an ordered list of test files and aggregate their outcomes.
    ///
    /// Resolves exactly once, with a report over every file: real outcomes
    /// for executed units, synthesized skips for units cancelled by
    /// fail-fast. An empty file list resolves immediately with an empty
    /// report.
    pub async fn run(&self, files: Vec<PathBuf>) -> Report {
        Runner::new(self, files).start(self).await
    }

    /// Execute a single test file directly, outside any orchestrated run.
    ///
    /// This is the "run this file directly" path: the unit's report is
    /// printed immediately unless a runner is currently active.
    pub async fn run_spec(&self, file: impl Into<PathBuf>) -> Result<Report> {
        let file = file.into();
        let spec = self.loader.load_spec(&file)?;
        let unit = TestUnit::new(file, self.options(), self.stack.current())
            .execute(spec, self)
            .await;
        let report = Report::new(self.options(), vec![unit]);
        if self.stack.current().is_none() {
            report.print();
        }
        Ok(report)
    }
}
