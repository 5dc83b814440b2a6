//! Test run orchestration
//!
//! Launches test units under the concurrency bound with a windowed
//! dispatch loop: resource use is bounded by the cap regardless of how
//! many files the run covers. Fail-fast trades completeness for fast
//! feedback without discarding work already started.

use futures::future::LocalBoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use std::path::PathBuf;
use tracing::debug;

use crate::executor::harness::Harness;
use crate::executor::stack::RunnerId;
use crate::executor::unit::TestUnit;
use crate::models::crash;
use crate::output::{Progress, Report};
use crate::utils::Timer;

pub(crate) struct Runner {
    id: RunnerId,
    files: Vec<PathBuf>,
    launched: usize,
    completed: Vec<TestUnit>,
}

impl Runner {
    pub(crate) fn new(harness: &Harness, files: Vec<PathBuf>) -> Self {
        Self {
            id: harness.stack().allocate(),
            files,
            launched: 0,
            completed: Vec::new(),
        }
    }

    pub(crate) async fn start(mut self, harness: &Harness) -> Report {
        let total = self.files.len();
        if total == 0 {
            return Report::new(harness.options(), Vec::new());
        }

        let timer = Timer::start("test run");
        let mut progress = Progress::new(total, harness.options().progress_size);
        harness.stack().push(self.id);

        let mut in_flight: FuturesUnordered<LocalBoxFuture<'_, TestUnit>> =
            FuturesUnordered::new();
        while self.completed.len() < total {
            // fill freed concurrency slots; pushed futures are lazy, so
            // execution is deferred to the next scheduling turn
            while self.launched < total.min(self.completed.len() + harness.options().max_concur) {
                let file = self.files[self.launched].clone();
                self.launched += 1;
                in_flight.push(launch(harness, file, self.id).boxed_local());
            }

            match in_flight.next().await {
                Some(unit) => self.finish(unit, harness, &mut progress),
                None => crash(&"runner lost track of in-flight tests"),
            }
        }

        progress.finish();
        let popped = harness.stack().pop();
        if popped != Some(self.id) {
            crash(&format!(
                "runner stack corrupted: expected runner {}, popped {popped:?}",
                self.id
            ));
        }
        debug!("{} test file(s) completed in {}ms", total, timer.elapsed_ms());
        Report::new(harness.options(), self.completed)
    }

    fn finish(&mut self, unit: TestUnit, harness: &Harness, progress: &mut Progress) {
        if unit.owner() != Some(self.id) {
            crash(&format!(
                "test unit {} reported to the wrong runner",
                unit.name()
            ));
        }
        let failed = unit.outcome().is_failure();
        self.completed.push(unit);

        if harness.options().fail_fast && failed {
            // cancel only files not yet launched; units already in flight
            // still run to completion and land after these
            while self.launched < self.files.len() {
                let file = self.files[self.launched].clone();
                self.launched += 1;
                self.completed
                    .push(TestUnit::skipped(file, harness.options(), Some(self.id)));
            }
        }

        progress.update(&self.completed);
    }
}

/// Build and execute one unit under its owning runner
async fn launch(harness: &Harness, file: PathBuf, owner: RunnerId) -> TestUnit {
    let unit = TestUnit::new(file, harness.options(), Some(owner));
    match harness.loader().load_spec(unit.file()) {
        Ok(spec) => unit.execute(spec, harness).await,
        // a file that cannot load is an error outside any test method
        Err(error) => crash(&format!(
            "failed to load {}: {error:#}",
            unit.file().display()
        )),
    }
}
