//! Test unit execution
//!
//! A [`TestUnit`] is the execution record of one discovered test file: its
//! derived subject path, display name, overall outcome, and the ordered
//! per-method outcomes. Methods run strictly in declaration order, never
//! concurrently with their own siblings.

use futures::FutureExt;
use indexmap::IndexMap;
use serde::Serialize;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::Options;
use crate::executor::{Harness, RunnerId};
use crate::models::{CheckError, MethodOutcome, Outcome};
use crate::spec::{CheckContext, TestSpec};

/// Execution record of one test file
#[derive(Clone, Debug, Serialize)]
pub struct TestUnit {
    file: PathBuf,
    subject_file: PathBuf,
    name: String,
    outcome: Outcome,
    methods: IndexMap<String, MethodOutcome>,
    #[serde(skip)]
    owner: Option<RunnerId>,
}

impl TestUnit {
    pub(crate) fn new(file: PathBuf, options: &Options, owner: Option<RunnerId>) -> Self {
        // the subject lives at the same relative position under src_dir;
        // a file outside test_dir keeps its full path
        let relative = file.strip_prefix(&options.test_dir).unwrap_or(&file);
        let subject_file = options.src_dir.join(relative);
        let name = display_name(relative, &options.extension);
        Self {
            file,
            subject_file,
            name,
            outcome: Outcome::Succeeded,
            methods: IndexMap::new(),
            owner,
        }
    }

    /// Synthesize a pre-skipped unit for a file that was never launched
    pub(crate) fn skipped(file: PathBuf, options: &Options, owner: Option<RunnerId>) -> Self {
        let mut unit = Self::new(file, options, owner);
        unit.outcome = Outcome::Skipped;
        unit
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn subject_file(&self) -> &Path {
        &self.subject_file
    }

    /// Display name: relative path with separators rendered as `" : "` and
    /// the extension stripped
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Per-method outcomes, in declaration order
    pub fn methods(&self) -> &IndexMap<String, MethodOutcome> {
        &self.methods
    }

    pub(crate) fn owner(&self) -> Option<RunnerId> {
        self.owner
    }

    /// Run every check method of `spec` in order, converting failures to
    /// data; the unit itself never propagates a method error
    pub(crate) async fn execute(mut self, spec: TestSpec, harness: &Harness) -> Self {
        debug!("running {}", self.name);
        for method in spec.into_methods() {
            let name = method.name().to_string();

            if harness.options().fail_fast && self.outcome.is_failure() {
                self.methods.insert(name, MethodOutcome::Skipped);
                continue;
            }

            // recorded optimistically, replaced on failure
            self.methods.insert(name.clone(), MethodOutcome::Succeeded);
            let context = CheckContext::new(
                self.file.clone(),
                self.subject_file.clone(),
                harness.clone(),
            );
            match AssertUnwindSafe(method.invoke(context)).catch_unwind().await {
                Ok(Ok(())) => {}
                Ok(Err(error)) => self.record_failure(name, CheckError::from(error)),
                Err(payload) => self.record_failure(name, CheckError::from_panic(payload)),
            }
        }
        self
    }

    fn record_failure(&mut self, method: String, error: CheckError) {
        debug!("{} - {} failed: {}", self.name, method, error);
        self.outcome = Outcome::Failed;
        self.methods.insert(method, MethodOutcome::Failed(error));
    }
}

fn display_name(relative: &Path, extension: &str) -> String {
    let name = relative
        .components()
        .map(|part| part.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" : ");
    let suffix = format!(".{extension}");
    name.strip_suffix(&suffix).map(str::to_string).unwrap_or(name)
}
