//! Test spec definitions and check contexts
//!
//! A spec is an ordered collection of named, zero-argument, possibly
//! asynchronous check methods. Each method receives a fresh [`CheckContext`]
//! bound to the unit's subject path; the subject module is resolved lazily
//! through the [`ModuleLoader`] collaborator and memoized.

use anyhow::{anyhow, Result};
use futures::future::{FutureExt, LocalBoxFuture};
use indexmap::IndexMap;
use once_cell::unsync::OnceCell;
use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::executor::Harness;
use crate::models::CheckError;

/// Handle to a lazily-loaded subject module
pub type SubjectHandle = Rc<dyn Any>;

/// Future returned by a check method
pub type CheckFuture = LocalBoxFuture<'static, Result<()>>;

/// One named check method of a spec
pub struct CheckMethod {
    name: String,
    run: Box<dyn Fn(CheckContext) -> CheckFuture>,
}

impl CheckMethod {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn invoke(&self, context: CheckContext) -> CheckFuture {
        (self.run)(context)
    }
}

/// Ordered collection of named check methods defining one test file
#[derive(Default)]
pub struct TestSpec {
    methods: Vec<CheckMethod>,
}

impl TestSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a named check method; declaration order is execution order
    pub fn method<F, Fut>(mut self, name: impl Into<String>, check: F) -> Self
    where
        F: Fn(CheckContext) -> Fut + 'static,
        Fut: Future<Output = Result<()>> + 'static,
    {
        self.methods.push(CheckMethod {
            name: name.into(),
            run: Box::new(move |context| check(context).boxed_local()),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    pub(crate) fn into_methods(self) -> Vec<CheckMethod> {
        self.methods
    }
}

/// Per-method execution context handed to each check
///
/// Carries the unit's file identity, the derived subject path, and a handle
/// to the harness for nested runs.
pub struct CheckContext {
    file: PathBuf,
    subject_file: PathBuf,
    harness: Harness,
    subject: OnceCell<SubjectHandle>,
}

impl CheckContext {
    pub(crate) fn new(file: PathBuf, subject_file: PathBuf, harness: Harness) -> Self {
        Self {
            file,
            subject_file,
            harness,
            subject: OnceCell::new(),
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn subject_file(&self) -> &Path {
        &self.subject_file
    }

    /// Harness handle, usable to trigger a nested run from inside a check
    pub fn harness(&self) -> &Harness {
        &self.harness
    }

    /// The subject module under test, loaded on first access
    pub fn subject(&self) -> Result<SubjectHandle> {
        self.subject
            .get_or_try_init(|| self.harness.loader().load_subject(&self.subject_file))
            .map(Clone::clone)
    }

    /// The subject, downcast to a concrete type
    pub fn subject_as<T: 'static>(&self) -> Result<Rc<T>> {
        self.subject()?.downcast::<T>().map_err(|_| {
            anyhow!(
                "subject {} has an unexpected type",
                self.subject_file.display()
            )
        })
    }

    /// Fail the check unless `condition` holds
    #[track_caller]
    pub fn ensure(&self, condition: bool, what: impl fmt::Display) -> Result<(), CheckError> {
        if condition {
            Ok(())
        } else {
            Err(self.failure(format!("check failed: {what}"), Location::caller()))
        }
    }

    #[track_caller]
    pub fn ensure_eq<T>(&self, left: T, right: T) -> Result<(), CheckError>
    where
        T: PartialEq + fmt::Debug,
    {
        if left == right {
            Ok(())
        } else {
            Err(self.failure(format!("{left:?} != {right:?}"), Location::caller()))
        }
    }

    #[track_caller]
    pub fn ensure_ne<T>(&self, left: T, right: T) -> Result<(), CheckError>
    where
        T: PartialEq + fmt::Debug,
    {
        if left != right {
            Ok(())
        } else {
            Err(self.failure(format!("{left:?} == {right:?}"), Location::caller()))
        }
    }

    /// Build a check error whose stack references the unit's own file, so
    /// the report can trim harness frames away
    fn failure(&self, message: String, location: &Location<'_>) -> CheckError {
        let stack = format!(
            "CheckError: {message}\n    at check ({}:{}:{})",
            self.file.display(),
            location.line(),
            location.column()
        );
        CheckError::new(message).with_stack(stack)
    }
}

/// Module-loading collaborator: maps file identifiers to specs and subject
/// paths to loaded subject handles
pub trait ModuleLoader {
    fn load_spec(&self, file: &Path) -> Result<TestSpec>;
    fn load_subject(&self, path: &Path) -> Result<SubjectHandle>;
}

type SpecFactory = Box<dyn Fn() -> TestSpec>;
type SubjectInit = Box<dyn Fn() -> Result<SubjectHandle>>;

/// Registry-backed [`ModuleLoader`]
///
/// Specs are registered programmatically against the file identifiers that
/// discovery yields; subject constructors are registered against derived
/// subject paths and their handles memoized across contexts.
#[derive(Default)]
pub struct SpecRegistry {
    specs: IndexMap<PathBuf, SpecFactory>,
    subjects: HashMap<PathBuf, SubjectInit>,
    resolved: RefCell<HashMap<PathBuf, SubjectHandle>>,
}

impl SpecRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the spec factory for a test file
    pub fn spec(mut self, file: impl Into<PathBuf>, factory: impl Fn() -> TestSpec + 'static) -> Self {
        self.specs.insert(file.into(), Box::new(factory));
        self
    }

    /// Register a subject constructor for a subject path
    pub fn subject(
        mut self,
        path: impl Into<PathBuf>,
        init: impl Fn() -> Result<SubjectHandle> + 'static,
    ) -> Self {
        self.subjects.insert(path.into(), Box::new(init));
        self
    }

    /// Registered test files, in registration order
    pub fn files(&self) -> Vec<PathBuf> {
        self.specs.keys().cloned().collect()
    }
}

impl ModuleLoader for SpecRegistry {
    fn load_spec(&self, file: &Path) -> Result<TestSpec> {
        let factory = self
            .specs
            .get(file)
            .ok_or_else(|| anyhow!("no spec registered for {}", file.display()))?;
        Ok(factory())
    }

    fn load_subject(&self, path: &Path) -> Result<SubjectHandle> {
        if let Some(handle) = self.resolved.borrow().get(path) {
            return Ok(handle.clone());
        }
        let init = self
            .subjects
            .get(path)
            .ok_or_else(|| anyhow!("no subject registered for {}", path.display()))?;
        let handle = init()?;
        self.resolved
            .borrow_mut()
            .insert(path.to_path_buf(), handle.clone());
        Ok(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Options;
    use crate::models::parse_stack;
    use std::cell::Cell;

    fn context_for(registry: SpecRegistry) -> CheckContext {
        let harness = Harness::new(Options::default(), registry);
        CheckContext::new(
            PathBuf::from("test/math.rs"),
            PathBuf::from("src/math.rs"),
            harness,
        )
    }

    #[test]
    fn spec_preserves_declaration_order() {
        let spec = TestSpec::new()
            .method("first", |_ctx| async { Ok(()) })
            .method("second", |_ctx| async { Ok(()) })
            .method("third", |_ctx| async { Ok(()) });
        let names: Vec<_> = spec.methods.iter().map(|m| m.name().to_string()).collect();
        assert_eq!(names, ["first", "second", "third"]);
    }

    #[test]
    fn registry_lists_files_in_registration_order() {
        let registry = SpecRegistry::new()
            .spec("test/b.rs", TestSpec::new)
            .spec("test/a.rs", TestSpec::new);
        assert_eq!(
            registry.files(),
            [PathBuf::from("test/b.rs"), PathBuf::from("test/a.rs")]
        );
    }

    #[test]
    fn registry_rejects_unknown_files() {
        let registry = SpecRegistry::new();
        assert!(registry.load_spec(Path::new("test/missing.rs")).is_err());
        assert!(registry.load_subject(Path::new("src/missing.rs")).is_err());
    }

    #[test]
    fn subject_is_loaded_lazily_and_memoized() {
        let loads = Rc::new(Cell::new(0));
        let counter = loads.clone();
        let registry = SpecRegistry::new().subject("src/math.rs", move || {
            counter.set(counter.get() + 1);
            Ok(Rc::new(7_i32) as SubjectHandle)
        });
        let context = context_for(registry);

        assert_eq!(loads.get(), 0);
        let first = context.subject_as::<i32>().unwrap();
        let second = context.subject_as::<i32>().unwrap();
        assert_eq!(*first, 7);
        assert_eq!(*second, 7);
        assert_eq!(loads.get(), 1);
    }

    #[test]
    fn subject_memoization_spans_contexts() {
        let loads = Rc::new(Cell::new(0));
        let counter = loads.clone();
        let registry = SpecRegistry::new().subject("src/math.rs", move || {
            counter.set(counter.get() + 1);
            Ok(Rc::new(String::from("module")) as SubjectHandle)
        });
        let harness = Harness::new(Options::default(), registry);
        for _ in 0..3 {
            let context = CheckContext::new(
                PathBuf::from("test/math.rs"),
                PathBuf::from("src/math.rs"),
                harness.clone(),
            );
            context.subject().unwrap();
        }
        assert_eq!(loads.get(), 1);
    }

    #[test]
    fn ensure_eq_failure_carries_parseable_stack() {
        let context = context_for(SpecRegistry::new());
        let error = context.ensure_eq(2 + 2, 5).unwrap_err();
        assert_eq!(error.message(), "4 != 5");

        let frames = parse_stack(error.stack().unwrap());
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].display_text(), "4 != 5");
        assert_eq!(frames[1].file(), Some("test/math.rs"));
    }

    #[test]
    fn ensure_passes_and_fails() {
        let context = context_for(SpecRegistry::new());
        assert!(context.ensure(true, "always holds").is_ok());
        let error = context.ensure(false, "list is sorted").unwrap_err();
        assert_eq!(error.message(), "check failed: list is sorted");
    }

    #[test]
    fn ensure_ne_detects_equality() {
        let context = context_for(SpecRegistry::new());
        assert!(context.ensure_ne(1, 2).is_ok());
        assert!(context.ensure_ne(3, 3).is_err());
    }
}
