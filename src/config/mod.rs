//! Configuration module
//!
//! Resolves harness options from a project config file (`slimtest.yaml`,
//! `slimtest.yml`, or `slimtest.json`) found by walking up parent
//! directories from the start directory, then applies CLI overrides and
//! normalizes every field.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Config file names probed in each ancestor directory
pub const CONFIG_FILES: [&str; 3] = ["slimtest.yaml", "slimtest.yml", "slimtest.json"];

/// Partial options, as read from a config file or CLI overrides
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawOptions {
    /// Directory holding test files, relative to the project root
    pub test_dir: Option<PathBuf>,

    /// Directory holding subject modules, relative to the project root
    pub src_dir: Option<PathBuf>,

    /// Test file extension recognized by discovery
    pub extension: Option<String>,

    /// Skip remaining work once any unit fails
    pub fail_fast: Option<bool>,

    /// Maximum number of concurrently executing test files
    pub max_concur: Option<usize>,

    /// Width of the progress bar, in blocks
    pub progress_size: Option<usize>,

    /// Maximum stack frames shown per failure, beyond the header
    pub stack_limit: Option<usize>,

    /// Report per-method success/skip lines, not only failures
    pub expand_all: Option<bool>,

    /// Dump resolved options and debug logging
    pub verbose: Option<bool>,
}

impl RawOptions {
    /// Load partial options from a file, parsed by extension
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read config file")?;

        let raw: Self = if path
            .as_ref()
            .extension()
            .map(|e| e == "yaml" || e == "yml")
            .unwrap_or(false)
        {
            serde_yaml::from_str(&content).context("Failed to parse YAML config")?
        } else {
            serde_json::from_str(&content).context("Failed to parse JSON config")?
        };

        Ok(raw)
    }

    /// Overlay `overrides` on top of `self`; set fields in `overrides` win
    pub fn merge(self, overrides: RawOptions) -> RawOptions {
        RawOptions {
            test_dir: overrides.test_dir.or(self.test_dir),
            src_dir: overrides.src_dir.or(self.src_dir),
            extension: overrides.extension.or(self.extension),
            fail_fast: overrides.fail_fast.or(self.fail_fast),
            max_concur: overrides.max_concur.or(self.max_concur),
            progress_size: overrides.progress_size.or(self.progress_size),
            stack_limit: overrides.stack_limit.or(self.stack_limit),
            expand_all: overrides.expand_all.or(self.expand_all),
            verbose: overrides.verbose.or(self.verbose),
        }
    }
}

/// Fully resolved harness options
#[derive(Clone, Debug)]
pub struct Options {
    pub root: PathBuf,
    pub test_dir: PathBuf,
    pub src_dir: PathBuf,
    pub extension: String,
    pub fail_fast: bool,
    pub max_concur: usize,
    pub progress_size: usize,
    pub stack_limit: usize,
    pub expand_all: bool,
    pub verbose: bool,
}

impl Default for Options {
    fn default() -> Self {
        normalize(PathBuf::from("."), RawOptions::default())
    }
}

impl Options {
    pub fn with_dirs(mut self, test_dir: impl Into<PathBuf>, src_dir: impl Into<PathBuf>) -> Self {
        self.test_dir = test_dir.into();
        self.src_dir = src_dir.into();
        self
    }

    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    pub fn with_max_concur(mut self, max_concur: usize) -> Self {
        self.max_concur = max_concur;
        self
    }

    pub fn with_expand_all(mut self, expand_all: bool) -> Self {
        self.expand_all = expand_all;
        self
    }

    pub fn with_stack_limit(mut self, stack_limit: usize) -> Self {
        self.stack_limit = stack_limit;
        self
    }

    pub fn with_progress_size(mut self, progress_size: usize) -> Self {
        self.progress_size = progress_size;
        self
    }
}

/// Resolve options starting from the current directory
pub fn resolve(overrides: RawOptions) -> Result<Options> {
    let start = std::env::current_dir().context("Failed to determine working directory")?;
    resolve_from(start, overrides)
}

/// Resolve options starting from an explicit directory
///
/// The nearest ancestor directory containing a config file becomes the
/// project root; with no config file anywhere, defaults apply rooted at the
/// start directory.
pub fn resolve_from(start: impl Into<PathBuf>, overrides: RawOptions) -> Result<Options> {
    let start = start.into();
    let (root, from_file) = find_config(&start)?;
    let options = normalize(root, from_file.merge(overrides));

    if options.verbose {
        debug!("root: {}", options.root.display());
        debug!("test_dir: {}", options.test_dir.display());
        debug!("src_dir: {}", options.src_dir.display());
        debug!("extension: {}", options.extension);
        debug!("fail_fast: {}", options.fail_fast);
        debug!("max_concur: {}", options.max_concur);
        debug!("progress_size: {}", options.progress_size);
        debug!("stack_limit: {}", options.stack_limit);
        debug!("expand_all: {}", options.expand_all);
    }

    Ok(options)
}

fn find_config(start: &Path) -> Result<(PathBuf, RawOptions)> {
    let mut dir = start;
    loop {
        for name in CONFIG_FILES {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Ok((dir.to_path_buf(), RawOptions::load(&candidate)?));
            }
        }
        match dir.parent() {
            Some(parent) => dir = parent,
            None => return Ok((start.to_path_buf(), RawOptions::default())),
        }
    }
}

fn normalize(root: PathBuf, raw: RawOptions) -> Options {
    let test_dir = root.join(raw.test_dir.unwrap_or_else(|| PathBuf::from("test")));
    let src_dir = root.join(raw.src_dir.unwrap_or_else(|| PathBuf::from("src")));
    Options {
        test_dir,
        src_dir,
        extension: raw.extension.unwrap_or_else(|| "rs".to_string()),
        fail_fast: raw.fail_fast.unwrap_or(false),
        max_concur: raw.max_concur.filter(|n| *n > 0).unwrap_or(10),
        progress_size: raw.progress_size.filter(|n| *n > 0).unwrap_or(40),
        stack_limit: raw.stack_limit.unwrap_or(5),
        expand_all: raw.expand_all.unwrap_or(true),
        verbose: raw.verbose.unwrap_or(false),
        root,
    }
}
