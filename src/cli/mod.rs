//! CLI argument parsing and entry point
//!
//! Defines the command-line interface using clap and a ready-made `main`
//! body for user runner binaries: resolve options, discover test files,
//! run, print the report, and map the result to a process exit code.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::config::{self, RawOptions};
use crate::discovery;
use crate::executor::Harness;
use crate::output::Report;
use crate::spec::SpecRegistry;
use crate::utils::init_logger;

/// Minimal async test harness
#[derive(Parser, Debug)]
#[command(name = "slimtest")]
#[command(about = "Run test files with bounded concurrency and a colorized report")]
pub struct Args {
    /// Test files to run (discovered from the test directory when omitted)
    pub files: Vec<PathBuf>,

    /// Skip remaining files once any test fails
    #[arg(short = 'f', long)]
    pub fail_fast: bool,

    /// Show per-method success/skip lines, not only failures
    #[arg(short = 'a', long)]
    pub expand_all: bool,

    /// Maximum number of concurrently executing test files
    #[arg(short = 'c', long)]
    pub max_concur: Option<usize>,

    /// Maximum stack frames shown per failure
    #[arg(long)]
    pub stack_limit: Option<usize>,

    /// Project root (defaults to the nearest ancestor with a config file)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Convert flags into config overrides.
    ///
    /// `expand_all` is always passed through, so the CLI default is off
    /// even when the config file says otherwise; boolean flags that were
    /// not given leave the config value alone.
    pub fn overrides(&self) -> RawOptions {
        RawOptions {
            fail_fast: self.fail_fast.then_some(true),
            expand_all: Some(self.expand_all),
            max_concur: self.max_concur,
            stack_limit: self.stack_limit,
            verbose: self.verbose.then_some(true),
            ..RawOptions::default()
        }
    }
}

/// Complete `main` body for a user runner binary.
///
/// Exit status 0 when every test succeeded, 1 when any failed, 2 on a
/// harness-internal error.
pub fn run_main(registry: SpecRegistry) -> ExitCode {
    let args = Args::parse();
    match execute(args, registry) {
        Ok(report) => {
            if report.has_failures() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(error) => {
            eprintln!("{error:#}");
            ExitCode::from(2)
        }
    }
}

/// Resolve options, discover files, and drive a full run to its report
pub fn execute(args: Args, registry: SpecRegistry) -> Result<Report> {
    let overrides = args.overrides();
    let options = match &args.root {
        Some(root) => config::resolve_from(root.clone(), overrides)?,
        None => config::resolve(overrides)?,
    };
    init_logger(options.verbose);

    let files = if args.files.is_empty() {
        discovery::list_test_files(&options)?
    } else {
        discovery::resolve_files(args.files, &options)
    };

    // test bodies interleave cooperatively on one thread; there is no
    // preemption between await points
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build runtime")?;

    let harness = Harness::new(options, registry);
    let report = runtime.block_on(harness.run(files));
    report.print();
    Ok(report)
}
