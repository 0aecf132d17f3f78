// Copyright 2025 Cornell University
// released under MIT License

//! # Batch driver
//! Walks the corpus, filters the files, derives output names and runs the tools.
//! Execution is strictly sequential and stops at the first failure.

use crate::config::{BatchConfig, SourcePolicy};
use crate::discover::Corpus;
use crate::errors::{BatchError, Result};
use crate::naming::{ensure_dir, NamingPolicy};
use crate::predicates::{PathFilter, Rejection};
use crate::runner::{require_tool, CommandRunner, ProcessRunner};
use crate::tools::{convert_command, simplify_command, ToolCommand};
use log::{debug, info, warn};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// The jobs that can be run over a corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pipeline {
    /// `.aig` -> `.aag` for every file in the corpus.
    Convert(SourcePolicy),
    /// zero + fold into a tagged sibling, then convert the whole corpus.
    ZeroThenFold,
    /// fold into a mirrored directory tree.
    FoldRelocate,
}

impl Pipeline {
    pub fn steps(&self) -> Vec<Step> {
        match self {
            Pipeline::Convert(policy) => vec![Step::Convert(*policy)],
            // the converted counterparts of the new artifacts are wanted, never delete here
            Pipeline::ZeroThenFold => {
                vec![Step::ZeroThenFold, Step::Convert(SourcePolicy::Keep)]
            }
            Pipeline::FoldRelocate => vec![Step::FoldRelocate],
        }
    }
}

/// A single pass over the corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Convert(SourcePolicy),
    ZeroThenFold,
    FoldRelocate,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Convert(SourcePolicy::Keep) => write!(f, "convert"),
            Step::Convert(SourcePolicy::Delete) => write!(f, "convert (delete sources)"),
            Step::ZeroThenFold => write!(f, "zero-then-fold"),
            Step::FoldRelocate => write!(f, "fold"),
        }
    }
}

/// Terminal state of a discovered file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileState {
    Rejected(Rejection),
    SourceRetained { output: PathBuf },
    SourceDeleted { output: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    pub step: Step,
    pub input: PathBuf,
    pub state: FileState,
}

impl FileOutcome {
    pub fn output(&self) -> Option<&Path> {
        match &self.state {
            FileState::Rejected(_) => None,
            FileState::SourceRetained { output } | FileState::SourceDeleted { output } => {
                Some(output.as_path())
            }
        }
    }
}

/// The error that aborted a batch.
#[derive(Debug)]
pub struct BatchFailure {
    pub step: Step,
    /// `None` if the batch failed before any file was looked at.
    pub input: Option<PathBuf>,
    pub error: BatchError,
}

/// Everything that happened during a batch, in processing order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<FileOutcome>,
    pub failure: Option<BatchFailure>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    pub fn transformed(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes.iter().filter(|o| o.output().is_some())
    }

    pub fn rejected(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes.iter().filter(|o| o.output().is_none())
    }

    /// Outputs produced by the batch, in the order they were written.
    pub fn outputs(&self) -> Vec<&Path> {
        self.outcomes.iter().filter_map(|o| o.output()).collect()
    }

    /// One line that describes the batch.
    pub fn summary(&self) -> String {
        let transformed = self.transformed().count();
        let deleted = self
            .outcomes
            .iter()
            .filter(|o| matches!(o.state, FileState::SourceDeleted { .. }))
            .count();
        let mut out = format!(
            "{transformed} file(s) transformed, {} rejected",
            self.rejected().count()
        );
        if deleted > 0 {
            out.push_str(&format!(", {deleted} source(s) deleted"));
        }
        if let Some(failure) = &self.failure {
            match &failure.input {
                Some(input) => out.push_str(&format!(
                    "; {} aborted at `{}`: {}",
                    failure.step,
                    input.display(),
                    failure.error
                )),
                None => out.push_str(&format!("; {} aborted: {}", failure.step, failure.error)),
            }
        }
        out
    }

    /// Turns a failed batch into its error.
    pub fn into_result(self) -> std::result::Result<Self, BatchFailure> {
        match self.failure {
            Some(failure) => Err(failure),
            None => Ok(self),
        }
    }
}

/// Drives the batch. Generic over the runner so that tool execution can be replaced.
pub struct Orchestrator<R: CommandRunner = ProcessRunner> {
    config: BatchConfig,
    runner: R,
}

impl Orchestrator<ProcessRunner> {
    pub fn new(config: BatchConfig) -> Result<Self> {
        Self::with_runner(config, ProcessRunner::default())
    }
}

impl<R: CommandRunner> Orchestrator<R> {
    pub fn with_runner(config: BatchConfig, runner: R) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, runner })
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Runs every step of `pipeline` over the corpus.
    pub fn run(&mut self, pipeline: Pipeline) -> BatchReport {
        let mut report = BatchReport::default();
        for step in pipeline.steps() {
            let files = match self.preflight(step) {
                Ok(corpus) => {
                    info!("{step}: scanning {}", corpus.root().display());
                    corpus.files().collect::<Vec<_>>()
                }
                Err(error) => {
                    report.failure = Some(BatchFailure {
                        step,
                        input: None,
                        error,
                    });
                    return report;
                }
            };
            if !self.run_files(step, files, &mut report) {
                return report;
            }
        }
        report
    }

    /// Runs a single step over an explicit list of files instead of scanning the corpus,
    /// e.g. to retry the file a previous batch failed on.
    pub fn run_step(
        &mut self,
        step: Step,
        files: impl IntoIterator<Item = PathBuf>,
    ) -> BatchReport {
        let mut report = BatchReport::default();
        if let Err(error) = self.preflight(step) {
            report.failure = Some(BatchFailure {
                step,
                input: None,
                error,
            });
            return report;
        }
        self.run_files(step, files, &mut report);
        report
    }

    /// Returns false if the batch has to stop.
    fn run_files(
        &mut self,
        step: Step,
        files: impl IntoIterator<Item = PathBuf>,
        report: &mut BatchReport,
    ) -> bool {
        let filter = self.filter(step);
        let naming = self.naming(step);
        for input in files {
            match self.process(step, &filter, &naming, &input) {
                Ok(state) => report.outcomes.push(FileOutcome { step, input, state }),
                Err(error) => {
                    report.failure = Some(BatchFailure {
                        step,
                        input: Some(input),
                        error,
                    });
                    return false;
                }
            }
        }
        true
    }

    fn process(
        &mut self,
        step: Step,
        filter: &PathFilter,
        naming: &NamingPolicy,
        input: &Path,
    ) -> Result<FileState> {
        if let Err(rejection) = filter.check(input) {
            debug!("{step}: skipping {} ({rejection:?})", input.display());
            return Ok(FileState::Rejected(rejection));
        }
        let derivation = match naming.derive(input) {
            Ok(d) => d,
            Err(e) => {
                warn!("{step}: skipping {e}");
                return Ok(FileState::Rejected(Rejection::Malformed(e.to_string())));
            }
        };
        if let Some(dir) = &derivation.mkdir {
            ensure_dir(dir)?;
        }
        let cmd = self.command(step, input, &derivation.output);
        self.runner.run(&cmd)?;

        let output = derivation.output;
        match step {
            Step::Convert(SourcePolicy::Delete) => {
                fs::remove_file(input).map_err(|source| BatchError::RemoveSource {
                    path: input.to_path_buf(),
                    source,
                })?;
                Ok(FileState::SourceDeleted { output })
            }
            _ => Ok(FileState::SourceRetained { output }),
        }
    }

    /// Checks that the directory to scan and the tool needed by `step` are there.
    fn preflight(&self, step: Step) -> Result<Corpus> {
        let corpus = Corpus::open(self.scan_dir(step))?;
        match step {
            Step::Convert(_) => require_tool(&self.config.converter)?,
            Step::ZeroThenFold | Step::FoldRelocate => require_tool(&self.config.simplifier)?,
        }
        Ok(corpus)
    }

    fn scan_dir(&self, step: Step) -> PathBuf {
        match step {
            Step::Convert(_) => self.config.root.clone(),
            Step::ZeroThenFold | Step::FoldRelocate => self.config.scan_dir(),
        }
    }

    fn filter(&self, step: Step) -> PathFilter {
        match step {
            Step::Convert(_) => PathFilter::source_only(&self.config.source_ext),
            Step::ZeroThenFold | Step::FoldRelocate => {
                PathFilter::not_derived(&self.config.source_ext, self.config.derived_tags())
            }
        }
    }

    fn naming(&self, step: Step) -> NamingPolicy {
        let conf = &self.config;
        match step {
            Step::Convert(_) => NamingPolicy::SwapExtension {
                from: conf.source_ext.clone(),
                to: conf.target_ext.clone(),
            },
            Step::ZeroThenFold => NamingPolicy::SuffixTag {
                ext: conf.source_ext.clone(),
                tag: conf.zero_fold_tag.clone(),
            },
            Step::FoldRelocate => NamingPolicy::MirroredPrefix {
                anchor: conf.scan_dir(),
                ext: conf.source_ext.clone(),
                dir_prefix: conf.fold_dir_prefix.clone(),
                tag: conf.fold_tag.clone(),
            },
        }
    }

    fn command(&self, step: Step, input: &Path, output: &Path) -> ToolCommand {
        let conf = &self.config;
        match step {
            Step::Convert(_) => convert_command(&conf.converter, conf.converter_form, input, output),
            Step::ZeroThenFold => simplify_command(
                &conf.simplifier,
                input,
                &[&conf.zero_pass, &conf.zero_fold_pass],
                output,
            ),
            Step::FoldRelocate => {
                simplify_command(&conf.simplifier, input, &[&conf.fold_pass], output)
            }
        }
    }
}
