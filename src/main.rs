// Copyright 2025 Cornell University
// released under MIT License

use aiger_batch::config::{BatchConfig, ConverterForm, SourcePolicy};
use aiger_batch::orchestrator::{Orchestrator, Pipeline};
use anyhow::Context;
use clap::{Args, ColorChoice, Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use log::debug;
use std::path::PathBuf;

// From the root of a benchmark checkout that contains `aigtoaig` and `abc`, run:
// $ cargo run -- --root ./ zero-fold

/// Args for the batch CLI
#[derive(Parser, Debug)]
#[command(version, about, long_about = None, disable_version_flag = true)]
struct Cli {
    /// Root of the corpus
    #[arg(short, long, value_name = "DIR", default_value = "./")]
    root: PathBuf,

    /// Path to the AIGER converter
    #[arg(long, value_name = "AIGTOAIG", default_value = "./aigtoaig")]
    converter: PathBuf,

    /// Path to abc
    #[arg(long, value_name = "ABC", default_value = "./abc")]
    abc: PathBuf,

    /// Extension of the files that get transformed
    #[arg(long, value_name = "EXT", default_value = ".aig")]
    source_ext: String,

    /// Extension of the converted files
    #[arg(long, value_name = "EXT", default_value = ".aag")]
    target_ext: String,

    /// Users can specify `-v` or `--verbose` to see skipped files,
    /// `-q` to hide the commands
    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,

    /// To suppress colors in log messages, pass in `--color never`
    #[arg(long, value_name = "COLOR_CHOICE", default_value = "auto")]
    color: ColorChoice,

    #[command(subcommand)]
    job: Job,
}

#[derive(Subcommand, Debug)]
enum Job {
    /// Convert every source file into the target format
    Convert {
        /// Delete each source file once it has been converted
        #[arg(long)]
        delete_source: bool,

        /// Use `aigtoaig -a <in>` and write its stdout into the output file
        #[arg(long)]
        ascii_stdout: bool,
    },
    /// Run `zero ; fold2` on every file and convert the whole corpus afterwards
    ZeroFold(FoldArgs),
    /// Run `fold` on every file and write the result into a `folded_` directory
    Fold(FoldArgs),
}

#[derive(Args, Debug)]
struct FoldArgs {
    /// Only transform files below this directory (relative to the root)
    #[arg(short, long, value_name = "DIR", default_value = "hwmcc20")]
    subtree: PathBuf,

    /// Transform files anywhere below the root instead of only in the subtree
    #[arg(long, conflicts_with = "subtree")]
    whole_root: bool,
}

impl FoldArgs {
    fn subtree(self) -> Option<PathBuf> {
        if self.whole_root {
            None
        } else {
            Some(self.subtree)
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Parse CLI args
    let cli = Cli::parse();

    // For concision, we disable timestamps in the log
    let mut logger = env_logger::Builder::new();
    logger
        .format_timestamp(None)
        .format_target(false)
        .filter_level(cli.verbosity.log_level_filter());
    if cli.color == ColorChoice::Never {
        logger.write_style(env_logger::WriteStyle::Never);
    }
    logger.init();

    let mut conf = BatchConfig {
        root: cli.root,
        source_ext: cli.source_ext,
        target_ext: cli.target_ext,
        converter: cli.converter,
        simplifier: cli.abc,
        ..Default::default()
    };
    let pipeline = match cli.job {
        Job::Convert {
            delete_source,
            ascii_stdout,
        } => {
            if ascii_stdout {
                conf.converter_form = ConverterForm::AsciiToStdout;
            }
            let policy = if delete_source {
                SourcePolicy::Delete
            } else {
                SourcePolicy::Keep
            };
            Pipeline::Convert(policy)
        }
        Job::ZeroFold(args) => {
            conf.subtree = args.subtree();
            Pipeline::ZeroThenFold
        }
        Job::Fold(args) => {
            conf.subtree = args.subtree();
            Pipeline::FoldRelocate
        }
    };

    let mut orchestrator = Orchestrator::new(conf).context("failed to set up the batch")?;
    let report = orchestrator.run(pipeline);
    for output in report.outputs() {
        debug!("wrote {}", output.display());
    }
    println!("{}", report.summary());

    match report.into_result() {
        Ok(_) => Ok(()),
        Err(failure) => {
            let err = anyhow::Error::new(failure.error);
            Err(match failure.input {
                Some(input) => err.context(format!(
                    "{} failed on {}",
                    failure.step,
                    input.display()
                )),
                None => err.context(format!("{} could not start", failure.step)),
            })
        }
    }
}
