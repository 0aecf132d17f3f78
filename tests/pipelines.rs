// Copyright 2025 Cornell University
// released under MIT License

// End-to-end runs against stub tools written as shell scripts.
#![cfg(unix)]

use aiger_batch::config::{BatchConfig, ConverterForm, SourcePolicy};
use aiger_batch::errors::BatchError;
use aiger_batch::orchestrator::{FileState, Orchestrator, Pipeline, Step};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// `aigtoaig <in> <out>` / `aigtoaig -a <in>`, copies the input
const CONVERTER: &str = r#"
if [ "$1" = "-a" ]; then cat "$2"; else cp "$1" "$2"; fi
"#;

/// `abc -c "read <in>; ... ; write_aiger <out>"`, copies the input
const ABC: &str = r#"
script="$2"
out="${script##*write_aiger }"
in="${script#read }"
in="${in%%;*}"
cp "$in" "$out"
"#;

const FAILING: &str = "exit 1";

struct Setup {
    corpus: TempDir,
    // tools live outside of the corpus so that they are not picked up by the walk
    _tools: TempDir,
    conf: BatchConfig,
}

impl Setup {
    fn new(files: &[&str], converter: &str, abc: &str) -> Self {
        let corpus = TempDir::new().unwrap();
        for f in files {
            let path = corpus.path().join(f);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, format!("aig {f}\n")).unwrap();
        }
        let tools = TempDir::new().unwrap();
        let conf = BatchConfig {
            converter: write_tool(tools.path(), "aigtoaig", converter),
            simplifier: write_tool(tools.path(), "abc", abc),
            ..BatchConfig::with_root(corpus.path())
        };
        Self {
            corpus,
            _tools: tools,
            conf,
        }
    }

    fn path(&self, rel: &str) -> PathBuf {
        self.corpus.path().join(rel)
    }
}

fn write_tool(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[test]
fn convert_keeps_the_original() {
    let s = Setup::new(&["a.aig"], CONVERTER, ABC);
    let report = Orchestrator::new(s.conf.clone())
        .unwrap()
        .run(Pipeline::Convert(SourcePolicy::Keep));
    assert!(report.is_success(), "{}", report.summary());
    assert!(s.path("a.aig").exists());
    assert_eq!(fs::read_to_string(s.path("a.aag")).unwrap(), "aig a.aig\n");
}

#[test]
fn convert_through_stdout_and_delete() {
    let mut s = Setup::new(&["a.aig", "deep/er/b.aig"], CONVERTER, ABC);
    s.conf.converter_form = ConverterForm::AsciiToStdout;
    let report = Orchestrator::new(s.conf.clone())
        .unwrap()
        .run(Pipeline::Convert(SourcePolicy::Delete));
    assert!(report.is_success(), "{}", report.summary());
    assert!(!s.path("a.aig").exists());
    assert!(!s.path("deep/er/b.aig").exists());
    assert_eq!(
        fs::read_to_string(s.path("deep/er/b.aag")).unwrap(),
        "aig deep/er/b.aig\n"
    );
    insta::assert_snapshot!(report.summary(), @"2 file(s) transformed, 0 rejected, 2 source(s) deleted");
}

#[test]
fn zero_then_fold_then_convert() {
    let mut s = Setup::new(&["hwmcc20/m.aig"], CONVERTER, ABC);
    s.conf.subtree = Some(PathBuf::from("hwmcc20"));
    let report = Orchestrator::new(s.conf.clone())
        .unwrap()
        .run(Pipeline::ZeroThenFold);
    assert!(report.is_success(), "{}", report.summary());

    assert!(s.path("hwmcc20/m.aig").exists());
    assert!(s.path("hwmcc20/m_zeroed_then_folded.aig").exists());
    assert!(s.path("hwmcc20/m_zeroed_then_folded.aag").exists());
    let derived = s.path("hwmcc20/m_zeroed_then_folded.aag");
    assert!(report.outputs().contains(&derived.as_path()));

    let steps: Vec<Step> = report.transformed().map(|o| o.step).collect();
    assert_eq!(steps[0], Step::ZeroThenFold);
    assert!(steps[1..]
        .iter()
        .all(|step| *step == Step::Convert(SourcePolicy::Keep)));
    // original and derived file both get converted
    assert_eq!(steps.len(), 3);
}

#[test]
fn fold_into_mirrored_directory() {
    let mut s = Setup::new(&["hwmcc20/sub/n.aig"], CONVERTER, ABC);
    s.conf.subtree = Some(PathBuf::from("hwmcc20"));
    let mut orchestrator = Orchestrator::new(s.conf.clone()).unwrap();
    let report = orchestrator.run(Pipeline::FoldRelocate);
    assert!(report.is_success(), "{}", report.summary());

    assert!(s.path("hwmcc20/folded_sub").is_dir());
    assert_eq!(
        fs::read_to_string(s.path("hwmcc20/folded_sub/n_folded.aig")).unwrap(),
        "aig hwmcc20/sub/n.aig\n"
    );

    // running again reuses the existing directory and skips the derived file
    let report = orchestrator.run(Pipeline::FoldRelocate);
    assert!(report.is_success(), "{}", report.summary());
    assert_eq!(report.transformed().count(), 1);
    assert!(report
        .rejected()
        .any(|o| o.input.ends_with("folded_sub/n_folded.aig")));
}

#[test]
fn fold_uses_the_hwmcc20_layout_by_default() {
    // only the tool paths differ from the stock configuration
    let s = Setup::new(&["hwmcc20/sub/n.aig", "other/o.aig"], CONVERTER, ABC);
    let report = Orchestrator::new(s.conf.clone())
        .unwrap()
        .run(Pipeline::FoldRelocate);
    assert!(report.is_success(), "{}", report.summary());
    assert!(s.path("hwmcc20/folded_sub/n_folded.aig").exists());
    // files outside of the subtree are not touched
    assert!(!s.path("folded_other").exists());
    assert_eq!(report.transformed().count(), 1);
}

#[test]
fn failing_converter_stops_the_batch() {
    let s = Setup::new(&["x.aig", "y.aig"], FAILING, ABC);
    let report = Orchestrator::new(s.conf.clone())
        .unwrap()
        .run(Pipeline::Convert(SourcePolicy::Keep));
    let failure = report.into_result().unwrap_err();
    assert!(matches!(failure.error, BatchError::ToolFailed { .. }));
    assert!(!s.path("x.aag").exists());
    assert!(!s.path("y.aag").exists());
}

#[test]
fn failing_redirect_leaves_no_output() {
    let mut s = Setup::new(&["x.aig"], "echo half; exit 1", ABC);
    s.conf.converter_form = ConverterForm::AsciiToStdout;
    let report = Orchestrator::new(s.conf.clone())
        .unwrap()
        .run(Pipeline::Convert(SourcePolicy::Delete));
    assert!(!report.is_success());
    assert!(s.path("x.aig").exists());
    assert!(!s.path("x.aag").exists());
}

#[test]
fn failing_abc_skips_the_conversion() {
    let mut s = Setup::new(&["hwmcc20/m.aig"], CONVERTER, FAILING);
    s.conf.subtree = Some(PathBuf::from("hwmcc20"));
    let report = Orchestrator::new(s.conf.clone())
        .unwrap()
        .run(Pipeline::ZeroThenFold);
    let failure = report.failure.as_ref().unwrap();
    assert_eq!(failure.step, Step::ZeroThenFold);
    assert!(report.outcomes.is_empty());
    assert!(!s.path("hwmcc20/m.aag").exists());
}

#[test]
fn unrelated_files_are_left_alone() {
    let s = Setup::new(&["README.md", "b.aag", "c.aig.bak"], CONVERTER, ABC);
    let report = Orchestrator::new(s.conf.clone())
        .unwrap()
        .run(Pipeline::Convert(SourcePolicy::Delete));
    assert!(report.is_success());
    assert_eq!(report.transformed().count(), 0);
    assert!(report
        .outcomes
        .iter()
        .all(|o| matches!(o.state, FileState::Rejected(_))));
    assert!(s.path("c.aig.bak").exists());
}

#[test]
fn cli_stops_after_the_failing_command() {
    let s = Setup::new(&["x.aig", "y.aig", "z.aig"], FAILING, ABC);
    let out = Command::new(env!("CARGO_BIN_EXE_aiger-batch"))
        .arg("--root")
        .arg(s.corpus.path())
        .arg("--converter")
        .arg(&s.conf.converter)
        .arg("--color")
        .arg("never")
        .arg("convert")
        .output()
        .unwrap();
    assert!(!out.status.success());

    let stderr = String::from_utf8_lossy(&out.stderr);
    // log lines look like `[INFO ] ...`, the final error is printed without brackets
    let log_lines: Vec<&str> = stderr.lines().filter(|l| l.starts_with('[')).collect();
    let commands: Vec<&str> = log_lines
        .iter()
        .copied()
        .filter(|l| l.contains("aigtoaig "))
        .collect();
    // only the failing command was issued and nothing was logged after it
    assert_eq!(commands.len(), 1, "{stderr}");
    assert_eq!(log_lines.last(), Some(&commands[0]), "{stderr}");
    assert!(stderr.contains("failed with"), "{stderr}");
    for f in ["x.aag", "y.aag", "z.aag"] {
        assert!(!s.path(f).exists());
    }
}

#[test]
fn cli_converts_a_corpus() {
    let s = Setup::new(&["a.aig", "sub/b.aig"], CONVERTER, ABC);
    let out = Command::new(env!("CARGO_BIN_EXE_aiger-batch"))
        .arg("-r")
        .arg(s.corpus.path())
        .arg("--converter")
        .arg(&s.conf.converter)
        .arg("-q")
        .arg("convert")
        .output()
        .unwrap();
    assert!(out.status.success());
    insta::assert_snapshot!(String::from_utf8_lossy(&out.stdout).trim().to_string(), @"2 file(s) transformed, 0 rejected");
    assert!(s.path("sub/b.aag").exists());
}
