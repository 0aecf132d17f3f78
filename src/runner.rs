// Copyright 2025 Cornell University
// released under MIT License

use crate::errors::{BatchError, Result};
use crate::tools::ToolCommand;
use log::{info, warn};
use std::fs::{self, File};
use std::path::Path;
use std::process::{Command, Stdio};

/// Executes tool invocations. Implementations must log the command before running it
/// and turn a non-zero exit status into `BatchError::ToolFailed`.
pub trait CommandRunner {
    fn run(&mut self, cmd: &ToolCommand) -> Result<()>;
}

/// Runs the tool as a child process and blocks until it exits.
/// There is no timeout, a hanging tool hangs the batch.
#[derive(Debug, Default)]
pub struct ProcessRunner {}

impl CommandRunner for ProcessRunner {
    fn run(&mut self, cmd: &ToolCommand) -> Result<()> {
        info!("{cmd}");
        let mut proc = Command::new(&cmd.program);
        proc.args(&cmd.args);
        if let Some(out) = &cmd.stdout_to {
            let file = File::create(out).map_err(|source| BatchError::Redirect {
                path: out.clone(),
                source,
            })?;
            proc.stdout(Stdio::from(file));
        }

        let error = match proc.status() {
            Ok(status) if status.success() => return Ok(()),
            Ok(status) => BatchError::ToolFailed {
                command: cmd.to_string(),
                status,
            },
            Err(source) => BatchError::ToolSpawn {
                tool: cmd.program.clone(),
                source,
            },
        };

        // do not leave a truncated redirect target behind
        if let Some(out) = &cmd.stdout_to {
            if let Err(e) = fs::remove_file(out) {
                warn!("failed to remove partial output {}: {e}", out.display());
            }
        }
        Err(error)
    }
}

/// Makes sure that `tool` can be started. Bare names are left to the `PATH` lookup
/// of the OS, anything with a directory component has to exist.
pub fn require_tool(tool: &Path) -> Result<()> {
    let is_bare_name = tool.parent() == Some(Path::new(""));
    if is_bare_name || tool.is_file() {
        Ok(())
    } else {
        Err(BatchError::ToolNotFound(tool.to_path_buf()))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;

    fn stub(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn successful_tool() {
        let dir = tempfile::TempDir::new().unwrap();
        let tool = stub(dir.path(), "ok", "exit 0");
        ProcessRunner::default()
            .run(&ToolCommand::new(tool))
            .unwrap();
    }

    #[test]
    fn failing_tool() {
        let dir = tempfile::TempDir::new().unwrap();
        let tool = stub(dir.path(), "fail", "exit 3");
        let res = ProcessRunner::default().run(&ToolCommand::new(tool).arg("x.aig"));
        match res {
            Err(BatchError::ToolFailed { command, status }) => {
                assert!(command.ends_with("fail x.aig"), "{command}");
                assert_eq!(status.code(), Some(3));
            }
            other => panic!("expected ToolFailed, got {other:?}"),
        }
    }

    #[test]
    fn arguments_are_not_interpreted_by_a_shell() {
        let dir = tempfile::TempDir::new().unwrap();
        let tool = stub(dir.path(), "echo_args", "printf '%s\\n' \"$@\"");
        let out = dir.path().join("out.txt");
        let cmd = ToolCommand::new(tool)
            .arg("a; rm -rf b")
            .arg("$(whoami)")
            .stdout_to(&out);
        ProcessRunner::default().run(&cmd).unwrap();
        assert_eq!(fs::read_to_string(&out).unwrap(), "a; rm -rf b\n$(whoami)\n");
    }

    #[test]
    fn failed_redirect_leaves_no_output() {
        let dir = tempfile::TempDir::new().unwrap();
        let tool = stub(dir.path(), "half", "echo partial; exit 1");
        let out = dir.path().join("x.aag");
        let res = ProcessRunner::default().run(&ToolCommand::new(tool).stdout_to(&out));
        assert!(matches!(res, Err(BatchError::ToolFailed { .. })));
        assert!(!out.exists());
    }

    #[test]
    fn redirect_into_missing_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let marker = dir.path().join("ran");
        let tool = stub(dir.path(), "touch_marker", &format!("touch '{}'", marker.display()));
        let out = dir.path().join("missing/x.aag");
        let res = ProcessRunner::default().run(&ToolCommand::new(tool).stdout_to(&out));
        match res {
            Err(BatchError::Redirect { path, .. }) => assert_eq!(path, out),
            other => panic!("expected Redirect, got {other:?}"),
        }
        // the tool is never started
        assert!(!marker.exists());
    }

    #[test]
    fn missing_tool() {
        let dir = tempfile::TempDir::new().unwrap();
        let tool = dir.path().join("aigtoaig");
        assert!(matches!(
            require_tool(&tool),
            Err(BatchError::ToolNotFound(_))
        ));
        let res = ProcessRunner::default().run(&ToolCommand::new(&tool));
        assert!(matches!(res, Err(BatchError::ToolSpawn { .. })));
    }

    #[test]
    fn require_existing_tool() {
        let dir = tempfile::TempDir::new().unwrap();
        let tool = stub(dir.path(), "abc", "exit 0");
        require_tool(&tool).unwrap();
        require_tool(Path::new("sh")).unwrap();
    }
}
