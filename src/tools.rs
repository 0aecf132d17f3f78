// Copyright 2025 Cornell University
// released under MIT License

//! # External tools
//! Builds the invocations of the AIGER converter and of abc as argument vectors.
//! Nothing here goes through a shell.

use crate::config::ConverterForm;
use std::fmt;
use std::path::{Path, PathBuf};

/// A fully materialized tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// If set, stdout of the tool is written to this file.
    pub stdout_to: Option<PathBuf>,
}

impl ToolCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: vec![],
            stdout_to: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn stdout_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdout_to = Some(path.into());
        self
    }
}

/// Renders the command as a line that can be pasted into a shell.
impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote(&self.program.to_string_lossy()))?;
        for arg in self.args.iter() {
            write!(f, " {}", quote(arg))?;
        }
        if let Some(out) = &self.stdout_to {
            write!(f, " > {}", quote(&out.to_string_lossy()))?;
        }
        Ok(())
    }
}

fn quote(word: &str) -> String {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./+=:,@%".contains(c));
    if plain {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

/// `aigtoaig` invocation that turns `input` into `output`.
pub fn convert_command(
    tool: &Path,
    form: ConverterForm,
    input: &Path,
    output: &Path,
) -> ToolCommand {
    match form {
        ConverterForm::TwoArgument => ToolCommand::new(tool)
            .arg(path_arg(input))
            .arg(path_arg(output)),
        ConverterForm::AsciiToStdout => ToolCommand::new(tool)
            .arg("-a")
            .arg(path_arg(input))
            .stdout_to(output),
    }
}

/// abc script that reads `input`, runs `passes` in order and writes `output`.
/// The script is abc's own command language and is handed over as a single argument.
pub fn abc_script<P: AsRef<str>>(input: &Path, passes: &[P], output: &Path) -> String {
    let passes: Vec<&str> = passes.iter().map(|p| p.as_ref()).collect();
    format!(
        "read {}; {} ; write_aiger {}",
        input.to_string_lossy(),
        passes.join(" ; "),
        output.to_string_lossy()
    )
}

pub fn simplify_command<P: AsRef<str>>(
    tool: &Path,
    input: &Path,
    passes: &[P],
    output: &Path,
) -> ToolCommand {
    ToolCommand::new(tool)
        .arg("-c")
        .arg(abc_script(input, passes, output))
}
