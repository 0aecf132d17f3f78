// Copyright 2025 Cornell University
// released under MIT License

//! # Batch configuration
//! Everything that used to be baked into the corpus scripts: where the corpus lives,
//! which extensions and tags are used and where the external tools are.

use crate::errors::{BatchError, Result};
use std::path::PathBuf;

/// How the converter is invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConverterForm {
    /// `aigtoaig <in> <out>`
    #[default]
    TwoArgument,
    /// `aigtoaig -a <in> > <out>`
    AsciiToStdout,
}

/// What happens to the original `.aig` once its conversion succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourcePolicy {
    #[default]
    Keep,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    /// Root of the corpus. The conversion step always scans all of it.
    pub root: PathBuf,
    /// Directory (relative to `root`) that the fold pipelines restrict themselves to.
    /// `None` lets them scan the whole corpus.
    pub subtree: Option<PathBuf>,
    pub source_ext: String,
    pub target_ext: String,
    /// File name tag of the zero-then-fold artifacts.
    pub zero_fold_tag: String,
    /// File name tag of the fold-only artifacts.
    pub fold_tag: String,
    /// Directory prefix under which fold-only artifacts are mirrored.
    pub fold_dir_prefix: String,
    pub converter: PathBuf,
    pub converter_form: ConverterForm,
    pub simplifier: PathBuf,
    pub zero_pass: String,
    /// Fold pass used after zeroing.
    pub zero_fold_pass: String,
    /// Fold pass used by the fold-only pipeline.
    pub fold_pass: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./"),
            subtree: Some(PathBuf::from("hwmcc20")),
            source_ext: ".aig".to_string(),
            target_ext: ".aag".to_string(),
            zero_fold_tag: "_zeroed_then_folded".to_string(),
            fold_tag: "_folded".to_string(),
            fold_dir_prefix: "folded_".to_string(),
            converter: PathBuf::from("./aigtoaig"),
            converter_form: ConverterForm::TwoArgument,
            simplifier: PathBuf::from("./abc"),
            zero_pass: "zero".to_string(),
            zero_fold_pass: "fold2".to_string(),
            fold_pass: "fold".to_string(),
        }
    }
}

impl BatchConfig {
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    /// Directory scanned by the fold pipelines.
    pub fn scan_dir(&self) -> PathBuf {
        match &self.subtree {
            Some(sub) => self.root.join(sub),
            None => self.root.clone(),
        }
    }

    /// Tags that mark a file as derived. Both fold pipelines skip the outputs of either.
    pub fn derived_tags(&self) -> Vec<String> {
        vec![self.zero_fold_tag.clone(), self.fold_tag.clone()]
    }

    pub fn validate(&self) -> Result<()> {
        let non_empty = [
            ("source extension", &self.source_ext),
            ("target extension", &self.target_ext),
            ("zero-then-fold tag", &self.zero_fold_tag),
            ("fold tag", &self.fold_tag),
            ("fold directory prefix", &self.fold_dir_prefix),
        ];
        for (what, value) in non_empty {
            if value.is_empty() {
                return Err(BatchError::InvalidConfig(format!("{what} must not be empty")));
            }
        }
        if self.source_ext == self.target_ext {
            return Err(BatchError::InvalidConfig(format!(
                "source and target extension are both `{}`",
                self.source_ext
            )));
        }
        // a tag containing the extension would make the derived name ambiguous
        for tag in [&self.zero_fold_tag, &self.fold_tag] {
            if tag.contains(self.source_ext.as_str()) {
                return Err(BatchError::InvalidConfig(format!(
                    "tag `{tag}` contains the source extension `{}`",
                    self.source_ext
                )));
            }
        }
        if self
            .fold_dir_prefix
            .contains(['/', std::path::MAIN_SEPARATOR])
        {
            return Err(BatchError::InvalidConfig(format!(
                "directory prefix `{}` must not contain a path separator",
                self.fold_dir_prefix
            )));
        }
        if let Some(sub) = &self.subtree {
            if sub.is_absolute() {
                return Err(BatchError::InvalidConfig(format!(
                    "subtree `{}` must be relative to the corpus root",
                    sub.display()
                )));
            }
        }
        Ok(())
    }
}
