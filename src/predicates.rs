// Copyright 2025 Cornell University
// released under MIT License

use std::path::Path;

/// True iff the path ends in `ext`. Compared on raw bytes and case-sensitive,
/// so `foo.AIG` or a path shorter than `ext` is simply not a match.
pub fn is_source_format(path: &Path, ext: &str) -> bool {
    path.as_os_str().as_encoded_bytes().ends_with(ext.as_bytes())
}

/// True iff the base name contains none of `tags`.
pub fn is_not_derived<S: AsRef<str>>(path: &Path, tags: &[S]) -> bool {
    match path.file_name() {
        Some(name) => {
            let name = name.to_string_lossy();
            !tags.iter().any(|t| name.contains(t.as_ref()))
        }
        None => false,
    }
}

/// Why a discovered file was not turned into a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    NotSourceFormat,
    AlreadyDerived,
    /// The output path could not be derived (see `naming::NamingError`).
    Malformed(String),
}

/// Conjunction of the predicates a pipeline needs.
#[derive(Debug, Clone)]
pub struct PathFilter {
    source_ext: String,
    derived_tags: Vec<String>,
}

impl PathFilter {
    /// Only checks the extension.
    pub fn source_only(source_ext: impl Into<String>) -> Self {
        Self {
            source_ext: source_ext.into(),
            derived_tags: vec![],
        }
    }

    /// Checks the extension and skips anything carrying one of `derived_tags`.
    pub fn not_derived(source_ext: impl Into<String>, derived_tags: Vec<String>) -> Self {
        Self {
            source_ext: source_ext.into(),
            derived_tags,
        }
    }

    pub fn check(&self, path: &Path) -> Result<(), Rejection> {
        if !is_source_format(path, &self.source_ext) {
            Err(Rejection::NotSourceFormat)
        } else if !is_not_derived(path, &self.derived_tags) {
            Err(Rejection::AlreadyDerived)
        } else {
            Ok(())
        }
    }
}
