// Copyright 2025 Cornell University
// released under MIT License

//! # Output naming
//! Derives where the artifact of a transformation goes. All policies are pure functions
//! of the input path, the only filesystem access is `ensure_dir`, which the caller
//! runs on `Derivation::mkdir` before the tool writes its output.

use crate::errors::{BatchError, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NamingError {
    #[error("`{0}` does not end in `{1}`")]
    MissingExtension(PathBuf, String),
    #[error("`{0}` is not valid UTF-8")]
    NotUtf8(PathBuf),
    #[error("`{path}` is not inside a subdirectory of `{anchor}`")]
    NoMirrorDir { path: PathBuf, anchor: PathBuf },
}

/// Where a derived artifact is written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Derivation {
    pub output: PathBuf,
    /// Directory that needs to exist before `output` can be written.
    pub mkdir: Option<PathBuf>,
}

impl Derivation {
    fn in_place(output: PathBuf) -> Self {
        Self {
            output,
            mkdir: None,
        }
    }
}

/// The naming policies found in the corpus. They produce different layouts and
/// must not be mixed up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamingPolicy {
    /// `dir/m.aig` -> `dir/m.aag`
    SwapExtension { from: String, to: String },
    /// `dir/m.aig` -> `dir/m<tag>.aig`
    SuffixTag { ext: String, tag: String },
    /// `anchor/sub/rest/m.aig` -> `anchor/<dir_prefix>sub/rest/m<tag>.aig`
    MirroredPrefix {
        anchor: PathBuf,
        ext: String,
        dir_prefix: String,
        tag: String,
    },
}

impl NamingPolicy {
    pub fn derive(&self, input: &Path) -> std::result::Result<Derivation, NamingError> {
        match self {
            NamingPolicy::SwapExtension { from, to } => {
                swap_extension(input, from, to).map(Derivation::in_place)
            }
            NamingPolicy::SuffixTag { ext, tag } => {
                let stem = strip_ext(input, ext)?;
                Ok(Derivation::in_place(PathBuf::from(format!(
                    "{stem}{tag}{ext}"
                ))))
            }
            NamingPolicy::MirroredPrefix {
                anchor,
                ext,
                dir_prefix,
                tag,
            } => mirror(input, anchor, ext, dir_prefix, tag),
        }
    }
}

/// Replaces a trailing `from` with `to`. A path that already ends in `to` is returned
/// as is, so swapping twice gives the same result as swapping once.
pub fn swap_extension(
    path: &Path,
    from: &str,
    to: &str,
) -> std::result::Result<PathBuf, NamingError> {
    if strip_ext(path, to).is_ok() {
        return Ok(path.to_path_buf());
    }
    let stem = strip_ext(path, from)?;
    Ok(PathBuf::from(format!("{stem}{to}")))
}

fn strip_ext<'a>(path: &'a Path, ext: &str) -> std::result::Result<&'a str, NamingError> {
    let p = path
        .to_str()
        .ok_or_else(|| NamingError::NotUtf8(path.to_path_buf()))?;
    p.strip_suffix(ext)
        .ok_or_else(|| NamingError::MissingExtension(path.to_path_buf(), ext.to_string()))
}

fn mirror(
    input: &Path,
    anchor: &Path,
    ext: &str,
    dir_prefix: &str,
    tag: &str,
) -> std::result::Result<Derivation, NamingError> {
    let no_mirror_dir = || NamingError::NoMirrorDir {
        path: input.to_path_buf(),
        anchor: anchor.to_path_buf(),
    };
    let rel = input.strip_prefix(anchor).map_err(|_| no_mirror_dir())?;
    let parts = rel
        .components()
        .map(|c| match c {
            Component::Normal(part) => part
                .to_str()
                .ok_or_else(|| NamingError::NotUtf8(input.to_path_buf())),
            _ => Err(no_mirror_dir()),
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;

    // need at least one directory beneath the anchor plus the file itself
    let Some((file_name, dirs)) = parts.split_last() else {
        return Err(no_mirror_dir());
    };
    let Some((first_dir, rest)) = dirs.split_first() else {
        return Err(no_mirror_dir());
    };
    let stem = file_name
        .strip_suffix(ext)
        .ok_or_else(|| NamingError::MissingExtension(input.to_path_buf(), ext.to_string()))?;

    let mut dir = anchor.join(format!("{dir_prefix}{first_dir}"));
    dir.extend(rest);
    let output = dir.join(format!("{stem}{tag}{ext}"));
    Ok(Derivation {
        output,
        mkdir: Some(dir),
    })
}

/// Creates `dir` and all of its parents. Succeeds if the directory is already there.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|source| BatchError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}
