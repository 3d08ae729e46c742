//! Candidate file enumeration: argument paths or stdin lines, normalized,
//! filtered to regular files and deduplicated in first-seen order.

use std::collections::HashSet;
use std::fs;
use std::io::{self, BufRead};
use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

enum Source {
    Args(std::vec::IntoIter<PathBuf>),
    Lines(io::Lines<Box<dyn BufRead>>),
}

/// Lazy, single-pass sequence of upload candidates. Non-regular files
/// (directories, missing paths, special files) are silently dropped; stdin
/// read failures are fatal.
pub struct Files {
    source: Source,
    dedup: bool,
    seen: HashSet<PathBuf>,
}

impl Files {
    pub fn from_args(paths: Vec<PathBuf>, dedup: bool) -> Self {
        Files {
            source: Source::Args(paths.into_iter()),
            dedup,
            seen: HashSet::new(),
        }
    }

    /// One path per non-blank line, trailing whitespace trimmed.
    pub fn from_reader(reader: Box<dyn BufRead>, dedup: bool) -> Self {
        Files {
            source: Source::Lines(reader.lines()),
            dedup,
            seen: HashSet::new(),
        }
    }

    pub fn from_stdin(dedup: bool) -> Self {
        Self::from_reader(Box::new(io::stdin().lock()), dedup)
    }
}

impl Iterator for Files {
    type Item = Result<PathBuf>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let raw = match &mut self.source {
                Source::Args(paths) => paths.next()?,
                Source::Lines(lines) => match lines.next() {
                    None => return None,
                    Some(Err(e)) => return Some(Err(Error::Stdin(e))),
                    Some(Ok(line)) => {
                        let line = line.trim_end();
                        if line.is_empty() {
                            continue;
                        }
                        PathBuf::from(line)
                    }
                },
            };
            let path = match normalize(&raw) {
                Ok(path) => path,
                Err(e) => return Some(Err(e)),
            };
            match fs::metadata(&path) {
                Ok(meta) if meta.is_file() => {}
                _ => continue,
            }
            if self.dedup && !self.seen.insert(path.clone()) {
                continue;
            }
            return Some(Ok(path));
        }
    }
}

/// Absolutize and lexically clean a path. Symlinks are deliberately NOT
/// resolved: two symlinks to the same target stay distinct entries, so the
/// same content can be uploaded under different keys.
fn normalize(path: &Path) -> Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    Ok(normalized)
}
