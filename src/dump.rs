//! # Dump Artifacts
//!
//! Naming, locating, and reading the dump file a test run leaves behind.
//!
//! The target writes `<dump-dir>/<stem><time>.log`. Each test case gets its
//! own stem from [`dump_stem`], so the stem doubles as the search prefix.

use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::Crash;

/// Every generated stem starts with this.
pub const STEM_PREFIX: &str = "prototest";

/// Dump stem for the `index`-th test case parsed with `seed`.
///
/// Distinct indices give distinct stems for a fixed seed, and the trailing
/// `_` keeps one stem from being a prefix of another (`_1_` vs `_10_`).
pub fn dump_stem(seed: u32, index: usize) -> String {
    format!("{STEM_PREFIX}{seed}_{index}_")
}

/// Result of a dump directory search.
#[derive(Debug, Clone, PartialEq)]
pub struct DumpMatch {
    pub path: PathBuf,
    /// Other candidates that were passed over.
    pub ambiguous: Vec<PathBuf>,
}

/// Dump files in `dir` named `<prefix>*<suffix>`, sorted by name.
fn matching_dumps(dir: &Path, prefix: &str, suffix: &str) -> Result<Vec<PathBuf>, Crash> {
    let entries = fs::read_dir(dir).map_err(|e| Crash::DumpDirUnreadable {
        dir: dir.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut matches: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter(|entry| {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            name.starts_with(prefix) && name.ends_with(suffix)
        })
        .map(|entry| entry.path())
        .collect();
    matches.sort();
    Ok(matches)
}

/// Finds the dump whose file name starts with `prefix` and ends with `suffix`.
///
/// Candidates are sorted by name and the first wins; the rest are reported in
/// [`DumpMatch::ambiguous`].
pub fn locate_dump(dir: &Path, prefix: &str, suffix: &str) -> Result<DumpMatch, Crash> {
    let mut matches = matching_dumps(dir, prefix, suffix)?.into_iter();
    let Some(path) = matches.next() else {
        return Err(Crash::MissingDump {
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
            dir: dir.to_path_buf(),
        });
    };
    let ambiguous: Vec<PathBuf> = matches.collect();
    if !ambiguous.is_empty() {
        tracing::warn!(
            dump = %path.display(),
            ignored = ambiguous.len(),
            "several dump files share prefix {prefix}; using the first"
        );
    }
    Ok(DumpMatch { path, ambiguous })
}

/// Deletes dumps an earlier run left under `prefix`, so only files written
/// by the next launch can match. A missing directory has nothing to clear.
pub fn clear_stale_dumps(dir: &Path, prefix: &str, suffix: &str) -> Result<usize, Crash> {
    if !dir.is_dir() {
        return Ok(0);
    }
    let stale = matching_dumps(dir, prefix, suffix)?;
    for path in &stale {
        fs::remove_file(path).map_err(|e| Crash::StaleDump {
            path: path.clone(),
            message: e.to_string(),
        })?;
    }
    if !stale.is_empty() {
        tracing::debug!(prefix, removed = stale.len(), "cleared stale dump files");
    }
    Ok(stale.len())
}

/// A dump file held in memory for assertion lookups.
#[derive(Debug, Clone)]
pub struct DumpArtifact {
    path: PathBuf,
    lines: Vec<String>,
}

impl DumpArtifact {
    pub fn load(path: &Path) -> Result<Self, Crash> {
        let bytes = fs::read(path).map_err(|e| Crash::DumpUnreadable {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let text = String::from_utf8_lossy(&bytes);
        Ok(Self::from_text(path, &text))
    }

    pub fn from_text(path: impl Into<PathBuf>, text: &str) -> Self {
        Self {
            path: path.into(),
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Content line `line`, counted from 0 after the header line.
    pub fn content_line(&self, line: usize) -> Option<&str> {
        let physical = line.checked_add(1)?;
        self.lines.get(physical).map(String::as_str)
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}
