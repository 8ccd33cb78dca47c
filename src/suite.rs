//! # Test Suites
//!
//! A suite is the set of config files named on the command line. It expands
//! directories into the `.test` files they contain, loads one [`TestFile`] per
//! config path, and runs them all. The suite passes only if every file does.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
use walkdir::WalkDir;

use crate::config::{HarnessConfig, CONFIG_EXTENSION};
use crate::errors::HarnessError;
use crate::file::TestFile;
use crate::launcher::Launcher;
use crate::output::Reporter;

/// Per-file seeds are drawn from this range.
pub const SEED_RANGE: std::ops::RangeInclusive<u32> = 10_000..=99_999;

#[derive(Debug, Default)]
pub struct TestSuite {
    config_paths: BTreeSet<PathBuf>,
    test_files: BTreeMap<PathBuf, TestFile>,
    errors: Vec<HarnessError>,
    failed: bool,
}

// ============================================================================
// Discovery
// ============================================================================

/// True when `path` names a config file (`.test`, any case).
pub fn is_config_path(path: &str) -> bool {
    path.to_lowercase().ends_with(CONFIG_EXTENSION)
}

/// Trims each candidate, keeps config files, and drops duplicates.
pub fn filter_config_paths<I, S>(candidates: I) -> BTreeSet<PathBuf>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    candidates
        .into_iter()
        .map(|c| c.as_ref().trim().to_string())
        .filter(|c| is_config_path(c))
        .map(PathBuf::from)
        .collect()
}

/// Replaces each directory in `paths` by the config files inside it.
///
/// Only the top level is scanned unless `recursive` is set. Plain paths are
/// passed through untouched; [`filter_config_paths`] decides whether they stay.
pub fn discover_config_files(paths: &[PathBuf], recursive: bool) -> Result<Vec<PathBuf>, HarnessError> {
    let mut found = Vec::new();
    for path in paths {
        if !path.is_dir() {
            found.push(path.clone());
            continue;
        }
        let depth = if recursive { usize::MAX } else { 1 };
        for entry in WalkDir::new(path).max_depth(depth).sort_by_file_name() {
            let entry = entry.map_err(|e| HarnessError::Discovery {
                path: path.clone(),
                message: e.to_string(),
            })?;
            if entry.file_type().is_file() && is_config_path(&entry.path().to_string_lossy()) {
                found.push(entry.path().to_path_buf());
            }
        }
    }
    Ok(found)
}

fn seed_source(seed: Option<u64>) -> Xoshiro256StarStar {
    match seed {
        Some(seed) => Xoshiro256StarStar::seed_from_u64(seed),
        None => Xoshiro256StarStar::from_entropy(),
    }
}

// ============================================================================
// Suite
// ============================================================================

impl TestSuite {
    pub fn new<I, S>(candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            config_paths: filter_config_paths(candidates),
            ..Self::default()
        }
    }

    /// Expands directories, filters to config files, and fails when none remain.
    pub fn discover(paths: &[PathBuf], config: &HarnessConfig) -> Result<Self, HarnessError> {
        let candidates = discover_config_files(paths, config.recursive)?;
        let suite = Self::new(candidates.iter().map(|p| p.to_string_lossy()));
        if suite.config_paths.is_empty() {
            return Err(HarnessError::NoConfigFiles);
        }
        Ok(suite)
    }

    pub fn config_paths(&self) -> &BTreeSet<PathBuf> {
        &self.config_paths
    }

    pub fn test_files(&self) -> &BTreeMap<PathBuf, TestFile> {
        &self.test_files
    }

    pub fn test_file(&self, path: &Path) -> Option<&TestFile> {
        self.test_files.get(path)
    }

    /// Non-fatal errors met while loading configs or writing logs.
    pub fn errors(&self) -> &[HarnessError] {
        &self.errors
    }

    pub fn failed(&self) -> bool {
        self.failed
    }

    /// Loads a [`TestFile`] for each config path. Files without any test
    /// cases are skipped with a warning; unreadable files fail the suite.
    pub fn gen_tests(&mut self, config: &HarnessConfig, reporter: &mut dyn Reporter) {
        self.test_files.clear();
        self.errors.clear();
        let mut seeds = seed_source(config.seed);

        for path in &self.config_paths {
            let seed = seeds.gen_range(SEED_RANGE);
            let file = match TestFile::load(path.clone(), seed, config) {
                Ok(file) => file,
                Err(e) => {
                    tracing::error!("{e}");
                    reporter.file_skipped(path, "could not read config file");
                    self.errors.push(e);
                    continue;
                }
            };
            reporter.file_parsed(&file);
            if file.cases().is_empty() {
                reporter.file_skipped(path, "No tests found");
                continue;
            }
            self.test_files.insert(path.clone(), file);
        }
    }

    /// Runs every loaded file and writes its results log. Returns `true`
    /// when every assertion in every file passed.
    pub fn run(&mut self, config: &HarnessConfig, launcher: &dyn Launcher, reporter: &mut dyn Reporter) -> bool {
        self.failed = !self.errors.is_empty();
        for file in self.test_files.values_mut() {
            if !file.run(config, launcher, reporter) {
                self.failed = true;
            }
            if let Err(e) = file.write_log(config) {
                tracing::error!("{e}");
                self.errors.push(e);
                self.failed = true;
            }
        }
        !self.failed
    }
}
