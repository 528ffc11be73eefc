use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Result, WatchError};

/// Persists the two cooperating identifier lists that encode a run's stage:
/// the run list (triggered but not yet downloaded, rewritten in full on
/// reconcile) and the downloaded list (append-only).
///
/// A run identifier should eventually live in exactly one of the two lists.
/// Transient membership in both is a recognized race, resolved by
/// [`RunRegistry::reconcile`] rather than treated as corruption.
#[derive(Debug, Clone)]
pub struct RunRegistry {
    run_list: PathBuf,
    downloaded_list: PathBuf,
}

impl RunRegistry {
    pub fn new(run_list: PathBuf, downloaded_list: PathBuf) -> Self {
        Self {
            run_list,
            downloaded_list,
        }
    }

    /// Load the run list, preserving insertion order.
    pub fn load_run_list(&self) -> Result<Vec<String>> {
        Self::load(&self.run_list, "run_list")
    }

    /// Load the downloaded list, preserving insertion order.
    pub fn load_downloaded(&self) -> Result<Vec<String>> {
        Self::load(&self.downloaded_list, "downloaded_list")
    }

    // An unopenable list file is a configuration error and aborts the whole
    // pass; there is no per-run recovery from it.
    fn load(path: &Path, field: &'static str) -> Result<Vec<String>> {
        let raw = std::fs::read_to_string(path).map_err(|source| WatchError::ListFile {
            field,
            path: path.to_path_buf(),
            source,
        })?;
        Ok(raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect())
    }

    /// Append one identifier to the run list.
    pub fn append_run(&self, id: &str) -> Result<()> {
        Self::append(&self.run_list, "run_list", id)
    }

    /// Append one identifier to the downloaded list.
    pub fn append_downloaded(&self, id: &str) -> Result<()> {
        Self::append(&self.downloaded_list, "downloaded_list", id)
    }

    fn append(path: &Path, field: &'static str, id: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| WatchError::ListFile {
                field,
                path: path.to_path_buf(),
                source,
            })?;
        writeln!(file, "{id}")?;
        Ok(())
    }

    /// Settle `completed_id`: remove it from the run list and record it in
    /// the downloaded list.
    ///
    /// Reads both lists, rewrites the run list omitting `completed_id`
    /// (every other member is kept in order), and appends `completed_id` to
    /// the downloaded store unless it is already there — an identifier found
    /// in both lists was finished through another path and is only removed.
    /// Calling this twice with the same identifier is a no-op the second
    /// time.
    pub fn reconcile(&self, completed_id: &str) -> Result<()> {
        tracing::info!(run = completed_id, "reconciling run lists");

        let run_list = self.load_run_list()?;
        let downloaded = self.load_downloaded()?;
        let downloaded_set: HashSet<&str> = downloaded.iter().map(String::as_str).collect();

        let raced: Vec<&str> = run_list
            .iter()
            .map(String::as_str)
            .filter(|id| downloaded_set.contains(id))
            .collect();
        if !raced.is_empty() {
            tracing::warn!(
                entries = ?raced,
                "identifiers present in both lists, resolving toward downloaded"
            );
        }

        let was_pending = run_list.iter().any(|id| id.as_str() == completed_id);
        let remaining: Vec<&String> = run_list
            .iter()
            .filter(|id| id.as_str() != completed_id)
            .collect();
        self.rewrite_run_list(&remaining)?;

        if !was_pending {
            tracing::debug!(run = completed_id, "not in run list, nothing to record");
        } else if downloaded_set.contains(completed_id) {
            tracing::warn!(
                run = completed_id,
                "already in downloaded list, skipping append"
            );
        } else {
            tracing::info!(run = completed_id, "recording run as downloaded");
            self.append_downloaded(completed_id)?;
        }
        Ok(())
    }

    // Atomic replace: write a sibling temp file, then rename over the run
    // list, so a crash mid-rewrite never leaves a truncated list behind.
    fn rewrite_run_list(&self, entries: &[&String]) -> Result<()> {
        let tmp = self.run_list.with_extension("tmp");
        let mut body = String::new();
        for id in entries {
            body.push_str(id);
            body.push('\n');
        }
        std::fs::write(&tmp, body)?;
        std::fs::rename(&tmp, &self.run_list)?;
        Ok(())
    }
}
