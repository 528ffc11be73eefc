use std::collections::HashSet;
use std::path::Path;

use crate::classify;
use crate::config::Config;
use crate::error::{Result, WatchError};
use crate::executor::CommandRunner;
use crate::registry::RunRegistry;
use crate::service::ExecutionService;
use crate::status;

/// Drives per-run lifecycle transitions: one discovery/trigger pass and one
/// download pass, each a single non-blocking sweep over its worklist. An
/// external timer re-invokes the process; there is no internal loop, sleep,
/// or retry.
///
/// Stage is never stored on a run — it is derived from membership in the
/// two persisted lists plus the name classifier's verdict.
pub struct LifecycleController<S, R> {
    config: Config,
    registry: RunRegistry,
    service: S,
    runner: R,
    // Coarse process-wide trigger lock: only one directory may be in flight
    // at a time. Plain mutable state, not an OS-level lock.
    trigger_locked: bool,
}

impl<S: ExecutionService, R: CommandRunner> LifecycleController<S, R> {
    pub fn new(config: Config, service: S, runner: R) -> Self {
        let registry = RunRegistry::new(config.run_list.clone(), config.downloaded_list.clone());
        Self {
            config,
            registry,
            service,
            runner,
            trigger_locked: false,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.trigger_locked
    }

    /// One discovery/trigger pass over the input root.
    ///
    /// For each candidate directory: skip anything already triggered or
    /// already settled, classify the name, and either record it as
    /// permanently skipped (malformed names are terminal) or create its
    /// working directories, invoke the trigger command, and append it to
    /// the run list. The trigger exit code is logged but never gates the
    /// list update, so a transient failure is not reprocessed.
    pub async fn trigger_pass(&mut self) -> Result<()> {
        let triggered: HashSet<String> = self.registry.load_run_list()?.into_iter().collect();
        let finished: HashSet<String> = self.registry.load_downloaded()?.into_iter().collect();

        let entries = std::fs::read_dir(&self.config.input_root).map_err(|source| {
            WatchError::InputRoot {
                path: self.config.input_root.clone(),
                source,
            }
        })?;

        for entry in entries {
            let entry = entry.map_err(|source| WatchError::InputRoot {
                path: self.config.input_root.clone(),
                source,
            })?;
            let name = entry.file_name().to_string_lossy().into_owned();

            if !entry.path().is_dir() {
                tracing::debug!(entry = %name, "not a directory, ignoring");
                continue;
            }
            if triggered.contains(&name) {
                tracing::warn!(run = %name, "already triggered, waiting on download; skipping");
                continue;
            }
            if finished.contains(&name) {
                tracing::warn!(run = %name, "already in downloaded list; skipping");
                continue;
            }
            if self.trigger_locked {
                tracing::warn!(run = %name, "trigger lock set, not able to process");
                continue;
            }

            self.trigger_locked = true;
            let result = self.process_candidate(&name).await;
            // The lock is released whatever the outcome of this directory.
            self.trigger_locked = false;
            result?;
        }

        Ok(())
    }

    async fn process_candidate(&self, name: &str) -> Result<()> {
        tracing::info!(run = name, "processing candidate directory");

        if !classify::is_run_dir_name(name) {
            tracing::info!(
                run = name,
                "name does not match the run convention, recording as permanently skipped"
            );
            self.registry.append_downloaded(name)?;
            return Ok(());
        }

        let run_dir = self.config.run_dir(name);
        let output_dir = self.config.output_dir(name);
        let results_dir = self.config.results_dir(name);
        ensure_dir(&output_dir);
        ensure_dir(&results_dir);

        let outcome = self
            .runner
            .run_trigger(name, &run_dir, &output_dir, &self.config.service.config_ref)
            .await;
        tracing::info!(run = name, exit_code = ?outcome.exit_code, "workflow trigger returned");
        if !outcome.success() {
            tracing::warn!(
                run = name,
                "trigger exited nonzero; run is still recorded as triggered"
            );
        }

        // Exit code never gates bookkeeping: a failed trigger stays in the
        // run list rather than being rediscovered next pass.
        self.registry.append_run(name)?;
        Ok(())
    }

    /// One download pass over the run list.
    ///
    /// Entries also present in the downloaded list are stale raced entries
    /// and are reconciled without invoking download. For the rest the
    /// sub-job status is aggregated; ready runs are downloaded and
    /// reconciled regardless of the download exit code, the others are left
    /// untouched for the next pass. A per-run status failure is logged and
    /// isolated so one bad run does not block the others.
    pub async fn download_pass(&mut self) -> Result<()> {
        let run_list = self.registry.load_run_list()?;
        let finished: HashSet<String> = self.registry.load_downloaded()?.into_iter().collect();

        for id in &run_list {
            if finished.contains(id) {
                tracing::warn!(run = %id, "already in downloaded list, reconciling stale entry");
                self.registry.reconcile(id)?;
                continue;
            }

            tracing::info!(run = %id, "checking sub-job status");
            let output_dir = self.config.output_dir(id);
            let buckets = match status::collect(&self.service, id, &output_dir).await {
                Ok(buckets) => buckets,
                Err(e) => {
                    tracing::error!(run = %id, error = %e, "status query failed, leaving run for the next pass");
                    continue;
                }
            };

            tracing::info!(
                run = %id,
                successful = buckets.successful.len(),
                running = buckets.running.len(),
                failed = buckets.failed.len(),
                exceptioned = buckets.exceptioned.len(),
                waiting = buckets.waiting.len(),
                "sub-job status"
            );

            if !buckets.is_ready() {
                tracing::info!(run = %id, "not all sub-jobs complete, will try again later");
                continue;
            }

            let results_dir = self.config.results_dir(id);
            let outcome = self
                .runner
                .run_download(id, &output_dir, &results_dir, &self.config.service.config_ref)
                .await;
            tracing::info!(run = %id, exit_code = ?outcome.exit_code, "download returned");
            if !outcome.success() {
                tracing::warn!(
                    run = %id,
                    "download exited nonzero; run is still recorded as downloaded"
                );
            }

            self.registry.reconcile(id)?;
        }

        Ok(())
    }
}

// Idempotent: a pre-existing directory is a warning, not an error, and a
// creation failure is logged without aborting the run (the trigger command
// surfaces its own failure).
fn ensure_dir(path: &Path) {
    if path.exists() {
        tracing::warn!(path = %path.display(), "directory already exists");
        return;
    }
    match std::fs::create_dir_all(path) {
        Ok(()) => tracing::info!(path = %path.display(), "created directory"),
        Err(e) => tracing::error!(path = %path.display(), error = %e, "failed to create directory"),
    }
}
