use std::path::Path;

use crate::error::Result;
use crate::manifest::{self, SubJobRef};
use crate::service::ExecutionService;

/// Which of the five status buckets a sub-job state string falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Successful,
    Running,
    Failed,
    Exceptioned,
    Waiting,
}

/// Map a service state string onto exactly one bucket.
///
/// The service distinguishes hard failures (`error`) from exceptions; both
/// are surfaced, but only the former blocks readiness. States this process
/// does not recognize are treated as waiting, which keeps the run pending
/// instead of advancing it on an unknown signal.
pub fn classify_state(state: &str) -> Bucket {
    match state {
        "ok" => Bucket::Successful,
        "running" => Bucket::Running,
        "error" => Bucket::Failed,
        "exception" => Bucket::Exceptioned,
        _ => Bucket::Waiting,
    }
}

/// Per-run aggregation of sub-job states, plus the distinguished upload
/// sub-job if the manifest names one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusBuckets {
    pub successful: Vec<String>,
    pub running: Vec<String>,
    pub failed: Vec<String>,
    pub exceptioned: Vec<String>,
    pub waiting: Vec<String>,
    pub upload: Option<SubJobRef>,
}

impl StatusBuckets {
    fn insert(&mut self, bucket: Bucket, id: String) {
        match bucket {
            Bucket::Successful => self.successful.push(id),
            Bucket::Running => self.running.push(id),
            Bucket::Failed => self.failed.push(id),
            Bucket::Exceptioned => self.exceptioned.push(id),
            Bucket::Waiting => self.waiting.push(id),
        }
    }

    /// A run may download once nothing is running, failed, or waiting.
    /// Exceptioned sub-jobs are reported but do not block readiness.
    pub fn is_ready(&self) -> bool {
        self.running.is_empty() && self.failed.is_empty() && self.waiting.is_empty()
    }
}

/// Classify every sub-job described under `output_dir` by querying the
/// execution service for its current state.
///
/// Pure with respect to its inputs: the same manifest and service states
/// yield the same buckets on every call. A service or manifest failure
/// surfaces as an error for the caller to isolate per run.
pub async fn collect<S: ExecutionService>(
    service: &S,
    run: &str,
    output_dir: &Path,
) -> Result<StatusBuckets> {
    let sub_jobs = manifest::read_sub_jobs(output_dir)?;
    let mut buckets = StatusBuckets::default();

    for sub_job in sub_jobs {
        let state = service.job_state(&sub_job.id).await?;
        let bucket = classify_state(&state);
        tracing::debug!(run, sub_job = %sub_job.id, state = %state, ?bucket, "classified sub-job");
        if sub_job.is_upload() {
            buckets.upload = Some(sub_job.clone());
        }
        buckets.insert(bucket, sub_job.id);
    }

    Ok(buckets)
}
