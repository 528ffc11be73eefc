use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, WatchError};

/// One sub-job descriptor from a run's `output` directory. The workflow
/// trigger writes one JSON file per sub-job it registered with the
/// execution service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubJobRef {
    /// Identifier the execution service knows the sub-job by.
    pub id: String,
    /// Human-readable sub-job name.
    pub name: String,
}

impl SubJobRef {
    /// The upload step is a distinguished sub-job that downstream stages
    /// reference separately; it is recognized by its name.
    pub fn is_upload(&self) -> bool {
        self.name.to_ascii_lowercase().starts_with("upload")
    }
}

/// Read every `*.json` sub-job descriptor under `output_dir`, sorted by
/// sub-job id so repeated reads classify in a stable order.
pub fn read_sub_jobs(output_dir: &Path) -> Result<Vec<SubJobRef>> {
    let entries =
        std::fs::read_dir(output_dir).map_err(|source| WatchError::Manifest {
            path: output_dir.to_path_buf(),
            source,
        })?;

    let mut sub_jobs = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| WatchError::Manifest {
            path: output_dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let raw = std::fs::read_to_string(&path).map_err(|source| WatchError::Manifest {
            path: path.clone(),
            source,
        })?;
        let sub_job: SubJobRef = serde_json::from_str(&raw)
            .map_err(|source| WatchError::Descriptor { path, source })?;
        sub_jobs.push(sub_job);
    }

    sub_jobs.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(sub_jobs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_sub_job_is_recognized_by_name() {
        let upload = SubJobRef {
            id: "h1".to_string(),
            name: "Upload 20230401-KS01".to_string(),
        };
        let analysis = SubJobRef {
            id: "h2".to_string(),
            name: "variant-calling".to_string(),
        };
        assert!(upload.is_upload());
        assert!(!analysis.is_upload());
    }
}
