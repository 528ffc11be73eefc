use std::future::Future;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, WatchError};

/// External execution service that reports the current state of a sub-job.
///
/// The production implementation talks HTTP; tests substitute a fake with
/// canned states.
pub trait ExecutionService {
    /// Fetch the current state string for one sub-job.
    fn job_state(&self, id: &str) -> impl Future<Output = Result<String>>;
}

#[derive(Debug, Deserialize)]
struct StateResponse {
    state: String,
}

/// HTTP client for the execution service's history API.
#[derive(Debug, Clone)]
pub struct HttpExecutionService {
    client: reqwest::Client,
    host: String,
    api_key: String,
}

impl HttpExecutionService {
    pub fn new(host: impl Into<String>, api_key: impl Into<String>) -> Self {
        let host = host.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            host,
            api_key: api_key.into(),
        }
    }

    /// Read the API key from the key file: first line, trimmed.
    pub fn load_api_key(path: &Path) -> Result<String> {
        let raw = std::fs::read_to_string(path).map_err(|source| WatchError::ApiKey {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(raw.lines().next().unwrap_or_default().trim().to_string())
    }
}

impl ExecutionService for HttpExecutionService {
    async fn job_state(&self, id: &str) -> Result<String> {
        let url = format!("{}/api/histories/{}", self.host, id);
        let response: StateResponse = self
            .client
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        if response.state.is_empty() {
            return Err(WatchError::ServiceResponse {
                id: id.to_string(),
                reason: "empty state field".to_string(),
            });
        }
        Ok(response.state)
    }
}
