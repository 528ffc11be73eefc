use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, WatchError};

fn default_trigger_command() -> String {
    "workflow_runner".to_string()
}

fn default_download_command() -> String {
    "history_utils".to_string()
}

/// Where the external execution service lives and how to talk to it.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the execution service API.
    pub host: String,

    /// File whose first line is the API key used for status queries.
    pub api_key_file: PathBuf,

    /// Service configuration reference handed to the external trigger and
    /// download commands (opaque to this process).
    pub config_ref: PathBuf,
}

/// Typed configuration for one reconciler invocation. Every value the
/// passes consume has a named field here; loading validates the shape up
/// front instead of failing on a missing key mid-pass.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Root directory scanned for candidate run directories.
    pub input_root: PathBuf,

    /// Newline-delimited list of runs triggered but not yet downloaded.
    pub run_list: PathBuf,

    /// Append-only newline-delimited list of downloaded (or permanently
    /// skipped) runs.
    pub downloaded_list: PathBuf,

    pub service: ServiceConfig,

    /// Program invoked to trigger the workflow for a new run.
    #[serde(default = "default_trigger_command")]
    pub trigger_command: String,

    /// Program invoked to download a completed run.
    #[serde(default = "default_download_command")]
    pub download_command: String,
}

impl Config {
    /// Load and validate the configuration file (JSON).
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| WatchError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let config: Config = serde_json::from_str(&raw).map_err(|e| WatchError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(config)
    }

    /// Directory holding a run's input data.
    pub fn run_dir(&self, id: &str) -> PathBuf {
        self.input_root.join(id)
    }

    /// Directory holding a run's sub-job manifests.
    pub fn output_dir(&self, id: &str) -> PathBuf {
        self.run_dir(id).join("output")
    }

    /// Directory the download step populates.
    pub fn results_dir(&self, id: &str) -> PathBuf {
        self.run_dir(id).join("results")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_json() -> &'static str {
        r#"{
            "input_root": "/data/runs",
            "run_list": "/data/state/run_list.txt",
            "downloaded_list": "/data/state/downloaded.txt",
            "service": {
                "host": "https://galaxy.example.org",
                "api_key_file": "/data/state/api_key",
                "config_ref": "/data/state/service.cfg"
            }
        }"#
    }

    #[test]
    fn parses_minimal_config_with_command_defaults() {
        let config: Config = serde_json::from_str(minimal_json()).unwrap();
        assert_eq!(config.input_root, PathBuf::from("/data/runs"));
        assert_eq!(config.trigger_command, "workflow_runner");
        assert_eq!(config.download_command, "history_utils");
    }

    #[test]
    fn run_directories_derive_from_input_root() {
        let config: Config = serde_json::from_str(minimal_json()).unwrap();
        assert_eq!(
            config.output_dir("20230401-KS01"),
            PathBuf::from("/data/runs/20230401-KS01/output")
        );
        assert_eq!(
            config.results_dir("20230401-KS01"),
            PathBuf::from("/data/runs/20230401-KS01/results")
        );
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let err = Config::load(Path::new("/nonexistent/seqwatch.json")).unwrap_err();
        assert!(err.to_string().contains("cannot load config"));
    }
}
