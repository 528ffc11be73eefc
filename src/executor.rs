use std::future::Future;
use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;

/// Outcome of one external command invocation. The exit code is recorded
/// and logged, never used to gate a lifecycle transition.
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    /// Exit code of the child, `None` if it was killed by a signal or
    /// could not be spawned at all.
    pub exit_code: Option<i32>,
    /// Captured stderr, kept for the log stream.
    pub stderr: String,
}

impl CommandOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Seam for the external workflow-trigger and download tools. Both are
/// opaque commands: the only contract is an exit code (0 = success).
pub trait CommandRunner {
    /// Trigger the workflow for a newly discovered run.
    fn run_trigger(
        &self,
        run: &str,
        input_dir: &Path,
        output_dir: &Path,
        service_cfg: &Path,
    ) -> impl Future<Output = CommandOutcome>;

    /// Download a completed run's results.
    fn run_download(
        &self,
        run: &str,
        manifest_dir: &Path,
        results_dir: &Path,
        service_cfg: &Path,
    ) -> impl Future<Output = CommandOutcome>;
}

/// Spawns the configured programs as child processes and waits for them.
/// Invocations block the pass until the child exits; no timeout is applied.
#[derive(Debug, Clone)]
pub struct ShellRunner {
    trigger_program: String,
    download_program: String,
}

impl ShellRunner {
    pub fn new(trigger_program: String, download_program: String) -> Self {
        Self {
            trigger_program,
            download_program,
        }
    }

    // A spawn failure is folded into the outcome rather than propagated:
    // the pass treats it exactly like a nonzero exit.
    async fn run(run: &str, program: &str, mut command: Command) -> CommandOutcome {
        tracing::info!(run, program, "invoking external command");
        match command
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
        {
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr).to_string();
                if !output.status.success() && !stderr.is_empty() {
                    tracing::warn!(run, program, stderr = %stderr.trim_end(), "command stderr");
                }
                CommandOutcome {
                    exit_code: output.status.code(),
                    stderr,
                }
            }
            Err(e) => {
                tracing::error!(run, program, error = %e, "failed to spawn command");
                CommandOutcome {
                    exit_code: None,
                    stderr: e.to_string(),
                }
            }
        }
    }
}

impl CommandRunner for ShellRunner {
    async fn run_trigger(
        &self,
        run: &str,
        input_dir: &Path,
        output_dir: &Path,
        service_cfg: &Path,
    ) -> CommandOutcome {
        let mut command = Command::new(&self.trigger_program);
        command
            .arg(input_dir)
            .arg("-o")
            .arg(output_dir)
            .arg("-i")
            .arg(service_cfg);
        Self::run(run, &self.trigger_program, command).await
    }

    async fn run_download(
        &self,
        run: &str,
        manifest_dir: &Path,
        results_dir: &Path,
        service_cfg: &Path,
    ) -> CommandOutcome {
        let mut command = Command::new(&self.download_program);
        command
            .arg(manifest_dir)
            .arg("download")
            .arg("-d")
            .arg("-o")
            .arg(results_dir)
            .arg("-i")
            .arg(service_cfg);
        Self::run(run, &self.download_program, command).await
    }
}
