use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use seqwatch::config::Config;
use seqwatch::controller::LifecycleController;
use seqwatch::executor::ShellRunner;
use seqwatch::service::HttpExecutionService;

#[derive(Parser, Debug)]
#[command(name = "seqwatch")]
#[command(version)]
#[command(about = "Lifecycle reconciler for sequencing sample-processing runs")]
struct Args {
    /// Path to the configuration file (JSON)
    #[arg(long, default_value = "seqwatch.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan the input root and trigger workflows for new run directories
    Trigger,
    /// Download runs whose sub-jobs have all completed
    Download,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = Config::load(&args.config)?;
    tracing::info!(
        config = %args.config.display(),
        input_root = %config.input_root.display(),
        "starting seqwatch"
    );

    let runner = ShellRunner::new(
        config.trigger_command.clone(),
        config.download_command.clone(),
    );

    match args.command {
        Commands::Trigger => {
            // The trigger pass never queries the service, so no API key is
            // required for it.
            let service = HttpExecutionService::new(config.service.host.clone(), String::new());
            let mut controller = LifecycleController::new(config, service, runner);
            controller.trigger_pass().await?;
        }
        Commands::Download => {
            let api_key = HttpExecutionService::load_api_key(&config.service.api_key_file)?;
            let service = HttpExecutionService::new(config.service.host.clone(), api_key);
            let mut controller = LifecycleController::new(config, service, runner);
            controller.download_pass().await?;
        }
    }

    Ok(())
}
