use anyhow::{Context, Result};
use clap::Parser;
use qristap_browser::{BrowserAutomationSession, VoteEventLocator};
use qristap_cli::orchestrator::IterationOrchestrator;
use qristap_core::{ArtifactNamer, Delay, RunConfiguration, WallClock, artifact};
use qristap_device::{AdbCli, DEFAULT_BRIDGE_HOST, DEFAULT_BRIDGE_PORT, DeviceControlChannel};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

const DEFAULT_TARGET_URL: &str = "https://voteqrisbali.com/event/vote-donasi-buleleng-festival";

#[derive(Parser)]
#[command(name = "qristap")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Drive the vote page and one Android device in an endless capture/transfer/tap loop"
)]
struct Cli {
    /// Path to the run profile (device coordinates and step delays)
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Which enumerated device to bind (0-indexed)
    #[arg(value_name = "DEVICE_INDEX", default_value_t = 0)]
    device_index: usize,

    /// Target page URL
    #[arg(long, default_value = DEFAULT_TARGET_URL)]
    url: String,

    /// Chrome binary location (checked before platform defaults)
    #[arg(long)]
    chrome_path: Option<PathBuf>,

    /// Device bridge host
    #[arg(long, default_value = DEFAULT_BRIDGE_HOST)]
    adb_host: String,

    /// Device bridge port
    #[arg(long, default_value_t = DEFAULT_BRIDGE_PORT)]
    adb_port: u16,

    /// Where the per-iteration capture is written
    #[arg(long, default_value = artifact::LOCAL_CAPTURE_FILE)]
    capture_path: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Fail fast, no recovery: log the error with the usual timestamped,
    // level-colored line and die. Restart policy belongs to a supervisor.
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = RunConfiguration::load(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;

    let delay: Arc<dyn Delay> = Arc::new(WallClock);

    let transport = AdbCli::new(cli.adb_host, cli.adb_port)?;
    let device = DeviceControlChannel::connect(transport, cli.device_index, delay.clone())?;

    let session = BrowserAutomationSession::open(
        &cli.url,
        cli.chrome_path.as_deref(),
        Box::new(VoteEventLocator::default()),
        delay.clone(),
        cli.capture_path,
    )
    .await?;

    let mut orchestrator =
        IterationOrchestrator::new(config, device, session, ArtifactNamer::new(), delay);

    orchestrator.run().await
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new(
            "qristap=debug,qristap_cli=debug,qristap_core=debug,qristap_device=debug,qristap_browser=debug",
        )
    } else {
        EnvFilter::new(
            "qristap=info,qristap_cli=info,qristap_core=info,qristap_device=info,qristap_browser=info",
        )
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
