use clap::Parser;
use qristap_relay::RelayServer;
use std::process::ExitCode;

const DEFAULT_VOTE_ENDPOINT: &str =
    "https://voteqrisbali.com/event/vote-donasi-buleleng-festival/vote/0198c29e-61f9-735d-a528-4f120a5fcc6a";

#[derive(Parser)]
#[command(name = "qristap-relay")]
#[command(author, version, about, long_about = None)]
#[command(about = "Serve the upstream payment code as a scannable QR page")]
struct Cli {
    /// Listen port
    #[arg(short, long, default_value_t = 8080)]
    port: u16,

    /// Upstream vote endpoint receiving the POST
    #[arg(long, default_value = DEFAULT_VOTE_ENDPOINT)]
    endpoint: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match RelayServer::new(cli.port, cli.endpoint).serve().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("qristap_relay=debug")
    } else {
        EnvFilter::new("qristap_relay=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
