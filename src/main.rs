//! RAX FTP Client - Entry Point
//!
//! Uploads or downloads a single file using the step-driven client.

use clap::Parser;
use log::{error, info};
use std::process::ExitCode;

use rax_ftp_client::utils::logging::setup_logging;
use rax_ftp_client::{ClientConfig, Direction, FtpClient, transfer_async};

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum Action {
    /// Download REMOTE into LOCAL
    Get,
    /// Upload LOCAL to REMOTE
    Put,
}

#[derive(Parser)]
#[command(name = "rax-ftp-client", about = "Transfer one file over FTP")]
struct Args {
    action: Action,
    local: String,
    remote: String,

    /// Configuration file (default: ./config.toml)
    #[arg(short, long)]
    config: Option<String>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    setup_logging(args.verbose);

    let config = match ClientConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let direction = match args.action {
        Action::Get => Direction::Get,
        Action::Put => Direction::Put,
    };

    let mut client = FtpClient::with_tcp(".", config.settings.clone());
    if let Err(e) = client.begin(config.server) {
        error!("{}", e);
        return ExitCode::FAILURE;
    }

    info!("Launching FTP transfer...");
    let status = transfer_async(&mut client, &args.local, &args.remote, direction).await;
    let stats = client.stats();

    let origin = if status.is_local_code() { "local" } else { "server" };
    println!("{:?} {} ({}) {}", status.result, status.code, origin, status.desc);
    if status.is_ok() {
        println!(
            "{} bytes in {:?} ({} B/s)",
            stats.bytes,
            stats.elapsed,
            stats.bytes_per_sec()
        );
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
