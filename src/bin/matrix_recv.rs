use std::process::ExitCode;
use std::sync::atomic::Ordering;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use matrix_relay::{output, Error, FrameReceiver, ReceiverConfig};

#[derive(Parser)]
#[command(name = "matrix-recv")]
#[command(about = "Matrix relay - device side\n\nReceives fragmented frames over UDP and outputs them to an LED driver.", long_about = None)]
struct Cli {
    /// Path to configuration file (JSON)
    config: String,

    /// Enable debug output (statistics)
    #[arg(long)]
    debug: bool,

    /// Enable detailed debug (hex dumps every datagram)
    #[arg(long)]
    ddebug: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // ddebug implies debug
    let debug = cli.debug || cli.ddebug;
    let level = if cli.ddebug {
        "trace"
    } else if debug {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();

    match run(&cli, debug) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("✗ {:#}", e);
            let code = e.downcast_ref::<Error>().map_or(1, Error::exit_code);
            ExitCode::from(code as u8)
        }
    }
}

fn run(cli: &Cli, debug: bool) -> Result<()> {
    // Load configuration
    let config = ReceiverConfig::load(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config))?;

    let sink = output::open(&config.output).context("Failed to open output")?;
    let mut receiver = FrameReceiver::bind(&config, sink)?.report_stats(debug);

    // Set up Ctrl-C handler with graceful shutdown
    let running = receiver.get_running_flag();
    if let Err(e) = ctrlc::set_handler(move || running.store(false, Ordering::Relaxed)) {
        warn!("Could not set Ctrl-C handler: {}", e);
    }

    // Start dark, whatever the driver held before
    receiver.blank().context("Failed to blank output")?;
    info!("Waiting for frames (Press Ctrl-C to stop)");

    // Blocks until shutdown
    receiver.run()?;

    receiver.shutdown();
    info!("✓ Receiver stopped");

    Ok(())
}
