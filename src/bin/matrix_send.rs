use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use matrix_relay::pattern::Pattern;
use matrix_relay::{Error, Matrix, MatrixSpec};

#[derive(Parser)]
#[command(name = "matrix-send")]
#[command(about = "Matrix relay - host side\n\nRenders a test pattern and streams it to a UDP LED matrix.", long_about = None)]
struct Cli {
    /// Target and geometry, e.g. 192.168.69.42:1234,16x8,snake
    target: String,

    /// Test pattern: quadrants, gradient or chase
    #[arg(long, default_value = "quadrants")]
    pattern: Pattern,

    /// Frames per second
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Stop after this many frames (runs until Ctrl-C otherwise)
    #[arg(long)]
    frames: Option<u64>,

    /// Enable debug output
    #[arg(long)]
    debug: bool,

    /// Enable detailed debug (hex dumps of every fragment)
    #[arg(long)]
    ddebug: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // ddebug implies debug
    let level = if cli.ddebug {
        "trace"
    } else if cli.debug {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("✗ {:#}", e);
            let code = e.downcast_ref::<Error>().map_or(1, Error::exit_code);
            ExitCode::from(code as u8)
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let spec: MatrixSpec = cli.target.parse()?;
    let mut matrix = Matrix::connect(&spec)?;

    let running = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&running);
    if let Err(e) = ctrlc::set_handler(move || flag.store(false, Ordering::Relaxed)) {
        warn!("Could not set Ctrl-C handler: {}", e);
    }

    let interval = Duration::from_secs(1) / cli.fps.max(1);
    info!("Streaming {} at {} fps (Press Ctrl-C to stop)", cli.pattern, cli.fps.max(1));

    let mut frame = 0u64;
    while running.load(Ordering::Relaxed) && cli.frames.map_or(true, |n| frame < n) {
        let started = Instant::now();

        cli.pattern.draw(&mut matrix, frame)?;
        match matrix.render() {
            Ok(_) => {}
            // A lost frame is replaced by the next one
            Err(e @ Error::Send { .. }) => warn!("Frame {} dropped: {}", frame, e),
            Err(e) => return Err(e).context("Failed to render frame"),
        }
        frame += 1;

        if let Some(rest) = interval.checked_sub(started.elapsed()) {
            thread::sleep(rest);
        }
    }

    // Graceful shutdown - send a black frame to turn off LEDs
    info!("Turning off LEDs...");
    matrix.clear();
    matrix.render()?;

    Ok(())
}
