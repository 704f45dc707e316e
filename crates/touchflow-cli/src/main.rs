//! touchflow CLI - listen for TUIO cursors and print unified touch phases
//!
//! The receiver runs on its own thread; this binary plays the consumer,
//! polling a TUIO touch tracker once per frame.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;
use touchflow_input::{Touch, TouchPhase, TouchTracker};
use touchflow_transport::TuioReceiver;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;

use config::FileConfig;

/// touchflow - TUIO touch ingestion
#[derive(Parser)]
#[command(name = "touchflow")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Listen for TUIO and print touch phases
    Listen {
        /// UDP port to listen on
        #[arg(short, long, env = "TOUCHFLOW_PORT")]
        port: Option<u16>,

        /// Bind address
        #[arg(short, long)]
        bind: Option<String>,

        /// Screen width in pixels
        #[arg(long)]
        width: Option<f32>,

        /// Screen height in pixels
        #[arg(long)]
        height: Option<f32>,

        /// Keep TUIO's y axis as sent
        #[arg(long)]
        no_flip: bool,

        /// Polling frames per second
        #[arg(long, default_value = "60")]
        fps: u32,

        /// Print touches as JSON lines
        #[arg(long)]
        json: bool,

        /// Also print stationary touches
        #[arg(long)]
        verbose: bool,
    },

    /// Show version and defaults
    Info,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(&cli.log_level, cli.json_logs)?;

    let mut config = FileConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Listen {
            port,
            bind,
            width,
            height,
            no_flip,
            fps,
            json,
            verbose,
        } => {
            if let Some(port) = port {
                config.receiver.port = port;
            }
            if let Some(bind) = bind {
                config.receiver.bind_addr = bind;
            }
            if let Some(width) = width {
                config.display.width = width;
            }
            if let Some(height) = height {
                config.display.height = height;
            }
            if no_flip {
                config.display.flip_y = false;
            }

            let output = Output { json, verbose };
            run_listener(config, fps.max(1), output)?;
        }

        Commands::Info => {
            print_info(&config);
        }
    }

    Ok(())
}

fn setup_logging(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .context("Failed to parse log level")?;

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).compact())
            .init();
    }

    Ok(())
}

/// Operator commands read from stdin
enum Command {
    Refresh,
    Stats,
}

fn spawn_stdin_reader() -> mpsc::Receiver<Command> {
    let (tx, rx) = mpsc::channel();

    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let command = match line.trim() {
                "r" | "refresh" => Command::Refresh,
                "s" | "stats" => Command::Stats,
                _ => continue,
            };
            if tx.send(command).is_err() {
                break;
            }
        }
    });

    rx
}

struct Output {
    json: bool,
    verbose: bool,
}

#[derive(Serialize)]
struct TouchLine {
    id: i64,
    phase: TouchPhase,
    x: f32,
    y: f32,
    raw_x: f32,
    raw_y: f32,
    dx: f32,
    dy: f32,
    dt_ms: f64,
}

impl From<&Touch> for TouchLine {
    fn from(touch: &Touch) -> Self {
        Self {
            id: touch.touch_id(),
            phase: touch.phase(),
            x: touch.position().x,
            y: touch.position().y,
            raw_x: touch.raw_position().x,
            raw_y: touch.raw_position().y,
            dx: touch.delta_distance().x,
            dy: touch.delta_distance().y,
            dt_ms: touch.delta_time().as_secs_f64() * 1000.0,
        }
    }
}

fn run_listener(config: FileConfig, fps: u32, output: Output) -> Result<()> {
    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&shutdown);
    ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
        .context("Failed to install Ctrl+C handler")?;

    let mut receiver = TuioReceiver::new(config.receiver.clone());
    receiver
        .start()
        .with_context(|| format!("Failed to start TUIO receiver on {}", config.receiver.socket_addr()))?;

    let addr = receiver
        .local_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|| config.receiver.socket_addr());
    println!(
        "{} Listening for TUIO on {} ({}x{})",
        "TOUCHFLOW".cyan().bold(),
        addr,
        config.display.width,
        config.display.height
    );
    println!("  Type 'r' + Enter to force a refresh, 's' + Enter for stats");

    let mut tracker = TouchTracker::tuio(receiver.state(), config.display);
    let commands = spawn_stdin_reader();
    let frame_time = Duration::from_secs_f64(1.0 / fps as f64);

    while !shutdown.load(Ordering::SeqCst) {
        while let Ok(command) = commands.try_recv() {
            match command {
                Command::Refresh => {
                    let cleared = receiver.force_refresh();
                    println!("{} cleared {} cursors", "REFRESH".yellow().bold(), cleared);
                }
                Command::Stats => {
                    let stats = receiver.stats();
                    println!(
                        "{} datagrams={} decode_errors={} socket_errors={} rebinds={}",
                        "STATS".cyan(),
                        stats.datagrams(),
                        stats.decode_errors(),
                        stats.socket_errors(),
                        stats.rebinds()
                    );
                }
            }
        }

        for touch in tracker.poll() {
            if touch.phase() == TouchPhase::Stationary && !output.verbose {
                continue;
            }
            print_touch(&touch, output.json)?;
        }

        std::thread::sleep(frame_time);
    }

    info!("Received shutdown signal");
    receiver.stop()?;
    println!("{}", "Listener stopped".yellow());

    Ok(())
}

fn print_touch(touch: &Touch, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(&TouchLine::from(touch))?);
        return Ok(());
    }

    let phase = format!("{:?}", touch.phase());
    let phase = match touch.phase() {
        TouchPhase::Began => phase.green(),
        TouchPhase::Moved => phase.cyan(),
        TouchPhase::Stationary => phase.normal(),
        TouchPhase::Ended | TouchPhase::Canceled => phase.red(),
    };

    println!(
        "{:>6} {:<10} ({:8.1}, {:8.1}) d=({:6.1}, {:6.1})",
        touch.touch_id(),
        phase,
        touch.position().x,
        touch.position().y,
        touch.delta_distance().x,
        touch.delta_distance().y
    );

    Ok(())
}

fn print_info(config: &FileConfig) {
    println!("{}", "touchflow - TUIO touch ingestion".cyan().bold());
    println!();
    println!("Version:    {}", env!("CARGO_PKG_VERSION"));
    println!("Platform:   {}", std::env::consts::OS);
    println!("Listen:     {}", config.receiver.socket_addr());
    println!(
        "Display:    {}x{} (flip y: {})",
        config.display.width, config.display.height, config.display.flip_y
    );
    println!();
    println!("{}", "Examples:".green());
    println!("  touchflow listen --port 3333          # Listen on the TUIO default port");
    println!("  touchflow listen --json               # JSON lines output");
    println!("  touchflow -c touchflow.toml listen    # Load settings from a file");
}
