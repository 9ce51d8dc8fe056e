//! Reminder board (chime-board) - Main entry point
//!
//! Line-oriented shell around the board core: reads commands from stdin,
//! drives the board clock from a tokio interval, and prints board events as
//! JSON lines on stdout.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chime_board::audio::{AudioDevice, RodioDevice, VirtualDevice};
use chime_board::commands::Command;
use chime_board::config::TomlConfig;
use chime_board::Board;
use chime_common::config::{resolve_config_file, resolve_sound_root};
use chime_common::events::BoardEvent;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for chime-board
#[derive(Parser, Debug)]
#[command(name = "chime-board")]
#[command(about = "Multi-timer reminder board")]
#[command(version)]
struct Args {
    /// Configuration file (falls back to CHIME_CONFIG, then the platform config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Folder containing the sound clips (falls back to CHIME_SOUND_ROOT)
    #[arg(short, long)]
    sound_root: Option<PathBuf>,

    /// Simulate audio output instead of opening a sound device
    #[arg(long)]
    headless: bool,

    /// Seed for clip selection
    #[arg(long)]
    seed: Option<u64>,

    /// Board clock resolution in milliseconds
    #[arg(long, default_value = "50", env = "CHIME_TICK_MS")]
    tick_ms: u64,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    // Configuration is needed before tracing for the default log level
    let config = match resolve_config_file(args.config.as_deref(), "CHIME_CONFIG") {
        Some(path) => TomlConfig::load(&path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => TomlConfig::default(),
    };

    // Initialize tracing
    let fallback_filter = format!(
        "chime_board={0},chime_common={0}",
        config.logging.level
    );
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| fallback_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!(
        "Starting chimeboard (git {}, built {})",
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP")
    );

    let sound_root = resolve_sound_root(
        args.sound_root.as_deref(),
        "CHIME_SOUND_ROOT",
        config.sound_root.as_deref(),
    );
    info!("Sound root: {}", sound_root.display());

    let tick = Duration::from_millis(args.tick_ms.max(1));
    let settings = config.settings();
    let library = config.library();
    let initial = config.board.initial_reminders;

    if args.headless {
        info!("Headless mode: audio is simulated");
        let board = Board::new(settings, library, VirtualDevice::new());
        return run(seeded(board, args.seed), initial, tick).await;
    }

    match RodioDevice::open(sound_root) {
        Ok(device) => {
            let board = Board::new(settings, library, device);
            run(seeded(board, args.seed), initial, tick).await
        }
        Err(e) => {
            warn!("{}; continuing with simulated audio", e);
            let board = Board::new(settings, library, VirtualDevice::new());
            run(seeded(board, args.seed), initial, tick).await
        }
    }
}

fn seeded<D: AudioDevice>(board: Board<D>, seed: Option<u64>) -> Board<D> {
    match seed {
        Some(seed) => board.with_seed(seed),
        None => board,
    }
}

/// Shell loop: clock ticks, stdin commands, Ctrl+C
async fn run<D: AudioDevice>(mut board: Board<D>, initial: usize, tick: Duration) -> Result<()> {
    let mut events = board.subscribe();
    for _ in 0..initial {
        board.add_reminder();
    }

    let started = Instant::now();
    let mut ticker = tokio::time::interval(tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                board.advance_to(started.elapsed());
            }
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    info!("Input closed, shutting down");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                board.advance_to(started.elapsed());
                match line.parse::<Command>() {
                    Ok(Command::Quit) => break,
                    Ok(Command::Status) => print_status(&board)?,
                    Ok(Command::Board(command)) => {
                        if let Err(e) = board.apply(command) {
                            eprintln!("error: {}", e);
                        }
                    }
                    Err(e) => eprintln!("error: {}", e),
                }
            }
            _ = signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down");
                break;
            }
        }
        print_events(&mut events)?;
    }

    info!("Shutdown complete");
    Ok(())
}

/// Print pending low-frequency events as JSON lines
fn print_events(events: &mut broadcast::Receiver<BoardEvent>) -> Result<()> {
    loop {
        match events.try_recv() {
            Ok(event) if event.is_high_frequency() => {}
            Ok(event) => println!("{}", event.to_json_line()?),
            Err(TryRecvError::Lagged(missed)) => warn!("Event printer lagged, {} events skipped", missed),
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return Ok(()),
        }
    }
}

fn print_status<D: AudioDevice>(board: &Board<D>) -> Result<()> {
    let status = serde_json::json!({
        "slots": board.slots(),
        "player": board.player_view(),
        "queue_depth": board.queue_depth(),
    });
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}
