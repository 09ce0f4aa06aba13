//! # Descent Main Entry Point
//!
//! Parses the command line, sets up logging and the window, and runs the
//! fixed-step game loop.

use clap::Parser;
use descent::{
    config, DescentError, DescentResult, GameSession, GameSettings, InputHandler,
    MacroquadDisplay,
};
use log::{error, info};
use macroquad::prelude::*;
use std::path::PathBuf;

/// Longest frame fed into the tick accumulator, so a stalled window does not
/// replay seconds of ticks at once.
const MAX_FRAME_SECONDS: f32 = 0.25;

/// Command line arguments for Descent.
#[derive(Parser, Debug)]
#[command(name = "descent")]
#[command(about = "A seeded dungeon crawler with modal combat")]
#[command(version)]
struct Args {
    /// Seed for dungeon generation; may be negative
    #[arg(short, long, default_value_t = config::DEFAULT_SEED, allow_negative_numbers = true)]
    seed: i64,

    /// JSON file overriding the default settings table
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Print the default settings table as JSON and exit
    #[arg(long)]
    print_settings: bool,

    /// Log filter (error, warn, info, debug, trace, or env_logger syntax)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn window_conf() -> Conf {
    let (width, height) =
        MacroquadDisplay::new().window_size(config::GRID_WIDTH, config::GRID_HEIGHT);
    Conf {
        window_title: "Descent".to_string(),
        window_width: width as i32,
        window_height: height as i32,
        window_resizable: false,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() -> DescentResult<()> {
    let args = Args::parse();

    initialize_logging(&args.log_level)?;

    if args.print_settings {
        println!("{}", GameSettings::default().to_json_pretty()?);
        return Ok(());
    }

    info!("Starting Descent v{}", descent::VERSION);

    if let Err(e) = run_game(&args).await {
        error!("Game exited with an error: {}", e);
        return Err(e);
    }
    Ok(())
}

/// Initializes env_logger from the command line filter.
fn initialize_logging(log_level: &str) -> DescentResult<()> {
    env_logger::Builder::new()
        .parse_filters(log_level)
        .format_target(false)
        .try_init()
        .map_err(|e| DescentError::InvalidState(format!("Logger already set: {}", e)))
}

fn load_settings(path: Option<&PathBuf>) -> DescentResult<GameSettings> {
    match path {
        Some(path) => {
            info!("Loading settings from {}", path.display());
            GameSettings::from_json_file(path)
        }
        None => Ok(GameSettings::default()),
    }
}

/// Main game loop: drain input, apply intents, advance fixed ticks, draw.
async fn run_game(args: &Args) -> DescentResult<()> {
    let settings = load_settings(args.settings.as_ref())?;
    let mut session = GameSession::new(args.seed, settings)?;
    let input_handler = InputHandler::new();
    let mut display = MacroquadDisplay::new();

    let generation = &session.settings().generation;
    let (width, height) = display.window_size(generation.width, generation.height);
    request_new_screen_size(width, height);

    let tick_seconds = session.settings().timing.tick_seconds();
    let mut accumulator = 0.0;

    loop {
        for raw in input_handler.poll() {
            if let Some(intent) = input_handler.map_input(session.input_mode(), raw) {
                session.handle_intent(intent)?;
            }
        }
        if session.quit_requested() {
            info!("Quit requested after {} ticks", session.tick_count());
            break;
        }

        accumulator += get_frame_time().min(MAX_FRAME_SECONDS);
        while accumulator >= tick_seconds {
            session.tick()?;
            accumulator -= tick_seconds;
        }

        for event in session.drain_events() {
            display.add_message(event.message());
        }
        display.render(&session.snapshot(), session.input_mode());

        next_frame().await;
    }

    Ok(())
}
