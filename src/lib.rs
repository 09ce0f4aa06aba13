//! # Descent
//!
//! A turn-structured, tile-based dungeon crawler. The player explores seeded,
//! procedurally generated floors, fights enemies in a modal combat screen and
//! works down toward a boss floor.
//!
//! ## Architecture Overview
//!
//! The crate is split into a deterministic core and a thin presentation shell:
//!
//! - **Generation**: per-floor RNG streams and the room-and-corridor generator
//! - **Game**: world state, enemy AI, the combat state machine and the
//!   [`GameSession`] controller that ties them together each tick
//! - **Input**: discrete player intents and the key mapping that produces them
//! - **Rendering**: draws a [`GameSnapshot`] with solid-color cells
//!
//! The core never touches pixels. Each tick it consumes intents and exposes a
//! snapshot of everything needed to draw the frame.

pub mod game;
pub mod generation;
pub mod input;
pub mod rendering;
pub mod settings;

pub use game::*;
pub use generation::*;
pub use input::*;
pub use rendering::*;
pub use settings::*;

/// Core error type for the Descent game engine.
#[derive(thiserror::Error, Debug)]
pub enum DescentError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Settings table is inconsistent
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Game state is invalid
    #[error("Invalid game state: {0}")]
    InvalidState(String),

    /// Intent cannot be applied in the current mode
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// Generation failed
    #[error("Generation failed: {0}")]
    GenerationFailed(String),
}

/// Result type used throughout the Descent codebase.
pub type DescentResult<T> = Result<T, DescentError>;

/// Version information for the game.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default values for the settings table.
pub mod config {
    /// Dungeon width in tiles
    pub const GRID_WIDTH: i32 = 30;

    /// Dungeon height in tiles
    pub const GRID_HEIGHT: i32 = 22;

    /// Candidate rooms attempted per floor
    pub const NUM_ROOMS: u32 = 8;

    /// Smallest room side
    pub const ROOM_MIN_SIZE: i32 = 4;

    /// Largest room side
    pub const ROOM_MAX_SIZE: i32 = 8;

    /// Weak enemies placed per floor
    pub const ENEMIES_PER_FLOOR: usize = 3;

    /// Strong enemies placed per floor
    pub const STRONG_ENEMIES_PER_FLOOR: usize = 1;

    /// Rejection-sampling budget for each placement pass
    pub const PLACEMENT_ATTEMPTS: u32 = 100;

    /// The floor that holds the boss instead of stairs down
    pub const BOSS_FLOOR: u32 = 5;

    pub const PLAYER_MAX_HP: i32 = 100;
    pub const PLAYER_ATTACK_MIN: i32 = 15;
    pub const PLAYER_ATTACK_MAX: i32 = 25;

    pub const WEAK_MAX_HP: i32 = 60;
    pub const WEAK_ATTACK_MIN: i32 = 10;
    pub const WEAK_ATTACK_MAX: i32 = 20;

    pub const STRONG_MAX_HP: i32 = 80;
    pub const STRONG_ATTACK_MIN: i32 = 15;
    pub const STRONG_ATTACK_MAX: i32 = 30;

    pub const BOSS_MAX_HP: i32 = 200;
    pub const BOSS_ATTACK_MIN: i32 = 25;
    pub const BOSS_ATTACK_MAX: i32 = 40;

    /// Probability that a flee attempt succeeds
    pub const FLEE_CHANCE: f64 = 0.7;

    /// Ticks the enemy turn is held on screen before it resolves
    pub const ENEMY_TURN_DELAY: u32 = 30;

    /// Fixed simulation rate of the tick loop
    pub const TICKS_PER_SECOND: u32 = 30;

    /// Roaming enemies take one step every this many ticks
    pub const ENEMY_MOVE_INTERVAL: u32 = 50;

    /// Seed used when none is supplied
    pub const DEFAULT_SEED: i64 = 42;
}
