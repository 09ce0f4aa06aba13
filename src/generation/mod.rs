//! # Generation Module
//!
//! Deterministic procedural generation of dungeon floors.
//!
//! Every floor is built from its own random stream keyed by `(seed, floor)`,
//! so walking back up to a floor rebuilds it exactly as it was first seen.
//! Layout (rooms, corridors, stairs) lives in [`dungeon`]; enemy and boss
//! placement lives in [`encounters`].

pub mod dungeon;
pub mod encounters;

pub use dungeon::*;
pub use encounters::*;

use crate::config;
use crate::game::{FloorContext, Position, Tile};
use crate::{DescentError, DescentResult};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Largest accepted grid side, in tiles.
pub const MAX_GRID_SIDE: i32 = 1024;

/// Configuration for floor generation.
///
/// Controls the grid size, how many rooms are attempted and how large they
/// may be, and how many enemies of each kind are placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Grid width in tiles
    pub width: i32,
    /// Grid height in tiles
    pub height: i32,
    /// Candidate rooms attempted per floor; overlapping candidates are dropped
    pub num_rooms: u32,
    /// Minimum room side
    pub min_room_size: i32,
    /// Maximum room side
    pub max_room_size: i32,
    /// Target count of weak enemies
    pub weak_enemies: usize,
    /// Target count of strong enemies (the tracked slot holds at most one)
    pub strong_enemies: usize,
    /// Rejection-sampling budget per placement pass
    pub placement_attempts: u32,
    /// Floor index that holds the boss and no stairs down
    pub boss_floor: u32,
    /// Start tile used when a floor has no stairs at all
    pub fallback_start: Position,
}

impl GenerationConfig {
    /// Creates the standard configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use descent::GenerationConfig;
    ///
    /// let config = GenerationConfig::new();
    /// assert_eq!((config.width, config.height), (30, 22));
    /// assert!(config.max_room_size >= config.min_room_size);
    /// ```
    pub fn new() -> Self {
        Self {
            width: config::GRID_WIDTH,
            height: config::GRID_HEIGHT,
            num_rooms: config::NUM_ROOMS,
            min_room_size: config::ROOM_MIN_SIZE,
            max_room_size: config::ROOM_MAX_SIZE,
            weak_enemies: config::ENEMIES_PER_FLOOR,
            strong_enemies: config::STRONG_ENEMIES_PER_FLOOR,
            placement_attempts: config::PLACEMENT_ATTEMPTS,
            boss_floor: config::BOSS_FLOOR,
            fallback_start: Position::new(1, 1),
        }
    }

    /// Creates a cramped configuration for exercising degraded generation.
    pub fn for_testing() -> Self {
        Self {
            width: 16,
            height: 12,
            num_rooms: 4,
            min_room_size: 3,
            max_room_size: 5,
            ..Self::new()
        }
    }

    /// Checks that rooms of every allowed size fit inside the wall border.
    pub fn validate(&self) -> DescentResult<()> {
        if self.min_room_size < 2 || self.max_room_size < self.min_room_size {
            return Err(DescentError::InvalidConfig(format!(
                "room size range {}..={} is invalid",
                self.min_room_size, self.max_room_size
            )));
        }
        // Top-left x is drawn from 1..=width - w - 1, which needs width >= w + 2.
        if self.width < self.max_room_size + 2 || self.height < self.max_room_size + 2 {
            return Err(DescentError::InvalidConfig(format!(
                "grid {}x{} cannot hold rooms of side {}",
                self.width, self.height, self.max_room_size
            )));
        }
        if self.width > MAX_GRID_SIDE || self.height > MAX_GRID_SIDE {
            return Err(DescentError::InvalidConfig(format!(
                "grid {}x{} exceeds the {} tile limit per side",
                self.width, self.height, MAX_GRID_SIDE
            )));
        }
        if self.strong_enemies > 1 {
            return Err(DescentError::InvalidConfig(
                "at most one strong enemy per floor is tracked".to_string(),
            ));
        }
        let fallback = self.fallback_start;
        if fallback.x <= 0
            || fallback.y <= 0
            || fallback.x >= self.width - 1
            || fallback.y >= self.height - 1
        {
            return Err(DescentError::InvalidConfig(format!(
                "fallback start {:?} is not an interior tile",
                fallback
            )));
        }
        Ok(())
    }

    /// Whether `floor` is the boss floor.
    pub fn is_boss_floor(&self, floor: u32) -> bool {
        floor == self.boss_floor
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// A rectangular room used while laying out a floor.
///
/// Rooms only exist during generation; the finished floor keeps just tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Top-left corner of the room
    pub top_left: Position,
    pub width: i32,
    pub height: i32,
}

impl Room {
    /// Creates a new room.
    ///
    /// # Examples
    ///
    /// ```
    /// use descent::{Position, Room};
    ///
    /// let room = Room::new(Position::new(5, 5), 6, 4);
    /// assert_eq!(room.center(), Position::new(8, 7));
    /// ```
    pub fn new(top_left: Position, width: i32, height: i32) -> Self {
        Self {
            top_left,
            width,
            height,
        }
    }

    /// Gets the center position of the room (rounded toward the top-left).
    pub fn center(&self) -> Position {
        Position::new(
            self.top_left.x + self.width / 2,
            self.top_left.y + self.height / 2,
        )
    }

    /// Axis-aligned overlap test between two rooms.
    pub fn overlaps(&self, other: &Room) -> bool {
        !(self.top_left.x >= other.top_left.x + other.width
            || other.top_left.x >= self.top_left.x + self.width
            || self.top_left.y >= other.top_left.y + other.height
            || other.top_left.y >= self.top_left.y + self.height)
    }

    /// Gets every position covered by the room.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (self.top_left.y..self.top_left.y + self.height).flat_map(move |y| {
            (self.top_left.x..self.top_left.x + self.width).map(move |x| Position::new(x, y))
        })
    }
}

/// Which floor to build and which stairs it should carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloorRequest {
    pub seed: i64,
    pub floor: u32,
    pub place_up_stairs: bool,
    pub place_down_stairs: bool,
}

impl FloorRequest {
    /// A request for both stair kinds.
    pub fn new(seed: i64, floor: u32) -> Self {
        Self {
            seed,
            floor,
            place_up_stairs: true,
            place_down_stairs: true,
        }
    }

    pub fn with_up_stairs(mut self, place: bool) -> Self {
        self.place_up_stairs = place;
        self
    }

    pub fn with_down_stairs(mut self, place: bool) -> Self {
        self.place_down_stairs = place;
        self
    }
}

/// Trait for procedural generators.
pub trait Generator<T> {
    /// Generates content for `request`, drawing every random value from `rng`.
    fn generate(&self, request: &FloorRequest, rng: &mut StdRng) -> DescentResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, request: &FloorRequest) -> DescentResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

/// Utility functions for generation algorithms.
pub mod utils {
    use super::*;
    use rand::SeedableRng;
    use std::collections::HashSet;

    /// Derives the 64-bit stream key for a floor.
    ///
    /// Mixes the pair through a splitmix64 finalizer so neighbouring seeds
    /// and floors land on unrelated streams.
    pub fn floor_stream_key(seed: i64, floor: u32) -> u64 {
        let mut z = (seed as u64)
            ^ (floor as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
            ^ 0xD1B5_4A32_D192_ED03;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Creates the deterministic random stream for `(seed, floor)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use descent::generation::utils::floor_rng;
    /// use rand::Rng;
    ///
    /// let a: u64 = floor_rng(42, 1).gen();
    /// let b: u64 = floor_rng(42, 1).gen();
    /// assert_eq!(a, b);
    /// ```
    pub fn floor_rng(seed: i64, floor: u32) -> StdRng {
        StdRng::seed_from_u64(floor_stream_key(seed, floor))
    }

    /// Checks the placement invariants of a finished floor: the player start,
    /// both stairs, every enemy and the boss sit on distinct tiles, and every
    /// one of them except the stairs is plain floor.
    pub fn validate_floor(floor: &FloorContext, boss_floor: u32) -> DescentResult<()> {
        if floor.floor == boss_floor && floor.stairs_down.is_some() {
            return Err(DescentError::GenerationFailed(
                "boss floor must not have stairs down".to_string(),
            ));
        }

        let mut taken = HashSet::new();
        let mut claim = |pos: Position, what: &str| -> DescentResult<()> {
            if taken.insert(pos) {
                Ok(())
            } else {
                Err(DescentError::GenerationFailed(format!(
                    "{} at {:?} overlaps another placement",
                    what, pos
                )))
            }
        };

        if let Some(pos) = floor.stairs_up {
            if floor.grid.get(pos) != Some(Tile::StairsUp) {
                return Err(DescentError::GenerationFailed(
                    "stairs up not marked on grid".to_string(),
                ));
            }
            claim(pos, "stairs up")?;
        }
        if let Some(pos) = floor.stairs_down {
            if floor.grid.get(pos) != Some(Tile::StairsDown) {
                return Err(DescentError::GenerationFailed(
                    "stairs down not marked on grid".to_string(),
                ));
            }
            claim(pos, "stairs down")?;
        }
        let start = Some(floor.player_start);
        if start != floor.stairs_up && start != floor.stairs_down {
            claim(floor.player_start, "player start")?;
        }

        let enemies = floor
            .roaming
            .iter()
            .chain(floor.tracked.iter())
            .chain(floor.boss.iter());
        for enemy in enemies {
            if !floor.grid.is_floor(enemy.position) {
                return Err(DescentError::GenerationFailed(format!(
                    "{:?} placed on a non-floor tile at {:?}",
                    enemy.kind, enemy.position
                )));
            }
            claim(enemy.position, enemy.kind.name())?;
        }
        Ok(())
    }
}
