//! # Dungeon Generation
//!
//! Room-and-corridor layout for a single floor.
//!
//! The generator:
//! 1. Starts from a grid of solid wall
//! 2. Tries a fixed number of random rooms, discarding any that overlap
//! 3. Joins each accepted room to the previous one with an L-shaped corridor
//! 4. Puts stairs up in the first room and stairs down in the last
//! 5. Scatters enemies and, on the boss floor, finds room for the boss
//!
//! Every random draw comes from the stream handed to [`Generator::generate`],
//! so the same `(seed, floor)` stream always yields the same floor.

use crate::game::{Enemy, EnemyKind, FloorContext, Grid, Position, Tile};
use crate::generation::{
    place_boss, scatter_enemies, utils, FloorRequest, GenerationConfig, Generator, Room,
};
use crate::{CombatConfig, DescentResult, GameSettings};
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::Rng;

/// Primary floor generator using the room-and-corridor algorithm.
#[derive(Debug, Clone)]
pub struct DungeonGenerator {
    /// Layout and placement parameters
    pub config: GenerationConfig,
    /// Source of enemy hit points and attack ranges
    pub combat: CombatConfig,
}

impl DungeonGenerator {
    /// Creates a generator from explicit configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use descent::{CombatConfig, DungeonGenerator, FloorRequest, GenerationConfig, Generator};
    /// use descent::generation::utils::floor_rng;
    ///
    /// let generator = DungeonGenerator::new(GenerationConfig::new(), CombatConfig::default());
    /// let request = FloorRequest::new(42, 1);
    /// let floor = generator.generate(&request, &mut floor_rng(42, 1)).unwrap();
    /// assert_eq!(floor.floor, 1);
    /// ```
    pub fn new(config: GenerationConfig, combat: CombatConfig) -> Self {
        Self { config, combat }
    }

    /// Creates a generator from the session settings table.
    pub fn from_settings(settings: &GameSettings) -> Self {
        Self::new(settings.generation.clone(), settings.combat.clone())
    }

    /// Draws a candidate room that keeps a 1-tile wall border.
    fn room_candidate(&self, rng: &mut StdRng) -> Room {
        let config = &self.config;
        let width = rng.gen_range(config.min_room_size..=config.max_room_size);
        let height = rng.gen_range(config.min_room_size..=config.max_room_size);
        let x = rng.gen_range(1..=config.width - width - 1);
        let y = rng.gen_range(1..=config.height - height - 1);
        Room::new(Position::new(x, y), width, height)
    }

    /// Places rooms and corridors. Overlapping candidates are dropped, not
    /// retried, so a floor may end up with fewer rooms than attempted.
    fn place_rooms(&self, grid: &mut Grid, rng: &mut StdRng) -> Vec<Room> {
        let mut rooms: Vec<Room> = Vec::new();

        for _ in 0..self.config.num_rooms {
            let candidate = self.room_candidate(rng);
            if rooms.iter().any(|existing| candidate.overlaps(existing)) {
                continue;
            }

            self.carve_room(grid, &candidate);
            if let Some(previous) = rooms.last() {
                let horizontal_first = rng.gen_bool(0.5);
                self.carve_l_corridor(
                    grid,
                    previous.center(),
                    candidate.center(),
                    horizontal_first,
                );
            }
            rooms.push(candidate);
        }

        rooms
    }

    /// Carves out a room by setting its tiles to floor.
    fn carve_room(&self, grid: &mut Grid, room: &Room) {
        for pos in room.positions() {
            grid.carve(pos);
        }
    }

    /// Carves an L-shaped, 1-tile-wide corridor between two points.
    fn carve_l_corridor(
        &self,
        grid: &mut Grid,
        start: Position,
        end: Position,
        horizontal_first: bool,
    ) {
        let (min_x, max_x) = (start.x.min(end.x), start.x.max(end.x));
        let (min_y, max_y) = (start.y.min(end.y), start.y.max(end.y));

        if horizontal_first {
            for x in min_x..=max_x {
                grid.carve(Position::new(x, start.y));
            }
            for y in min_y..=max_y {
                grid.carve(Position::new(end.x, y));
            }
        } else {
            for y in min_y..=max_y {
                grid.carve(Position::new(start.x, y));
            }
            for x in min_x..=max_x {
                grid.carve(Position::new(x, end.y));
            }
        }
    }

    /// Adds stairs. Up goes in the first room; down goes in the last room
    /// whose center differs from the up stairs, and never on the boss floor.
    fn add_stairs(
        &self,
        grid: &mut Grid,
        rooms: &[Room],
        request: &FloorRequest,
    ) -> DescentResult<(Option<Position>, Option<Position>)> {
        let stairs_up = if request.place_up_stairs {
            rooms.first().map(Room::center)
        } else {
            None
        };

        let wants_down = request.place_down_stairs && !self.config.is_boss_floor(request.floor);
        let stairs_down = if wants_down {
            rooms
                .iter()
                .rev()
                .map(Room::center)
                .find(|&center| Some(center) != stairs_up)
        } else {
            None
        };

        if let Some(pos) = stairs_up {
            grid.set(pos, Tile::StairsUp)?;
        }
        if let Some(pos) = stairs_down {
            grid.set(pos, Tile::StairsDown)?;
        }
        Ok((stairs_up, stairs_down))
    }
}

impl Generator<FloorContext> for DungeonGenerator {
    fn generate(&self, request: &FloorRequest, rng: &mut StdRng) -> DescentResult<FloorContext> {
        self.config.validate()?;

        let mut grid = Grid::new(self.config.width, self.config.height);
        let rooms = self.place_rooms(&mut grid, rng);
        let (stairs_up, stairs_down) = self.add_stairs(&mut grid, &rooms, request)?;

        let player_start = stairs_up
            .or(stairs_down)
            .unwrap_or(self.config.fallback_start);

        let mut reserved: Vec<Position> = [Some(player_start), stairs_up, stairs_down]
            .into_iter()
            .flatten()
            .collect();

        let weak_positions = scatter_enemies(
            &grid,
            &reserved,
            self.config.weak_enemies,
            self.config.placement_attempts,
            rng,
        );
        reserved.extend(&weak_positions);

        let strong_positions = scatter_enemies(
            &grid,
            &reserved,
            self.config.strong_enemies,
            self.config.placement_attempts,
            rng,
        );
        reserved.extend(&strong_positions);

        if weak_positions.len() < self.config.weak_enemies
            || strong_positions.len() < self.config.strong_enemies
        {
            warn!(
                "Floor {} placed {}/{} weak and {}/{} strong enemies",
                request.floor,
                weak_positions.len(),
                self.config.weak_enemies,
                strong_positions.len(),
                self.config.strong_enemies
            );
        }

        let mut next_id = 0;
        let mut spawn = |kind: EnemyKind, position: Position| {
            let enemy = Enemy::new(next_id, kind, position, self.combat.stats(kind));
            next_id += 1;
            enemy
        };

        let roaming: Vec<Enemy> = weak_positions
            .into_iter()
            .map(|pos| spawn(EnemyKind::Weak, pos))
            .collect();
        let tracked = strong_positions
            .first()
            .map(|&pos| spawn(EnemyKind::Strong, pos));

        let boss = if self.config.is_boss_floor(request.floor) {
            match place_boss(&mut grid, &rooms, &reserved) {
                Some(placement) => {
                    debug!("Boss placed at {:?} via {:?}", placement.anchor, placement.method);
                    Some(spawn(EnemyKind::Boss, placement.anchor))
                }
                None => {
                    warn!("Floor {} has no room for the boss", request.floor);
                    None
                }
            }
        } else {
            None
        };

        let floor = FloorContext {
            seed: request.seed,
            floor: request.floor,
            grid,
            player_start,
            stairs_up,
            stairs_down,
            roaming,
            tracked,
            boss,
        };

        self.validate(&floor, request)?;

        debug!(
            "{} built floor {} (seed {}): {} rooms, {} roaming enemies",
            self.generator_type(),
            request.floor,
            request.seed,
            rooms.len(),
            floor.roaming.len()
        );

        Ok(floor)
    }

    fn validate(&self, floor: &FloorContext, _request: &FloorRequest) -> DescentResult<()> {
        utils::validate_floor(floor, self.config.boss_floor)
    }

    fn generator_type(&self) -> &'static str {
        "DungeonGenerator"
    }
}

impl Default for DungeonGenerator {
    fn default() -> Self {
        Self::new(GenerationConfig::default(), CombatConfig::default())
    }
}
