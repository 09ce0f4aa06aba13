//! # World Module
//!
//! The tile grid, enemy records and the per-floor world state the player moves
//! through. A floor is regenerated wholesale whenever the floor index changes;
//! afterwards only positions change.

use crate::game::Position;
use crate::{DamageRange, DescentError, DescentResult, EnemyStats};
use serde::{Deserialize, Serialize};

/// A single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    Wall,
    Floor,
    StairsUp,
    StairsDown,
}

impl Tile {
    /// Whether the player may stand on this tile.
    pub fn is_passable(self) -> bool {
        !matches!(self, Tile::Wall)
    }

    /// Whether this tile is one of the two stair kinds.
    pub fn is_stairs(self) -> bool {
        matches!(self, Tile::StairsUp | Tile::StairsDown)
    }
}

/// Fixed-size 2D tile array, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grid {
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
}

impl Grid {
    /// Creates a grid filled entirely with walls.
    ///
    /// # Examples
    ///
    /// ```
    /// use descent::{Grid, Position, Tile};
    ///
    /// let grid = Grid::new(30, 22);
    /// assert_eq!(grid.get(Position::new(3, 3)), Some(Tile::Wall));
    /// assert_eq!(grid.get(Position::new(30, 0)), None);
    /// ```
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            tiles: vec![Tile::Wall; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Whether `pos` lies inside `[0, width) x [0, height)`.
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    /// Whether `pos` lies inside the 1-tile wall border.
    pub fn is_interior(&self, pos: Position) -> bool {
        pos.x > 0 && pos.y > 0 && pos.x < self.width - 1 && pos.y < self.height - 1
    }

    fn index(&self, pos: Position) -> usize {
        (pos.y * self.width + pos.x) as usize
    }

    /// Returns the tile at `pos`, or None when out of bounds.
    pub fn get(&self, pos: Position) -> Option<Tile> {
        if self.in_bounds(pos) {
            Some(self.tiles[self.index(pos)])
        } else {
            None
        }
    }

    /// Overwrites the tile at `pos`.
    pub fn set(&mut self, pos: Position, tile: Tile) -> DescentResult<()> {
        if !self.in_bounds(pos) {
            return Err(DescentError::InvalidState(format!(
                "Tile write outside grid at {:?}",
                pos
            )));
        }
        let index = self.index(pos);
        self.tiles[index] = tile;
        Ok(())
    }

    /// Sets an interior tile to floor, ignoring border and out-of-range cells.
    pub fn carve(&mut self, pos: Position) {
        if self.is_interior(pos) {
            let index = self.index(pos);
            self.tiles[index] = Tile::Floor;
        }
    }

    /// Whether the tile at `pos` is plain floor (not stairs).
    pub fn is_floor(&self, pos: Position) -> bool {
        self.get(pos) == Some(Tile::Floor)
    }

    /// Iterates over rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Tile]> {
        self.tiles.chunks(self.width.max(1) as usize)
    }

    /// Counts tiles of the given kind.
    pub fn count(&self, tile: Tile) -> usize {
        self.tiles.iter().filter(|&&t| t == tile).count()
    }
}

/// True iff `pos` is in bounds and not a wall.
///
/// Enemies never block movement: stepping onto one starts combat instead.
pub fn can_move(grid: &Grid, pos: Position) -> bool {
    grid.get(pos).map(Tile::is_passable).unwrap_or(false)
}

/// Enemy archetypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Roaming enemy, several per floor
    Weak,
    /// The single tracked enemy per floor
    Strong,
    /// Terminal-floor enemy with a 2x2 footprint
    Boss,
}

impl EnemyKind {
    pub fn name(self) -> &'static str {
        match self {
            EnemyKind::Weak => "Goblin",
            EnemyKind::Strong => "Brute",
            EnemyKind::Boss => "Dungeon Lord",
        }
    }
}

/// Per-floor identifier for an enemy.
pub type EnemyId = u32;

/// A placed enemy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EnemyId,
    pub kind: EnemyKind,
    pub position: Position,
    pub max_hp: i32,
    pub attack: DamageRange,
}

impl Enemy {
    pub fn new(id: EnemyId, kind: EnemyKind, position: Position, stats: EnemyStats) -> Self {
        Self {
            id,
            kind,
            position,
            max_hp: stats.max_hp,
            attack: stats.attack,
        }
    }
}

/// Back-reference from a combat session to the enemy it is fighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyHandle {
    /// A member of the roaming set
    Roaming(EnemyId),
    /// The tracked enemy slot
    Tracked,
    /// The boss slot
    Boss,
}

/// Everything generated for one floor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloorContext {
    pub seed: i64,
    pub floor: u32,
    pub grid: Grid,
    pub player_start: Position,
    pub stairs_up: Option<Position>,
    pub stairs_down: Option<Position>,
    /// Roaming enemies in placement order; no two share a tile
    pub roaming: Vec<Enemy>,
    pub tracked: Option<Enemy>,
    pub boss: Option<Enemy>,
}

impl FloorContext {
    /// Finds the enemy standing on `pos`, checking roaming enemies first,
    /// then the tracked enemy, then the boss when `boss_active` is set.
    pub fn enemy_at(&self, pos: Position, boss_active: bool) -> Option<EnemyHandle> {
        if let Some(enemy) = self.roaming.iter().find(|e| e.position == pos) {
            return Some(EnemyHandle::Roaming(enemy.id));
        }
        if self.tracked.as_ref().is_some_and(|e| e.position == pos) {
            return Some(EnemyHandle::Tracked);
        }
        if boss_active && self.boss.as_ref().is_some_and(|e| e.position == pos) {
            return Some(EnemyHandle::Boss);
        }
        None
    }

    /// Resolves a handle to the enemy it refers to.
    pub fn enemy(&self, handle: EnemyHandle) -> Option<&Enemy> {
        match handle {
            EnemyHandle::Roaming(id) => self.roaming.iter().find(|e| e.id == id),
            EnemyHandle::Tracked => self.tracked.as_ref(),
            EnemyHandle::Boss => self.boss.as_ref(),
        }
    }

    /// Removes a defeated enemy. The boss is never removed: beating it ends
    /// the game instead.
    pub fn remove_enemy(&mut self, handle: EnemyHandle) -> Option<Enemy> {
        match handle {
            EnemyHandle::Roaming(id) => {
                let index = self.roaming.iter().position(|e| e.id == id)?;
                Some(self.roaming.remove(index))
            }
            EnemyHandle::Tracked => self.tracked.take(),
            EnemyHandle::Boss => None,
        }
    }

    /// Whether any enemy occupies `pos`, counting every tile of the boss
    /// footprint.
    pub fn is_occupied(&self, pos: Position) -> bool {
        self.roaming.iter().any(|e| e.position == pos)
            || self.tracked.as_ref().is_some_and(|e| e.position == pos)
            || self
                .boss
                .as_ref()
                .is_some_and(|e| boss_footprint(e.position).contains(&pos))
    }
}

/// The four tiles covered by a boss anchored at `anchor` (its top-left).
pub fn boss_footprint(anchor: Position) -> [Position; 4] {
    [
        anchor,
        Position::new(anchor.x + 1, anchor.y),
        Position::new(anchor.x, anchor.y + 1),
        Position::new(anchor.x + 1, anchor.y + 1),
    ]
}

/// The player's persistent state across floors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub position: Position,
    pub hp: i32,
    pub max_hp: i32,
}

impl PlayerState {
    /// Creates a player at full health.
    pub fn new(position: Position, max_hp: i32) -> Self {
        Self {
            position,
            hp: max_hp,
            max_hp,
        }
    }

    /// Applies damage, clamping at zero. Returns the damage applied.
    pub fn take_damage(&mut self, damage: i32) -> i32 {
        self.hp = (self.hp - damage).max(0);
        damage
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }
}

/// The active floor plus the player walking on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldState {
    pub floor: FloorContext,
    pub player: PlayerState,
}

impl WorldState {
    pub fn new(floor: FloorContext, player: PlayerState) -> Self {
        Self { floor, player }
    }

    /// Swaps in a freshly generated floor, keeping the player's health.
    pub fn replace_floor(&mut self, floor: FloorContext) {
        self.floor = floor;
    }

    /// Moves the player one step if the target tile allows it.
    /// Returns whether the player moved.
    pub fn try_move_player(&mut self, direction: crate::Direction) -> bool {
        let target = self.player.position.step(direction);
        if can_move(&self.floor.grid, target) {
            self.player.position = target;
            true
        } else {
            false
        }
    }

    /// Moves the player off a stair tile to the first orthogonal floor
    /// neighbor, or leaves them in place if there is none.
    pub fn nudge_off_stairs(&mut self) {
        let grid = &self.floor.grid;
        let on_stairs = grid
            .get(self.player.position)
            .is_some_and(Tile::is_stairs);
        if !on_stairs {
            return;
        }
        if let Some(next) = self
            .player
            .position
            .orthogonal_neighbors()
            .into_iter()
            .find(|&pos| grid.is_floor(pos))
        {
            self.player.position = next;
        }
    }
}
