//! # Encounter Placement
//!
//! Places enemies and the boss on a laid-out floor.

use crate::game::{boss_footprint, Grid, Position, Tile};
use crate::generation::Room;
use rand::Rng;

/// Rejection-samples up to `count` distinct interior floor tiles that avoid
/// `reserved`, giving up after `attempts` draws. Returning fewer than `count`
/// positions is an accepted outcome, not an error.
pub fn scatter_enemies<R: Rng + ?Sized>(
    grid: &Grid,
    reserved: &[Position],
    count: usize,
    attempts: u32,
    rng: &mut R,
) -> Vec<Position> {
    let mut placed: Vec<Position> = Vec::with_capacity(count);
    let mut tries = 0;
    while placed.len() < count && tries < attempts {
        let pos = Position::new(
            rng.gen_range(1..=grid.width() - 2),
            rng.gen_range(1..=grid.height() - 2),
        );
        if grid.is_floor(pos) && !reserved.contains(&pos) && !placed.contains(&pos) {
            placed.push(pos);
        }
        tries += 1;
    }
    placed
}

/// How the boss footprint was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BossPlacementMethod {
    /// Centered in one of the rooms
    Room,
    /// First free 2x2 block in a row-major scan of the grid
    GridScan,
    /// Carved out of wall next to existing floor
    Carved,
}

/// Where the boss ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BossPlacement {
    /// Top-left tile of the 2x2 footprint
    pub anchor: Position,
    pub method: BossPlacementMethod,
}

/// Finds a 2x2 footprint for the boss that avoids every `blocked` tile.
///
/// Rooms are tried first in generation order, each at its center block. If
/// none fits, the grid is scanned row-major for any free floor block. As a
/// last resort a block that touches existing floor is carved out of the
/// walls, so a floor with at least one walkable tile always gets its boss.
pub fn place_boss(grid: &mut Grid, rooms: &[Room], blocked: &[Position]) -> Option<BossPlacement> {
    let is_free = |grid: &Grid, anchor: Position| {
        boss_footprint(anchor)
            .iter()
            .all(|&pos| grid.is_floor(pos) && !blocked.contains(&pos))
    };

    let in_room = rooms
        .iter()
        .filter(|room| room.width >= 2 && room.height >= 2)
        .map(|room| {
            Position::new(
                room.top_left.x + room.width / 2 - 1,
                room.top_left.y + room.height / 2 - 1,
            )
        })
        .find(|&anchor| is_free(&*grid, anchor));
    if let Some(anchor) = in_room {
        return Some(BossPlacement {
            anchor,
            method: BossPlacementMethod::Room,
        });
    }

    let interior_anchors: Vec<Position> = (1..grid.height() - 2)
        .flat_map(|y| (1..grid.width() - 2).map(move |x| Position::new(x, y)))
        .collect();

    if let Some(&anchor) = interior_anchors.iter().find(|&&anchor| is_free(&*grid, anchor)) {
        return Some(BossPlacement {
            anchor,
            method: BossPlacementMethod::GridScan,
        });
    }

    let carvable = interior_anchors.into_iter().find(|&anchor| {
        let footprint = boss_footprint(anchor);
        footprint.iter().all(|&pos| {
            matches!(grid.get(pos), Some(Tile::Floor | Tile::Wall)) && !blocked.contains(&pos)
        }) && footprint.iter().any(|&pos| grid.is_floor(pos))
    })?;
    for pos in boss_footprint(carvable) {
        grid.carve(pos);
    }
    Some(BossPlacement {
        anchor: carvable,
        method: BossPlacementMethod::Carved,
    })
}
