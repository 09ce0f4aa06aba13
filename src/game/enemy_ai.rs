//! # Enemy AI
//!
//! Roaming and tracked enemies wander: each step they pick one random free
//! orthogonal floor tile, or stay put when boxed in. The boss never moves.

use crate::game::{FloorContext, Position};
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

/// Tick-counted trigger for enemy steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EnemyStepTimer {
    counter: u32,
}

impl EnemyStepTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one tick; returns true (and restarts) every `interval` ticks.
    pub fn tick(&mut self, interval: u32) -> bool {
        self.counter += 1;
        if self.counter >= interval {
            self.counter = 0;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.counter = 0;
    }
}

/// Moves every roaming enemy, then the tracked enemy, by one random legal step.
///
/// A tile is legal when it is plain floor and holds neither the player nor any
/// other enemy, the boss footprint included. Occupancy is read after each
/// individual move, so no two enemies ever end on the same tile.
pub fn step_enemies<R: Rng + ?Sized>(floor: &mut FloorContext, player: Position, rng: &mut R) {
    for index in 0..floor.roaming.len() {
        let from = floor.roaming[index].position;
        if let Some(to) = pick_step(floor, from, player, rng) {
            floor.roaming[index].position = to;
        }
    }

    if let Some(from) = floor.tracked.as_ref().map(|e| e.position) {
        if let Some(to) = pick_step(floor, from, player, rng) {
            if let Some(tracked) = floor.tracked.as_mut() {
                tracked.position = to;
            }
        }
    }

    debug!(
        "Enemies stepped on floor {}: {} roaming, tracked {}",
        floor.floor,
        floor.roaming.len(),
        if floor.tracked.is_some() { "present" } else { "absent" }
    );
}

fn pick_step<R: Rng + ?Sized>(
    floor: &FloorContext,
    from: Position,
    player: Position,
    rng: &mut R,
) -> Option<Position> {
    let candidates: Vec<Position> = from
        .orthogonal_neighbors()
        .into_iter()
        .filter(|&pos| floor.grid.is_floor(pos) && pos != player && !floor.is_occupied(pos))
        .collect();
    candidates.choose(rng).copied()
}
