//! # Combat Module
//!
//! The modal combat screen is a small state machine resolving one encounter
//! between the player and a single enemy:
//!
//! ```text
//! PlayerTurn --attack/defend/failed flee--> EnemyTurn --delay--> PlayerTurn
//!     |                                        |   \
//!     +--flee succeeds--> Fled                 |    +--player hp 0--> (defeat)
//!                                              +--enemy hp 0--> Victory
//! ```
//!
//! `Victory` and `Fled` wait for an acknowledgment before the session is
//! dropped. A defeat ends the session immediately. The enemy-turn delay is a
//! tick count so that a fixed tick rate reproduces every fight exactly.

use crate::config;
use crate::game::{Enemy, EnemyHandle, EnemyKind, PlayerState};
use crate::{DescentError, DescentResult};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Inclusive damage range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DamageRange {
    pub min: i32,
    pub max: i32,
}

impl DamageRange {
    pub fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    /// Draws a uniform value in `[min, max]`.
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> i32 {
        rng.gen_range(self.min..=self.max)
    }
}

/// Hit points and attack range for one enemy kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyStats {
    pub max_hp: i32,
    pub attack: DamageRange,
}

/// Combat numbers from the settings table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    pub player_max_hp: i32,
    pub player_attack: DamageRange,
    pub weak: EnemyStats,
    pub strong: EnemyStats,
    pub boss: EnemyStats,
    /// Probability in `[0, 1]` that a flee attempt succeeds
    pub flee_chance: f64,
    /// Ticks the enemy turn is displayed before it resolves
    pub enemy_turn_delay: u32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            player_max_hp: config::PLAYER_MAX_HP,
            player_attack: DamageRange::new(config::PLAYER_ATTACK_MIN, config::PLAYER_ATTACK_MAX),
            weak: EnemyStats {
                max_hp: config::WEAK_MAX_HP,
                attack: DamageRange::new(config::WEAK_ATTACK_MIN, config::WEAK_ATTACK_MAX),
            },
            strong: EnemyStats {
                max_hp: config::STRONG_MAX_HP,
                attack: DamageRange::new(config::STRONG_ATTACK_MIN, config::STRONG_ATTACK_MAX),
            },
            boss: EnemyStats {
                max_hp: config::BOSS_MAX_HP,
                attack: DamageRange::new(config::BOSS_ATTACK_MIN, config::BOSS_ATTACK_MAX),
            },
            flee_chance: config::FLEE_CHANCE,
            enemy_turn_delay: config::ENEMY_TURN_DELAY,
        }
    }
}

impl CombatConfig {
    /// Stats for an enemy kind.
    pub fn stats(&self, kind: EnemyKind) -> EnemyStats {
        match kind {
            EnemyKind::Weak => self.weak,
            EnemyKind::Strong => self.strong,
            EnemyKind::Boss => self.boss,
        }
    }

    pub fn validate(&self) -> DescentResult<()> {
        if self.player_max_hp <= 0 {
            return Err(DescentError::InvalidConfig(
                "player_max_hp must be positive".to_string(),
            ));
        }
        // Every damage draw must be at least 1 so fights always terminate.
        let ranges = [
            ("player_attack", self.player_attack),
            ("weak.attack", self.weak.attack),
            ("strong.attack", self.strong.attack),
            ("boss.attack", self.boss.attack),
        ];
        for (name, range) in ranges {
            if range.min < 1 || range.max < range.min {
                return Err(DescentError::InvalidConfig(format!(
                    "{} must satisfy 1 <= min <= max, got {}..={}",
                    name, range.min, range.max
                )));
            }
        }
        for (name, stats) in [("weak", self.weak), ("strong", self.strong), ("boss", self.boss)] {
            if stats.max_hp <= 0 {
                return Err(DescentError::InvalidConfig(format!(
                    "{}.max_hp must be positive",
                    name
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.flee_chance) {
            return Err(DescentError::InvalidConfig(format!(
                "flee_chance must lie in [0, 1], got {}",
                self.flee_chance
            )));
        }
        Ok(())
    }
}

/// Damage after the defend rule: halved, rounded down, never below 1.
///
/// # Examples
///
/// ```
/// use descent::apply_defense;
///
/// assert_eq!(apply_defense(17, false), 17);
/// assert_eq!(apply_defense(17, true), 8);
/// assert_eq!(apply_defense(1, true), 1);
/// ```
pub fn apply_defense(damage: i32, defending: bool) -> i32 {
    if defending {
        (damage / 2).max(1)
    } else {
        damage
    }
}

/// Shared damage formula: a uniform roll, then the defend rule.
pub fn roll_damage<R: Rng + ?Sized>(range: DamageRange, defending: bool, rng: &mut R) -> i32 {
    apply_defense(range.roll(rng), defending)
}

/// Player choices on their turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatAction {
    Attack,
    Defend,
    Flee,
}

/// Where the encounter currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatPhase {
    PlayerTurn,
    /// The enemy is about to act; resolves once the countdown reaches zero
    EnemyTurn { delay_remaining: u32 },
    /// Enemy hp reached zero; waiting for acknowledgment
    Victory,
    /// The player escaped; waiting for acknowledgment
    Fled,
}

/// What happened as a result of a player action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Attacked { damage: i32 },
    Defended,
    FleeSucceeded,
    FleeFailed,
}

/// What the enemy turn produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyTurnOutcome {
    /// The countdown is still running
    Waiting,
    /// The turn finished; `damage` is None when the enemy was already down
    Resolved { damage: Option<i32>, defended: bool },
    /// The player was reduced to zero hp; the session is over
    PlayerDefeated { damage: i32 },
}

/// How a session ended, handed back to the controller for bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatResolution {
    Victory(EnemyHandle),
    Fled(EnemyHandle),
    Defeat(EnemyHandle),
}

/// One live encounter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatSession {
    pub enemy_kind: EnemyKind,
    /// Which world entity this fight is against
    pub enemy: EnemyHandle,
    pub enemy_hp: i32,
    pub enemy_max_hp: i32,
    pub enemy_attack: DamageRange,
    pub phase: CombatPhase,
    /// Most recent damage number, shown on the combat panel
    pub last_damage: Option<i32>,
    pub player_defending: bool,
    turn_delay: u32,
}

impl CombatSession {
    /// Starts an encounter on the player's turn with the enemy at full health.
    pub fn new(handle: EnemyHandle, enemy: &Enemy, turn_delay: u32) -> Self {
        Self {
            enemy_kind: enemy.kind,
            enemy: handle,
            enemy_hp: enemy.max_hp,
            enemy_max_hp: enemy.max_hp,
            enemy_attack: enemy.attack,
            phase: CombatPhase::PlayerTurn,
            last_damage: None,
            player_defending: false,
            turn_delay,
        }
    }

    /// Whether the session is waiting for an acknowledgment to close.
    pub fn awaiting_acknowledgment(&self) -> bool {
        matches!(self.phase, CombatPhase::Victory | CombatPhase::Fled)
    }

    /// Applies the player's choice. Only legal during `PlayerTurn`.
    pub fn apply_player_action<R: Rng + ?Sized>(
        &mut self,
        action: CombatAction,
        rules: &CombatConfig,
        rng: &mut R,
    ) -> DescentResult<ActionOutcome> {
        if self.phase != CombatPhase::PlayerTurn {
            return Err(DescentError::InvalidAction(format!(
                "{:?} is not allowed during {:?}",
                action, self.phase
            )));
        }

        let outcome = match action {
            CombatAction::Attack => {
                let damage = roll_damage(rules.player_attack, false, rng);
                self.enemy_hp -= damage;
                self.last_damage = Some(damage);
                self.player_defending = false;
                ActionOutcome::Attacked { damage }
            }
            CombatAction::Defend => {
                self.player_defending = true;
                ActionOutcome::Defended
            }
            CombatAction::Flee => {
                if rng.gen::<f64>() < rules.flee_chance {
                    self.phase = CombatPhase::Fled;
                    return Ok(ActionOutcome::FleeSucceeded);
                }
                self.player_defending = false;
                ActionOutcome::FleeFailed
            }
        };

        self.phase = CombatPhase::EnemyTurn {
            delay_remaining: self.turn_delay,
        };
        Ok(outcome)
    }

    /// Advances the enemy turn by one tick. The countdown always runs to zero
    /// before the enemy acts.
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        player: &mut PlayerState,
        rng: &mut R,
    ) -> EnemyTurnOutcome {
        let CombatPhase::EnemyTurn { delay_remaining } = self.phase else {
            return EnemyTurnOutcome::Waiting;
        };
        if delay_remaining > 0 {
            self.phase = CombatPhase::EnemyTurn {
                delay_remaining: delay_remaining - 1,
            };
            return EnemyTurnOutcome::Waiting;
        }

        let defended = self.player_defending;
        let mut damage = None;
        if self.enemy_hp > 0 {
            let dealt = roll_damage(self.enemy_attack, defended, rng);
            player.take_damage(dealt);
            self.last_damage = Some(dealt);
            damage = Some(dealt);
        }

        if self.enemy_hp <= 0 {
            self.phase = CombatPhase::Victory;
        } else if !player.is_alive() {
            return EnemyTurnOutcome::PlayerDefeated {
                damage: damage.unwrap_or(0),
            };
        } else {
            self.phase = CombatPhase::PlayerTurn;
        }
        EnemyTurnOutcome::Resolved { damage, defended }
    }

    /// Closes a finished session on acknowledgment.
    pub fn acknowledge(&self) -> Option<CombatResolution> {
        match self.phase {
            CombatPhase::Victory => Some(CombatResolution::Victory(self.enemy)),
            CombatPhase::Fled => Some(CombatResolution::Fled(self.enemy)),
            _ => None,
        }
    }
}
