//! # Game Session Module
//!
//! The session controller: owns the world, the optional combat session, the
//! seed and the session RNG, and advances all of them one tick at a time.
//!
//! Each frame the presentation shell hands over the intents it polled, then
//! calls [`GameSession::tick`] once per fixed step. A tick runs, in order:
//! the combat countdown, floor transitions, the stairs nudge, the encounter
//! check and the enemy step timer.

use crate::game::{
    step_enemies, ActionOutcome, CombatAction, CombatPhase, CombatResolution, CombatSession,
    EnemyHandle, EnemyKind, EnemyStepTimer, EnemyTurnOutcome, Grid, PlayerState, Position,
    WorldState,
};
use crate::generation::utils::floor_rng;
use crate::{
    DescentResult, DungeonGenerator, FloorRequest, GameSettings, Generator, InputMode, Intent,
};
use log::{debug, info};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Top-level screen the session is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    /// Waiting for the first start-new-game intent
    Title,
    Playing,
    /// Game over; the world is frozen until a new game starts
    Lost,
    /// The boss is beaten
    Won,
}

/// Something that happened during a tick, drained by the presentation for
/// its message log and sound cues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    NewGame { seed: i64 },
    FloorEntered { floor: u32 },
    CombatStarted { kind: EnemyKind },
    PlayerAttacked { damage: i32 },
    PlayerDefended,
    FleeSucceeded,
    FleeFailed,
    EnemyAttacked { kind: EnemyKind, damage: i32, defended: bool },
    EnemyDefeated { kind: EnemyKind },
    PlayerDefeated { kind: EnemyKind },
    GameWon,
    SeedChanged { seed: i64 },
    SeedRejected { input: String },
}

impl GameEvent {
    /// One-line text for the message log.
    pub fn message(&self) -> String {
        match self {
            GameEvent::NewGame { seed } => format!("A new descent begins (seed {})", seed),
            GameEvent::FloorEntered { floor } => format!("You enter floor {}", floor),
            GameEvent::CombatStarted { kind } => format!("A {} blocks your way!", kind.name()),
            GameEvent::PlayerAttacked { damage } => format!("You hit for {} damage", damage),
            GameEvent::PlayerDefended => "You raise your guard".to_string(),
            GameEvent::FleeSucceeded => "You escaped!".to_string(),
            GameEvent::FleeFailed => "You failed to escape".to_string(),
            GameEvent::EnemyAttacked {
                kind,
                damage,
                defended,
            } => {
                if *defended {
                    format!("The {} hits your guard for {}", kind.name(), damage)
                } else {
                    format!("The {} hits you for {}", kind.name(), damage)
                }
            }
            GameEvent::EnemyDefeated { kind } => format!("The {} falls", kind.name()),
            GameEvent::PlayerDefeated { kind } => format!("You were slain by the {}", kind.name()),
            GameEvent::GameWon => "The Dungeon Lord is defeated!".to_string(),
            GameEvent::SeedChanged { seed } => format!("Seed set to {}", seed),
            GameEvent::SeedRejected { input } => format!("'{}' is not a valid seed", input),
        }
    }
}

/// Everything the presentation needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub status: GameStatus,
    pub seed: i64,
    pub floor: u32,
    pub grid: Grid,
    pub player: PlayerState,
    pub roaming: Vec<Position>,
    pub tracked: Option<Position>,
    /// Top-left tile of the boss footprint
    pub boss: Option<Position>,
    pub combat: Option<CombatSession>,
    /// Seed text being typed, when seed entry is open
    pub seed_entry: Option<String>,
    /// Whether the seed label accepts edits right now
    pub seed_editable: bool,
    pub tick: u64,
}

/// One game from the title screen onward.
#[derive(Debug, Clone)]
pub struct GameSession {
    settings: GameSettings,
    generator: DungeonGenerator,
    seed: i64,
    /// Active floor and the player on it
    pub world: WorldState,
    /// Present exactly while an encounter is on screen
    pub combat: Option<CombatSession>,
    seed_entry: Option<String>,
    status: GameStatus,
    /// Reset to the floor stream on every regeneration; combat and enemy AI
    /// keep drawing from it afterwards.
    rng: StdRng,
    enemy_timer: EnemyStepTimer,
    tick_count: u64,
    quit_requested: bool,
    events: Vec<GameEvent>,
}

impl GameSession {
    /// Builds floor 1 for `seed` and waits on the title screen.
    ///
    /// # Examples
    ///
    /// ```
    /// use descent::{GameSession, GameSettings, GameStatus, Intent};
    ///
    /// let mut session = GameSession::new(42, GameSettings::default()).unwrap();
    /// assert_eq!(session.status(), GameStatus::Title);
    ///
    /// session.step([Intent::StartNewGame]).unwrap();
    /// assert_eq!(session.status(), GameStatus::Playing);
    /// assert_eq!(session.floor_index(), 1);
    /// ```
    pub fn new(seed: i64, settings: GameSettings) -> DescentResult<Self> {
        settings.validate()?;
        let generator = DungeonGenerator::from_settings(&settings);

        let mut rng = floor_rng(seed, 1);
        let floor = generator.generate(&FloorRequest::new(seed, 1), &mut rng)?;
        let player = PlayerState::new(floor.player_start, settings.combat.player_max_hp);
        info!("Session created with seed {}", seed);

        Ok(Self {
            settings,
            generator,
            seed,
            world: WorldState::new(floor, player),
            combat: None,
            seed_entry: None,
            status: GameStatus::Title,
            rng,
            enemy_timer: EnemyStepTimer::new(),
            tick_count: 0,
            quit_requested: false,
            events: Vec::new(),
        })
    }

    pub fn seed(&self) -> i64 {
        self.seed
    }

    pub fn floor_index(&self) -> u32 {
        self.world.floor.floor
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn seed_entry(&self) -> Option<&str> {
        self.seed_entry.as_deref()
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Takes every event recorded since the last drain.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// The seed may only change on floor 1 outside combat.
    pub fn seed_editable(&self) -> bool {
        self.status == GameStatus::Playing && self.floor_index() == 1 && self.combat.is_none()
    }

    /// Which group of intents the session currently accepts.
    pub fn input_mode(&self) -> InputMode {
        match self.status {
            GameStatus::Title => InputMode::Title,
            GameStatus::Lost | GameStatus::Won => InputMode::Ended,
            GameStatus::Playing => match &self.combat {
                Some(session) if session.awaiting_acknowledgment() => {
                    InputMode::CombatAwaitingAck
                }
                Some(session) if session.phase == CombatPhase::PlayerTurn => {
                    InputMode::CombatTurn
                }
                Some(_) => InputMode::CombatBusy,
                None if self.seed_entry.is_some() => InputMode::SeedEntry,
                None => InputMode::Exploring,
            },
        }
    }

    /// Applies a batch of intents, then advances one tick.
    pub fn step(&mut self, intents: impl IntoIterator<Item = Intent>) -> DescentResult<()> {
        for intent in intents {
            self.handle_intent(intent)?;
        }
        self.tick()
    }

    /// Applies one intent. Intents the current mode does not accept are
    /// ignored.
    pub fn handle_intent(&mut self, intent: Intent) -> DescentResult<()> {
        if intent == Intent::Quit {
            self.quit_requested = true;
            return Ok(());
        }

        let mode = self.input_mode();
        match (mode, intent) {
            (InputMode::Title, Intent::StartNewGame) => {
                self.status = GameStatus::Playing;
                self.events.push(GameEvent::NewGame { seed: self.seed });
                info!("Game started with seed {}", self.seed);
            }
            (InputMode::Ended, Intent::StartNewGame) => self.start_new_game()?,
            (InputMode::Exploring, Intent::Move(direction)) => {
                self.world.try_move_player(direction);
            }
            (InputMode::Exploring, Intent::EnterSeedEdit) if self.seed_editable() => {
                self.seed_entry = Some(String::new());
            }
            (InputMode::SeedEntry, Intent::AppendSeedChar(c)) => self.append_seed_char(c),
            (InputMode::SeedEntry, Intent::Backspace) => {
                if let Some(text) = self.seed_entry.as_mut() {
                    text.pop();
                }
            }
            (InputMode::SeedEntry, Intent::CommitSeed) => self.commit_seed()?,
            (InputMode::SeedEntry, Intent::CancelSeedEdit) => self.seed_entry = None,
            (InputMode::CombatTurn, Intent::Attack) => self.combat_action(CombatAction::Attack)?,
            (InputMode::CombatTurn, Intent::Defend) => self.combat_action(CombatAction::Defend)?,
            (InputMode::CombatTurn, Intent::Flee) => self.combat_action(CombatAction::Flee)?,
            (InputMode::CombatAwaitingAck, Intent::Acknowledge) => {
                if let Some(resolution) = self.combat.as_ref().and_then(CombatSession::acknowledge)
                {
                    self.finish_combat(resolution);
                }
            }
            (mode, intent) => debug!("Ignoring {:?} in {:?} mode", intent, mode),
        }
        Ok(())
    }

    /// Advances the session by one fixed tick. The world is frozen on the
    /// title, game over and win screens.
    pub fn tick(&mut self) -> DescentResult<()> {
        self.tick_count += 1;
        if self.status != GameStatus::Playing {
            return Ok(());
        }

        self.advance_combat();
        if self.status != GameStatus::Playing {
            return Ok(());
        }

        if self.combat.is_none() && self.seed_entry.is_none() {
            self.take_stairs()?;
            self.check_encounter();
        }

        if self.combat.is_none()
            && self
                .enemy_timer
                .tick(self.settings.timing.enemy_move_interval)
        {
            step_enemies(&mut self.world.floor, self.world.player.position, &mut self.rng);
        }
        Ok(())
    }

    /// Builds the render snapshot for the current frame.
    pub fn snapshot(&self) -> GameSnapshot {
        let floor = &self.world.floor;
        GameSnapshot {
            status: self.status,
            seed: self.seed,
            floor: floor.floor,
            grid: floor.grid.clone(),
            player: self.world.player,
            roaming: floor.roaming.iter().map(|e| e.position).collect(),
            tracked: floor.tracked.as_ref().map(|e| e.position),
            boss: floor.boss.as_ref().map(|e| e.position),
            combat: self.combat.clone(),
            seed_entry: self.seed_entry.clone(),
            seed_editable: self.seed_editable(),
            tick: self.tick_count,
        }
    }

    /// Replaces the active floor with a fresh build of `floor` and restarts
    /// the session RNG on that floor's stream.
    fn regenerate(&mut self, floor: u32, up_stairs: bool, down_stairs: bool) -> DescentResult<()> {
        let request = FloorRequest::new(self.seed, floor)
            .with_up_stairs(up_stairs)
            .with_down_stairs(down_stairs);
        self.rng = floor_rng(self.seed, floor);
        let context = self.generator.generate(&request, &mut self.rng)?;
        self.world.replace_floor(context);
        self.events.push(GameEvent::FloorEntered { floor });
        info!("Entered floor {} (seed {})", floor, self.seed);
        Ok(())
    }

    /// Back to floor 1 at full health with the current seed.
    fn reset_to_first_floor(&mut self) -> DescentResult<()> {
        self.regenerate(1, true, true)?;
        self.world.player = PlayerState::new(
            self.world.floor.player_start,
            self.settings.combat.player_max_hp,
        );
        self.combat = None;
        self.seed_entry = None;
        self.enemy_timer.reset();
        Ok(())
    }

    fn start_new_game(&mut self) -> DescentResult<()> {
        self.reset_to_first_floor()?;
        self.status = GameStatus::Playing;
        self.events.push(GameEvent::NewGame { seed: self.seed });
        info!("New game with seed {}", self.seed);
        Ok(())
    }

    /// Digits anywhere, a minus sign only as the first character.
    fn append_seed_char(&mut self, c: char) {
        if let Some(text) = self.seed_entry.as_mut() {
            if c.is_ascii_digit() || (c == '-' && text.is_empty()) {
                text.push(c);
            }
        }
    }

    /// Parses the typed seed. A valid seed restarts floor 1 with full health;
    /// anything else is dropped. Seed entry closes either way.
    fn commit_seed(&mut self) -> DescentResult<()> {
        let Some(text) = self.seed_entry.take() else {
            return Ok(());
        };
        match text.parse::<i64>() {
            Ok(seed) => {
                self.seed = seed;
                self.reset_to_first_floor()?;
                self.events.push(GameEvent::SeedChanged { seed });
                info!("Seed changed to {}", seed);
            }
            Err(_) => {
                debug!("Rejected seed input {:?}", text);
                self.events.push(GameEvent::SeedRejected { input: text });
            }
        }
        Ok(())
    }

    /// Stairs down lead one floor deeper; stairs up lead back when there is a
    /// floor above.
    fn take_stairs(&mut self) -> DescentResult<()> {
        let position = self.world.player.position;
        let current = self.world.floor.floor;
        let fallback = self.settings.generation.fallback_start;

        if Some(position) == self.world.floor.stairs_down {
            self.regenerate(current + 1, true, true)?;
            self.world.player.position = self.world.floor.stairs_up.unwrap_or(fallback);
        } else if Some(position) == self.world.floor.stairs_up && current > 1 {
            let above = current - 1;
            self.regenerate(above, above > 1, true)?;
            self.world.player.position = self.world.floor.stairs_down.unwrap_or(fallback);
        } else {
            return Ok(());
        }

        self.world.nudge_off_stairs();
        Ok(())
    }

    fn check_encounter(&mut self) {
        let floor = &self.world.floor;
        let boss_active = self.settings.generation.is_boss_floor(floor.floor);
        let Some(handle) = floor.enemy_at(self.world.player.position, boss_active) else {
            return;
        };
        let Some(enemy) = floor.enemy(handle) else {
            return;
        };

        info!(
            "{} encountered at {:?} on floor {}",
            enemy.kind.name(),
            enemy.position,
            floor.floor
        );
        self.events.push(GameEvent::CombatStarted { kind: enemy.kind });
        self.combat = Some(CombatSession::new(
            handle,
            enemy,
            self.settings.combat.enemy_turn_delay,
        ));
    }

    fn combat_action(&mut self, action: CombatAction) -> DescentResult<()> {
        let Some(session) = self.combat.as_mut() else {
            return Ok(());
        };
        let outcome = session.apply_player_action(action, &self.settings.combat, &mut self.rng)?;

        match outcome {
            ActionOutcome::Attacked { damage } => {
                self.events.push(GameEvent::PlayerAttacked { damage });
            }
            ActionOutcome::Defended => self.events.push(GameEvent::PlayerDefended),
            ActionOutcome::FleeSucceeded => {
                self.events.push(GameEvent::FleeSucceeded);
                self.step_away_after_flee();
            }
            ActionOutcome::FleeFailed => self.events.push(GameEvent::FleeFailed),
        }
        Ok(())
    }

    /// Moves the player to the first free orthogonal floor tile (left, right,
    /// up, down). With no free neighbor the player stays put.
    fn step_away_after_flee(&mut self) {
        let floor = &self.world.floor;
        let free = self
            .world
            .player
            .position
            .orthogonal_neighbors()
            .into_iter()
            .find(|&pos| floor.grid.is_floor(pos) && !floor.is_occupied(pos));
        if let Some(pos) = free {
            self.world.player.position = pos;
        }
    }

    fn advance_combat(&mut self) {
        let Some(session) = self.combat.as_mut() else {
            return;
        };
        let kind = session.enemy_kind;
        let handle = session.enemy;

        match session.advance(&mut self.world.player, &mut self.rng) {
            EnemyTurnOutcome::Waiting => {}
            EnemyTurnOutcome::Resolved { damage, defended } => {
                if let Some(damage) = damage {
                    self.events.push(GameEvent::EnemyAttacked {
                        kind,
                        damage,
                        defended,
                    });
                }
                if session.phase == CombatPhase::Victory {
                    self.events.push(GameEvent::EnemyDefeated { kind });
                }
            }
            EnemyTurnOutcome::PlayerDefeated { damage } => {
                self.events.push(GameEvent::EnemyAttacked {
                    kind,
                    damage,
                    defended: session.player_defending,
                });
                self.events.push(GameEvent::PlayerDefeated { kind });
                self.finish_combat(CombatResolution::Defeat(handle));
            }
        }
    }

    /// Drops the combat session and applies its result to the world.
    fn finish_combat(&mut self, resolution: CombatResolution) {
        self.combat = None;
        match resolution {
            CombatResolution::Victory(EnemyHandle::Boss) => {
                self.status = GameStatus::Won;
                self.events.push(GameEvent::GameWon);
                info!("Boss defeated with seed {}", self.seed);
            }
            CombatResolution::Victory(handle) => {
                self.world.floor.remove_enemy(handle);
                info!("Enemy {:?} defeated on floor {}", handle, self.floor_index());
            }
            CombatResolution::Fled(handle) => {
                info!("Fled from {:?} on floor {}", handle, self.floor_index());
            }
            CombatResolution::Defeat(handle) => {
                self.world.floor.remove_enemy(handle);
                self.status = GameStatus::Lost;
                info!("Player defeated on floor {}", self.floor_index());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Direction, Tile};

    fn playing_session(seed: i64) -> GameSession {
        let mut session = GameSession::new(seed, GameSettings::default()).unwrap();
        session.handle_intent(Intent::StartNewGame).unwrap();
        session.drain_events();
        session
    }

    fn tick_until_player_turn(session: &mut GameSession) {
        for _ in 0..100 {
            if session.input_mode() != InputMode::CombatBusy {
                return;
            }
            session.tick().unwrap();
        }
        panic!("enemy turn never resolved");
    }

    #[test]
    fn test_session_starts_on_title() {
        let mut session = GameSession::new(42, GameSettings::default()).unwrap();
        assert_eq!(session.input_mode(), InputMode::Title);

        // The world does not move behind the title screen.
        let before = session.snapshot();
        for _ in 0..200 {
            session.tick().unwrap();
        }
        assert_eq!(session.snapshot().roaming, before.roaming);

        session.step([Intent::Move(Direction::East)]).unwrap();
        assert_eq!(session.status(), GameStatus::Title);
        session.step([Intent::StartNewGame]).unwrap();
        assert_eq!(session.status(), GameStatus::Playing);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let mut settings = GameSettings::default();
        settings.combat.flee_chance = 2.0;
        assert!(GameSession::new(1, settings).is_err());
    }

    #[test]
    fn test_seed_entry_accepts_signed_digits() {
        let mut session = playing_session(42);
        session.handle_intent(Intent::EnterSeedEdit).unwrap();
        assert_eq!(session.input_mode(), InputMode::SeedEntry);

        for c in ['-', '1', 'x', '-', '2'] {
            session.handle_intent(Intent::AppendSeedChar(c)).unwrap();
        }
        assert_eq!(session.seed_entry(), Some("-12"));
        session.handle_intent(Intent::Backspace).unwrap();
        assert_eq!(session.seed_entry(), Some("-1"));

        session.handle_intent(Intent::CommitSeed).unwrap();
        assert_eq!(session.seed(), -1);
        assert_eq!(session.floor_index(), 1);
        assert_eq!(session.input_mode(), InputMode::Exploring);
        assert!(session
            .drain_events()
            .contains(&GameEvent::SeedChanged { seed: -1 }));
    }

    #[test]
    fn test_invalid_seed_is_ignored() {
        let mut session = playing_session(42);
        let before = session.snapshot();

        session.handle_intent(Intent::EnterSeedEdit).unwrap();
        session.handle_intent(Intent::AppendSeedChar('-')).unwrap();
        session.handle_intent(Intent::CommitSeed).unwrap();

        assert_eq!(session.seed(), 42);
        assert_eq!(session.seed_entry(), None);
        assert_eq!(session.snapshot().grid, before.grid);
    }

    #[test]
    fn test_cancel_seed_entry() {
        let mut session = playing_session(42);
        session.handle_intent(Intent::EnterSeedEdit).unwrap();
        session.handle_intent(Intent::AppendSeedChar('7')).unwrap();
        session.handle_intent(Intent::CancelSeedEdit).unwrap();
        assert_eq!(session.seed(), 42);
        assert_eq!(session.input_mode(), InputMode::Exploring);
    }

    #[test]
    fn test_seed_commit_resets_health() {
        let mut session = playing_session(42);
        session.world.player.hp = 10;
        session.handle_intent(Intent::EnterSeedEdit).unwrap();
        session.handle_intent(Intent::AppendSeedChar('9')).unwrap();
        session.handle_intent(Intent::CommitSeed).unwrap();
        assert_eq!(session.world.player.hp, 100);
        assert_eq!(session.world.player.position, session.world.floor.player_start);
    }

    #[test]
    fn test_descending_and_climbing_stairs() {
        let mut session = playing_session(42);
        let down = session.world.floor.stairs_down.unwrap();
        session.world.player.position = down;
        session.tick().unwrap();

        assert_eq!(session.floor_index(), 2);
        let position = session.world.player.position;
        assert!(!session.world.floor.grid.get(position).unwrap().is_stairs());
        assert!(session
            .drain_events()
            .contains(&GameEvent::FloorEntered { floor: 2 }));

        session.combat = None;
        let up = session.world.floor.stairs_up.unwrap();
        session.world.player.position = up;
        session.tick().unwrap();
        assert_eq!(session.floor_index(), 1);
        assert!(session.world.floor.stairs_up.is_none());
        assert!(session.world.floor.stairs_down.is_some());
    }

    #[test]
    fn test_up_stairs_on_first_floor_do_nothing() {
        let mut session = playing_session(42);
        let up = session.world.floor.stairs_up.unwrap();
        session.world.player.position = up;
        session.tick().unwrap();
        assert_eq!(session.floor_index(), 1);
    }

    #[test]
    fn test_seed_locked_below_first_floor() {
        let mut session = playing_session(42);
        session.world.player.position = session.world.floor.stairs_down.unwrap();
        session.tick().unwrap();
        session.combat = None;

        session.handle_intent(Intent::EnterSeedEdit).unwrap();
        assert_eq!(session.seed_entry(), None);
        assert!(!session.snapshot().seed_editable);
    }

    #[test]
    fn test_revisited_floor_is_identical() {
        let mut session = playing_session(7);
        let first = session.world.floor.grid.clone();
        session.world.player.position = session.world.floor.stairs_down.unwrap();
        session.tick().unwrap();
        session.combat = None;
        session.world.player.position = session.world.floor.stairs_up.unwrap();
        session.tick().unwrap();

        // Floor 1 rebuilt from below has no up stairs; everything else matches.
        let rebuilt = &session.world.floor.grid;
        let up = session.snapshot();
        assert_eq!(up.floor, 1);
        for y in 0..first.height() {
            for x in 0..first.width() {
                let pos = Position::new(x, y);
                match first.get(pos) {
                    Some(Tile::StairsUp) => assert_eq!(rebuilt.get(pos), Some(Tile::Floor)),
                    tile => assert_eq!(rebuilt.get(pos), tile),
                }
            }
        }
    }

    #[test]
    fn test_encounter_and_victory_removes_enemy() {
        let mut session = playing_session(42);
        let target = session.world.floor.roaming[0].clone();
        session.world.player.position = target.position;
        session.tick().unwrap();

        assert_eq!(session.input_mode(), InputMode::CombatTurn);
        assert_eq!(
            session.combat.as_ref().map(|c| c.enemy),
            Some(EnemyHandle::Roaming(target.id))
        );

        for _ in 0..10 {
            if session.input_mode() != InputMode::CombatTurn {
                break;
            }
            session.handle_intent(Intent::Attack).unwrap();
            tick_until_player_turn(&mut session);
        }

        if session.status() == GameStatus::Playing {
            assert_eq!(session.input_mode(), InputMode::CombatAwaitingAck);
            session.handle_intent(Intent::Acknowledge).unwrap();
            assert!(session.combat.is_none());
        }
        assert!(session.world.floor.roaming.iter().all(|e| e.id != target.id));
    }

    #[test]
    fn test_enemy_turn_ignores_input() {
        let mut session = playing_session(42);
        session.world.player.position = session.world.floor.roaming[0].position;
        session.tick().unwrap();
        session.handle_intent(Intent::Defend).unwrap();
        assert_eq!(session.input_mode(), InputMode::CombatBusy);

        let hp = session.world.player.hp;
        session.handle_intent(Intent::Attack).unwrap();
        session.handle_intent(Intent::Acknowledge).unwrap();
        assert_eq!(session.world.player.hp, hp);
        assert_eq!(session.input_mode(), InputMode::CombatBusy);
    }

    #[test]
    fn test_certain_flee_steps_away_and_waits() {
        let mut settings = GameSettings::default();
        settings.combat.flee_chance = 1.0;
        let mut session = GameSession::new(42, settings).unwrap();
        session.handle_intent(Intent::StartNewGame).unwrap();

        let enemy_pos = session.world.floor.roaming[0].position;
        session.world.player.position = enemy_pos;
        session.tick().unwrap();
        session.handle_intent(Intent::Flee).unwrap();

        assert_eq!(session.input_mode(), InputMode::CombatAwaitingAck);
        assert_eq!(session.world.player.position.manhattan_distance(enemy_pos), 1);
        session.handle_intent(Intent::Acknowledge).unwrap();
        assert!(session.combat.is_none());
        assert_eq!(session.world.floor.roaming[0].position, enemy_pos);
    }

    #[test]
    fn test_defeat_freezes_world_until_new_game() {
        let mut session = playing_session(42);
        let winner = session.world.floor.roaming[0].clone();
        session.world.player.hp = 1;
        session.world.player.position = winner.position;
        session.tick().unwrap();
        session.handle_intent(Intent::Defend).unwrap();
        for _ in 0..40 {
            session.tick().unwrap();
        }

        assert_eq!(session.status(), GameStatus::Lost);
        assert_eq!(session.input_mode(), InputMode::Ended);
        assert!(session.combat.is_none());
        assert_eq!(session.world.player.hp, 0);
        assert!(session.world.floor.roaming.iter().all(|e| e.id != winner.id));

        session.handle_intent(Intent::StartNewGame).unwrap();
        assert_eq!(session.status(), GameStatus::Playing);
        assert_eq!(session.world.player.hp, 100);
        assert_eq!(session.seed(), 42);
        assert_eq!(session.floor_index(), 1);
    }

    #[test]
    fn test_losing_to_tracked_enemy_removes_it() {
        let mut session = playing_session(42);
        let tracked = session.world.floor.tracked.clone().expect("strong enemy");
        session.world.player.hp = 1;
        session.world.player.position = tracked.position;
        session.tick().unwrap();
        assert_eq!(
            session.combat.as_ref().map(|c| c.enemy),
            Some(EnemyHandle::Tracked)
        );

        session.handle_intent(Intent::Defend).unwrap();
        for _ in 0..40 {
            session.tick().unwrap();
        }
        assert_eq!(session.status(), GameStatus::Lost);
        assert!(session.world.floor.tracked.is_none());
    }

    /// Starts a fight with a lone weak enemy whose four neighbors are set to
    /// `neighbors` (left, right, up, down). Fleeing always succeeds.
    fn flee_scenario(neighbors: [Tile; 4]) -> (GameSession, Position) {
        let mut settings = GameSettings::default();
        settings.combat.flee_chance = 1.0;
        let mut session = GameSession::new(42, settings).unwrap();
        session.handle_intent(Intent::StartNewGame).unwrap();

        let floor = &mut session.world.floor;
        let target = floor.roaming[0].clone();
        floor.roaming = vec![target.clone()];
        floor.tracked = None;
        for (pos, tile) in target.position.orthogonal_neighbors().into_iter().zip(neighbors) {
            floor.grid.set(pos, tile).unwrap();
        }

        session.world.player.position = target.position;
        session.tick().unwrap();
        assert_eq!(session.input_mode(), InputMode::CombatTurn);
        (session, target.position)
    }

    #[test]
    fn test_flee_skips_occupied_and_stair_neighbors() {
        let (mut session, start) =
            flee_scenario([Tile::Floor, Tile::StairsDown, Tile::Floor, Tile::Floor]);
        let [left, _, up, _] = start.orthogonal_neighbors();
        let mut blocker = session.world.floor.roaming[0].clone();
        blocker.id = 99;
        blocker.position = left;
        session.world.floor.roaming.push(blocker);

        session.handle_intent(Intent::Flee).unwrap();
        assert_eq!(session.input_mode(), InputMode::CombatAwaitingAck);
        assert_eq!(session.world.player.position, up);
    }

    #[test]
    fn test_flee_prefers_left_then_right() {
        let (mut session, start) =
            flee_scenario([Tile::Wall, Tile::Floor, Tile::Floor, Tile::Floor]);
        let [_, right, _, _] = start.orthogonal_neighbors();
        session.handle_intent(Intent::Flee).unwrap();
        assert_eq!(session.world.player.position, right);
    }

    #[test]
    fn test_flee_without_free_neighbor_stays_put() {
        let (mut session, start) = flee_scenario([Tile::Wall; 4]);
        session.handle_intent(Intent::Flee).unwrap();
        assert_eq!(session.input_mode(), InputMode::CombatAwaitingAck);
        assert_eq!(session.world.player.position, start);

        session.handle_intent(Intent::Acknowledge).unwrap();
        assert!(session.combat.is_none());
        assert_eq!(session.world.floor.roaming.len(), 1);
    }

    #[test]
    fn test_enemies_hold_still_during_combat() {
        let mut settings = GameSettings::default();
        settings.timing.enemy_move_interval = 1;
        settings.combat.enemy_turn_delay = 60;
        settings.combat.flee_chance = 1.0;
        let mut session = GameSession::new(42, settings).unwrap();
        session.handle_intent(Intent::StartNewGame).unwrap();

        session.world.player.position = session.world.floor.roaming[0].position;
        session.tick().unwrap();
        session.handle_intent(Intent::Defend).unwrap();

        let frozen = session.snapshot();
        for _ in 0..50 {
            session.tick().unwrap();
            assert_eq!(session.input_mode(), InputMode::CombatBusy);
        }
        let during = session.snapshot();
        assert_eq!(during.roaming, frozen.roaming);
        assert_eq!(during.tracked, frozen.tracked);

        tick_until_player_turn(&mut session);
        session.handle_intent(Intent::Flee).unwrap();
        session.handle_intent(Intent::Acknowledge).unwrap();
        assert!(session.combat.is_none());

        for _ in 0..20 {
            session.tick().unwrap();
        }
        let after = session.snapshot();
        assert!(after.roaming != frozen.roaming || after.tracked != frozen.tracked);
    }

    #[test]
    fn test_quit_is_accepted_everywhere() {
        let mut session = GameSession::new(42, GameSettings::default()).unwrap();
        session.handle_intent(Intent::Quit).unwrap();
        assert!(session.quit_requested());
    }

    #[test]
    fn test_event_messages() {
        assert_eq!(
            GameEvent::FloorEntered { floor: 3 }.message(),
            "You enter floor 3"
        );
        assert_eq!(
            GameEvent::CombatStarted {
                kind: EnemyKind::Boss
            }
            .message(),
            "A Dungeon Lord blocks your way!"
        );
    }
}
