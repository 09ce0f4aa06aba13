//! # Intents
//!
//! The discrete commands the session accepts, and the input modes that
//! decide which of them a key press can produce.

use crate::Direction;
use serde::{Deserialize, Serialize};

/// A single player command handed to [`crate::GameSession::handle_intent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    /// Step one tile while exploring
    Move(Direction),
    Attack,
    Defend,
    Flee,
    /// Close a finished encounter
    Acknowledge,
    /// Open the seed editor (floor 1 only)
    EnterSeedEdit,
    /// Type one character into the seed editor
    AppendSeedChar(char),
    Backspace,
    CommitSeed,
    CancelSeedEdit,
    /// Leave the title, game over or win screen
    StartNewGame,
    Quit,
}

/// Which group of intents the session currently accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputMode {
    Title,
    Exploring,
    SeedEntry,
    /// Player's turn in combat
    CombatTurn,
    /// Enemy turn countdown; only quitting is possible
    CombatBusy,
    /// Victory or a successful flee is on screen
    CombatAwaitingAck,
    /// Game over or win screen
    Ended,
}

impl InputMode {
    /// Short prompt for the status line.
    pub fn prompt(self) -> &'static str {
        match self {
            InputMode::Title => "Press SPACE to enter the dungeon",
            InputMode::Exploring => "Arrows: move   S: change seed   ESC: quit",
            InputMode::SeedEntry => "Type a seed, ENTER to apply, ESC to cancel",
            InputMode::CombatTurn => "A: attack   D: defend   F: flee",
            InputMode::CombatBusy => "Enemy's turn...",
            InputMode::CombatAwaitingAck => "Press any key to continue",
            InputMode::Ended => "Press SPACE to play again",
        }
    }
}
